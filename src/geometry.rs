/// Spatial primitives shared by every subsystem.
///
/// The simulation mixes two coordinate spaces: the snake and the food live on
/// discrete grid cells, while agents, the boss and projectiles move through
/// continuous pixel space.  Headings are plain degrees measured the way
/// `atan2` reports them (0° points along +x, 90° along +y, screen-down).
use std::ops::{Add, AddAssign, Mul, Sub};

// ── Continuous space ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

// ── Discrete grid ────────────────────────────────────────────────────────────

/// A grid cell addressed by column and row.  Signed so that a head which has
/// just left the board can still be represented (and detected).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn offset(self, dcol: i32, drow: i32) -> Cell {
        Cell::new(self.col + dcol, self.row + drow)
    }

    /// Largest per-axis distance: two cells are within `n` of each other
    /// when both the column and row gaps are below `n`.
    pub fn chebyshev(self, other: Cell) -> i32 {
        (self.col - other.col).abs().max((self.row - other.row).abs())
    }

    pub fn in_bounds(self, columns: i32, rows: i32) -> bool {
        (0..columns).contains(&self.col) && (0..rows).contains(&self.row)
    }
}

/// Pixel centre of a grid cell.
pub fn cell_center(cell: Cell, cell_size: f32) -> Vec2 {
    Vec2::new(
        cell.col as f32 * cell_size + cell_size / 2.0,
        cell.row as f32 * cell_size + cell_size / 2.0,
    )
}

/// Grid cell containing a pixel position.
pub fn cell_of(pos: Vec2, cell_size: f32) -> Cell {
    Cell::new(
        (pos.x / cell_size).floor() as i32,
        (pos.y / cell_size).floor() as i32,
    )
}

// ── Angles ───────────────────────────────────────────────────────────────────

/// Bearing in degrees from `from` towards `to`.
pub fn bearing_deg(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}

/// Unit vector pointing along `heading` degrees.
pub fn heading_vector(heading: f32) -> Vec2 {
    let rad = heading.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Signed smallest difference `a - b`, wrapped into [-180, 180).
pub fn angle_delta(a: f32, b: f32) -> f32 {
    (a - b + 180.0).rem_euclid(360.0) - 180.0
}

/// Unit vector of the cardinal direction closest to `heading`.
pub fn cardinal_vector(heading: f32) -> Vec2 {
    let quadrant = (heading.rem_euclid(360.0) / 90.0).round() as i32 % 4;
    match quadrant {
        0 => Vec2::new(1.0, 0.0),
        1 => Vec2::new(0.0, 1.0),
        2 => Vec2::new(-1.0, 0.0),
        _ => Vec2::new(0.0, -1.0),
    }
}
