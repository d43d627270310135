/// The player's snake: an ordered run of grid cells, head first.
///
/// The simulation core reads it through `head_position`, `occupied_cells`
/// and `body_length`, and only ever mutates it through `grow` (on food
/// pickup) and `advance` (on the snake's own movement cadence).
use std::collections::VecDeque;

use crate::entities::DeathCause;
use crate::geometry::{cell_center, Cell, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Snake {
    segments: VecDeque<Cell>,
    direction: Direction,
    /// Buffered input, applied on the next `advance`.
    pending: Direction,
    /// Cells still to be appended before the tail starts trailing again.
    growth: u32,
}

impl Snake {
    /// A snake centred on the board, facing right, body trailing left.
    pub fn new(columns: i32, rows: i32, length: usize) -> Self {
        let head = Cell::new(columns / 2, rows / 2);
        let segments = (0..length as i32).map(|i| head.offset(-i, 0)).collect();
        Self {
            segments,
            direction: Direction::Right,
            pending: Direction::Right,
            growth: 0,
        }
    }

    /// Build a snake from explicit cells, head first.
    pub fn from_segments(segments: impl IntoIterator<Item = Cell>, direction: Direction) -> Self {
        Self {
            segments: segments.into_iter().collect(),
            direction,
            pending: direction,
            growth: 0,
        }
    }

    /// Buffer a direction change.  The exact reverse of the current heading
    /// is ignored so the head can never fold back into the neck.
    pub fn steer(&mut self, direction: Direction) {
        if direction != self.direction.opposite() {
            self.pending = direction;
        }
    }

    /// Move one cell along the buffered direction.
    pub fn advance(&mut self) {
        self.direction = self.pending;
        let (dc, dr) = self.direction.delta();
        let new_head = self.head().offset(dc, dr);
        self.segments.push_front(new_head);

        if self.growth > 0 {
            self.growth -= 1;
        } else {
            self.segments.pop_back();
        }
    }

    pub fn grow(&mut self, cells: u32) {
        self.growth += cells;
    }

    pub fn head(&self) -> Cell {
        // Only an empty `from_segments` snake lacks a head.
        self.segments.front().copied().unwrap_or(Cell::new(0, 0))
    }

    pub fn head_position(&self, cell_size: f32) -> Vec2 {
        cell_center(self.head(), cell_size)
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.segments.iter()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.segments.contains(&cell)
    }

    pub fn body_length(&self) -> usize {
        self.segments.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_growth(&self) -> u32 {
        self.growth
    }

    /// Wall first, then self-overlap.  `None` while the snake is alive.
    pub fn collision(&self, columns: i32, rows: i32) -> Option<DeathCause> {
        let head = self.head();
        if !head.in_bounds(columns, rows) {
            return Some(DeathCause::Wall);
        }
        if self.segments.iter().skip(1).any(|&c| c == head) {
            return Some(DeathCause::SelfCollision);
        }
        None
    }
}
