/// Straight-line ballistics.  A projectile's velocity is decided once, at
/// the instant it is fired, and never revised afterwards.
use crate::config::ProjectileConfig;
use crate::entities::{Projectile, Shooter};
use crate::geometry::{bearing_deg, heading_vector, Vec2};

/// Fire from `origin` along `angle_deg` degrees.
pub fn fire(origin: Vec2, angle_deg: f32, speed: f32, shooter: Shooter) -> Projectile {
    Projectile {
        position: origin,
        velocity: heading_vector(angle_deg) * speed,
        shooter,
    }
}

/// One shot at the exact current bearing to `target`.
pub fn aimed(origin: Vec2, target: Vec2, speed: f32, shooter: Shooter) -> Projectile {
    fire(origin, bearing_deg(origin, target), speed, shooter)
}

/// Three simultaneous shots: the exact bearing and ±`spread_deg` around it.
pub fn spread(origin: Vec2, target: Vec2, spread_deg: f32, speed: f32, shooter: Shooter) -> [Projectile; 3] {
    let centre = bearing_deg(origin, target);
    [
        fire(origin, centre - spread_deg, speed, shooter),
        fire(origin, centre, speed, shooter),
        fire(origin, centre + spread_deg, speed, shooter),
    ]
}

pub fn is_off_screen(position: Vec2, width: f32, height: f32, margin: f32) -> bool {
    position.x < -margin || position.x > width + margin || position.y < -margin || position.y > height + margin
}

pub fn hits(position: Vec2, head: Vec2, radius: f32, half_cell: f32) -> bool {
    position.distance(head) < radius + half_cell
}

/// What survived a projectile pass, and whether the head was struck.
#[derive(Debug)]
pub struct ProjectileStep {
    pub survivors: Vec<Projectile>,
    pub hits: usize,
}

/// Advance every projectile one frame, prune those beyond the off-screen
/// margin, then remove any that touch the snake head.
pub fn advance_all(
    projectiles: &[Projectile],
    head: Vec2,
    cfg: &ProjectileConfig,
    width: f32,
    height: f32,
    cell_size: f32,
) -> ProjectileStep {
    let mut hit_count = 0;
    let survivors = projectiles
        .iter()
        .filter_map(|p| {
            let position = p.position + p.velocity;
            if is_off_screen(position, width, height, cfg.offscreen_margin) {
                return None;
            }
            if hits(position, head, cfg.radius, cell_size / 2.0) {
                hit_count += 1;
                return None;
            }
            Some(Projectile { position, ..p.clone() })
        })
        .collect();

    ProjectileStep {
        survivors,
        hits: hit_count,
    }
}
