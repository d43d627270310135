pub mod ai;
pub mod compute;
pub mod config;
pub mod entities;
pub mod geometry;
pub mod projectile;
pub mod snake;
pub mod spawn;
