//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies
//!
//! Hosts drive it through `FixedClock::advance`, feeding each step to
//! `tick`, then `blend_all` with the returned alpha before drawing.

pub mod body;
pub mod clock;
pub mod collider;
pub mod state;
pub mod tick;

pub use body::{Body, BodyRole, PrevPose};
pub use clock::FixedClock;
pub use collider::{Collider, IntersectTest, unit_sphere_points};
pub use state::{GameEvent, GamePhase, GameState, LEVELS, LevelSpec};
pub use tick::{TickInput, is_home_run, tick, update_progression};
