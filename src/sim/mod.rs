//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, single shared stream
//! - Stable iteration order (slot index order for pools)
//! - No rendering or platform dependencies

pub mod collision;
pub mod creature;
pub mod enemies;
pub mod field;
pub mod player;
pub mod rng;
pub mod score;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use creature::{Chain, ChainMode, Segment};
pub use enemies::{Crosser, Dropper, Flyer, Saucer};
pub use field::{Field, Obstacle};
pub use player::{Bullet, Player, PowerUp};
pub use rng::GameRng;
pub use score::{ScoreEvent, Scoreboard};
pub use state::{Coin, FallingObstacle, GameState, Pickup, ReflectedShot};
pub use tick::{TickInput, tick};
