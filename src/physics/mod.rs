/// Player physics: swept-AABB collision against the voxel grid, DDA block
/// picking, and the locomotion controller.
pub mod collision;
pub mod player;
pub mod raycast;

pub use collision::{Aabb, CollisionFlags, PLAYER_EYE_LEVEL, PLAYER_HEIGHT, PLAYER_WIDTH};
pub use player::{MoveInput, Player};
pub use raycast::{raycast, RayHit, MAX_RAY_STEPS};
