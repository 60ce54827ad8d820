//! Core primitives.
//!
//! Bounding boxes, errors and state hashing shared by the scene graph and the
//! collision world.

pub mod aabb;
pub mod error;
pub mod hash;

// Re-export core types
pub use aabb::Aabb;
pub use error::{PhysicsError, Result};
pub use hash::{compute_state_hash, StateHash, StateHasher};
