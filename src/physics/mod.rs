//! Physics Module
//!
//! Per-tick collision and contact resolution. 100% deterministic for a given
//! scene, config and sequence of `dt` values.
//!
//! ## Module Structure
//!
//! - `config`: Gravity, friction, ground plane
//! - `collision`: Overlap test, minimal push-out, per-pair response
//! - `world`: Membership snapshot and the four-phase tick

pub mod config;
pub mod collision;
pub mod world;

// Re-export key types
pub use config::WorldConfig;
pub use collision::{Contact, PushDirection, PushOut};
pub use world::{CollisionWorld, Membership};
