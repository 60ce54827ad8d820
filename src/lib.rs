//! # Trackside Physics
//!
//! Per-frame AABB collision and contact resolution over a scene graph of
//! transform nodes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    TRACKSIDE PHYSICS                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                         │
//! │  ├── aabb.rs     - Validated axis-aligned boxes              │
//! │  ├── error.rs    - Error taxonomy                            │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  scene/          - Scene graph                               │
//! │  ├── node.rs     - Transform node, category, react hook      │
//! │  ├── graph.rs    - Generational arena and traversal          │
//! │  └── desc.rs     - Declarative scene description             │
//! │                                                              │
//! │  physics/        - Simulation (deterministic)                │
//! │  ├── config.rs   - Gravity, friction, ground plane           │
//! │  ├── collision.rs- Overlap test and push-out                 │
//! │  └── world.rs    - Four-phase tick                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! A tick is single-threaded and runs to completion. Nodes are visited in
//! traversal order, pairs in membership order, push-out ties in the fixed order
//! `+X, +Y, +Z, -X, -Y, -Z`. Given the same scene, config and `dt` sequence the
//! world produces the same [`state_hash`](physics::CollisionWorld::state_hash).
//!
//! ## Example
//!
//! ```
//! use glam::Vec3;
//! use trackside::{Aabb, Category, CollisionWorld, Node, SceneGraph, WorldConfig};
//!
//! let unit = Aabb::from_half_extents(Vec3::ONE).unwrap();
//! let mut graph = SceneGraph::new();
//! let root = graph.root();
//!
//! let mut car = Node::new("car").with_category(Category::free()).with_box(unit);
//! car.velocity = Vec3::new(5.0, 0.0, 0.0);
//! let car = graph.spawn(root, car).unwrap();
//! graph
//!     .spawn(
//!         root,
//!         Node::new("wall")
//!             .with_category(Category::Obstacle)
//!             .with_box(unit)
//!             .with_translation(Vec3::new(3.0, 0.0, 0.0)),
//!     )
//!     .unwrap();
//!
//! let mut world = CollisionWorld::new(graph, WorldConfig::default()).unwrap();
//! world.update(0.25);
//!
//! let car = world.graph().node(car).unwrap();
//! assert_eq!(car.translation.x, 1.0);
//! assert_eq!(car.velocity, Vec3::ZERO);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod scene;
pub mod physics;

// Re-export commonly used types
pub use crate::core::aabb::Aabb;
pub use crate::core::error::{PhysicsError, Result};
pub use crate::core::hash::StateHash;
pub use crate::scene::graph::{NodeId, SceneGraph};
pub use crate::scene::node::{Category, CategoryKind, Node, ReactHook};
pub use crate::scene::desc::{HookRegistry, SceneDesc};
pub use crate::physics::config::WorldConfig;
pub use crate::physics::collision::{Contact, PushDirection};
pub use crate::physics::world::CollisionWorld;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
