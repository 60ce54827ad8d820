//! Scene Graph Module
//!
//! Transform nodes, the arena that owns them, and the declarative
//! description scenes are built from.
//!
//! ## Module Structure
//!
//! - `node`: Transform node, collision category, reaction hook
//! - `graph`: Generational arena, parent/child edges, traversal
//! - `desc`: Serde scene description and builder

pub mod node;
pub mod graph;
pub mod desc;

// Re-export key types
pub use node::{Node, Category, CategoryKind, ReactHook, DEFAULT_FREE_MASS};
pub use graph::{SceneGraph, NodeId};
pub use desc::{SceneDesc, NodeDesc, BoxDesc, Extras, HookRegistry};
