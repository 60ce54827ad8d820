//! Error Types
//!
//! Construction-time problems (malformed boxes, bad descriptions, bad config)
//! are fatal to scene setup. Per-tick anomalies are reported with the same
//! type but absorbed by the world as no-ops.

use crate::scene::graph::NodeId;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PhysicsError>;

/// Errors raised by the scene graph and collision world.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    /// A box has `min > max` (or a non-finite corner) on some axis.
    #[error("invalid bounds on axis {axis}: min {min} > max {max}")]
    InvalidBounds {
        /// Axis index (0 = X, 1 = Y, 2 = Z)
        axis: usize,
        /// Offending minimum
        min: f32,
        /// Offending maximum
        max: f32,
    },

    /// Box index out of range for the node's box list.
    #[error("box index {index} out of range (node has {len} boxes)")]
    InvalidIndex {
        /// Requested index
        index: usize,
        /// Number of boxes on the node
        len: usize,
    },

    /// A resolution call referenced a node with no collision category.
    #[error("node {0} has no collision category")]
    UnclassifiedNode(NodeId),

    /// Handle does not refer to a live node.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Attaching `child` under `parent` would create a cycle.
    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCycle {
        /// Intended parent
        parent: NodeId,
        /// Intended child
        child: NodeId,
    },

    /// `child` is not attached under `parent`.
    #[error("{child} is not a child of {parent}")]
    NotAChild {
        /// Parent handle
        parent: NodeId,
        /// Child handle
        child: NodeId,
    },

    /// The graph root cannot be re-parented, detached or despawned.
    #[error("the scene root cannot be moved or removed")]
    RootImmovable,

    /// FREE body mass outside `[0, 1]`.
    #[error("mass {0} outside [0, 1]")]
    InvalidMass(f32),

    /// A scene description gives a FREE node a starting velocity.
    #[error("FREE node {0:?} must start at rest")]
    FreeBodyInMotion(String),

    /// Unrecognized `collidable` string in a scene description.
    #[error("unknown collision category: {0}")]
    UnknownCategory(String),

    /// A description names a reaction hook the registry does not provide.
    #[error("no reaction hook registered under {0:?}")]
    UnknownHook(String),

    /// World configuration out of range.
    #[error("invalid world config: {0}")]
    InvalidConfig(String),

    /// Scene or config JSON could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
