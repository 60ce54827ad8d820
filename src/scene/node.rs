//! Transform Node
//!
//! A spatial entity with local TRS components, derived local/world matrices,
//! a kinematic velocity, local-space bounding boxes and a collision category.
//! Parent/child edges live in the owning [`SceneGraph`](super::graph::SceneGraph).

use std::fmt;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::aabb::Aabb;
use crate::core::error::{PhysicsError, Result};
use crate::scene::graph::NodeId;

/// Default mass of a FREE body when none is given.
pub const DEFAULT_FREE_MASS: f32 = 0.5;

// =============================================================================
// REACTION HOOK
// =============================================================================

/// Zero-argument side effect fired when a TRIGGER node is hit.
///
/// Cloning shares the same callback.
#[derive(Clone)]
pub struct ReactHook(Arc<dyn Fn() + Send + Sync>);

impl ReactHook {
    /// Wrap a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the callback.
    #[inline]
    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for ReactHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReactHook(..)")
    }
}

// =============================================================================
// COLLISION CATEGORY
// =============================================================================

/// Collision category with per-category data.
#[derive(Clone, Debug, Default)]
pub enum Category {
    /// Not part of collision (still integrated).
    #[default]
    None,
    /// Immovable; stops free bodies dead.
    Obstacle,
    /// Moves and gets pushed out of overlaps.
    Free {
        /// Fraction of velocity a body loses when it hits this one.
        mass: f32,
    },
    /// Pushes free bodies out and fires a reaction.
    Trigger {
        /// Fired once per resolved overlap.
        on_react: Option<ReactHook>,
    },
}

impl Category {
    /// FREE category with the default mass.
    pub fn free() -> Self {
        Category::Free { mass: DEFAULT_FREE_MASS }
    }

    /// FREE category with an explicit mass in `[0, 1]`.
    pub fn free_with_mass(mass: f32) -> Result<Self> {
        let category = Category::Free { mass };
        category.validate()?;
        Ok(category)
    }

    /// TRIGGER category with a hook.
    pub fn trigger(hook: ReactHook) -> Self {
        Category::Trigger { on_react: Some(hook) }
    }

    /// Plain tag for this category.
    pub fn kind(&self) -> CategoryKind {
        match self {
            Category::None => CategoryKind::None,
            Category::Obstacle => CategoryKind::Obstacle,
            Category::Free { .. } => CategoryKind::Free,
            Category::Trigger { .. } => CategoryKind::Trigger,
        }
    }

    /// Check per-category data. A FREE mass must lie in `[0, 1]` so that
    /// scaling by `1 - mass` never flips velocity.
    pub fn validate(&self) -> Result<()> {
        match self {
            Category::Free { mass } if !(0.0..=1.0).contains(mass) => {
                Err(PhysicsError::InvalidMass(*mass))
            }
            _ => Ok(()),
        }
    }

    /// Anything but `None`.
    #[inline]
    pub fn is_classified(&self) -> bool {
        !matches!(self, Category::None)
    }
}

/// Data-free category tag, used for contact records and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CategoryKind {
    /// Unclassified
    None = 0,
    /// Immovable
    Obstacle = 1,
    /// Movable body
    Free = 2,
    /// Reactive object
    Trigger = 3,
}

// =============================================================================
// NODE
// =============================================================================

/// A transformable scene node.
#[derive(Clone, Debug)]
pub struct Node {
    /// Display name (not required to be unique)
    pub name: String,

    /// Local translation
    pub translation: Vec3,

    /// Local rotation (unit quaternion)
    pub rotation: Quat,

    /// Local scale
    pub scale: Vec3,

    /// Velocity in units per second
    pub velocity: Vec3,

    category: Category,
    boxes: Vec<Aabb>,

    /// Local matrix, always `T * R * S`.
    matrix: Mat4,
    /// Parent's world matrix as of the last refresh.
    parent_global: Mat4,
    /// `parent_global * matrix`.
    global: Mat4,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// Create an unclassified node at the origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            velocity: Vec3::ZERO,
            category: Category::None,
            boxes: Vec::new(),
            matrix: Mat4::IDENTITY,
            parent_global: Mat4::IDENTITY,
            global: Mat4::IDENTITY,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Builder: set translation and refresh matrices.
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self.update_matrix();
        self
    }

    /// Builder: set rotation and refresh matrices.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation.normalize();
        self.update_matrix();
        self
    }

    /// Builder: set scale and refresh matrices.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self.update_matrix();
        self
    }

    /// Builder: set category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Builder: append a local-space box.
    pub fn with_box(mut self, aabb: Aabb) -> Self {
        self.boxes.push(aabb);
        self
    }

    // -------------------------------------------------------------------------
    // Transform
    // -------------------------------------------------------------------------

    /// Recompute the local matrix from TRS and the world matrix from the
    /// cached parent world matrix.
    pub fn update_matrix(&mut self) {
        self.matrix =
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
        self.global = self.parent_global * self.matrix;
    }

    /// Replace the local matrix and decompose it back into TRS.
    pub fn set_matrix(&mut self, matrix: Mat4) {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.translation = translation;
        self.update_matrix();
    }

    /// Refresh against a new parent world matrix.
    pub(crate) fn update_matrix_under(&mut self, parent_global: Mat4) {
        self.parent_global = parent_global;
        self.update_matrix();
    }

    /// Local matrix.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// World matrix.
    #[inline]
    pub fn global_matrix(&self) -> Mat4 {
        self.global
    }

    /// World translation (as of the last matrix refresh).
    #[inline]
    pub fn world_translation(&self) -> Vec3 {
        self.global.w_axis.truncate()
    }

    /// Local +Z rotated into parent space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local +Y rotated into parent space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Add to velocity. Controllers use this between ticks.
    #[inline]
    pub fn accelerate(&mut self, delta: Vec3) {
        self.velocity += delta;
    }

    // -------------------------------------------------------------------------
    // Bounds
    // -------------------------------------------------------------------------

    /// Local-space boxes.
    #[inline]
    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// Append a local-space box.
    pub fn push_box(&mut self, aabb: Aabb) {
        self.boxes.push(aabb);
    }

    /// The `index`-th box moved to world space (translation only).
    pub fn world_aabb(&self, index: usize) -> Result<Aabb> {
        self.boxes
            .get(index)
            .map(|b| b.translated(self.world_translation()))
            .ok_or(PhysicsError::InvalidIndex {
                index,
                len: self.boxes.len(),
            })
    }

    /// All boxes moved to world space, in list order.
    pub fn world_aabbs(&self) -> impl Iterator<Item = Aabb> + Clone + '_ {
        let offset = self.world_translation();
        self.boxes.iter().map(move |b| b.translated(offset))
    }

    // -------------------------------------------------------------------------
    // Category
    // -------------------------------------------------------------------------

    /// Collision category.
    #[inline]
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Change the category. A running world keeps its old membership.
    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    /// Fire the reaction hook if this is a TRIGGER with one attached.
    pub fn react(&self) {
        if let Category::Trigger { on_react: Some(hook) } = &self.category {
            hook.call();
        }
    }

    // -------------------------------------------------------------------------
    // Hierarchy (read-only; edits go through the graph)
    // -------------------------------------------------------------------------

    /// Parent handle, `None` for the root or a detached node.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in order.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
