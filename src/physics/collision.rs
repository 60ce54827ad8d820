//! Collision Detection and Resolution
//!
//! Brute-force AABB overlap between nodes and minimal single-axis push-out.
//!
//! ## Push-out
//!
//! For overlapping boxes A and B:
//!
//! ```text
//! diff_a = max_b - min_a   // move A in +X/+Y/+Z to clear B
//! diff_b = max_a - min_b   // move A in -X/-Y/-Z to clear B
//! ```
//!
//! Every non-negative component is a candidate. The smallest wins; ties go to
//! the earliest of `+X, +Y, +Z, -X, -Y, -Z`. Only A moves.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::aabb::Aabb;
use crate::core::error::{PhysicsError, Result};
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::node::{Category, CategoryKind};

// =============================================================================
// PUSH DIRECTION
// =============================================================================

/// Signed axis a body is pushed along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum PushDirection {
    /// +X
    PosX = 0,
    /// +Y
    PosY = 1,
    /// +Z
    PosZ = 2,
    /// -X
    NegX = 3,
    /// -Y
    NegY = 4,
    /// -Z
    NegZ = 5,
}

impl PushDirection {
    /// Candidate order. Earlier entries win ties.
    pub const ORDER: [PushDirection; 6] = [
        PushDirection::PosX,
        PushDirection::PosY,
        PushDirection::PosZ,
        PushDirection::NegX,
        PushDirection::NegY,
        PushDirection::NegZ,
    ];

    /// Axis index (0 = X, 1 = Y, 2 = Z).
    #[inline]
    pub fn axis(self) -> usize {
        self as usize % 3
    }

    /// `+1.0` or `-1.0`.
    #[inline]
    pub fn sign(self) -> f32 {
        if (self as u8) < 3 {
            1.0
        } else {
            -1.0
        }
    }

    /// Unit vector along this direction.
    pub fn unit(self) -> Vec3 {
        let mut v = Vec3::ZERO;
        v[self.axis()] = self.sign();
        v
    }
}

/// Minimal displacement that separates A from B.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushOut {
    /// Direction A moves
    pub direction: PushDirection,
    /// Non-negative distance A moves
    pub distance: f32,
}

impl PushOut {
    /// Displacement vector to add to A's translation.
    #[inline]
    pub fn displacement(&self) -> Vec3 {
        self.direction.unit() * self.distance
    }
}

// =============================================================================
// DETECTION
// =============================================================================

/// First overlapping pair: boxes of A in the outer loop, boxes of B inner.
pub fn first_overlap<I, J>(a: I, b: J) -> Option<(Aabb, Aabb)>
where
    I: IntoIterator<Item = Aabb>,
    J: Iterator<Item = Aabb> + Clone,
{
    for box_a in a {
        if let Some(box_b) = b.clone().find(|box_b| box_a.intersects(box_b)) {
            return Some((box_a, box_b));
        }
    }
    None
}

/// Smallest single-axis move of `a` that clears `b`.
///
/// Returns `None` when no candidate is non-negative, which means the boxes do
/// not actually overlap (or a component is NaN).
pub fn minimal_push_out(a: &Aabb, b: &Aabb) -> Option<PushOut> {
    let diff_a = b.max() - a.min();
    let diff_b = a.max() - b.min();
    let candidates = [diff_a.x, diff_a.y, diff_a.z, diff_b.x, diff_b.y, diff_b.z];

    let mut best: Option<PushOut> = None;
    for (direction, distance) in PushDirection::ORDER.into_iter().zip(candidates) {
        if distance >= 0.0 && best.map_or(true, |b| distance < b.distance) {
            best = Some(PushOut { direction, distance });
        }
    }
    best
}

/// Push-out for two composite shapes, using their first overlapping pair.
pub fn push_out<I, J>(a: I, b: J) -> Option<PushOut>
where
    I: IntoIterator<Item = Aabb>,
    J: Iterator<Item = Aabb> + Clone,
{
    let (box_a, box_b) = first_overlap(a, b)?;
    minimal_push_out(&box_a, &box_b)
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// A resolved overlap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Tick the contact was resolved on
    pub tick: u64,
    /// The body that moved
    pub body: NodeId,
    /// The node it was pushed out of
    pub partner: NodeId,
    /// Partner category
    pub kind: CategoryKind,
    /// Direction the body moved
    pub direction: PushDirection,
    /// Distance the body moved
    pub distance: f32,
}

/// Velocity change for the moving body.
#[derive(Clone, Copy, Debug)]
enum Response {
    Stop,
    Scale(f32),
    React,
}

/// Resolve `body` against `partner`: push the body out and apply the response
/// for the partner's category.
///
/// Returns `Ok(None)` when the nodes do not overlap. Only `body` moves.
/// Unclassified nodes fail with `UnclassifiedNode`, a FREE partner with an
/// out-of-range mass with `InvalidMass`.
pub fn resolve_pair(
    graph: &mut SceneGraph,
    body: NodeId,
    partner: NodeId,
    tick: u64,
) -> Result<Option<Contact>> {
    if body == partner {
        return Ok(None);
    }

    let a = graph.node(body)?;
    let b = graph.node(partner)?;
    if !a.category().is_classified() {
        return Err(PhysicsError::UnclassifiedNode(body));
    }
    b.category().validate()?;
    let response = match b.category() {
        Category::None => return Err(PhysicsError::UnclassifiedNode(partner)),
        Category::Obstacle => Response::Stop,
        Category::Free { mass } => Response::Scale(1.0 - mass),
        Category::Trigger { .. } => Response::React,
    };
    let kind = b.category().kind();

    let Some(push) = push_out(a.world_aabbs(), b.world_aabbs()) else {
        return Ok(None);
    };

    let node = graph.node_mut(body)?;
    node.translation += push.displacement();
    match response {
        Response::Stop => node.velocity = Vec3::ZERO,
        Response::Scale(factor) => node.velocity *= factor,
        Response::React => {}
    }
    graph.update_matrix(body)?;

    if let Response::React = response {
        graph.node(partner)?.react();
    }

    let contact = Contact {
        tick,
        body,
        partner,
        kind,
        direction: push.direction,
        distance: push.distance,
    };
    trace!(?contact, "resolved contact");
    Ok(Some(contact))
}
