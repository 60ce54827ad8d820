//! Axis-Aligned Bounding Boxes
//!
//! Boxes are validated on construction so that overlap and push-out math
//! never sees `min > max`.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::error::{PhysicsError, Result};

/// An axis-aligned box defined by its minimum and maximum corners.
///
/// Fields are private: the only way to build one is through a validating
/// constructor.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAabb", into = "RawAabb")]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

/// Unvalidated wire form.
#[derive(Clone, Copy, Serialize, Deserialize)]
struct RawAabb {
    min: [f32; 3],
    max: [f32; 3],
}

impl Aabb {
    /// Create a box from its corners.
    ///
    /// Fails with `InvalidBounds` if any axis has `min > max` or a
    /// non-finite component.
    pub fn new(min: Vec3, max: Vec3) -> Result<Self> {
        for axis in 0..3 {
            let (lo, hi) = (min[axis], max[axis]);
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(PhysicsError::InvalidBounds { axis, min: lo, max: hi });
            }
        }
        Ok(Self { min, max })
    }

    /// Box centered on the origin with the given half extents.
    pub fn from_half_extents(half: Vec3) -> Result<Self> {
        Self::new(-half, half)
    }

    /// Smallest box containing every point.
    ///
    /// Returns `Ok(None)` for an empty point set.
    pub fn from_points(points: &[Vec3]) -> Result<Option<Self>> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(None);
        };
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Self::new(min, max).map(Some)
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Size along each axis.
    #[inline]
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Box shifted by `offset`. Translation keeps a valid box valid.
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Closed-interval overlap on all three axes. Touching faces overlap.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|k| intervals_overlap(self.min[k], self.max[k], other.min[k], other.max[k]))
    }

    /// Grow this box to also contain `other`.
    pub fn merge(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

/// `[min1, max1]` and `[min2, max2]` share at least one point.
#[inline]
pub fn intervals_overlap(min1: f32, max1: f32, min2: f32, max2: f32) -> bool {
    !(min1 > max2 || min2 > max1)
}

impl TryFrom<RawAabb> for Aabb {
    type Error = PhysicsError;

    fn try_from(raw: RawAabb) -> Result<Self> {
        Self::new(Vec3::from_array(raw.min), Vec3::from_array(raw.max))
    }
}

impl From<Aabb> for RawAabb {
    fn from(aabb: Aabb) -> Self {
        Self {
            min: aabb.min.to_array(),
            max: aabb.max.to_array(),
        }
    }
}

impl fmt::Debug for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Aabb([{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}])",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}
