//! Declarative Scene Description
//!
//! The loader side of the boundary: a serde tree of node descriptions that is
//! validated and turned into a [`SceneGraph`] once, at scene-build time.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "name": "Car", "translation": [0, 0, 0],
//!       "extras": { "collidable": "DYNAMIC", "mass": 0.5 },
//!       "boxes": [ { "min": [-1, -1, -1], "max": [1, 1, 1] } ] },
//!     { "name": "Cone", "translation": [5, 0, 0],
//!       "extras": { "collidable": "TRIGGER", "sound": "cone_hit" },
//!       "boxes": [ { "points": [[-0.3, 0, -0.3], [0.3, 0.8, 0.3]] } ] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::aabb::Aabb;
use crate::core::error::{PhysicsError, Result};
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::node::{Category, Node, ReactHook};

// =============================================================================
// HOOK REGISTRY
// =============================================================================

/// Named reaction hooks supplied by the embedding application (audio, scripts).
#[derive(Clone, Debug, Default)]
pub struct HookRegistry {
    hooks: BTreeMap<String, ReactHook>,
}

impl HookRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a hook under `name`.
    pub fn register(&mut self, name: impl Into<String>, hook: ReactHook) -> &mut Self {
        self.hooks.insert(name.into(), hook);
        self
    }

    /// Look up a hook.
    pub fn get(&self, name: &str) -> Option<&ReactHook> {
        self.hooks.get(name)
    }
}

// =============================================================================
// DESCRIPTION TYPES
// =============================================================================

/// Whole scene: top-level nodes attached under the graph root.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneDesc {
    /// Top-level nodes
    #[serde(default)]
    pub nodes: Vec<NodeDesc>,
}

/// One node and its subtree.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDesc {
    /// Node name
    pub name: String,
    /// Local translation (defaults to origin)
    pub translation: Option<[f32; 3]>,
    /// Local rotation as `[x, y, z, w]` (defaults to identity)
    pub rotation: Option<[f32; 4]>,
    /// Local scale (defaults to one)
    pub scale: Option<[f32; 3]>,
    /// Column-major local matrix; overrides TRS when present
    pub matrix: Option<[f32; 16]>,
    /// Initial velocity; rejected on FREE nodes, which start at rest
    pub velocity: Option<[f32; 3]>,
    /// Collision metadata
    pub extras: Option<Extras>,
    /// Local-space bounding boxes
    pub boxes: Vec<BoxDesc>,
    /// Child nodes
    pub children: Vec<NodeDesc>,
}

/// Free-form collision metadata attached to a node.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Extras {
    /// `STATIC`/`OBSTACLE`, `DYNAMIC`/`FREE`, `TRIGGER`/`INTERACTIVE`
    pub collidable: Option<String>,
    /// FREE body mass in `[0, 1]`
    pub mass: Option<f32>,
    /// Name of the reaction hook for a TRIGGER
    pub sound: Option<String>,
}

/// A bounding box, either explicit or derived from geometry.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoxDesc {
    /// Explicit corners
    Bounds {
        /// Minimum corner
        min: [f32; 3],
        /// Maximum corner
        max: [f32; 3],
    },
    /// Vertex positions; the box is their bounds
    Points {
        /// Positions
        points: Vec<[f32; 3]>,
    },
}

// =============================================================================
// BUILDING
// =============================================================================

impl SceneDesc {
    /// Parse a JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the description and build a graph from it.
    ///
    /// Any malformed box, unknown category or missing hook aborts the build.
    pub fn build(&self, hooks: &HookRegistry) -> Result<SceneGraph> {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        for desc in &self.nodes {
            desc.spawn_into(&mut graph, root, hooks)?;
        }
        graph.update_matrices();
        Ok(graph)
    }
}

impl NodeDesc {
    /// Build this node (without children).
    pub fn to_node(&self, hooks: &HookRegistry) -> Result<Node> {
        let mut node = Node::new(self.name.clone());

        if let Some(m) = self.matrix {
            node.set_matrix(Mat4::from_cols_array(&m));
        } else {
            if let Some(t) = self.translation {
                node.translation = Vec3::from_array(t);
            }
            if let Some(r) = self.rotation {
                node.rotation = Quat::from_array(r).normalize();
            }
            if let Some(s) = self.scale {
                node.scale = Vec3::from_array(s);
            }
            node.update_matrix();
        }

        for b in &self.boxes {
            if let Some(aabb) = b.to_aabb()? {
                node.push_box(aabb);
            }
        }

        if let Some(extras) = &self.extras {
            node.set_category(extras.category(&self.name, hooks)?);
        }

        if let Some(v) = self.velocity {
            if matches!(node.category(), Category::Free { .. }) {
                return Err(PhysicsError::FreeBodyInMotion(self.name.clone()));
            }
            node.velocity = Vec3::from_array(v);
        }

        Ok(node)
    }

    fn spawn_into(&self, graph: &mut SceneGraph, parent: NodeId, hooks: &HookRegistry) -> Result<NodeId> {
        let id = graph.spawn(parent, self.to_node(hooks)?)?;
        for child in &self.children {
            child.spawn_into(graph, id, hooks)?;
        }
        Ok(id)
    }
}

impl Extras {
    /// Resolve the category tag once, at build time.
    pub fn category(&self, node_name: &str, hooks: &HookRegistry) -> Result<Category> {
        let Some(tag) = self.collidable.as_deref() else {
            return Ok(Category::None);
        };

        let category = match tag.to_ascii_uppercase().as_str() {
            "STATIC" | "OBSTACLE" => Category::Obstacle,
            "DYNAMIC" | "FREE" => match self.mass {
                Some(mass) => Category::free_with_mass(mass)?,
                None => Category::free(),
            },
            "TRIGGER" | "INTERACTIVE" => {
                let on_react = match self.sound.as_deref() {
                    Some(name) => Some(
                        hooks
                            .get(name)
                            .cloned()
                            .ok_or_else(|| PhysicsError::UnknownHook(name.to_string()))?,
                    ),
                    None => None,
                };
                return Ok(Category::Trigger { on_react });
            }
            "NONE" => Category::None,
            _ => return Err(PhysicsError::UnknownCategory(tag.to_string())),
        };

        if let Some(sound) = &self.sound {
            debug!(node = node_name, sound = sound.as_str(), "ignoring sound on non-trigger node");
        }
        Ok(category)
    }
}

impl BoxDesc {
    /// Validate into an [`Aabb`]. An empty point list yields no box.
    pub fn to_aabb(&self) -> Result<Option<Aabb>> {
        match self {
            BoxDesc::Bounds { min, max } => {
                Aabb::new(Vec3::from_array(*min), Vec3::from_array(*max)).map(Some)
            }
            BoxDesc::Points { points } => {
                let points: Vec<Vec3> = points.iter().copied().map(Vec3::from_array).collect();
                Aabb::from_points(&points)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::node::CategoryKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const TRACK: &str = r#"{
        "nodes": [
            { "name": "Car", "translation": [0, 0, 0],
              "extras": { "collidable": "DYNAMIC" },
              "boxes": [ { "min": [-1, -1, -1], "max": [1, 1, 1] } ],
              "children": [ { "name": "front_left_wheel", "translation": [1, 0, 1] } ] },
            { "name": "Wall", "translation": [10, 0, 0],
              "extras": { "collidable": "STATIC" },
              "boxes": [ { "min": [-0.5, -2, -20], "max": [0.5, 2, 20] } ] },
            { "name": "Cone", "translation": [5, 0, 3],
              "extras": { "collidable": "trigger", "sound": "cone_hit" },
              "boxes": [ { "points": [[-0.3, 0, -0.3], [0.3, 0.8, 0.3], [0, 0.4, 0]] } ] },
            { "name": "Sun" }
        ]
    }"#;

    fn hooks(counter: Arc<AtomicUsize>) -> HookRegistry {
        let mut hooks = HookRegistry::new();
        hooks.register(
            "cone_hit",
            ReactHook::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        hooks
    }

    #[test]
    fn test_build_track() {
        let hits = Arc::new(AtomicUsize::new(0));
        let graph = SceneDesc::from_json(TRACK).unwrap().build(&hooks(hits.clone())).unwrap();

        let car = graph.find("Car").unwrap();
        let car_node = graph.node(car).unwrap();
        assert_eq!(car_node.category().kind(), CategoryKind::Free);
        assert_eq!(car_node.boxes().len(), 1);

        let wheel = graph.child_by_name(car, "front_left_wheel").unwrap();
        assert_eq!(graph.node(wheel).unwrap().world_translation(), Vec3::new(1.0, 0.0, 1.0));

        let wall = graph.node(graph.find("Wall").unwrap()).unwrap();
        assert_eq!(wall.category().kind(), CategoryKind::Obstacle);
        assert_eq!(wall.world_aabb(0).unwrap().min(), Vec3::new(9.5, -2.0, -20.0));

        let cone = graph.node(graph.find("Cone").unwrap()).unwrap();
        assert_eq!(cone.boxes()[0].max(), Vec3::new(0.3, 0.8, 0.3));
        cone.react();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let sun = graph.node(graph.find("Sun").unwrap()).unwrap();
        assert_eq!(sun.category().kind(), CategoryKind::None);
    }

    #[test]
    fn test_rejects_inverted_box() {
        let json = r#"{ "nodes": [ { "name": "Bad",
            "extras": { "collidable": "STATIC" },
            "boxes": [ { "min": [0, 0, 5], "max": [1, 1, 1] } ] } ] }"#;
        let err = SceneDesc::from_json(json).unwrap().build(&HookRegistry::new()).unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidBounds { axis: 2, .. }));
    }

    #[test]
    fn test_rejects_unknown_category() {
        let json = r#"{ "nodes": [ { "name": "X", "extras": { "collidable": "BOUNCY" } } ] }"#;
        let err = SceneDesc::from_json(json).unwrap().build(&HookRegistry::new()).unwrap_err();
        assert!(matches!(err, PhysicsError::UnknownCategory(ref s) if s == "BOUNCY"));
    }

    #[test]
    fn test_rejects_missing_hook() {
        let json = r#"{ "nodes": [ { "name": "X",
            "extras": { "collidable": "TRIGGER", "sound": "horn" } } ] }"#;
        let err = SceneDesc::from_json(json).unwrap().build(&HookRegistry::new()).unwrap_err();
        assert!(matches!(err, PhysicsError::UnknownHook(ref s) if s == "horn"));
    }

    #[test]
    fn test_explicit_mass() {
        let json = r#"{ "nodes": [ { "name": "Heavy",
            "extras": { "collidable": "FREE", "mass": 0.9 } } ] }"#;
        let graph = SceneDesc::from_json(json).unwrap().build(&HookRegistry::new()).unwrap();
        let node = graph.node(graph.find("Heavy").unwrap()).unwrap();
        assert!(matches!(node.category(), Category::Free { mass } if (*mass - 0.9).abs() < 1e-6));
    }

    #[test]
    fn test_free_node_starts_at_rest() {
        let json = r#"{ "nodes": [ { "name": "Car", "velocity": [5, 0, 0],
            "extras": { "collidable": "FREE" } } ] }"#;
        let err = SceneDesc::from_json(json).unwrap().build(&HookRegistry::new()).unwrap_err();
        assert!(matches!(err, PhysicsError::FreeBodyInMotion(ref s) if s == "Car"));

        // Other nodes may move from the start
        let json = r#"{ "nodes": [ { "name": "Cloud", "velocity": [2, 0, 0] } ] }"#;
        let graph = SceneDesc::from_json(json).unwrap().build(&HookRegistry::new()).unwrap();
        let cloud = graph.node(graph.find("Cloud").unwrap()).unwrap();
        assert_eq!(cloud.velocity, Vec3::new(2.0, 0.0, 0.0));

        let hooks = hooks(Arc::new(AtomicUsize::new(0)));
        let graph = SceneDesc::from_json(TRACK).unwrap().build(&hooks).unwrap();
        let car = graph.node(graph.find("Car").unwrap()).unwrap();
        assert_eq!(car.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_matrix_overrides_trs() {
        let m = Mat4::from_translation(Vec3::new(2.0, 3.0, 4.0));
        let desc = NodeDesc {
            name: "M".into(),
            translation: Some([9.0, 9.0, 9.0]),
            matrix: Some(m.to_cols_array()),
            ..Default::default()
        };
        let node = desc.to_node(&HookRegistry::new()).unwrap();
        assert!(node.translation.abs_diff_eq(Vec3::new(2.0, 3.0, 4.0), 1e-6));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(SceneDesc::from_json("{ nodes: "), Err(PhysicsError::Parse(_))));
    }
}
