//! Collision World
//!
//! Owns the scene graph for the length of a session and steps it.
//!
//! ## Tick Phases
//!
//! ```text
//! 1. integrate   translation += velocity * dt, ground clamp, refresh matrix
//! 2. resolve     each FREE vs OBSTACLEs, then TRIGGERs, then other FREEs
//! 3. damp        velocity *= 1 - friction (classified nodes)
//! 4. commit      refresh every derived matrix
//! ```
//!
//! Phases never reorder. Membership is a snapshot taken at construction;
//! re-classification means building a new world.

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::core::error::Result;
use crate::core::hash::{compute_state_hash, StateHash};
use crate::physics::collision::{resolve_pair, Contact};
use crate::physics::config::WorldConfig;
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::node::Category;

/// Nodes grouped by category, in traversal order at snapshot time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Membership {
    /// OBSTACLE nodes
    pub obstacles: Vec<NodeId>,
    /// FREE nodes
    pub free: Vec<NodeId>,
    /// TRIGGER nodes
    pub triggers: Vec<NodeId>,
}

impl Membership {
    /// Classify every attached node of `graph`.
    pub fn snapshot(graph: &SceneGraph) -> Self {
        let mut membership = Self::default();
        for id in graph.traverse() {
            let Some(node) = graph.get(id) else {
                continue;
            };
            match node.category() {
                Category::None => {}
                Category::Obstacle => membership.obstacles.push(id),
                Category::Free { .. } => membership.free.push(id),
                Category::Trigger { .. } => membership.triggers.push(id),
            }
        }
        membership
    }
}

/// Per-tick collision and contact resolution over one scene graph.
#[derive(Debug)]
pub struct CollisionWorld {
    graph: SceneGraph,
    membership: Membership,
    config: WorldConfig,
    tick: u64,
    contacts: Vec<Contact>,
}

impl CollisionWorld {
    /// Take ownership of `graph` and snapshot category membership.
    ///
    /// Fails with `InvalidMass` if any FREE node carries a mass outside `[0, 1]`.
    pub fn new(graph: SceneGraph, config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let membership = Membership::snapshot(&graph);
        for &id in &membership.free {
            graph.node(id)?.category().validate()?;
        }
        info!(
            obstacles = membership.obstacles.len(),
            free = membership.free.len(),
            triggers = membership.triggers.len(),
            "collision world initialized"
        );
        Ok(Self {
            graph,
            membership,
            config,
            tick: 0,
            contacts: Vec::new(),
        })
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// A negative or non-finite `dt` is ignored.
    pub fn update(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt, "ignoring tick with invalid dt");
            return;
        }

        self.tick += 1;
        self.contacts.clear();

        self.integrate(dt);
        self.resolve();
        self.damp();
        self.graph.update_matrices();

        debug!(tick = self.tick, contacts = self.contacts.len(), "tick complete");
    }

    /// Phase 1: move every attached node, clamp classified nodes to the ground.
    fn integrate(&mut self, dt: f32) {
        let WorldConfig { gravity, ground_height, ground_epsilon, .. } = self.config;

        // Preorder, so a parent is refreshed before its children read it.
        for id in self.graph.traverse() {
            let Some(node) = self.graph.get_mut(id) else {
                continue;
            };
            node.translation += node.velocity * dt;

            // Height is local: a classified child rests on the plane of its
            // parent's frame.
            if node.category().is_classified() {
                let height = node.translation.y - ground_height;
                if height > ground_epsilon {
                    node.velocity.y -= gravity;
                } else {
                    node.velocity.y = 0.0;
                    node.translation.y = ground_height;
                }
            }

            if let Err(err) = self.graph.refresh(id) {
                debug!(%id, %err, "skipping refresh");
            }
        }
    }

    /// Phase 2: one resolution pass per (FREE, partner) pair.
    fn resolve(&mut self) {
        let Membership { obstacles, free, triggers } = &self.membership;

        for &body in free {
            let partners = obstacles
                .iter()
                .chain(triggers)
                .chain(free.iter().filter(|other| **other != body));

            for &partner in partners {
                match resolve_pair(&mut self.graph, body, partner, self.tick) {
                    Ok(Some(contact)) => self.contacts.push(contact),
                    Ok(None) => {}
                    Err(err) => debug!(%body, %partner, %err, "pair skipped"),
                }
            }
        }
    }

    /// Phase 3: uniform velocity decay for classified nodes.
    fn damp(&mut self) {
        let retain = 1.0 - self.config.friction;
        let Membership { obstacles, free, triggers } = &self.membership;

        for &id in obstacles.iter().chain(free).chain(triggers) {
            if let Some(node) = self.graph.get_mut(id) {
                if node.category().is_classified() {
                    node.velocity *= retain;
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The scene graph.
    #[inline]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable scene graph, for controller writes between ticks.
    ///
    /// Structural edits are allowed but not re-classified.
    #[inline]
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Give the graph back (e.g. to re-classify with a new world).
    pub fn into_graph(self) -> SceneGraph {
        self.graph
    }

    /// Category snapshot.
    #[inline]
    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    /// Active configuration.
    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Completed ticks.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Contacts resolved during the last tick, in resolution order.
    #[inline]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Add to a node's velocity between ticks.
    pub fn accelerate(&mut self, id: NodeId, delta: Vec3) -> Result<()> {
        self.graph.node_mut(id)?.accelerate(delta);
        Ok(())
    }

    /// Hash of tick plus every attached node's transform and velocity.
    pub fn state_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |hasher| {
            for id in self.graph.traverse() {
                if let Some(node) = self.graph.get(id) {
                    hasher.update_u32(id.index());
                    hasher.update_u32(id.generation());
                    hasher.update_str(&node.name);
                    hasher.update_vec3(node.translation);
                    hasher.update_quat(node.rotation);
                    hasher.update_vec3(node.scale);
                    hasher.update_vec3(node.velocity);
                }
            }
        })
    }
}
