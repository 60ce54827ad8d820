//! Scene Graph Arena
//!
//! Nodes live in a slot arena addressed by generational handles. Parent/child
//! edges are plain handle pairs, so there is no ownership cycle to manage.
//! Freed slots are reused with a bumped generation; stale handles then fail
//! with `UnknownNode` instead of aliasing a new node.

use std::fmt;

use glam::Mat4;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{PhysicsError, Result};
use crate::scene::node::Node;

// =============================================================================
// NODE ID
// =============================================================================

/// Generational handle to a node in a [`SceneGraph`].
///
/// Implements Ord so handle-keyed collections iterate deterministically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}:{})", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.generation)
    }
}

// =============================================================================
// SCENE GRAPH
// =============================================================================

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Tree of nodes under a single root.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only an empty root node.
    pub fn new() -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId { index: 0, generation: 0 },
        };
        graph.root = graph.insert(Node::new("root"));
        graph
    }

    /// Root handle.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes (attached or detached), root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Only the root is alive.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Handle still refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Borrow a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Mutably borrow a node.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Borrow a node or fail with `UnknownNode`.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(PhysicsError::UnknownNode(id))
    }

    /// Mutably borrow a node or fail with `UnknownNode`.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id).ok_or(PhysicsError::UnknownNode(id))
    }

    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------

    /// Store a node detached from the tree.
    ///
    /// Any hierarchy fields on the incoming node are cleared.
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, node: Some(node) });
            NodeId { index, generation: 0 }
        }
    }

    /// Insert a node and attach it under `parent`.
    pub fn spawn(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.insert(node);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// A child attached elsewhere is moved. The child's matrices are
    /// refreshed against the new parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root {
            return Err(PhysicsError::RootImmovable);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(PhysicsError::WouldCycle { parent, child });
        }

        if let Some(old_parent) = self.node(child)?.parent {
            self.unlink(old_parent, child);
        }
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.update_matrix(child)
    }

    /// Detach `child` from `parent`. The node stays alive but is no longer
    /// traversed.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(PhysicsError::NotAChild { parent, child });
        }
        self.unlink(parent, child);
        let node = self.node_mut(child)?;
        node.parent = None;
        node.update_matrix_under(Mat4::IDENTITY);
        Ok(())
    }

    /// Free a node and its whole subtree.
    pub fn despawn(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(PhysicsError::RootImmovable);
        }
        if let Some(parent) = self.node(id)?.parent {
            self.unlink(parent, id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
        Ok(())
    }

    /// Deep-copy a subtree. The copy is detached; hooks are shared.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        let source = self.node(id)?.clone();
        let children = source.children.clone();
        let copy = self.insert(source);
        self.refresh(copy)?;
        for child in children {
            let child_copy = self.clone_subtree(child)?;
            self.add_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.get_mut(parent) {
            if let Some(pos) = node.children.iter().position(|c| *c == child) {
                node.children.remove(pos);
            }
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.get(id).and_then(|n| n.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Attached nodes, parent before children, children in list order.
    pub fn traverse(&self) -> Vec<NodeId> {
        self.traverse_from(self.root)
    }

    /// Preorder walk of the subtree at `start`.
    pub fn traverse_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// First direct child of `parent` named `name`.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.get(parent)?
            .children
            .iter()
            .copied()
            .find(|c| self.get(*c).is_some_and(|n| n.name == name))
    }

    /// First attached node named `name`, in traversal order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.traverse()
            .into_iter()
            .find(|id| self.get(*id).is_some_and(|n| n.name == name))
    }

    // -------------------------------------------------------------------------
    // Transforms
    // -------------------------------------------------------------------------

    /// Refresh one node's matrices against its parent, without touching
    /// descendants.
    pub(crate) fn refresh(&mut self, id: NodeId) -> Result<()> {
        let parent_global = match self.node(id)?.parent {
            Some(parent) => self.node(parent)?.global_matrix(),
            None => Mat4::IDENTITY,
        };
        self.node_mut(id)?.update_matrix_under(parent_global);
        Ok(())
    }

    /// Refresh a node and everything below it.
    pub fn update_matrix(&mut self, id: NodeId) -> Result<()> {
        self.refresh(id)?;
        for descendant in self.traverse_from(id).into_iter().skip(1) {
            self.refresh(descendant)?;
        }
        Ok(())
    }

    /// Refresh every attached node.
    pub fn update_matrices(&mut self) {
        for id in self.traverse() {
            if let Err(err) = self.refresh(id) {
                debug!(%id, %err, "skipping refresh");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn named(graph: &mut SceneGraph, parent: NodeId, name: &str) -> NodeId {
        graph.spawn(parent, Node::new(name)).unwrap()
    }

    #[test]
    fn test_traverse_preorder() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = named(&mut graph, root, "a");
        let b = named(&mut graph, root, "b");
        let a1 = named(&mut graph, a, "a1");
        let a2 = named(&mut graph, a, "a2");
        let b1 = named(&mut graph, b, "b1");

        assert_eq!(graph.traverse(), vec![root, a, a1, a2, b, b1]);
    }

    #[test]
    fn test_remove_child_clears_parent() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = named(&mut graph, root, "a");
        let b = named(&mut graph, root, "b");

        graph.remove_child(root, a).unwrap();
        assert_eq!(graph.node(a).unwrap().parent(), None);
        assert_eq!(graph.node(root).unwrap().children(), &[b]);
        assert_eq!(graph.traverse(), vec![root, b]);
        // Detached but alive
        assert!(graph.contains(a));

        assert!(matches!(
            graph.remove_child(root, a),
            Err(PhysicsError::NotAChild { .. })
        ));
    }

    #[test]
    fn test_reparent_moves_child() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = named(&mut graph, root, "a");
        let b = named(&mut graph, root, "b");
        let c = named(&mut graph, a, "c");

        graph.add_child(b, c).unwrap();
        assert!(graph.node(a).unwrap().children().is_empty());
        assert_eq!(graph.node(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn test_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = named(&mut graph, root, "a");
        let b = named(&mut graph, a, "b");

        assert!(matches!(graph.add_child(b, a), Err(PhysicsError::WouldCycle { .. })));
        assert!(matches!(graph.add_child(a, a), Err(PhysicsError::WouldCycle { .. })));
        assert!(matches!(graph.add_child(a, root), Err(PhysicsError::RootImmovable)));
    }

    #[test]
    fn test_despawn_invalidates_handles() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = named(&mut graph, root, "a");
        let a1 = named(&mut graph, a, "a1");

        graph.despawn(a).unwrap();
        assert!(!graph.contains(a));
        assert!(!graph.contains(a1));
        assert_eq!(graph.len(), 1);

        // Slot reuse bumps generation
        let fresh = graph.insert(Node::new("fresh"));
        assert!(fresh.index() == a.index() || fresh.index() == a1.index());
        assert!(graph.get(a).is_none());
        assert!(matches!(graph.node(a1), Err(PhysicsError::UnknownNode(_))));
    }

    #[test]
    fn test_world_matrix_follows_parent() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let car = graph
            .spawn(root, Node::new("car").with_translation(Vec3::new(10.0, 0.0, 0.0)))
            .unwrap();
        let wheel = graph
            .spawn(car, Node::new("wheel").with_translation(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(graph.node(wheel).unwrap().world_translation(), Vec3::new(11.0, 0.0, 0.0));

        graph.node_mut(car).unwrap().translation.x = 20.0;
        graph.update_matrix(car).unwrap();
        assert_eq!(graph.node(wheel).unwrap().world_translation(), Vec3::new(21.0, 0.0, 0.0));
    }

    #[test]
    fn test_update_matrices_after_despawn() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let car = graph.spawn(root, Node::new("car")).unwrap();
        let wheel = graph
            .spawn(car, Node::new("wheel").with_translation(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        let spare = graph.spawn(car, Node::new("spare")).unwrap();

        graph.despawn(spare).unwrap();
        graph.node_mut(car).unwrap().translation = Vec3::new(0.0, 0.0, 5.0);
        graph.update_matrices();

        assert_eq!(graph.node(car).unwrap().children(), &[wheel]);
        assert_eq!(graph.node(wheel).unwrap().world_translation(), Vec3::new(1.0, 0.0, 5.0));
    }

    #[test]
    fn test_find_and_child_by_name() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let car = named(&mut graph, root, "Car");
        let wheel = named(&mut graph, car, "front_left_wheel");

        assert_eq!(graph.child_by_name(car, "front_left_wheel"), Some(wheel));
        assert_eq!(graph.child_by_name(root, "front_left_wheel"), None);
        assert_eq!(graph.find("front_left_wheel"), Some(wheel));
        assert_eq!(graph.find("missing"), None);
    }

    #[test]
    fn test_clone_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let cone = named(&mut graph, root, "cone");
        named(&mut graph, cone, "tip");

        let copy = graph.clone_subtree(cone).unwrap();
        assert_ne!(copy, cone);
        assert_eq!(graph.node(copy).unwrap().parent(), None);
        let kids = graph.node(copy).unwrap().children().to_vec();
        assert_eq!(kids.len(), 1);
        assert_eq!(graph.node(kids[0]).unwrap().name, "tip");

        graph.add_child(root, copy).unwrap();
        assert_eq!(graph.traverse().len(), 5);
    }
}
