//! Scene graph: a tree of canvas objects with explicit z-order.

use crate::id::ObjectId;
use crate::object::CanvasObject;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;

/// The canvas content: a rooted tree of [`CanvasObject`]s.
///
/// Edges go from parent to child. Sibling order (back to front) is kept
/// per parent in `child_order`.
#[derive(Debug)]
pub struct SceneGraph {
    pub graph: StableDiGraph<CanvasObject, ()>,
    pub root: NodeIndex,
    id_index: HashMap<ObjectId, NodeIndex>,
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root_obj = CanvasObject::root();
        let root_id = root_obj.id;
        let root = graph.add_node(root_obj);

        let mut id_index = HashMap::new();
        id_index.insert(root_id, root);

        Self {
            graph,
            root,
            id_index,
            child_order: HashMap::new(),
        }
    }

    /// Append `obj` as the front-most child of `parent`.
    pub fn add_node(&mut self, parent: NodeIndex, obj: CanvasObject) -> NodeIndex {
        let len = self.children(parent).len();
        self.insert_at(parent, len, obj)
    }

    /// Insert `obj` among `parent`'s children at z-position `pos` (clamped).
    pub fn insert_at(&mut self, parent: NodeIndex, pos: usize, obj: CanvasObject) -> NodeIndex {
        let id = obj.id;
        let idx = self.graph.add_node(obj);
        self.graph.add_edge(parent, idx, ());
        self.id_index.insert(id, idx);
        let order = self.child_order.entry(parent).or_default();
        order.insert(pos.min(order.len()), idx);
        idx
    }

    /// Remove a single node, keeping the index and sibling order in sync.
    /// Children of the removed node are removed with it.
    pub fn remove_node(&mut self, idx: NodeIndex) -> Option<CanvasObject> {
        for child in self.children(idx) {
            self.remove_node(child);
        }
        if let Some(parent) = self.parent(idx)
            && let Some(order) = self.child_order.get_mut(&parent)
        {
            order.retain(|&c| c != idx);
        }
        self.child_order.remove(&idx);
        let removed = self.graph.remove_node(idx);
        if let Some(obj) = &removed {
            self.id_index.remove(&obj.id);
        }
        removed
    }

    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CanvasObject> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn index_of(&self, id: ObjectId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Id of the object at `idx`, or `None` once the node has been removed.
    pub fn id_at(&self, idx: NodeIndex) -> Option<ObjectId> {
        self.graph.node_weight(idx).map(|obj| obj.id)
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children back to front.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.child_order.get(&idx).cloned().unwrap_or_default()
    }

    pub fn child_ids(&self, idx: NodeIndex) -> Vec<ObjectId> {
        self.children(idx)
            .into_iter()
            .filter_map(|c| self.id_at(c))
            .collect()
    }

    /// Every node below `idx`, parents before children.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeIndex> = self.children(idx).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).into_iter().rev());
        }
        out
    }

    /// Position of `idx` among its siblings.
    pub fn z_index(&self, idx: NodeIndex) -> Option<usize> {
        let parent = self.parent(idx)?;
        self.child_order.get(&parent)?.iter().position(|&c| c == idx)
    }

    /// Move `child` under `new_parent` at z-position `pos` (clamped).
    pub fn reparent(&mut self, child: NodeIndex, new_parent: NodeIndex, pos: usize) {
        if let Some(old_parent) = self.parent(child) {
            if let Some(edge) = self.graph.find_edge(old_parent, child) {
                self.graph.remove_edge(edge);
            }
            if let Some(order) = self.child_order.get_mut(&old_parent) {
                order.retain(|&c| c != child);
            }
        }
        self.graph.add_edge(new_parent, child, ());
        let order = self.child_order.entry(new_parent).or_default();
        order.insert(pos.min(order.len()), child);
    }

    /// Move a child one step backward in z-order. Returns true if it moved.
    pub fn send_backward(&mut self, child: NodeIndex) -> bool {
        match self.z_index(child) {
            Some(pos) if pos > 0 => self.move_child(child, pos, pos - 1),
            _ => false,
        }
    }

    /// Move a child one step forward in z-order. Returns true if it moved.
    pub fn bring_forward(&mut self, child: NodeIndex) -> bool {
        let Some(pos) = self.z_index(child) else {
            return false;
        };
        let last = self.sibling_count(child).saturating_sub(1);
        if pos >= last {
            return false;
        }
        self.move_child(child, pos, pos + 1)
    }

    /// Move a child to the back of z-order (first child).
    pub fn send_to_back(&mut self, child: NodeIndex) -> bool {
        match self.z_index(child) {
            Some(pos) if pos > 0 => self.move_child(child, pos, 0),
            _ => false,
        }
    }

    /// Move a child to the front of z-order (last child).
    pub fn bring_to_front(&mut self, child: NodeIndex) -> bool {
        let Some(pos) = self.z_index(child) else {
            return false;
        };
        let last = self.sibling_count(child).saturating_sub(1);
        if pos == last {
            return false;
        }
        self.move_child(child, pos, last)
    }

    fn sibling_count(&self, child: NodeIndex) -> usize {
        self.parent(child)
            .and_then(|p| self.child_order.get(&p))
            .map_or(0, Vec::len)
    }

    fn move_child(&mut self, child: NodeIndex, from: usize, to: usize) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        let Some(order) = self.child_order.get_mut(&parent) else {
            return false;
        };
        let node = order.remove(from);
        order.insert(to, node);
        true
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
