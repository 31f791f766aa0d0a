//! Search tree storage.
//!
//! Nodes live in an `ego_tree` arena. Children are owned through the arena
//! and the parent link is a plain `NodeId` back-edge, so walking from a leaf
//! up to the root is O(depth) without reference cycles.

use ego_tree::{NodeId, NodeRef, Tree};

use crate::board::ActionId;
use crate::mcts::SearchError;
use crate::mcts_node::MctsNode;

/// The arena holding one search tree. The root is the only entry point.
#[derive(Debug, Clone)]
pub struct SearchTree {
    tree: Tree<MctsNode>,
}

impl Default for SearchTree {
    fn default() -> Self {
        SearchTree::new()
    }
}

impl SearchTree {
    /// Creates a tree made of a fresh root.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(MctsNode::root()),
        }
    }

    /// Returns the id of the root node.
    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    /// Returns the root node.
    pub fn root(&self) -> NodeRef<'_, MctsNode> {
        self.tree.root()
    }

    /// Returns a node by id.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, MctsNode>> {
        self.tree.get(id)
    }

    /// Number of nodes reachable from the root.
    pub fn len(&self) -> usize {
        self.tree.root().descendants().count()
    }

    /// A tree always holds at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the node has not been expanded yet.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.tree.get(id).is_none_or(|node| !node.has_children())
    }

    /// Whether the node has no parent.
    pub fn is_root(&self, id: NodeId) -> bool {
        self.tree.get(id).is_some_and(|node| node.parent().is_none())
    }

    /// Looks up the child reached from `id` by `action`.
    pub fn child(&self, id: NodeId, action: ActionId) -> Option<NodeId> {
        self.tree
            .get(id)?
            .children()
            .find(|child| child.value().action == Some(action))
            .map(|child| child.id())
    }

    /// Adds one unvisited child per `(action, prior)` pair. Actions that
    /// already have a child are skipped, so existing statistics are never
    /// overwritten. Returns the number of children created.
    pub fn expand<I>(&mut self, id: NodeId, action_priors: I) -> Result<usize, SearchError>
    where
        I: IntoIterator<Item = (ActionId, f64)>,
    {
        let node = self.node_ref(id)?;
        let mut existing: Vec<ActionId> = node.children().filter_map(|c| c.value().action).collect();
        let mut fresh = Vec::new();
        for (action, prior) in action_priors {
            if !existing.contains(&action) {
                existing.push(action);
                fresh.push(MctsNode::new(action, prior));
            }
        }

        let added = fresh.len();
        let mut node = self
            .tree
            .get_mut(id)
            .ok_or_else(|| SearchError::InvalidCall(format!("unknown node {id:?}")))?;
        for child in fresh {
            node.append(child);
        }
        Ok(added)
    }

    /// Returns the child maximizing `Q + c * P * sqrt(N_parent) / (1 + N)`.
    ///
    /// Ties go to the child inserted first. Fails on a leaf.
    pub fn select(
        &self,
        id: NodeId,
        exploration_constant: f64,
    ) -> Result<(ActionId, NodeId), SearchError> {
        let node = self.node_ref(id)?;
        let parent_visits = node.value().visits;

        let mut best: Option<(f64, ActionId, NodeId)> = None;
        for child in node.children() {
            let Some(action) = child.value().action else {
                continue;
            };
            let score = child.value().puct_score(parent_visits, exploration_constant);
            if best.is_none_or(|(best_score, _, _)| score > best_score) {
                best = Some((score, action, child.id()));
            }
        }

        best.map(|(_, action, child)| (action, child))
            .ok_or_else(|| SearchError::InvalidCall("select called on a leaf node".to_string()))
    }

    /// Backs `leaf_value` up from `id` to the root. The value is negated once
    /// per edge so every node sees it from its own parent's side.
    pub fn update_recursive(&mut self, id: NodeId, leaf_value: f64) -> Result<(), SearchError> {
        let mut path = vec![id];
        let mut current = self.node_ref(id)?;
        while let Some(parent) = current.parent() {
            path.push(parent.id());
            current = parent;
        }

        // ancestors first, the root receives the value signed for its depth
        for (depth, node_id) in path.into_iter().enumerate().rev() {
            let signed = if depth % 2 == 0 { leaf_value } else { -leaf_value };
            if let Some(mut node) = self.tree.get_mut(node_id) {
                node.value().update(signed);
            }
        }
        Ok(())
    }

    /// Makes the child reached by `action` the new root, keeping its subtree
    /// statistics and dropping every sibling. Falls back to a fresh root and
    /// returns `false` when the root has no such child.
    pub fn promote(&mut self, action: ActionId) -> bool {
        let Some(child_id) = self.child(self.root_id(), action) else {
            self.reset();
            return false;
        };
        let Some(child) = self.tree.get(child_id) else {
            self.reset();
            return false;
        };

        let mut subtree = Tree::new(child.value().clone());
        let mut pending = vec![(child_id, subtree.root().id())];
        while let Some((source, target)) = pending.pop() {
            let (Some(source), Some(mut target)) = (self.tree.get(source), subtree.get_mut(target))
            else {
                continue;
            };
            let mut copied = Vec::new();
            for grandchild in source.children() {
                let id = target.append(grandchild.value().clone()).id();
                copied.push((grandchild.id(), id));
            }
            pending.extend(copied);
        }

        self.tree = subtree;
        true
    }

    /// Replaces the whole tree with a fresh root.
    pub fn reset(&mut self) {
        self.tree = Tree::new(MctsNode::root());
    }

    fn node_ref(&self, id: NodeId) -> Result<NodeRef<'_, MctsNode>, SearchError> {
        self.tree
            .get(id)
            .ok_or_else(|| SearchError::InvalidCall(format!("unknown node {id:?}")))
    }
}
