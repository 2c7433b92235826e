//! Expandable tree of items.
//!
//! Rows are the tree's visible nodes in pre-order. The root occupies row 0
//! when shown; a hidden root contributes only its children, and only while it
//! is expanded. A node's children are visible when the node is expanded and
//! the node itself is reachable.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_veneer_core::Signal;
use parking_lot::RwLock;

use super::{RowSource, StructuralChange};
use crate::error::{ModelError, ModelResult};

/// Identifies a node in an [`ItemTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_node_id() -> NodeId {
    NodeId(NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

struct TreeNode<T> {
    data: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    expanded: bool,
    /// Rows under the node while it is expanded; 0 when collapsed.
    rows_below: usize,
}

impl<T> TreeNode<T> {
    fn leaf(data: T, parent: Option<NodeId>) -> Self {
        Self {
            data,
            parent,
            children: Vec::new(),
            expanded: false,
            rows_below: 0,
        }
    }
}

struct TreeStorage<T> {
    nodes: HashMap<NodeId, TreeNode<T>>,
    root: Option<NodeId>,
    show_root: bool,
}

impl<T> TreeStorage<T> {
    fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            root: None,
            show_root: true,
        }
    }

    fn node(&self, id: NodeId) -> ModelResult<&TreeNode<T>> {
        self.nodes
            .get(&id)
            .ok_or(ModelError::UnknownNode { node: id })
    }

    /// Whether the node's children are shown.
    fn is_open(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            match self.nodes.get(&id) {
                Some(node) if node.expanded => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Whether the node occupies a row.
    fn is_visible(&self, id: NodeId) -> bool {
        match self.nodes.get(&id) {
            Some(node) => match node.parent {
                Some(parent) => self.is_open(parent),
                None => self.show_root && self.root == Some(id),
            },
            None => false,
        }
    }

    /// Rows under an open node, not counting the node itself.
    fn visible_descendants(&self, id: NodeId) -> usize {
        self.nodes.get(&id).map_or(0, |node| node.rows_below)
    }

    /// Add `delta` to the cached row counts of `from` and its ancestors, up
    /// to the first collapsed one.
    fn propagate(&mut self, from: Option<NodeId>, delta: isize) {
        let mut current = from;
        while let Some(id) = current {
            let Some(node) = self.nodes.get_mut(&id) else {
                break;
            };
            if !node.expanded {
                break;
            }
            node.rows_below = node.rows_below.saturating_add_signed(delta);
            current = node.parent;
        }
    }

    /// Expand or collapse `id`, returning its rows below afterwards.
    fn set_open(&mut self, id: NodeId, expanded: bool) -> usize {
        let rows: usize = match self.nodes.get(&id) {
            Some(node) if expanded => node
                .children
                .iter()
                .map(|child| 1 + self.visible_descendants(*child))
                .sum(),
            _ => 0,
        };
        let Some(node) = self.nodes.get_mut(&id) else {
            return 0;
        };
        let before = node.rows_below;
        node.expanded = expanded;
        node.rows_below = rows;
        let parent = node.parent;
        self.propagate(parent, rows as isize - before as isize);
        rows
    }

    fn row_count(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        usize::from(self.show_root) + self.visible_descendants(root)
    }

    fn flatten(&self) -> Vec<NodeId> {
        let mut rows = Vec::with_capacity(self.row_count());
        let Some(root) = self.root else {
            return rows;
        };
        if self.show_root {
            rows.push(root);
        }
        let mut stack = Vec::new();
        if let Some(node) = self.nodes.get(&root).filter(|node| node.expanded) {
            stack.extend(node.children.iter().rev().copied());
        }
        while let Some(id) = stack.pop() {
            rows.push(id);
            if let Some(node) = self.nodes.get(&id).filter(|node| node.expanded) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        rows
    }

    /// Walks up from the node, counting the rows of earlier siblings at
    /// every level.
    fn row_of(&self, id: NodeId) -> Option<usize> {
        if !self.is_visible(id) {
            return None;
        }
        let mut row = 0;
        let mut current = id;
        while let Some(parent) = self.nodes.get(&current)?.parent {
            for &sibling in self.nodes.get(&parent)?.children.iter().take_while(|&&s| s != current) {
                row += 1 + self.visible_descendants(sibling);
            }
            row += 1;
            current = parent;
        }
        Some(row - usize::from(!self.show_root))
    }

    fn node_at_row(&self, row: usize) -> Option<NodeId> {
        let root = self.root?;
        let mut remaining = row;
        if self.show_root {
            if remaining == 0 {
                return Some(root);
            }
            remaining -= 1;
        }
        let mut current = self.nodes.get(&root).filter(|node| node.expanded)?;
        'descend: loop {
            for &child in &current.children {
                let node = self.nodes.get(&child)?;
                if remaining == 0 {
                    return Some(child);
                }
                remaining -= 1;
                if remaining < node.rows_below {
                    current = node;
                    continue 'descend;
                }
                remaining -= node.rows_below;
            }
            return None;
        }
    }

    /// Row where the node's children start, for an open node.
    fn first_child_row(&self, id: NodeId) -> usize {
        match self.row_of(id) {
            Some(row) => row + 1,
            // Only a hidden root is open without a row of its own.
            None => 0,
        }
    }

    fn depth(&self, id: NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.nodes.get(&id)?;
        while let Some(parent) = current.parent {
            depth += 1;
            current = self.nodes.get(&parent)?;
        }
        Some(depth)
    }

    fn remove_subtree(&mut self, id: NodeId) -> Option<T> {
        let node = self.nodes.remove(&id)?;
        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                pending.extend(removed.children);
            }
        }
        Some(node.data)
    }
}

/// A hierarchy of items with expand/collapse state.
///
/// # Example
///
/// ```
/// use horizon_veneer::model::ItemTree;
///
/// let tree = ItemTree::new();
/// let root = tree.set_root("Root".to_string()).unwrap();
/// tree.add_child(root, "A".to_string()).unwrap();
/// tree.add_child(root, "B".to_string()).unwrap();
///
/// // Collapsed root: only the root row.
/// assert_eq!(tree.visible_row_count(), 1);
///
/// tree.set_expanded(root, true).unwrap();
/// assert_eq!(tree.visible_row_count(), 3);
/// ```
pub struct ItemTree<T> {
    storage: RwLock<TreeStorage<T>>,
    changed: Signal<StructuralChange>,
}

impl<T: Clone + Send + Sync + 'static> ItemTree<T> {
    /// Create an empty tree that shows its root.
    pub fn new() -> Self {
        Self {
            storage: RwLock::new(TreeStorage::new()),
            changed: Signal::new("tree"),
        }
    }

    /// Replace the whole tree with a single collapsed root.
    pub fn set_root(&self, data: T) -> ModelResult<NodeId> {
        let id = next_node_id();
        let row_count = {
            let mut storage = self.storage.write();
            storage.nodes.clear();
            storage.nodes.insert(id, TreeNode::leaf(data, None));
            storage.root = Some(id);
            storage.row_count()
        };
        self.changed.emit(StructuralChange::RowsReset { row_count })?;
        Ok(id)
    }

    /// The root node.
    pub fn root(&self) -> Option<NodeId> {
        self.storage.read().root
    }

    /// Whether the root occupies a row.
    pub fn shows_root(&self) -> bool {
        self.storage.read().show_root
    }

    /// Show or hide the root row.
    pub fn set_show_root(&self, show: bool) -> ModelResult<()> {
        let row_count = {
            let mut storage = self.storage.write();
            if storage.show_root == show {
                return Ok(());
            }
            storage.show_root = show;
            storage.row_count()
        };
        self.changed.emit(StructuralChange::RowsReset { row_count })?;
        Ok(())
    }

    /// Append a collapsed child to `parent`.
    ///
    /// Emits a row insertion when the new node is visible.
    pub fn add_child(&self, parent: NodeId, data: T) -> ModelResult<NodeId> {
        let id = next_node_id();
        let inserted = {
            let mut storage = self.storage.write();
            let below = storage.node(parent)?.rows_below;
            // The new last child lands right after the parent's current rows.
            let at = storage
                .is_open(parent)
                .then(|| storage.first_child_row(parent) + below);

            storage.nodes.insert(id, TreeNode::leaf(data, Some(parent)));
            if let Some(node) = storage.nodes.get_mut(&parent) {
                node.children.push(id);
            }
            storage.propagate(Some(parent), 1);
            at.map(|row| (row, storage.row_count()))
        };

        if let Some((at, row_count)) = inserted {
            self.changed.emit(StructuralChange::RowsInserted {
                at,
                count: 1,
                row_count,
            })?;
        }
        Ok(id)
    }

    /// Remove a node and its subtree, returning the node's data.
    pub fn remove(&self, id: NodeId) -> ModelResult<T> {
        let (data, change) = {
            let mut storage = self.storage.write();
            let parent = storage.node(id)?.parent;

            let change = match parent {
                None => None,
                Some(_) => storage.row_of(id).map(|at| {
                    let count = 1 + storage.visible_descendants(id);
                    (at, count)
                }),
            };

            match parent {
                Some(parent) => {
                    if let Some(node) = storage.nodes.get_mut(&parent) {
                        node.children.retain(|&child| child != id);
                    }
                    let removed = 1 + storage.visible_descendants(id);
                    storage.propagate(Some(parent), -(removed as isize));
                }
                None => storage.root = None,
            }
            let data = storage
                .remove_subtree(id)
                .ok_or(ModelError::UnknownNode { node: id })?;

            let row_count = storage.row_count();
            let change = match (parent, change) {
                (None, _) => Some(StructuralChange::RowsReset { row_count }),
                (Some(_), Some((at, count))) => Some(StructuralChange::RowsRemoved {
                    at,
                    count,
                    row_count,
                }),
                (Some(_), None) => None,
            };
            (data, change)
        };

        if let Some(change) = change {
            self.changed.emit(change)?;
        }
        Ok(data)
    }

    /// Expand or collapse a node. Returns whether the state changed.
    ///
    /// Emits the inserted or removed rows when the node's children become
    /// shown or hidden.
    pub fn set_expanded(&self, id: NodeId, expanded: bool) -> ModelResult<bool> {
        let change = {
            let mut storage = self.storage.write();
            if storage.node(id)?.expanded == expanded {
                return Ok(false);
            }

            let reachable = match storage.node(id)?.parent {
                Some(parent) => storage.is_open(parent),
                None => true,
            };

            // Measure while open: before collapsing, after expanding.
            let before = storage.visible_descendants(id);
            let after = storage.set_open(id, expanded);

            if reachable {
                let at = storage.first_child_row(id);
                let row_count = storage.row_count();
                match (expanded, after.max(before)) {
                    (_, 0) => None,
                    (true, count) => Some(StructuralChange::RowsInserted {
                        at,
                        count,
                        row_count,
                    }),
                    (false, count) => Some(StructuralChange::RowsRemoved {
                        at,
                        count,
                        row_count,
                    }),
                }
            } else {
                None
            }
        };

        if let Some(change) = change {
            self.changed.emit(change)?;
        }
        Ok(true)
    }

    /// Whether a node is expanded.
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.storage
            .read()
            .nodes
            .get(&id)
            .is_some_and(|node| node.expanded)
    }

    /// A copy of a node's data.
    pub fn get(&self, id: NodeId) -> Option<T> {
        self.storage.read().nodes.get(&id).map(|node| node.data.clone())
    }

    /// A node's parent.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.storage.read().nodes.get(&id).and_then(|node| node.parent)
    }

    /// A node's children in order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.storage
            .read()
            .nodes
            .get(&id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Number of nodes, visible or not.
    pub fn node_count(&self) -> usize {
        self.storage.read().nodes.len()
    }

    /// Number of visible rows.
    pub fn visible_row_count(&self) -> usize {
        self.storage.read().row_count()
    }

    /// Visible nodes in row order.
    pub fn visible_rows(&self) -> Vec<NodeId> {
        self.storage.read().flatten()
    }

    /// The row a node occupies, if visible.
    pub fn row_of(&self, id: NodeId) -> Option<usize> {
        self.storage.read().row_of(id)
    }

    /// The node shown at `row`.
    pub fn node_at_row(&self, row: usize) -> Option<NodeId> {
        self.storage.read().node_at_row(row)
    }

    /// Distance from the root; the root has depth 0.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.storage.read().depth(id)
    }

    /// Indentation level of a node's row: its depth, less one when the root
    /// is hidden.
    pub fn indent_level(&self, id: NodeId) -> Option<usize> {
        let storage = self.storage.read();
        let depth = storage.depth(id)?;
        Some(if storage.show_root {
            depth
        } else {
            depth.saturating_sub(1)
        })
    }

    /// The structural change signal.
    pub fn changed(&self) -> &Signal<StructuralChange> {
        &self.changed
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ItemTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> RowSource for ItemTree<T> {
    fn visible_row_count(&self) -> usize {
        ItemTree::visible_row_count(self)
    }
}

impl<T> fmt::Debug for ItemTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = self.storage.read();
        f.debug_struct("ItemTree")
            .field("nodes", &storage.nodes.len())
            .field("root", &storage.root)
            .field("show_root", &storage.show_root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn s(text: &str) -> String {
        text.to_string()
    }

    fn recorder(tree: &ItemTree<String>) -> Arc<Mutex<Vec<StructuralChange>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        tree.changed().connect(move |change| {
            seen_clone.lock().push(change.clone());
            Ok(())
        });
        seen
    }

    /// Root with children A (with A1, A2) and B; root expanded, A collapsed.
    fn sample() -> (ItemTree<String>, NodeId, NodeId, NodeId) {
        let tree = ItemTree::new();
        let root = tree.set_root(s("root")).unwrap();
        let a = tree.add_child(root, s("A")).unwrap();
        tree.add_child(a, s("A1")).unwrap();
        tree.add_child(a, s("A2")).unwrap();
        let b = tree.add_child(root, s("B")).unwrap();
        tree.set_expanded(root, true).unwrap();
        (tree, root, a, b)
    }

    #[test]
    fn test_empty_tree_has_no_rows() {
        let tree = ItemTree::<String>::new();
        assert_eq!(tree.visible_row_count(), 0);
        assert!(tree.visible_rows().is_empty());
    }

    #[test]
    fn test_shown_root_with_expanded_leaves() {
        let tree = ItemTree::new();
        let root = tree.set_root(s("root")).unwrap();
        for i in 0..4 {
            tree.add_child(root, format!("leaf {i}")).unwrap();
        }
        tree.set_expanded(root, true).unwrap();
        assert_eq!(tree.visible_row_count(), 5);
    }

    #[test]
    fn test_hidden_root() {
        let (tree, root, a, _) = sample();
        tree.set_show_root(false).unwrap();
        assert_eq!(tree.visible_row_count(), 2);
        assert_eq!(tree.row_of(root), None);
        assert_eq!(tree.row_of(a), Some(0));
        assert_eq!(tree.indent_level(a), Some(0));

        tree.set_expanded(root, false).unwrap();
        assert_eq!(tree.visible_row_count(), 0);
    }

    #[test]
    fn test_pre_order_rows() {
        let (tree, root, a, b) = sample();
        tree.set_expanded(a, true).unwrap();

        let rows = tree.visible_rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], root);
        assert_eq!(rows[1], a);
        assert_eq!(tree.get(rows[2]), Some(s("A1")));
        assert_eq!(tree.get(rows[3]), Some(s("A2")));
        assert_eq!(rows[4], b);
        assert_eq!(tree.node_at_row(4), Some(b));
        assert_eq!(tree.depth(rows[2]), Some(2));
    }

    #[test]
    fn test_expand_collapse_emit_ranges() {
        let (tree, _, a, _) = sample();
        let seen = recorder(&tree);

        assert!(tree.set_expanded(a, true).unwrap());
        assert!(!tree.set_expanded(a, true).unwrap());
        assert!(tree.set_expanded(a, false).unwrap());

        assert_eq!(
            *seen.lock(),
            vec![
                StructuralChange::RowsInserted {
                    at: 2,
                    count: 2,
                    row_count: 5
                },
                StructuralChange::RowsRemoved {
                    at: 2,
                    count: 2,
                    row_count: 3
                },
            ]
        );
    }

    #[test]
    fn test_hidden_subtree_changes_are_silent() {
        let (tree, _, a, _) = sample();
        let seen = recorder(&tree);

        // A is collapsed, so its new child has no row.
        tree.add_child(a, s("A3")).unwrap();
        assert!(seen.lock().is_empty());
        assert_eq!(tree.visible_row_count(), 3);
    }

    #[test]
    fn test_remove_visible_subtree() {
        let (tree, _, a, b) = sample();
        tree.set_expanded(a, true).unwrap();
        let seen = recorder(&tree);

        assert_eq!(tree.remove(a).unwrap(), s("A"));
        assert_eq!(tree.visible_row_count(), 2);
        assert_eq!(tree.row_of(b), Some(1));
        assert_eq!(tree.node_count(), 2);
        assert_eq!(
            *seen.lock(),
            vec![StructuralChange::RowsRemoved {
                at: 1,
                count: 3,
                row_count: 2
            }]
        );
    }

    #[test]
    fn test_remove_root_resets() {
        let (tree, root, _, _) = sample();
        let seen = recorder(&tree);

        tree.remove(root).unwrap();
        assert_eq!(tree.root(), None);
        assert_eq!(tree.node_count(), 0);
        assert_eq!(*seen.lock(), vec![StructuralChange::RowsReset { row_count: 0 }]);
    }

    #[test]
    fn test_unknown_node() {
        let (tree, root, _, _) = sample();
        tree.remove(root).unwrap();
        assert_eq!(
            tree.add_child(root, s("orphan")).unwrap_err(),
            ModelError::UnknownNode { node: root }
        );
    }

    #[test]
    fn test_deep_chain() {
        let tree = ItemTree::new();
        let root = tree.set_root(s("root")).unwrap();
        let mut chain = vec![root];
        for depth in 1..200_000 {
            let parent = chain[chain.len() - 1];
            chain.push(tree.add_child(parent, format!("level {depth}")).unwrap());
        }
        // Bottom up, so every expansion happens under a collapsed parent.
        for &node in chain.iter().rev() {
            tree.set_expanded(node, true).unwrap();
        }

        assert_eq!(tree.visible_row_count(), 200_000);
        assert_eq!(tree.visible_rows().len(), 200_000);
        let deepest = chain[chain.len() - 1];
        assert_eq!(tree.row_of(deepest), Some(199_999));
        assert_eq!(tree.node_at_row(199_999), Some(deepest));

        tree.remove(chain[1]).unwrap();
        assert_eq!(tree.visible_row_count(), 1);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_rows_stay_consistent_through_mutations() {
        let (tree, root, a, b) = sample();
        let seen = recorder(&tree);
        let check = |tree: &ItemTree<String>| {
            let rows = tree.visible_rows();
            assert_eq!(rows.len(), tree.visible_row_count());
            for (row, &node) in rows.iter().enumerate() {
                assert_eq!(tree.row_of(node), Some(row));
                assert_eq!(tree.node_at_row(row), Some(node));
            }
            assert_eq!(tree.node_at_row(rows.len()), None);
        };

        tree.set_expanded(a, true).unwrap();
        let b1 = tree.add_child(b, s("B1")).unwrap();
        tree.set_expanded(b, true).unwrap();
        tree.add_child(b1, s("B1a")).unwrap();
        tree.set_expanded(b1, true).unwrap();
        check(&tree);

        // Appending to an open A lands after A2, before B.
        tree.add_child(a, s("A3")).unwrap();
        assert_eq!(
            seen.lock().last(),
            Some(&StructuralChange::RowsInserted {
                at: 4,
                count: 1,
                row_count: 8
            })
        );
        check(&tree);

        tree.set_expanded(root, false).unwrap();
        assert_eq!(tree.visible_row_count(), 1);
        tree.set_expanded(root, true).unwrap();
        assert_eq!(tree.visible_row_count(), 8);

        tree.set_show_root(false).unwrap();
        check(&tree);
        tree.remove(b1).unwrap();
        check(&tree);
        assert_eq!(tree.visible_row_count(), 5);
    }
}
