// Pre-order flattening of a comment tree with a collapse-set overlay.

use std::collections::HashSet;

use super::thread::CommentNode;

/// Flatten nested comments into display order: each node is emitted, then
/// its children, unless the node's id is in `collapsed`. A collapsed node
/// itself stays visible; its descendants do not. Deterministic and free of
/// side effects on its inputs.
pub fn flatten<'a>(nodes: &'a [CommentNode], collapsed: &HashSet<u64>) -> Vec<&'a CommentNode> {
    let mut out = Vec::new();
    for node in nodes {
        push_pre_order(node, collapsed, &mut out);
    }
    out
}

fn push_pre_order<'a>(
    node: &'a CommentNode,
    collapsed: &HashSet<u64>,
    out: &mut Vec<&'a CommentNode>,
) {
    out.push(node);
    if !collapsed.contains(&node.id) {
        for child in &node.children {
            push_pre_order(child, collapsed, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn node(id: u64, depth: usize, children: Vec<CommentNode>) -> CommentNode {
        CommentNode {
            id,
            author: format!("user{id}"),
            text: String::new(),
            time: DateTime::UNIX_EPOCH,
            depth,
            parent: None,
            children,
        }
    }

    /// Tree from the reference scenario: 1 -> [2, 3], 2 -> [4].
    fn sample_tree() -> Vec<CommentNode> {
        vec![node(
            1,
            0,
            vec![node(2, 1, vec![node(4, 2, vec![])]), node(3, 1, vec![])],
        )]
    }

    fn ids(nodes: &[&CommentNode]) -> Vec<u64> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_flatten_is_pre_order() {
        let tree = sample_tree();
        let flat = flatten(&tree, &HashSet::new());
        assert_eq!(ids(&flat), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_collapsed_node_hides_descendants_only() {
        let tree = sample_tree();
        let flat = flatten(&tree, &HashSet::from([2]));
        // 2 stays visible, 4 disappears, sibling 3 is untouched.
        assert_eq!(ids(&flat), vec![1, 2, 3]);
    }

    #[test]
    fn test_collapsing_root_hides_whole_subtree() {
        let tree = sample_tree();
        let flat = flatten(&tree, &HashSet::from([1]));
        assert_eq!(ids(&flat), vec![1]);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let tree = sample_tree();
        let collapsed = HashSet::from([2]);
        let first = ids(&flatten(&tree, &collapsed));
        let second = ids(&flatten(&tree, &collapsed));
        assert_eq!(first, second);
    }

    #[test]
    fn test_sibling_subtrees_survive_collapse() {
        let tree = vec![
            node(1, 0, vec![node(2, 1, vec![node(3, 2, vec![])])]),
            node(4, 0, vec![node(5, 1, vec![])]),
        ];
        let flat = flatten(&tree, &HashSet::from([1]));
        assert_eq!(ids(&flat), vec![1, 4, 5]);
    }
}
