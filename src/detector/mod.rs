pub mod url_bar;

use crate::platform::UiNode;
use log::warn;
use std::collections::VecDeque;

/// Qualifiers the toolkit appends to a tab's description when it is the
/// active one ("Reels, selected" / "Reels, tab").
const SELECTION_QUALIFIERS: &[&str] = &["selected", "tab"];

/// Breadth-first search for a selected node matching the target surface.
///
/// A node qualifies on its view-id suffix, an exact description match, or
/// a description combining the target with a selection qualifier; all
/// description checks are case-insensitive. The app does not expose a
/// stable id for every surface, so the looser description patterns must
/// stay alongside the id check. Only a qualifying node whose selected
/// flag is set counts as a hit.
///
/// The walk gives up after `max_nodes` nodes and reports the surface as
/// inactive; an oversized or malformed tree must never block the user or
/// stall the event loop.
pub fn is_sub_screen_active(
    root: &UiNode,
    target_description: &str,
    view_id_suffix: &str,
    max_nodes: usize,
) -> bool {
    let target = target_description.to_lowercase();
    let mut queue = VecDeque::new();
    queue.push_back(root);
    let mut visited = 0usize;

    while let Some(node) = queue.pop_front() {
        visited += 1;
        if visited > max_nodes {
            warn!(
                "tree walk abandoned after {} nodes, treating surface as inactive",
                max_nodes
            );
            return false;
        }

        if node.selected && node_matches(node, &target, view_id_suffix) {
            return true;
        }

        for child in &node.children {
            queue.push_back(child);
        }
    }

    false
}

fn node_matches(node: &UiNode, target_lower: &str, view_id_suffix: &str) -> bool {
    if let Some(id) = &node.view_id {
        if !view_id_suffix.is_empty() && id.ends_with(view_id_suffix) {
            return true;
        }
    }

    if let Some(description) = &node.description {
        let description = description.to_lowercase();
        if description == target_lower {
            return true;
        }
        for qualifier in SELECTION_QUALIFIERS {
            if description.contains(&format!("{}, {}", target_lower, qualifier)) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_TREE_NODES;

    fn node(description: Option<&str>, selected: bool) -> UiNode {
        UiNode {
            description: description.map(|d| d.to_string()),
            selected,
            ..UiNode::default()
        }
    }

    fn wrap(children: Vec<UiNode>) -> UiNode {
        UiNode {
            children,
            ..UiNode::default()
        }
    }

    #[test]
    fn test_selected_matching_node_is_found() {
        let tree = wrap(vec![
            node(Some("Home"), false),
            node(Some("Reels"), true),
        ]);

        assert!(is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));
    }

    #[test]
    fn test_unselected_matching_node_is_not_a_hit() {
        let tree = wrap(vec![
            node(Some("Home"), true),
            node(Some("Reels"), false),
        ]);

        assert!(!is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));
    }

    #[test]
    fn test_description_match_is_case_insensitive() {
        let tree = wrap(vec![node(Some("reels"), true)]);
        assert!(is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));

        let tree = wrap(vec![node(Some("REELS"), true)]);
        assert!(is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));
    }

    #[test]
    fn test_description_with_selection_qualifier_matches() {
        let tree = wrap(vec![node(Some("Reels, selected"), true)]);
        assert!(is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));

        let tree = wrap(vec![node(Some("Reels, tab 4 of 5"), true)]);
        assert!(is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));
    }

    #[test]
    fn test_unrelated_description_does_not_match() {
        let tree = wrap(vec![node(Some("Reel mower reviews"), true)]);
        assert!(!is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));
    }

    #[test]
    fn test_view_id_suffix_matches_without_description() {
        let target = UiNode {
            view_id: Some("com.instagram.android:id/clips_tab".to_string()),
            selected: true,
            ..UiNode::default()
        };
        let tree = wrap(vec![node(Some("Home"), false), target]);

        assert!(is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));
    }

    #[test]
    fn test_deep_tree_is_searched() {
        let mut tree = node(Some("Reels"), true);
        for _ in 0..20 {
            tree = wrap(vec![node(None, false), tree]);
        }

        assert!(is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));
    }

    #[test]
    fn test_node_ceiling_fails_safe() {
        // A hit hidden behind more nodes than the ceiling allows is not
        // reached; the walk reports inactive instead of running long.
        let mut children: Vec<UiNode> = (0..10).map(|_| node(None, false)).collect();
        children.push(node(Some("Reels"), true));
        let tree = wrap(children);

        assert!(!is_sub_screen_active(&tree, "Reels", "clips_tab", 5));
        assert!(is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));
    }

    #[test]
    fn test_empty_tree_reports_inactive() {
        let tree = UiNode::default();
        assert!(!is_sub_screen_active(&tree, "Reels", "clips_tab", MAX_TREE_NODES));
    }
}
