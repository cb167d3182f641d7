use crate::platform::UiNode;
use log::warn;
use std::collections::VecDeque;

/// Text of the first node whose view id ends with the given suffix.
/// Same bounded walk as the sub-screen search.
pub fn find_bar_text(root: &UiNode, view_id_suffix: &str, max_nodes: usize) -> Option<String> {
    if view_id_suffix.is_empty() {
        return None;
    }

    let mut queue = VecDeque::new();
    queue.push_back(root);
    let mut visited = 0usize;

    while let Some(node) = queue.pop_front() {
        visited += 1;
        if visited > max_nodes {
            warn!("tree walk abandoned after {} nodes, no bar text", max_nodes);
            return None;
        }

        if let (Some(id), Some(text)) = (&node.view_id, &node.text) {
            if id.ends_with(view_id_suffix) && !text.is_empty() {
                return Some(text.clone());
            }
        }

        for child in &node.children {
            queue.push_back(child);
        }
    }

    None
}

/// Watches the browser's address bar and reports only changed URLs.
pub struct UrlWatcher {
    view_id_suffix: String,
    max_nodes: usize,
    last_url: Option<String>,
}

impl UrlWatcher {
    pub fn new(view_id_suffix: &str, max_nodes: usize) -> Self {
        Self {
            view_id_suffix: view_id_suffix.to_string(),
            max_nodes,
            last_url: None,
        }
    }

    /// Returns the newly visited URL when the bar text changed.
    pub fn observe(&mut self, root: &UiNode) -> Option<String> {
        let url = find_bar_text(root, &self.view_id_suffix, self.max_nodes)?;
        if self.last_url.as_deref() == Some(url.as_str()) {
            return None;
        }
        self.last_url = Some(url.clone());
        Some(url)
    }
}
