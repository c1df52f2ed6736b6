//! Accessibility tree capture.

use std::collections::HashMap;

use autoweb_protocols::AriaNode;
use serde_json::json;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::AXNode;

use super::core::PageSession;

impl PageSession {
    /// Full accessibility tree of the page or of one frame, flattened.
    pub async fn accessibility_tree(&self, frame_id: Option<&str>) -> Result<Vec<AriaNode>, CdpError> {
        let params = frame_id.map(|id| json!({ "frameId": id }));
        let result = self.call("Accessibility.getFullAXTree", params).await?;
        let nodes: Vec<AXNode> = serde_json::from_value(result["nodes"].clone())?;
        Ok(flatten_ax_tree(nodes))
    }
}

/// Flatten AX nodes depth-first from the root.
///
/// Ignored nodes are emitted with `ignored: true` and do not add a level of
/// indentation to their children.
pub fn flatten_ax_tree(nodes: Vec<AXNode>) -> Vec<AriaNode> {
    let Some(root_id) = nodes
        .iter()
        .find(|n| n.parent_id.is_none())
        .or_else(|| nodes.first())
        .map(|n| n.node_id.clone())
    else {
        return Vec::new();
    };

    let by_id: HashMap<&str, &AXNode> = nodes.iter().map(|n| (n.node_id.as_str(), n)).collect();
    let mut out = Vec::with_capacity(nodes.len());
    let mut stack: Vec<(&str, usize)> = vec![(root_id.as_str(), 0)];

    while let Some((id, depth)) = stack.pop() {
        let Some(node) = by_id.get(id) else { continue };

        let role = node.role.as_ref().map(|v| v.text()).unwrap_or_default();
        let ignored = node.ignored || role == "none" || (role == "generic" && node.name.is_none());
        out.push(AriaNode {
            depth,
            role,
            name: node.name.as_ref().map(|v| v.text()).unwrap_or_default(),
            value: node
                .value
                .as_ref()
                .map(|v| v.text())
                .filter(|v| !v.is_empty()),
            ignored,
        });

        let child_depth = if ignored { depth } else { depth + 1 };
        if let Some(children) = &node.child_ids {
            for child in children.iter().rev() {
                stack.push((child.as_str(), child_depth));
            }
        }
    }
    out
}
