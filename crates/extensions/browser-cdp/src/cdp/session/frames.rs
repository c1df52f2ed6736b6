//! Frame tree inspection.

use autoweb_protocols::FrameInfo;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::FrameTree;

use super::core::PageSession;

impl PageSession {
    /// All frames, main frame first, children depth-first.
    pub async fn frames(&self) -> Result<Vec<FrameInfo>, CdpError> {
        let result = self.call("Page.getFrameTree", None).await?;
        let tree: FrameTree = serde_json::from_value(result["frameTree"].clone())?;
        Ok(flatten_frame_tree(&tree))
    }
}

/// Flatten a `Page.getFrameTree` result depth-first.
pub fn flatten_frame_tree(tree: &FrameTree) -> Vec<FrameInfo> {
    let mut out = Vec::new();
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        out.push(FrameInfo {
            id: node.frame.id.clone(),
            parent_id: node.frame.parent_id.clone(),
            name: node.frame.name.clone().unwrap_or_default(),
            url: node.frame.url.clone(),
        });
        // reversed so the first child is visited first
        stack.extend(node.child_frames.iter().rev());
    }
    out
}
