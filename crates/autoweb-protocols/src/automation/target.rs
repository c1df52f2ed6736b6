//! Execution targets, frames and capture shapes.

use serde::{Deserialize, Serialize};

/// The document or frame a script runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionTarget {
    /// The top-level document.
    #[default]
    Root,
    /// An embedded frame.
    Frame {
        frame_id: String,
        name: String,
        url: String,
    },
}

impl ExecutionTarget {
    pub fn is_root(&self) -> bool {
        matches!(self, ExecutionTarget::Root)
    }

    /// Short label for logs.
    pub fn label(&self) -> String {
        match self {
            ExecutionTarget::Root => "root".to_string(),
            ExecutionTarget::Frame { name, url, .. } if !name.is_empty() => {
                format!("frame '{}' ({})", name, url)
            }
            ExecutionTarget::Frame { frame_id, url, .. } => format!("frame {} ({})", frame_id, url),
        }
    }
}

impl From<&FrameInfo> for ExecutionTarget {
    fn from(frame: &FrameInfo) -> Self {
        ExecutionTarget::Frame {
            frame_id: frame.id.clone(),
            name: frame.name.clone(),
            url: frame.url.clone(),
        }
    }
}

/// A frame in the live document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl FrameInfo {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: String::new(),
            url: url.into(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// How the current document is rendered for prompting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaptureMode {
    #[default]
    RawHtml,
    AriaSnapshot,
}

impl std::str::FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RAW_HTML" | "HTML" | "RAW" => Ok(CaptureMode::RawHtml),
            "ARIA_SNAPSHOT" | "ARIA" => Ok(CaptureMode::AriaSnapshot),
            other => Err(format!("unknown capture mode: {}", other)),
        }
    }
}

/// One node of an accessibility tree, already flattened with its depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AriaNode {
    pub depth: usize,
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub ignored: bool,
}

impl AriaNode {
    pub fn new(depth: usize, role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            depth,
            role: role.into(),
            name: name.into(),
            value: None,
            ignored: false,
        }
    }
}
