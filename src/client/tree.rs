//! Directory tree types returned by the tree listing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One node of a remote directory tree.
///
/// Fields other than `name` and `children` are kept verbatim in `extra`, so
/// a node serializes back to what the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TreeNode {
    /// Whether the node carries a child list (directories do).
    pub fn is_dir(&self) -> bool {
        self.children.is_some()
    }

    /// Child nodes, empty for files.
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Depth-first walk yielding every node including `self`.
    pub fn walk(&self) -> Vec<&TreeNode> {
        let mut nodes = vec![self];
        for child in self.children() {
            nodes.extend(child.walk());
        }
        nodes
    }
}

/// Options for listing a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Descend into subfolders
    pub recursive: bool,
    /// Skip dot-files
    pub ignore_hidden: bool,
    /// Report absolute paths instead of paths relative to the folder
    pub absolute_path: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            ignore_hidden: true,
            absolute_path: false,
        }
    }
}

impl TreeOptions {
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn ignore_hidden(mut self, ignore_hidden: bool) -> Self {
        self.ignore_hidden = ignore_hidden;
        self
    }

    pub fn absolute_path(mut self, absolute_path: bool) -> Self {
        self.absolute_path = absolute_path;
        self
    }
}
