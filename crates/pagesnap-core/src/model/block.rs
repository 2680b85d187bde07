use serde::{Deserialize, Serialize};

/// A content block attached to a page
///
/// Blocks form a tree: container blocks hold child blocks. The settings map
/// is opaque to PageSnap and copied verbatim into snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,

    /// Block service type, e.g. `text` or `container`
    #[serde(rename = "type")]
    pub block_type: String,

    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub position: i32,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

fn default_enabled() -> bool {
    true
}

impl Block {
    pub fn new(name: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            block_type: block_type.into(),
            settings: serde_json::Map::new(),
            position: 0,
            enabled: true,
            children: Vec::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    pub fn with_child(mut self, child: Block) -> Self {
        self.children.push(child);
        self
    }

    /// Number of blocks in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Block::count).sum::<usize>()
    }
}
