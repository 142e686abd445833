//! Construction options of a tree

use serde::{Deserialize, Serialize};

/// Metadata flags requested for the `add_meta` enrichment pass.
///
/// The computed level is always written alongside the requested flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddMeta {
    pub has_children: bool,
    pub is_leaf: bool,
    pub is_root: bool,
}

impl AddMeta {
    pub fn all() -> Self {
        Self {
            has_children: true,
            is_leaf: true,
            is_root: true,
        }
    }
}

/// How a tree reads its entities and what it writes back onto them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// Field holding the identifier (default: `id`)
    pub id_key: String,
    /// Field holding the parent identifier (default: `parentId`)
    pub parent_key: String,
    /// Strict lookups: unresolved nodes raise instead of yielding empty results
    pub validate_nodes: bool,
    /// Write each entity's depth under `level_key`
    pub embed_levels: bool,
    /// Write a metadata object under `meta_key`
    pub add_meta: Option<AddMeta>,
    pub level_key: String,
    pub meta_key: String,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            id_key: "id".into(),
            parent_key: "parentId".into(),
            validate_nodes: true,
            embed_levels: false,
            add_meta: None,
            level_key: "level".into(),
            meta_key: "meta".into(),
        }
    }
}

impl TreeOptions {
    pub fn with_id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    pub fn with_parent_key(mut self, key: impl Into<String>) -> Self {
        self.parent_key = key.into();
        self
    }

    /// Lenient trees answer unresolved lookups with empty results.
    pub fn lenient(mut self) -> Self {
        self.validate_nodes = false;
        self
    }

    pub fn with_embed_levels(mut self, embed: bool) -> Self {
        self.embed_levels = embed;
        self
    }

    pub fn with_add_meta(mut self, meta: AddMeta) -> Self {
        self.add_meta = Some(meta);
        self
    }

    pub fn with_level_key(mut self, key: impl Into<String>) -> Self {
        self.level_key = key.into();
        self
    }

    pub fn with_meta_key(mut self, key: impl Into<String>) -> Self {
        self.meta_key = key.into();
        self
    }
}
