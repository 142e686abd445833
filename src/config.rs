//! Tree options with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Options file: TOML, unspecified fields inherit
//! 3. Environment variables: `ENTITY_TREE_*` prefix, `__` for nested keys

use std::path::Path;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::{AddMeta, TreeError, TreeOptions, TreeResult};

/// Prefix of environment overrides, e.g. `ENTITY_TREE_ID_KEY=_id`.
pub const ENV_PREFIX: &str = "ENTITY_TREE";

/// Raw metadata flags (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawAddMeta {
    pub has_children: Option<bool>,
    pub is_leaf: Option<bool>,
    pub is_root: Option<bool>,
}

/// Raw options for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeOptions {
    pub id_key: Option<String>,
    pub parent_key: Option<String>,
    pub validate_nodes: Option<bool>,
    pub embed_levels: Option<bool>,
    pub add_meta: Option<RawAddMeta>,
    pub level_key: Option<String>,
    pub meta_key: Option<String>,
}

impl AddMeta {
    fn merge(base: Option<Self>, overlay: &RawAddMeta) -> Self {
        let base = base.unwrap_or_default();
        Self {
            has_children: overlay.has_children.unwrap_or(base.has_children),
            is_leaf: overlay.is_leaf.unwrap_or(base.is_leaf),
            is_root: overlay.is_root.unwrap_or(base.is_root),
        }
    }
}

impl TreeOptions {
    /// Merge overlay onto self: specified fields win, others keep base.
    pub fn merge_with(&self, overlay: &RawTreeOptions) -> Self {
        Self {
            id_key: overlay.id_key.clone().unwrap_or_else(|| self.id_key.clone()),
            parent_key: overlay
                .parent_key
                .clone()
                .unwrap_or_else(|| self.parent_key.clone()),
            validate_nodes: overlay.validate_nodes.unwrap_or(self.validate_nodes),
            embed_levels: overlay.embed_levels.unwrap_or(self.embed_levels),
            add_meta: overlay
                .add_meta
                .as_ref()
                .map(|raw| AddMeta::merge(self.add_meta, raw))
                .or(self.add_meta),
            level_key: overlay
                .level_key
                .clone()
                .unwrap_or_else(|| self.level_key.clone()),
            meta_key: overlay
                .meta_key
                .clone()
                .unwrap_or_else(|| self.meta_key.clone()),
        }
    }

    /// Parse TOML options on top of the defaults.
    pub fn from_toml_str(content: &str) -> TreeResult<Self> {
        let raw: RawTreeOptions = toml::from_str(content).map_err(|e| TreeError::Config {
            message: format!("parse options: {}", e),
        })?;
        Ok(Self::default().merge_with(&raw))
    }

    /// Load options with layered precedence.
    ///
    /// # Arguments
    /// * `path` - Optional TOML options file; a missing file is an error
    #[instrument(level = "debug")]
    pub fn load(path: Option<&Path>) -> TreeResult<Self> {
        let mut current = Self::default();

        if let Some(path) = path {
            let raw = load_raw_options(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        debug!(?current, "options loaded");
        Ok(current)
    }

    /// Apply `ENTITY_TREE_*` environment variables as explicit overrides.
    fn apply_env_overrides(mut options: Self) -> TreeResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("id_key") {
            options.id_key = val;
        }
        if let Ok(val) = config.get_string("parent_key") {
            options.parent_key = val;
        }
        if let Ok(val) = config.get_bool("validate_nodes") {
            options.validate_nodes = val;
        }
        if let Ok(val) = config.get_bool("embed_levels") {
            options.embed_levels = val;
        }
        if let Ok(val) = config.get_string("level_key") {
            options.level_key = val;
        }
        if let Ok(val) = config.get_string("meta_key") {
            options.meta_key = val;
        }

        let raw_meta = RawAddMeta {
            has_children: config.get_bool("add_meta.has_children").ok(),
            is_leaf: config.get_bool("add_meta.is_leaf").ok(),
            is_root: config.get_bool("add_meta.is_root").ok(),
        };
        if raw_meta.has_children.is_some() || raw_meta.is_leaf.is_some() || raw_meta.is_root.is_some()
        {
            options.add_meta = Some(AddMeta::merge(options.add_meta, &raw_meta));
        }

        Ok(options)
    }
}

/// Load a TOML file into RawTreeOptions for manual merging.
fn load_raw_options(path: &Path) -> TreeResult<RawTreeOptions> {
    let content = std::fs::read_to_string(path).map_err(|e| TreeError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| TreeError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config {
        message: e.to_string(),
    }
}
