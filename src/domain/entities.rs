//! Domain entities: records, identifiers and node arguments

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a node, normalized to its string form.
///
/// JSON strings are taken verbatim, numbers and booleans use their canonical
/// rendering, so `2` and `"2"` name the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret a field value as an identifier.
    ///
    /// Missing, `null`, empty strings and structured values carry no identifier.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            Value::Bool(b) => Some(Self(b.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

/// One record of the hierarchy: an opaque JSON object.
///
/// Only the fields named by the tree's `id_key` and `parent_key` carry meaning;
/// everything else is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter, handy for fixtures.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Identifier stored under `key`, if any.
    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.get(key).and_then(NodeId::from_value)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Object(entity.0)
    }
}

/// Argument of the navigation operations: a raw identifier or an entity.
///
/// Resolved once against the tree's index at the operation boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRef<'a> {
    Id(NodeId),
    Entity(&'a Entity),
}

impl From<NodeId> for NodeRef<'_> {
    fn from(id: NodeId) -> Self {
        NodeRef::Id(id)
    }
}

impl From<&NodeId> for NodeRef<'_> {
    fn from(id: &NodeId) -> Self {
        NodeRef::Id(id.clone())
    }
}

impl From<&str> for NodeRef<'_> {
    fn from(id: &str) -> Self {
        NodeRef::Id(NodeId::new(id))
    }
}

impl From<String> for NodeRef<'_> {
    fn from(id: String) -> Self {
        NodeRef::Id(NodeId::from(id))
    }
}

impl From<i64> for NodeRef<'_> {
    fn from(id: i64) -> Self {
        NodeRef::Id(NodeId::from(id))
    }
}

impl<'a> From<&'a Entity> for NodeRef<'a> {
    fn from(entity: &'a Entity) -> Self {
        NodeRef::Entity(entity)
    }
}

impl<'a> From<&&'a Entity> for NodeRef<'a> {
    fn from(entity: &&'a Entity) -> Self {
        NodeRef::Entity(*entity)
    }
}
