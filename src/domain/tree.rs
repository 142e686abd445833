//! Tree engine over a flat, parent-linked entity collection.

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::enrich;
use crate::domain::entities::{Entity, NodeId, NodeRef};
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::guard::RecursionGuard;
use crate::domain::index::Index;
use crate::domain::options::TreeOptions;

/// Tree-like queries over entities linked by a parent-id reference.
///
/// Built once from a snapshot: the parent links are validated, the index is
/// built and the optional enrichment passes write onto the entities before
/// the tree is handed out. `clone()` shares entities and index with the
/// source and skips validation.
#[derive(Debug, Clone)]
pub struct Tree {
    pub(crate) entities: Rc<Vec<Entity>>,
    pub(crate) index: Rc<Index>,
    options: TreeOptions,
}

impl Tree {
    /// Build a tree, failing with `RecursiveRelationship` on cyclic parent links.
    #[instrument(level = "debug", skip(entities, options), fields(count = entities.len()))]
    pub fn new(mut entities: Vec<Entity>, options: TreeOptions) -> TreeResult<Self> {
        let mut index = Index::new(&entities, &options.id_key, &options.parent_key);
        RecursionGuard::new(&index).validate_tree()?;
        index.group_by_parent();

        enrich::apply(&mut entities, &index, &options);
        debug!(
            embed_levels = options.embed_levels,
            add_meta = options.add_meta.is_some(),
            "tree built"
        );

        Ok(Self {
            entities: Rc::new(entities),
            index: Rc::new(index),
            options,
        })
    }

    /// Build a tree with default options.
    pub fn with_defaults(entities: Vec<Entity>) -> TreeResult<Self> {
        Self::new(entities, TreeOptions::default())
    }

    /// Build a tree from a JSON array of objects.
    pub fn from_json(value: Value, options: TreeOptions) -> TreeResult<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(TreeError::NotAnArray {
                    found: json_kind(&other),
                })
            }
        };
        let entities = items
            .into_iter()
            .enumerate()
            .map(|(position, item)| match item {
                Value::Object(map) => Ok(Entity::from(map)),
                _ => Err(TreeError::InvalidEntity { position }),
            })
            .collect::<TreeResult<Vec<_>>>()?;
        Self::new(entities, options)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn id_key(&self) -> &str {
        &self.options.id_key
    }

    pub fn parent_key(&self) -> &str {
        &self.options.parent_key
    }

    /// Strict (`true`) or lenient lookups.
    pub fn validate_nodes(&self) -> bool {
        self.options.validate_nodes
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn by_id(&self) -> &std::collections::HashMap<NodeId, usize> {
        self.index.by_id()
    }

    pub(crate) fn at(&self, pos: usize) -> &Entity {
        &self.entities[pos]
    }

    fn all(&self, positions: impl IntoIterator<Item = usize>) -> Vec<&Entity> {
        positions.into_iter().map(|pos| self.at(pos)).collect()
    }

    /// Resolve a node argument to its position.
    ///
    /// Strict trees fail on a missing or unknown node, lenient trees yield `None`.
    pub(crate) fn resolve<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<Option<usize>> {
        let id = match node.into() {
            NodeRef::Id(id) => Some(id),
            NodeRef::Entity(entity) => entity.node_id(self.id_key()),
        };
        let Some(id) = id.filter(|id| !id.as_str().is_empty()) else {
            return self.lookup_failure(TreeError::no_node());
        };
        match self.index.position(&id) {
            Some(pos) => Ok(Some(pos)),
            None => self.lookup_failure(TreeError::unknown_node(&id)),
        }
    }

    fn lookup_failure<T>(&self, error: TreeError) -> TreeResult<Option<T>> {
        if self.options.validate_nodes {
            Err(error)
        } else {
            Ok(None)
        }
    }

    /// The tree's own entity for `node`.
    pub fn get_node<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<Option<&Entity>> {
        Ok(self.resolve(node)?.map(|pos| self.at(pos)))
    }

    /// Plain index probe, never fails.
    pub fn get_by_id(&self, id: impl Into<NodeId>) -> Option<&Entity> {
        self.index.position(&id.into()).map(|pos| self.at(pos))
    }

    /// Direct children in collection order.
    #[instrument(level = "trace", skip_all)]
    pub fn children<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<Vec<&Entity>> {
        Ok(match self.resolve(node)? {
            Some(pos) => self.all(self.index.children_of(pos).iter().copied()),
            None => Vec::new(),
        })
    }

    pub fn has_children<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<bool> {
        Ok(!self.children(node)?.is_empty())
    }

    pub fn is_leaf<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<bool> {
        Ok(self.children(node)?.is_empty())
    }

    /// True when the node carries no parent reference at all.
    pub fn is_root<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<bool> {
        Ok(self
            .resolve(node)?
            .is_some_and(|pos| self.index.parent_ref_at(pos).is_none()))
    }

    /// Entity referenced by the node's parent reference.
    ///
    /// A dangling reference is a lookup failure on strict trees.
    #[instrument(level = "trace", skip_all)]
    pub fn parent<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<Option<&Entity>> {
        let Some(pos) = self.resolve(node)? else {
            return Ok(None);
        };
        match self.index.parent_ref_at(pos) {
            Some(parent_id) => self.get_node(parent_id),
            None => Ok(None),
        }
    }

    pub(crate) fn ancestor_positions(&self, mut pos: usize) -> Vec<usize> {
        let mut result = Vec::new();
        while let Some(parent) = self.index.parent_of(pos) {
            result.push(parent);
            pos = parent;
        }
        result
    }

    /// Level-by-level expansion below `pos`.
    pub(crate) fn descendant_positions(&self, pos: usize) -> Vec<usize> {
        let mut result = Vec::new();
        let mut level: Vec<usize> = self.index.children_of(pos).to_vec();
        while !level.is_empty() {
            result.extend_from_slice(&level);
            level = level
                .iter()
                .flat_map(|&child| self.index.children_of(child).iter().copied())
                .collect();
        }
        result
    }

    /// Parent, grandparent, ... up to the first unresolved parent reference.
    #[instrument(level = "trace", skip_all)]
    pub fn ancestors<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<Vec<&Entity>> {
        Ok(match self.resolve(node)? {
            Some(pos) => self.all(self.ancestor_positions(pos)),
            None => Vec::new(),
        })
    }

    pub fn self_and_ancestors<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<Vec<&Entity>> {
        Ok(match self.resolve(node)? {
            Some(pos) => self.all(std::iter::once(pos).chain(self.ancestor_positions(pos))),
            None => Vec::new(),
        })
    }

    /// All nodes below `node`; parents precede their own descendants.
    #[instrument(level = "trace", skip_all)]
    pub fn descendants<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<Vec<&Entity>> {
        Ok(match self.resolve(node)? {
            Some(pos) => self.all(self.descendant_positions(pos)),
            None => Vec::new(),
        })
    }

    pub fn self_and_descendants<'n>(
        &self,
        node: impl Into<NodeRef<'n>>,
    ) -> TreeResult<Vec<&Entity>> {
        Ok(match self.resolve(node)? {
            Some(pos) => self.all(std::iter::once(pos).chain(self.descendant_positions(pos))),
            None => Vec::new(),
        })
    }

    /// Topmost reachable node above (or at) `node`.
    pub fn ancestor<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<Option<&Entity>> {
        Ok(self.self_and_ancestors(node)?.last().copied())
    }

    /// First entity without a parent reference.
    pub fn root(&self) -> Option<&Entity> {
        (0..self.len())
            .find(|&pos| self.index.parent_ref_at(pos).is_none())
            .map(|pos| self.at(pos))
    }

    /// Entities without a parent reference.
    pub fn roots(&self) -> Vec<&Entity> {
        self.all((0..self.len()).filter(|&pos| self.index.parent_ref_at(pos).is_none()))
    }

    pub(crate) fn top_level_positions(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&pos| self.index.is_top_level(pos))
            .collect()
    }

    /// Entities whose parent reference is absent or does not resolve here.
    pub fn top_level_nodes(&self) -> Vec<&Entity> {
        self.all(self.top_level_positions())
    }

    /// Leaves across all entities, in collection order.
    pub fn leaf_nodes(&self) -> Vec<&Entity> {
        self.all((0..self.len()).filter(|&pos| self.index.children_of(pos).is_empty()))
    }

    /// Leaves within `self_and_descendants(node)`.
    pub fn leaf_nodes_under<'n>(&self, node: impl Into<NodeRef<'n>>) -> TreeResult<Vec<&Entity>> {
        let Some(pos) = self.resolve(node)? else {
            return Ok(Vec::new());
        };
        Ok(self.all(
            std::iter::once(pos)
                .chain(self.descendant_positions(pos))
                .filter(|&p| self.index.children_of(p).is_empty()),
        ))
    }

    /// Number of levels, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        enrich::levels(&self.index)
            .into_iter()
            .max()
            .map_or(0, |deepest| deepest + 1)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
