//! Lookup tables over an entity collection.
//!
//! Positions refer to the entity's place in the tree's collection; identifiers
//! and parent references are read once here so traversals never touch JSON.

use std::collections::HashMap;

use tracing::instrument;

use crate::domain::entities::{Entity, NodeId};

/// Identifier and parent-reference index of a tree.
#[derive(Debug, Default)]
pub struct Index {
    ids: Vec<Option<NodeId>>,
    parents: Vec<Option<NodeId>>,
    pub(crate) by_id: HashMap<NodeId, usize>,
    /// Children under their resolved parent; top-level entities are not grouped
    pub(crate) by_parent: HashMap<NodeId, Vec<usize>>,
}

impl Index {
    /// Read keys and build `by_id`. Duplicate identifiers: the last entity wins.
    #[instrument(level = "trace", skip(entities), fields(count = entities.len()))]
    pub(crate) fn new(entities: &[Entity], id_key: &str, parent_key: &str) -> Self {
        let ids: Vec<_> = entities.iter().map(|e| e.node_id(id_key)).collect();
        let parents = entities.iter().map(|e| e.node_id(parent_key)).collect();

        let mut by_id = HashMap::with_capacity(entities.len());
        for (pos, id) in ids.iter().enumerate() {
            if let Some(id) = id {
                by_id.insert(id.clone(), pos);
            }
        }

        Self {
            ids,
            parents,
            by_id,
            by_parent: HashMap::new(),
        }
    }

    /// Group positions by resolved parent, keeping collection order per group.
    ///
    /// Entities shadowed by a later duplicate identifier are left out, so child
    /// edges always mirror the parent links checked by the recursion guard.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn group_by_parent(&mut self) {
        let mut by_parent: HashMap<NodeId, Vec<usize>> = HashMap::new();
        for pos in 0..self.len() {
            if !self.owns_id(pos) {
                continue;
            }
            if let Some(parent) = self.resolved_parent_id(pos) {
                by_parent.entry(parent.clone()).or_default().push(pos);
            }
        }
        self.by_parent = by_parent;
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifier → position table.
    pub fn by_id(&self) -> &HashMap<NodeId, usize> {
        &self.by_id
    }

    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn id_at(&self, pos: usize) -> Option<&NodeId> {
        self.ids.get(pos).and_then(Option::as_ref)
    }

    /// Raw parent reference, whether or not it resolves.
    pub fn parent_ref_at(&self, pos: usize) -> Option<&NodeId> {
        self.parents.get(pos).and_then(Option::as_ref)
    }

    pub fn parent_of(&self, pos: usize) -> Option<usize> {
        self.parent_ref_at(pos).and_then(|p| self.position(p))
    }

    pub fn children_of(&self, pos: usize) -> &[usize] {
        self.id_at(pos)
            .and_then(|id| self.by_parent.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True unless a later entity with the same identifier shadows this one.
    pub fn owns_id(&self, pos: usize) -> bool {
        match self.id_at(pos) {
            Some(id) => self.position(id) == Some(pos),
            None => true,
        }
    }

    /// Parent absent, or not resolvable within this collection.
    pub fn is_top_level(&self, pos: usize) -> bool {
        self.parent_of(pos).is_none()
    }

    fn resolved_parent_id(&self, pos: usize) -> Option<&NodeId> {
        self.parent_ref_at(pos).filter(|p| self.by_id.contains_key(*p))
    }
}
