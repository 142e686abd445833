//! Structural filters producing new trees.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::entities::Entity;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::tree::Tree;

/// Explicit-stack frame of the path filter.
enum Visit {
    Enter(usize),
    Leave(usize),
}

impl Tree {
    /// Entities matching `predicate`, in collection order.
    pub fn filter_nodes<F>(&self, predicate: F) -> Vec<&Entity>
    where
        F: FnMut(&Entity) -> bool,
    {
        self.filter_nodes_in(self.entities.iter(), predicate)
    }

    /// Order-preserving filter over a given sequence of nodes.
    pub fn filter_nodes_in<'a, I, F>(&self, nodes: I, mut predicate: F) -> Vec<&'a Entity>
    where
        I: IntoIterator<Item = &'a Entity>,
        F: FnMut(&Entity) -> bool,
    {
        nodes.into_iter().filter(|node| predicate(*node)).collect()
    }

    /// New tree with every non-leaf entity plus the leaves matching `predicate`.
    ///
    /// Leaf status is taken from this tree, so an inner node whose children are
    /// all filtered out stays in the result.
    #[instrument(level = "debug", skip_all, fields(count = self.len()))]
    pub fn filter_leaves<F>(&self, mut predicate: F) -> TreeResult<Tree>
    where
        F: FnMut(&Entity) -> bool,
    {
        let kept: Vec<bool> = (0..self.len())
            .map(|pos| !self.index.children_of(pos).is_empty() || predicate(self.at(pos)))
            .collect();
        let entities = self.kept_entities(&kept);
        debug!(kept = entities.len(), "leaves filtered");
        Tree::new(entities, self.options().clone())
    }

    /// New tree with every match plus its full ancestor chain and subtree.
    ///
    /// Depth-first from the top-level nodes: a match pulls in its descendants
    /// and ancestors, a miss continues into its children. Fails with
    /// `StructuralCycle` if a node is re-entered while on the active stack.
    #[instrument(level = "debug", skip_all, fields(count = self.len()))]
    pub fn filter_paths<F>(&self, mut predicate: F) -> TreeResult<Tree>
    where
        F: FnMut(&Entity) -> bool,
    {
        let mut matched: HashSet<usize> = HashSet::new();
        let mut visiting: HashSet<usize> = HashSet::new();
        let mut stack: Vec<Visit> = self
            .top_level_positions()
            .into_iter()
            .rev()
            .map(Visit::Enter)
            .collect();

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Leave(pos) => {
                    visiting.remove(&pos);
                }
                Visit::Enter(pos) => {
                    if matched.contains(&pos) {
                        continue;
                    }
                    if !visiting.insert(pos) {
                        return Err(self.structural_cycle(pos));
                    }
                    stack.push(Visit::Leave(pos));

                    if predicate(self.at(pos)) {
                        matched.insert(pos);
                        matched.extend(self.descendant_positions(pos));
                        matched.extend(self.ancestor_positions(pos));
                    } else {
                        let children = self.index.children_of(pos);
                        stack.extend(children.iter().rev().map(|&child| Visit::Enter(child)));
                    }
                }
            }
        }

        let kept: Vec<bool> = (0..self.len()).map(|pos| matched.contains(&pos)).collect();
        let entities = self.kept_entities(&kept);
        debug!(kept = entities.len(), "paths filtered");
        Tree::new(entities, self.options().clone())
    }

    /// Kept entities in collection order.
    ///
    /// A shadowed duplicate survives only alongside the entity owning its
    /// identifier; its parent links were never checked by the recursion guard.
    fn kept_entities(&self, kept: &[bool]) -> Vec<Entity> {
        (0..self.len())
            .filter(|&pos| kept[pos])
            .filter(|&pos| {
                self.index
                    .id_at(pos)
                    .and_then(|id| self.index.position(id))
                    .map_or(true, |owner| kept[owner])
            })
            .map(|pos| self.at(pos).clone())
            .collect()
    }

    fn structural_cycle(&self, pos: usize) -> TreeError {
        let node = self
            .index
            .id_at(pos)
            .map_or_else(|| format!("#{}", pos), ToString::to_string);
        TreeError::StructuralCycle { node }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NodeId;
    use crate::domain::options::TreeOptions;
    use serde_json::json;
    use std::rc::Rc;

    #[test]
    fn test_filter_paths_fails_on_reentered_node() {
        let mut tree = Tree::from_json(
            json!([{"id": "a"}, {"id": "b", "parentId": "a"}]),
            TreeOptions::default(),
        )
        .unwrap();

        // simulate post-construction corruption: "b" lists "a" as its child
        let index = Rc::get_mut(&mut tree.index).unwrap();
        index
            .by_parent
            .insert(NodeId::new("b"), vec![0]);

        let result = tree.filter_paths(|_| false);
        assert_eq!(
            result.unwrap_err(),
            TreeError::StructuralCycle {
                node: "a".to_string()
            }
        );
    }

    #[test]
    fn test_filter_paths_keeps_collection_order() {
        let tree = Tree::from_json(
            json!([
                {"id": "leaf", "parentId": "mid"},
                {"id": "top"},
                {"id": "mid", "parentId": "top"},
                {"id": "other", "parentId": "top"},
            ]),
            TreeOptions::default(),
        )
        .unwrap();

        let filtered = tree
            .filter_paths(|e| e.node_id("id") == Some(NodeId::new("leaf")))
            .unwrap();
        let ids: Vec<_> = filtered
            .entities()
            .iter()
            .filter_map(|e| e.node_id("id"))
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, ["leaf", "top", "mid"]);
    }
}
