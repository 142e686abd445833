//! Recursion guard: proves every parent chain terminates.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::domain::entities::NodeId;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::index::Index;

/// Validates, once per tree, that the parent links are acyclic.
pub struct RecursionGuard<'a> {
    index: &'a Index,
}

impl<'a> RecursionGuard<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self { index }
    }

    /// Walk the parent chain of every indexed entity.
    ///
    /// Ids on a successful walk are remembered as valid, so chains sharing a
    /// tail are walked once. Unresolvable parents end a walk without error.
    #[instrument(level = "debug", skip(self), fields(count = self.index.len()))]
    pub fn validate_tree(&self) -> TreeResult<()> {
        let mut valid: HashSet<NodeId> = HashSet::new();

        for pos in 0..self.index.len() {
            if !self.index.owns_id(pos) {
                continue;
            }
            let Some(id) = self.index.id_at(pos) else {
                continue;
            };
            if valid.contains(id) {
                continue;
            }
            let walked = self.validate_node(pos, id, &valid)?;
            valid.extend(walked);
        }

        debug!(valid = valid.len(), "parent chains validated");
        Ok(())
    }

    fn validate_node(
        &self,
        mut pos: usize,
        start: &NodeId,
        valid: &HashSet<NodeId>,
    ) -> TreeResult<Vec<NodeId>> {
        let mut path = vec![start.clone()];
        let mut visiting: HashSet<&NodeId> = HashSet::from([start]);

        while let Some(parent_id) = self.index.parent_ref_at(pos) {
            let Some(parent_pos) = self.index.position(parent_id) else {
                break;
            };
            // a valid id's chain is known to terminate and cannot lead back here
            if valid.contains(parent_id) {
                break;
            }
            path.push(parent_id.clone());
            if !visiting.insert(parent_id) {
                warn!(path = ?path, "recursive parent relationship");
                return Err(TreeError::RecursiveRelationship { path });
            }
            pos = parent_pos;
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Entity;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn validate(value: Value) -> TreeResult<()> {
        let entities: Vec<Entity> = serde_json::from_value(value).unwrap();
        let index = Index::new(&entities, "id", "parentId");
        RecursionGuard::new(&index).validate_tree()
    }

    fn failing_path(value: Value) -> String {
        match validate(value) {
            Err(TreeError::RecursiveRelationship { path }) => {
                path.iter().map(NodeId::as_str).collect::<Vec<_>>().join(",")
            }
            other => panic!("expected recursion error, got {:?}", other),
        }
    }

    #[rstest]
    #[case(json!([{"id": 2, "parentId": 3}, {"id": 3, "parentId": 2}]), "2,3,2")]
    #[case(json!([{"id": 1}, {"id": 2, "parentId": 1}, {"id": 3, "parentId": 2}, {"id": 4, "parentId": 4}]), "4,4")]
    #[case(json!([{"id": 5, "parentId": 2}, {"id": 2, "parentId": 3}, {"id": 3, "parentId": 2}]), "5,2,3,2")]
    fn test_cycle_reports_visited_path(#[case] entities: Value, #[case] expected: &str) {
        assert_eq!(failing_path(entities), expected);
    }

    #[test]
    fn test_unresolvable_parent_ends_walk() {
        assert!(validate(json!([{"id": 1, "parentId": 99}, {"id": 2, "parentId": 1}])).is_ok());
    }

    #[test]
    fn test_shared_tail_validates() {
        assert!(validate(json!([
            {"id": "root"},
            {"id": "a", "parentId": "root"},
            {"id": "b", "parentId": "a"},
            {"id": "c", "parentId": "a"},
        ]))
        .is_ok());
    }

    #[test]
    fn test_cycle_through_shadowed_duplicate_is_ignored() {
        // the first "A" is shadowed by the second, which is a plain root
        assert!(validate(json!([
            {"id": "A", "parentId": "B"},
            {"id": "B", "parentId": "A"},
            {"id": "A"},
        ]))
        .is_ok());
    }
}
