//! Enrichment passes run once at construction: embedded levels and metadata.

use serde_json::{Map, Value};
use tracing::{instrument, trace};

use crate::domain::entities::Entity;
use crate::domain::index::Index;
use crate::domain::options::{AddMeta, TreeOptions};

/// Write the requested enrichment fields onto `entities`.
#[instrument(level = "debug", skip_all, fields(count = entities.len()))]
pub(crate) fn apply(entities: &mut [Entity], index: &Index, options: &TreeOptions) {
    if !options.embed_levels && options.add_meta.is_none() {
        return;
    }
    let levels = levels(index);

    for (pos, entity) in entities.iter_mut().enumerate() {
        if options.embed_levels {
            entity.insert(options.level_key.clone(), levels[pos]);
        }
        if let Some(flags) = options.add_meta {
            entity.insert(
                options.meta_key.clone(),
                meta_record(index, pos, levels[pos], flags),
            );
        }
    }
    trace!(embed_levels = options.embed_levels, "entities enriched");
}

/// Parent hops from each position to its top-level node.
///
/// Chains are walked until a known level or a top-level node, then filled in
/// top-down, so each position is computed once.
pub(crate) fn levels(index: &Index) -> Vec<usize> {
    let mut levels: Vec<Option<usize>> = vec![None; index.len()];

    for start in 0..index.len() {
        let mut chain = Vec::new();
        let mut known = None;
        let mut current = Some(start);
        while let Some(pos) = current {
            if let Some(level) = levels[pos] {
                known = Some(level);
                break;
            }
            chain.push(pos);
            current = index.parent_of(pos);
        }

        let mut next = known.map_or(0, |level| level + 1);
        for &pos in chain.iter().rev() {
            levels[pos] = Some(next);
            next += 1;
        }
    }

    levels.into_iter().map(Option::unwrap_or_default).collect()
}

fn meta_record(index: &Index, pos: usize, level: usize, flags: AddMeta) -> Value {
    let has_children = !index.children_of(pos).is_empty();
    let mut record = Map::new();
    if flags.has_children {
        record.insert("hasChildren".into(), has_children.into());
    }
    if flags.is_leaf {
        record.insert("isLeaf".into(), (!has_children).into());
    }
    if flags.is_root {
        record.insert("isRoot".into(), index.parent_ref_at(pos).is_none().into());
    }
    record.insert("level".into(), level.into());
    Value::Object(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index(value: Value) -> Index {
        let entities: Vec<Entity> = serde_json::from_value(value).unwrap();
        let mut index = Index::new(&entities, "id", "parentId");
        index.group_by_parent();
        index
    }

    #[test]
    fn test_levels_fill_children_listed_before_parents() {
        let index = index(json!([
            {"id": "c", "parentId": "b"},
            {"id": "b", "parentId": "a"},
            {"id": "a"},
            {"id": "orphan", "parentId": "gone"},
        ]));
        assert_eq!(levels(&index), vec![2, 1, 0, 0]);
    }

    #[test]
    fn test_meta_record_contains_only_requested_flags() {
        let index = index(json!([{"id": "a"}, {"id": "b", "parentId": "a"}]));
        let flags = AddMeta {
            is_leaf: true,
            ..AddMeta::default()
        };
        assert_eq!(meta_record(&index, 0, 0, flags), json!({"isLeaf": false, "level": 0}));
        assert_eq!(
            meta_record(&index, 1, 1, AddMeta::all()),
            json!({"hasChildren": false, "isLeaf": true, "isRoot": false, "level": 1})
        );
    }
}
