//! Strict versus lenient lookups

use rstest::{fixture, rstest};
use serde_json::json;

use entity_tree::util::testing;
use entity_tree::{Entity, Tree, TreeError, TreeOptions, TreeResult};

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn orphan() -> serde_json::Value {
    json!([{ "id": "orphan", "parentId": "gone" }])
}

#[fixture]
fn lenient() -> Tree {
    Tree::from_json(orphan(), TreeOptions::default().lenient()).unwrap()
}

#[fixture]
fn strict() -> Tree {
    Tree::from_json(orphan(), TreeOptions::default()).unwrap()
}

type Query = fn(&Tree, &str) -> TreeResult<usize>;

fn children(t: &Tree, id: &str) -> TreeResult<usize> {
    t.children(id).map(|v| v.len())
}

fn ancestors(t: &Tree, id: &str) -> TreeResult<usize> {
    t.ancestors(id).map(|v| v.len())
}

fn descendants(t: &Tree, id: &str) -> TreeResult<usize> {
    t.descendants(id).map(|v| v.len())
}

fn self_and_ancestors(t: &Tree, id: &str) -> TreeResult<usize> {
    t.self_and_ancestors(id).map(|v| v.len())
}

fn self_and_descendants(t: &Tree, id: &str) -> TreeResult<usize> {
    t.self_and_descendants(id).map(|v| v.len())
}

fn leaf_nodes_under(t: &Tree, id: &str) -> TreeResult<usize> {
    t.leaf_nodes_under(id).map(|v| v.len())
}

fn sequence_queries() -> Vec<(&'static str, Query)> {
    vec![
        ("children", children as Query),
        ("ancestors", ancestors as Query),
        ("descendants", descendants as Query),
        ("self_and_ancestors", self_and_ancestors as Query),
        ("self_and_descendants", self_and_descendants as Query),
        ("leaf_nodes_under", leaf_nodes_under as Query),
    ]
}

#[rstest]
fn given_lenient_tree_when_querying_unknown_id_then_returns_empty(lenient: Tree) {
    assert!(!lenient.validate_nodes());
    for (name, query) in sequence_queries() {
        assert_eq!(query(&lenient, "missing"), Ok(0), "{}", name);
    }
    assert_eq!(lenient.parent("missing"), Ok(None));
    assert_eq!(lenient.ancestor("missing"), Ok(None));
    assert_eq!(lenient.get_node("missing"), Ok(None));
}

#[rstest]
fn given_strict_tree_when_querying_unknown_id_then_raises_lookup(strict: Tree) {
    assert!(strict.validate_nodes());
    for (name, query) in sequence_queries() {
        assert!(
            matches!(query(&strict, "missing"), Err(TreeError::NodeLookup(_))),
            "{}",
            name
        );
    }
    assert!(matches!(strict.parent("missing"), Err(TreeError::NodeLookup(_))));
    assert_eq!(
        strict.get_node("missing").unwrap_err().to_string(),
        "Tree: node missing does not exist in the current tree"
    );
}

#[rstest]
fn given_lenient_tree_when_getting_dangling_parent_then_absent(lenient: Tree) {
    assert_eq!(lenient.parent("orphan"), Ok(None));
    assert_eq!(lenient.self_and_ancestors("orphan").unwrap().len(), 1);
}

#[rstest]
fn given_entity_without_id_when_querying_then_no_node_specified(strict: Tree, lenient: Tree) {
    let anonymous = Entity::new().with("name", "nobody");

    let err = strict.children(&anonymous).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Tree: no node specified or node is null or undefined"
    );
    assert!(lenient.children(&anonymous).unwrap().is_empty());
}

#[rstest]
fn given_lenient_tree_when_checking_predicates_on_unknown_then_neutral(lenient: Tree) {
    assert_eq!(lenient.is_root("missing"), Ok(false));
    assert_eq!(lenient.has_children("missing"), Ok(false));
    assert_eq!(lenient.is_leaf("missing"), Ok(true));
}
