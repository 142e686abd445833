//! Rendering a tree for display with `termtree`.

use std::collections::HashMap;
use std::fmt;

use termtree::Tree as TermTree;
use tracing::instrument;

use crate::domain::tree::Tree;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> TermTree<String>;
}

impl TreeNodeConvert for Tree {
    /// One branch per top-level node, labelled with identifiers.
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> TermTree<String> {
        if self.is_empty() {
            return TermTree::new("Empty tree".to_string());
        }

        let branches: Vec<_> = self
            .top_level_positions()
            .into_iter()
            .map(|pos| build_branch(self, pos))
            .collect();
        TermTree::new(format!("{} entities", self.len())).with_leaves(branches)
    }
}

/// Post-order build with an explicit stack; chain depth is not bounded by the call stack.
fn build_branch(tree: &Tree, top: usize) -> TermTree<String> {
    let mut built: HashMap<usize, TermTree<String>> = HashMap::new();
    let mut stack = vec![(top, false)];

    while let Some((pos, expanded)) = stack.pop() {
        let children = tree.index.children_of(pos);
        if expanded {
            let leaves: Vec<_> = children.iter().filter_map(|child| built.remove(child)).collect();
            built.insert(pos, TermTree::new(label(tree, pos)).with_leaves(leaves));
        } else {
            stack.push((pos, true));
            stack.extend(children.iter().rev().map(|&child| (child, false)));
        }
    }

    built
        .remove(&top)
        .unwrap_or_else(|| TermTree::new(label(tree, top)))
}

fn label(tree: &Tree, pos: usize) -> String {
    tree.index
        .id_at(pos)
        .map_or_else(|| format!("<no {}>", tree.id_key()), ToString::to_string)
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tree_string())
    }
}
