//! Tree semantics over flat collections of parent-linked records.
//!
//! Entities stay in their original order; the [`Tree`] indexes them by
//! identifier and parent reference, proves the parent links acyclic at
//! construction and answers ancestor/descendant queries and structural
//! filters on demand.

pub mod config;
pub mod domain;
pub mod util;

pub use domain::{
    AddMeta, Entity, NodeId, NodeRef, RecursionGuard, Tree, TreeError, TreeNodeConvert,
    TreeOptions, TreeResult,
};
