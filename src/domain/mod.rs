//! Domain layer: the tree engine
//!
//! Pure computation over in-memory entities (no I/O, no config loading).

pub mod display;
mod enrich;
pub mod entities;
pub mod error;
mod filter;
pub mod guard;
pub mod index;
pub mod options;
pub mod tree;

pub use display::TreeNodeConvert;
pub use entities::{Entity, NodeId, NodeRef};
pub use error::{TreeError, TreeResult};
pub use guard::RecursionGuard;
pub use index::Index;
pub use options::{AddMeta, TreeOptions};
pub use tree::Tree;
