pub mod constants;
pub mod entry;
pub mod error;
pub mod node;
pub mod ops;

pub use entry::Record;
pub use error::NodeError;
pub use node::{Node, NodeType};
pub use ops::{leaf_insert, leaf_update};
