pub mod node;
pub use node::*;

pub mod tree;
pub use tree::*;
