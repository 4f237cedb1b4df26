pub mod likelihood;

pub mod offspring;
pub use offspring::*;
