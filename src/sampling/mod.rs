pub mod embedding;
pub use embedding::*;

pub mod observation;
pub use observation::*;
