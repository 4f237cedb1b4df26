pub mod estimator;
pub use estimator::*;

pub mod minimizer;
pub use minimizer::*;

pub mod objective;
pub use objective::*;
