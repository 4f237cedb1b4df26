pub mod acceptance;
pub use acceptance::*;

pub mod chain;
pub use chain::*;

pub mod proposal;
pub use proposal::*;
