pub mod estimation;
pub mod mcmc;
pub mod model;
pub mod sampling;
pub mod tree;

/// densities, retention rates, likelihoods, acceptance ratios.
pub type Probability = f64;
/// embedding counts. whole numbers carried in floating point, since
/// counts grow factorially and overflow machine integers.
pub type Count = f64;

/// Random instance generation for testing and Monte Carlo sampling.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

/// Errors surfaced by construction and by the chain. Everything else
/// follows IEEE arithmetic: impossible states divide out to inf or NaN
/// and get resolved by the acceptance rule, not by the type system.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid offspring distribution: {0}")]
    InvalidDistribution(String),

    #[error("retention probability {0} outside the unit interval")]
    InvalidProbability(Probability),

    #[error("no internal node available to edit")]
    NoEligibleMove,
}
