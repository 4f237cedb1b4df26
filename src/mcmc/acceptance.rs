use super::proposal::Proposal;
use crate::Probability;
use crate::model::offspring::Offspring;
use crate::sampling::observation::Observation;
use crate::tree::tree::Tree;

/// Metropolis-Hastings acceptance probability of one proposed edit:
/// the posterior-times-reverse-density of the candidate over the
/// posterior-times-forward-density of the current tree, capped at 1.
/// IEEE semantics throughout: a current state of zero posterior mass
/// divides out to inf or NaN, and min() maps either to 1, so the
/// chain always accepts its way off impossible states.
pub fn acceptance(
    observation: &Observation,
    current: &Tree,
    proposal: &Proposal,
    retention: Probability,
    offspring: &Offspring,
) -> Probability {
    let above = observation.probability(proposal.candidate(), retention)
        * offspring.likelihood(proposal.candidate())
        * proposal.backward();
    let below = observation.probability(current, retention)
        * offspring.likelihood(current)
        * proposal.forward();
    (above / below).min(1.0)
}
