use super::acceptance::acceptance;
use super::proposal::Proposal;
use crate::Error;
use crate::Probability;
use crate::model::offspring::Offspring;
use crate::sampling::observation::Observation;
use crate::tree::tree::Tree;
use rand::Rng;

/// Metropolis-Hastings sampler over the latent full trees consistent
/// with one observation. holds the fixed ingredients of the target
/// density; every run threads its own rng and owns its trajectory.
#[derive(Debug)]
pub struct Chain<'a> {
    observation: &'a Observation,
    offspring: &'a Offspring,
    depth: usize,
    retention: Probability,
}

impl<'a> From<(&'a Observation, &'a Offspring, usize, Probability)> for Chain<'a> {
    fn from(
        (observation, offspring, depth, retention): (
            &'a Observation,
            &'a Offspring,
            usize,
            Probability,
        ),
    ) -> Self {
        Self {
            observation,
            offspring,
            depth,
            retention,
        }
    }
}

impl Chain<'_> {
    /// walk the chain for a fixed number of steps. the trajectory
    /// keeps every state including the initial one, so it always has
    /// steps + 1 trees and a rejected step repeats its predecessor.
    /// each step consumes rng draws in proposal order, then one
    /// uniform accept draw.
    pub fn run(
        &self,
        initial: Tree,
        steps: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<Tree>, Error> {
        log::info!(
            "running {} steps from a tree of {} nodes",
            steps,
            initial.len()
        );
        let mut trajectory = Vec::with_capacity(steps + 1);
        let mut current = initial;
        trajectory.push(current.clone());
        for step in 0..steps {
            let proposal = Proposal::propose(&current, self.offspring, self.depth, rng)?;
            let alpha = acceptance(
                self.observation,
                &current,
                &proposal,
                self.retention,
                self.offspring,
            );
            let accepted = rng.random::<f64>() < alpha;
            log::trace!("step {} acceptance {:.3} accepted {}", step, alpha, accepted);
            if accepted {
                current = proposal.accept();
            }
            trajectory.push(current.clone());
        }
        log::info!(
            "finished with {} trees, final size {} nodes",
            trajectory.len(),
            current.len()
        );
        Ok(trajectory)
    }
}
