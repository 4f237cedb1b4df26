use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use progeny::Probability;
use progeny::estimation::estimator::Estimator;
use progeny::estimation::objective::Objective;
use progeny::mcmc::chain::Chain;
use progeny::model::offspring::Offspring;
use progeny::sampling::observation::Observation;
use progeny::tree::tree::Tree;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::PathBuf;

/// rate of the truncated poisson truth family.
const POISSON_RATE: f64 = 3.0;
/// tail exponent of the zipf truth family.
const ZIPF_EXPONENT: f64 = 1.132;
/// per-trial success of the binomial prior family.
const BINOMIAL_SUCCESS: f64 = 0.3;

/// Hide a branching-process tree behind per-node retention, walk the
/// chain of full trees consistent with what survived, and re-estimate
/// the offspring distribution from the trajectory.
#[derive(Parser, Debug)]
struct Args {
    /// family of the distribution that grows the hidden tree
    #[arg(long, value_enum, default_value = "uniform")]
    truth: Truth,
    /// family of the distribution driving the chain and the refinement
    #[arg(long, value_enum, default_value = "uniform")]
    prior: Prior,
    /// support width W: child counts range over 1..=W
    #[arg(long, default_value_t = 3)]
    width: usize,
    /// level budget of the hidden tree
    #[arg(long, default_value_t = 3)]
    depth: usize,
    /// per-node retention probability of the observation
    #[arg(long, default_value_t = 0.5)]
    retention: Probability,
    /// metropolis-hastings steps
    #[arg(long, default_value_t = 20000)]
    steps: usize,
    /// rng seed for the whole experiment
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// where to write the json record, if anywhere
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Truth {
    Uniform,
    Poisson,
    Zipf,
}

impl Truth {
    fn offspring(&self, width: usize) -> Result<Offspring> {
        let weights = match self {
            Truth::Uniform => vec![1.0 / width as f64; width],
            Truth::Poisson => normalize(
                (1..=width)
                    .scan(1.0, |term, k| {
                        *term *= POISSON_RATE / k as f64;
                        Some(*term)
                    })
                    .collect(),
            ),
            Truth::Zipf => normalize(
                (1..=width)
                    .map(|k| (k as f64).powf(-ZIPF_EXPONENT))
                    .collect(),
            ),
        };
        Ok(Offspring::try_from(weights)?)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Prior {
    Uniform,
    Binomial,
}

impl Prior {
    fn offspring(&self, width: usize) -> Result<Offspring> {
        let weights = match self {
            Prior::Uniform => vec![1.0 / width as f64; width],
            Prior::Binomial => {
                let n = width - 1;
                let q = BINOMIAL_SUCCESS;
                (0..width)
                    .map(|j| choose(n, j) * q.powi(j as i32) * (1.0 - q).powi((n - j) as i32))
                    .collect()
            }
        };
        Ok(Offspring::try_from(weights)?)
    }
}

fn normalize(weights: Vec<f64>) -> Vec<f64> {
    let mass = weights.iter().sum::<f64>();
    weights.iter().map(|w| w / mass).collect()
}

fn choose(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |c, i| c * (n - i) as f64 / (i + 1) as f64)
}

/// kullback-leibler divergence from truth to estimate, in bits, with
/// zero-mass truth terms skipped. the estimate comes out of a softmax
/// and carries mass everywhere, so this direction is always finite.
fn divergence(truth: &Offspring, estimate: &Offspring) -> f64 {
    (1..=truth.width())
        .map(|k| (truth.density(k), estimate.density(k)))
        .filter(|(p, _)| *p > 0.0)
        .map(|(p, q)| p * (p / q).log2())
        .sum()
}

#[derive(serde::Serialize)]
struct Record {
    truth: Vec<Probability>,
    prior: Vec<Probability>,
    estimate: Vec<Probability>,
    divergence: f64,
    score: f64,
    iterations: usize,
    converged: bool,
    hidden: usize,
    observed: usize,
    retained: usize,
    retention: Probability,
    steps: usize,
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let truth = args.truth.offspring(args.width)?;
    let prior = args.prior.offspring(args.width)?;
    let ref mut rng = SmallRng::seed_from_u64(args.seed);
    let hidden = Tree::generate(&truth, args.depth, rng);
    let observation = Observation::observe(&hidden, args.retention, rng)?;
    log::info!(
        "hidden tree of {} nodes, observed {} ({} retained)",
        hidden.len(),
        observation.tree().len(),
        observation.retained()
    );
    let chain = Chain::from((&observation, &prior, args.depth, args.retention));
    let trajectory = chain.run(hidden.clone(), args.steps, rng)?;
    let estimator = Estimator::from(Objective::from((&trajectory[..], &prior)));
    let estimate = estimator.estimate(rng);
    let divergence = divergence(&truth, estimate.offspring());
    println!("truth      {}", truth);
    println!("prior      {}", prior);
    println!("estimate   {}", estimate.offspring());
    println!("kl         {:.6} bits", divergence);
    if let Some(ref path) = args.output {
        let record = Record {
            truth: truth.weights().to_vec(),
            prior: prior.weights().to_vec(),
            estimate: estimate.offspring().weights().to_vec(),
            divergence,
            score: estimate.score(),
            iterations: estimate.iterations(),
            converged: estimate.converged(),
            hidden: hidden.len(),
            observed: observation.tree().len(),
            retained: observation.retained(),
            retention: args.retention,
            steps: args.steps,
            seed: args.seed,
        };
        std::fs::write(path, serde_json::to_string_pretty(&record)?)?;
        log::info!("wrote record to {}", path.display());
    }
    Ok(())
}
