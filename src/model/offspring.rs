use crate::Error;
use crate::Probability;
use ndarray::Array1;
use rand::Rng;

/// A distribution over child counts 1..=W.
///
/// entry k-1 holds the probability of bearing exactly k children, so
/// there is no entry for zero: a lineage never dies out mid-growth,
/// it only stops at the depth horizon. width W is the support size.
/// construction validates and never normalizes.
#[derive(Debug, Clone, PartialEq)]
pub struct Offspring(Vec<Probability>);

impl TryFrom<Vec<Probability>> for Offspring {
    type Error = Error;
    fn try_from(weights: Vec<Probability>) -> Result<Self, Self::Error> {
        const TOLERANCE: f64 = 1e-6;
        if weights.is_empty() {
            return Err(Error::InvalidDistribution("empty support".into()));
        }
        if let Some(weight) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(Error::InvalidDistribution(format!(
                "weight {} is negative or not finite",
                weight
            )));
        }
        let mass = weights.iter().sum::<Probability>();
        if (mass - 1.0).abs() > TOLERANCE {
            return Err(Error::InvalidDistribution(format!(
                "mass {} is not unit",
                mass
            )));
        }
        Ok(Self(weights))
    }
}

impl Offspring {
    /// support size W. child counts range over 1..=W.
    pub fn width(&self) -> usize {
        self.0.len()
    }
    pub fn weights(&self) -> &[Probability] {
        &self.0
    }
    /// probability of bearing exactly this many children. degree zero
    /// weighs 1: leaves are cut off by the depth horizon, not drawn
    /// from the distribution, so they contribute no factor.
    pub fn density(&self, children: usize) -> Probability {
        match children {
            0 => 1.0,
            k if k <= self.width() => self.0[k - 1],
            _ => 0.0,
        }
    }
    /// draw a child count in 1..=W proportionally to the weights.
    pub fn draw(&self, rng: &mut impl Rng) -> usize {
        use rand::distr::Distribution;
        use rand::distr::weighted::WeightedIndex;
        WeightedIndex::new(&self.0)
            .expect("validated weights")
            .sample(rng)
            + 1
    }
    /// map an unconstrained vector of length W-1 onto the simplex:
    /// append the fixed reference exponent 1, shift by the max, and
    /// softmax. the shift keeps exp() in range without changing the
    /// image.
    pub fn reparametrize(alpha: &Array1<f64>) -> Self {
        let exponents = alpha
            .iter()
            .copied()
            .chain(std::iter::once(1.0))
            .collect::<Vec<_>>();
        let peak = exponents.iter().copied().fold(f64::MIN, f64::max);
        let weights = exponents
            .iter()
            .map(|x| (x - peak).exp())
            .collect::<Vec<_>>();
        let mass = weights.iter().sum::<f64>();
        Self(weights.iter().map(|w| w / mass).collect())
    }
}

impl crate::Arbitrary for Offspring {
    fn random() -> Self {
        let ref mut rng = rand::rng();
        let weights = (0..3).map(|_| rng.random::<f64>()).collect::<Vec<_>>();
        let mass = weights.iter().sum::<f64>();
        Self(weights.iter().map(|w| w / mass).collect())
    }
}

impl std::fmt::Display for Offspring {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[")?;
        for (k, weight) in self.0.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.3}", weight)?;
        }
        write!(f, "]")
    }
}
