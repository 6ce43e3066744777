//! Reference bit-string problems for driving sweeps end to end.

use rand::Rng;
use rand::rngs::StdRng;

/// A maximization problem over fixed-length bit strings.
pub trait DiscreteProblem {
    fn name(&self) -> &str;

    fn length(&self) -> usize;

    fn fitness(&self, state: &[u8]) -> f64;

    fn random_state(&self, rng: &mut StdRng) -> Vec<u8> {
        (0..self.length()).map(|_| rng.gen_range(0..=1)).collect()
    }
}

/// Number of ones in the string.
#[derive(Debug, Clone)]
pub struct OneMax {
    length: usize,
}

impl OneMax {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl DiscreteProblem for OneMax {
    fn name(&self) -> &str {
        "onemax"
    }

    fn length(&self) -> usize {
        self.length
    }

    fn fitness(&self, state: &[u8]) -> f64 {
        state.iter().filter(|b| **b == 1).count() as f64
    }
}

/// Four Peaks: rewards long runs of leading ones or trailing zeros, with a
/// bonus of `length` when both runs exceed `ceil(t_pct * length)`.
#[derive(Debug, Clone)]
pub struct FourPeaks {
    length: usize,
    threshold: usize,
}

impl FourPeaks {
    pub fn new(length: usize, t_pct: f64) -> Self {
        let threshold = (t_pct.clamp(0.0, 1.0) * length as f64).ceil() as usize;
        Self { length, threshold }
    }
}

impl DiscreteProblem for FourPeaks {
    fn name(&self) -> &str {
        "fourpeaks"
    }

    fn length(&self) -> usize {
        self.length
    }

    fn fitness(&self, state: &[u8]) -> f64 {
        let head = state.iter().take_while(|b| **b == 1).count();
        let tail = state.iter().rev().take_while(|b| **b == 0).count();
        let bonus = if head > self.threshold && tail > self.threshold {
            self.length
        } else {
            0
        };
        (head.max(tail) + bonus) as f64
    }
}
