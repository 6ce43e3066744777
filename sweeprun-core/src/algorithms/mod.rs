//! Reference algorithms implementing the [`Algorithm`](crate::algorithm::Algorithm)
//! contract over [`DiscreteProblem`](crate::problems::DiscreteProblem)s.

pub mod annealing;
pub mod hill_climb;
pub mod schedule;

pub use annealing::SimulatedAnnealing;
pub use hill_climb::RandomHillClimb;
pub use schedule::{DecayKind, DecaySchedule};

use rand::Rng;
use rand::rngs::StdRng;

/// Copy of `state` with one uniformly chosen bit flipped.
pub(crate) fn flip_one(state: &[u8], rng: &mut StdRng) -> Vec<u8> {
    let mut neighbor = state.to_vec();
    if !neighbor.is_empty() {
        let i = rng.gen_range(0..neighbor.len());
        neighbor[i] ^= 1;
    }
    neighbor
}
