//! Random index source for shuffle.
//!
//! Shuffle draws go through [`IndexPicker`] so tests can pin them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies indices for shuffle draws.
pub trait IndexPicker: Send {
    /// Return a value in `0..upper`. `upper` is always at least 1.
    fn pick_below(&mut self, upper: usize) -> usize;
}

/// `StdRng`-backed picker.
#[derive(Debug, Clone)]
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl IndexPicker for RandomPicker {
    fn pick_below(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

/// Draw an index in `0..len` other than `exclude`.
///
/// A single-entry queue can only repeat itself, so `len == 1` yields 0.
pub(crate) fn pick_excluding(
    picker: &mut dyn IndexPicker,
    len: usize,
    exclude: Option<usize>,
) -> usize {
    match exclude {
        _ if len <= 1 => 0,
        Some(cur) if cur < len => {
            let r = picker.pick_below(len - 1) % (len - 1);
            if r >= cur { r + 1 } else { r }
        }
        _ => picker.pick_below(len) % len,
    }
}
