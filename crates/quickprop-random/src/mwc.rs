//! George Marsaglia's multiply-with-carry generator.

use crate::{RandomSource, Seed};

// Marsaglia's defaults. Any non-zero pair works; they only replace zero lanes.
const DEFAULT_LANE1: u32 = 521288629;
const DEFAULT_LANE2: u32 = 362436069;

/// A multiply-with-carry generator with two 16-bit lanes
///
/// Each lane keeps its carry in the upper 16 bits. Output words combine
/// both lanes as `lane1 + (lane2 << 16)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mwc {
    lane1: u32,
    lane2: u32,
}

impl Mwc {
    /// Create a generator from two lane values; zero lanes fall back to the defaults
    pub fn new(lane1: u32, lane2: u32) -> Self {
        Self {
            lane1: if lane1 == 0 { DEFAULT_LANE1 } else { lane1 },
            lane2: if lane2 == 0 { DEFAULT_LANE2 } else { lane2 },
        }
    }

    /// Create a generator whose lanes are the low and high halves of the seed
    pub fn from_seed(seed: Seed) -> Self {
        Self::new(seed.0 as u32, (seed.0 >> 32) as u32)
    }

    /// The current state packed back into a seed
    pub fn seed(&self) -> Seed {
        Seed((self.lane2 as u64) << 32 | self.lane1 as u64)
    }
}

impl Default for Mwc {
    fn default() -> Self {
        Self::new(DEFAULT_LANE1, DEFAULT_LANE2)
    }
}

impl RandomSource for Mwc {
    fn next_u32(&mut self) -> u32 {
        self.lane1 = 18000u32
            .wrapping_mul(self.lane1 & 0xffff)
            .wrapping_add(self.lane1 >> 16);
        self.lane2 = 36969u32
            .wrapping_mul(self.lane2 & 0xffff)
            .wrapping_add(self.lane2 >> 16);

        self.lane1.wrapping_add(self.lane2 << 16)
    }
}
