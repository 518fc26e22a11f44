//! MT19937, the 32-bit Mersenne Twister (period 2^19937 - 1).
//!
//! Follows the reference `mt19937ar.c` by Makoto Matsumoto and Takuji
//! Nishimura: `init_genrand` seeding, `init_by_array` for longer keys, the
//! twist recurrence and the standard output tempering.

use crate::{RandomSource, Seed};

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// The 32-bit Mersenne Twister
#[derive(Clone)]
pub struct MersenneTwister {
    state: Box<[u32; N]>,
    index: usize,
}

impl MersenneTwister {
    /// Seed from a single word (`init_genrand`)
    pub fn new(seed: u32) -> Self {
        let mut state = Box::new([0u32; N]);
        state[0] = seed;
        for i in 1..N {
            let prev = state[i - 1];
            state[i] = 1812433253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        Self { state, index: N }
    }

    /// Seed from a key of arbitrary length (`init_by_array`)
    pub fn from_key(key: &[u32]) -> Self {
        let mut mt = Self::new(19650218);
        let state = &mut mt.state;
        let len = key.len().max(1);

        let mut i = 1;
        let mut j = 0;
        for _ in 0..N.max(len) {
            let prev = state[i - 1];
            let k = key.get(j).copied().unwrap_or(0);
            state[i] = (state[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1664525))
                .wrapping_add(k)
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                state[0] = state[N - 1];
                i = 1;
            }
            if j >= len {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = state[i - 1];
            state[i] = (state[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1566083941))
                .wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                state[0] = state[N - 1];
                i = 1;
            }
        }
        // MSB is 1, assuring a non-zero initial array
        state[0] = 0x8000_0000;
        mt
    }

    /// Seed from a 64-bit seed
    ///
    /// Seeds that fit in 32 bits use `init_genrand` so that they match the
    /// reference output; wider seeds use both halves as an `init_by_array` key.
    pub fn from_seed(seed: Seed) -> Self {
        match u32::try_from(seed.0) {
            Ok(word) => Self::new(word),
            Err(_) => Self::from_key(&[seed.0 as u32, (seed.0 >> 32) as u32]),
        }
    }

    fn twist(&mut self) {
        let mt = &mut self.state;
        let mag01 = |y: u32| if y & 1 == 0 { 0 } else { MATRIX_A };

        for kk in 0..N - M {
            let y = (mt[kk] & UPPER_MASK) | (mt[kk + 1] & LOWER_MASK);
            mt[kk] = mt[kk + M] ^ (y >> 1) ^ mag01(y);
        }
        for kk in N - M..N - 1 {
            let y = (mt[kk] & UPPER_MASK) | (mt[kk + 1] & LOWER_MASK);
            mt[kk] = mt[kk + M - N] ^ (y >> 1) ^ mag01(y);
        }
        let y = (mt[N - 1] & UPPER_MASK) | (mt[0] & LOWER_MASK);
        mt[N - 1] = mt[M - 1] ^ (y >> 1) ^ mag01(y);

        self.index = 0;
    }
}

impl std::fmt::Debug for MersenneTwister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MersenneTwister")
            .field("index", &self.index)
            .finish()
    }
}

impl RandomSource for MersenneTwister {
    fn next_u32(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }

        let mut y = self.state[self.index];
        self.index += 1;

        // Tempering
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^= y >> 18;
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_matches_reference_default_seed() {
        // std::mt19937 with its default seed 5489
        let mut mt = MersenneTwister::new(5489);
        let words: Vec<u32> = (0..3).map(|_| mt.next_u32()).collect();
        assert_eq!(words, vec![3499211612, 581869302, 3890346734]);
    }

    #[test]
    fn test_matches_reference_key_initialisation() {
        // First outputs listed in mt19937ar.out
        let mut mt = MersenneTwister::from_key(&[0x123, 0x234, 0x345, 0x456]);
        let words: Vec<u32> = (0..3).map(|_| mt.next_u32()).collect();
        assert_eq!(words, vec![1067595299, 955945823, 477289528]);
    }

    #[test]
    fn test_tenthousandth_output_of_default_seed() {
        // The C++ standard requires this value for default-constructed mt19937
        let mut mt = MersenneTwister::new(5489);
        let last = (0..10000).map(|_| mt.next_u32()).last();
        assert_eq!(last, Some(4123659995));
    }

    #[test]
    fn test_wide_seeds_are_deterministic() {
        let seed = Seed(0xdead_beef_0000_0001);
        let mut a = MersenneTwister::from_seed(seed);
        let mut b = MersenneTwister::from_seed(seed);
        for _ in 0..2000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_wide_and_narrow_seeds_differ() {
        let mut narrow = MersenneTwister::from_seed(Seed(1));
        let mut wide = MersenneTwister::from_seed(Seed(1 << 32 | 1));
        let xs: Vec<u32> = (0..8).map(|_| narrow.next_u32()).collect();
        let ys: Vec<u32> = (0..8).map(|_| wide.next_u32()).collect();
        assert_ne!(xs, ys);
    }
}
