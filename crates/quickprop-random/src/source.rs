//! The random source trait and the shapes derived from it.
//!
//! Algorithms only implement [`RandomSource::next_u32`]. Every wider or
//! differently typed draw is composed from 32-bit words so that all
//! algorithms agree on how, for example, a `u64` or an `f64` is built.

// 1 / 2^32, 1 / 2^33, 1 / 2^52 and 1 / 2^53.
const INV_32: f64 = 2.3283064365386962890625e-10;
const INV_33: f32 = 1.16415321826934814453125e-10;
const INV_52: f64 = 2.220446049250313080847263336181640625e-16;
const INV_53: f64 = 1.1102230246251565404236316680908203125e-16;

/// A stateful generator of uniformly distributed 32-bit words
///
/// Sources are owned by exactly one trial at a time; they are neither
/// cloned nor shared between concurrently running trials.
pub trait RandomSource {
    /// Generate a uniformly distributed `u32` in `[0, 2^32)`
    fn next_u32(&mut self) -> u32;

    /// Generate a uniformly distributed `u64` from two consecutive draws
    /// (`hi << 32 | lo`)
    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        hi << 32 | lo
    }

    fn next_u8(&mut self) -> u8 {
        self.next_u32() as u8
    }

    fn next_u16(&mut self) -> u16 {
        self.next_u32() as u16
    }

    fn next_i8(&mut self) -> i8 {
        self.next_u32() as i8
    }

    fn next_i16(&mut self) -> i16 {
        self.next_u32() as i16
    }

    fn next_i32(&mut self) -> i32 {
        self.next_u32() as i32
    }

    fn next_i64(&mut self) -> i64 {
        self.next_u64() as i64
    }

    /// Generate a uniformly distributed boolean from the lowest bit of a draw
    fn next_bool(&mut self) -> bool {
        self.next_u32() & 1 != 0
    }

    /// Generate a uniformly distributed `f32` in `(0, 1]`
    ///
    /// Zero is excluded so results can be fed to `ln` without checks.
    fn next_f32(&mut self) -> f32 {
        to_f32(self.next_u32())
    }

    /// Generate a uniformly distributed `f64` in `(0, 1]` from two draws
    ///
    /// The second word supplies the top 32 bits of the mantissa and the low
    /// 20 bits of the first word supply the rest.
    fn next_f64(&mut self) -> f64 {
        let hi = self.next_u32();
        let lo = self.next_u32();
        to_f64(hi, lo)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

pub(crate) fn to_f32(word: u32) -> f32 {
    (word as i32) as f32 * INV_32 as f32 + 0.5 + INV_33
}

pub(crate) fn to_f64(hi: u32, lo: u32) -> f64 {
    (lo as i32) as f64 * INV_32 + (0.5 + INV_53) + (hi & 0xfffff) as f64 * INV_52
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed list of words
    struct Words(Vec<u32>, usize);

    impl RandomSource for Words {
        fn next_u32(&mut self) -> u32 {
            let word = self.0[self.1 % self.0.len()];
            self.1 += 1;
            word
        }
    }

    #[test]
    fn test_u64_is_hi_then_lo() {
        let mut words = Words(vec![0x0123_4567, 0x89ab_cdef], 0);
        assert_eq!(words.next_u64(), 0x0123_4567_89ab_cdef);
    }

    #[test]
    fn test_narrow_shapes_truncate() {
        let mut words = Words(vec![0xffff_ff80], 0);
        assert_eq!(words.next_i8(), -128);
        assert_eq!(words.next_u8(), 0x80);
        assert_eq!(words.next_u16(), 0xff80);
        assert_eq!(words.next_i32(), -128);
    }

    #[test]
    fn test_f64_excludes_zero_and_stays_in_unit_interval() {
        for (hi, lo) in [(0, 0x8000_0000), (0, 0), (u32::MAX, 0x7fff_ffff), (0xfffff, u32::MAX)] {
            let x = to_f64(hi, lo);
            assert!(x > 0.0 && x <= 1.0, "{} out of range for ({:#x}, {:#x})", x, hi, lo);
        }
    }

    #[test]
    fn test_f32_excludes_zero_and_stays_in_unit_interval() {
        for word in [0x8000_0000, 0, 0x7fff_ffff, u32::MAX] {
            let x = to_f32(word);
            assert!(x > 0.0 && x <= 1.0, "{} out of range for {:#x}", x, word);
        }
    }

    #[test]
    fn test_bool_uses_lowest_bit() {
        let mut words = Words(vec![2, 3], 0);
        assert!(!words.next_bool());
        assert!(words.next_bool());
    }

    #[test]
    fn test_boxed_source_delegates() {
        let mut boxed: Box<dyn RandomSource> = Box::new(Words(vec![9], 0));
        assert_eq!(boxed.next_u32(), 9);
        assert_eq!(boxed.next_u64(), 9 << 32 | 9);
    }
}
