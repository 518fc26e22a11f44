//! Unbiased inclusive range sampling.
//!
//! Integer ranges never reduce a raw draw with `%`. The span `n` is split
//! into `u32::MAX / n` (or `u64::MAX / n`) equal buckets and any draw that
//! lands past the last whole bucket is rejected and redrawn. Types narrower
//! than 32 bits go through the 32-bit path; 64-bit types use 64-bit draws.
//!
//! The size-scaled variant clamps the range to `[-2^n, 2^n]` where `n`
//! grows linearly with size, so early trials stay close to zero.

use crate::{RandomSource, Size};

/// Minimum bit count used when scaling integer windows by size
const MIN_BITS: u32 = 40;

/// Types that can be sampled uniformly from an inclusive range
pub trait Uniform: Copy + PartialOrd {
    /// Sample uniformly from `[low, high]`; the bounds may be given in either order
    fn uniform<R: RandomSource + ?Sized>(random: &mut R, low: Self, high: Self) -> Self;

    /// The sub-range of `[low, high]` that `range_sized` samples from at `size`
    fn sized_window(size: Size, low: Self, high: Self) -> (Self, Self);
}

/// Range sampling for every random source
pub trait RandomRange: RandomSource {
    /// Generate a uniformly distributed value in `[low, high]`
    fn range<T: Uniform>(&mut self, low: T, high: T) -> T {
        T::uniform(self, low, high)
    }

    /// Generate a uniformly distributed value in the size-scaled window of `[low, high]`
    fn range_sized<T: Uniform>(&mut self, size: Size, low: T, high: T) -> T {
        let (low, high) = T::sized_window(size, low, high);
        T::uniform(self, low, high)
    }
}

impl<R: RandomSource + ?Sized> RandomRange for R {}

/// The window `range_sized` draws from for `size`
///
/// Windows are nested: for a fixed `[low, high]` the window at `size + 1`
/// always contains the window at `size`.
pub fn sized_window<T: Uniform>(size: Size, low: T, high: T) -> (T, T) {
    T::sized_window(size, low, high)
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Number of bits needed to store a magnitude (at least 1)
fn bits(magnitude: u64) -> u32 {
    (u64::BITS - magnitude.leading_zeros()).max(1)
}

fn exponent(size: Size, p: u32, max_exponent: u32) -> u32 {
    (p.max(MIN_BITS) * size.value() / 100).min(max_exponent)
}

fn signed_window(size: Size, low: i64, high: i64, max_exponent: u32) -> (i64, i64) {
    let (low, high) = ordered(low, high);
    let p = bits(low.unsigned_abs()).max(bits(high.unsigned_abs()));
    let k = 1i64 << exponent(size, p, max_exponent);

    let lo = low.max(-k);
    let hi = high.min(k);
    if lo <= hi {
        (lo, hi)
    } else if low > 0 {
        // The whole range lies beyond the window; collapse onto the bound nearest zero
        (low, low)
    } else {
        (high, high)
    }
}

fn unsigned_window(size: Size, low: u64, high: u64, max_exponent: u32) -> (u64, u64) {
    let (low, high) = ordered(low, high);
    let p = bits(low).max(bits(high));
    let k = 1u64 << exponent(size, p, max_exponent);

    let hi = high.min(k);
    if low <= hi {
        (low, hi)
    } else {
        (low, low)
    }
}

fn float_window(size: Size, low: f64, high: f64) -> (f64, f64) {
    let (low, high) = ordered(low, high);
    let m = low.abs().max(high.abs()) * size.value() as f64 / 100.0;

    let lo = low.max(-m);
    let hi = high.min(m);
    if lo <= hi {
        (lo, hi)
    } else if low > 0.0 {
        (low, low)
    } else {
        (high, high)
    }
}

// ============================================================================
// Integer Implementations
// ============================================================================

macro_rules! uniform_int {
    ($t:ty, $u:ty, $draw:ident, $window:ident, $wide:ty, $max_exponent:expr) => {
        impl Uniform for $t {
            fn uniform<R: RandomSource + ?Sized>(random: &mut R, low: Self, high: Self) -> Self {
                let (low, high) = ordered(low, high);
                let n = (high as $u).wrapping_sub(low as $u).wrapping_add(1);

                if n == 0 {
                    // The range covers every value of the type
                    return random.$draw() as $t;
                }

                let buckets = <$u>::MAX / n;
                let limit = buckets * n;

                loop {
                    let x = random.$draw();
                    if x < limit {
                        return low.wrapping_add((x / buckets) as $t);
                    }
                }
            }

            fn sized_window(size: Size, low: Self, high: Self) -> (Self, Self) {
                let (lo, hi) = $window(size, low as $wide, high as $wide, $max_exponent);
                (lo as $t, hi as $t)
            }
        }
    };
}

uniform_int!(i32, u32, next_u32, signed_window, i64, 30);
uniform_int!(u32, u32, next_u32, unsigned_window, u64, 30);
uniform_int!(i64, u64, next_u64, signed_window, i64, 62);
uniform_int!(u64, u64, next_u64, unsigned_window, u64, 62);

macro_rules! uniform_narrow {
    ($t:ty, $via:ty) => {
        impl Uniform for $t {
            fn uniform<R: RandomSource + ?Sized>(random: &mut R, low: Self, high: Self) -> Self {
                <$via>::uniform(random, low as $via, high as $via) as $t
            }

            fn sized_window(size: Size, low: Self, high: Self) -> (Self, Self) {
                let (lo, hi) = <$via>::sized_window(size, low as $via, high as $via);
                (lo as $t, hi as $t)
            }
        }
    };
}

uniform_narrow!(i8, i32);
uniform_narrow!(i16, i32);
uniform_narrow!(u8, u32);
uniform_narrow!(u16, u32);

// ============================================================================
// Other Implementations
// ============================================================================

impl Uniform for bool {
    fn uniform<R: RandomSource + ?Sized>(random: &mut R, low: Self, high: Self) -> Self {
        if low == high {
            low
        } else {
            random.next_bool()
        }
    }

    fn sized_window(_size: Size, low: Self, high: Self) -> (Self, Self) {
        ordered(low, high)
    }
}

impl Uniform for f64 {
    fn uniform<R: RandomSource + ?Sized>(random: &mut R, low: Self, high: Self) -> Self {
        let (low, high) = ordered(low, high);
        let u = random.next_f64();
        // Convex combination so that [f64::MIN, f64::MAX] does not overflow
        (low * (1.0 - u) + high * u).max(low).min(high)
    }

    fn sized_window(size: Size, low: Self, high: Self) -> (Self, Self) {
        float_window(size, low, high)
    }
}

impl Uniform for f32 {
    fn uniform<R: RandomSource + ?Sized>(random: &mut R, low: Self, high: Self) -> Self {
        let (low, high) = ordered(low, high);
        let u = random.next_f32();
        (low * (1.0 - u) + high * u).max(low).min(high)
    }

    fn sized_window(size: Size, low: Self, high: Self) -> (Self, Self) {
        let (lo, hi) = float_window(size, low as f64, high as f64);
        (lo as f32, hi as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Algorithm, Mwc, RandomFactory, Seed};
    use pretty_assertions::assert_eq;

    /// Replays a fixed list of words
    struct Words(Vec<u32>, usize);

    impl RandomSource for Words {
        fn next_u32(&mut self) -> u32 {
            let word = self.0[self.1 % self.0.len()];
            self.1 += 1;
            word
        }
    }

    fn check_bounds<T: Uniform + std::fmt::Debug>(random: &mut Mwc, low: T, high: T) {
        let mut first = None;
        let mut varied = false;
        for _ in 0..500 {
            let v = random.range(low, high);
            assert!(low <= v && v <= high, "{:?} outside [{:?}, {:?}]", v, low, high);
            match first {
                None => first = Some(v),
                Some(f) if f != v => varied = true,
                _ => {}
            }
        }
        assert!(varied || low == high, "all draws identical in [{:?}, {:?}]", low, high);
    }

    #[test]
    fn test_ranges_stay_in_bounds() {
        let mut random = Mwc::from_seed(Seed(12345));
        check_bounds(&mut random, -5i8, 5);
        check_bounds(&mut random, i8::MIN, i8::MAX);
        check_bounds(&mut random, 0u8, 1);
        check_bounds(&mut random, -300i16, 3000);
        check_bounds(&mut random, 10u16, 65535);
        check_bounds(&mut random, i32::MIN, -1);
        check_bounds(&mut random, 0u32, 7);
        check_bounds(&mut random, i64::MIN, i64::MAX - 1);
        check_bounds(&mut random, u64::MAX - 3, u64::MAX);
        check_bounds(&mut random, -1.5f64, 2.5);
        check_bounds(&mut random, 0.0f32, 1e-3);
        check_bounds(&mut random, 42i32, 42);
    }

    #[test]
    fn test_swapped_bounds() {
        let mut random = Mwc::from_seed(Seed(3));
        for _ in 0..200 {
            let v: i32 = random.range(10, -10);
            assert!((-10..=10).contains(&v));
        }
    }

    #[test]
    fn test_full_range_returns_raw_draw() {
        let mut words = Words(vec![0xffff_fffe], 0);
        assert_eq!(words.range(i32::MIN, i32::MAX), -2);
        assert_eq!(words.range(u32::MIN, u32::MAX), 0xffff_fffe);
        assert_eq!(words.range(u64::MIN, u64::MAX), 0xffff_fffe_ffff_fffe);
    }

    #[test]
    fn test_draws_past_last_bucket_are_rejected() {
        // n = 3, buckets = 1431655765, limit = 4294967295: u32::MAX is rejected
        let mut words = Words(vec![u32::MAX, u32::MAX, 1431655765 * 2], 0);
        assert_eq!(words.range(0u32, 2), 2);
        assert_eq!(words.1, 3);
    }

    #[test]
    fn test_histogram_is_uniform() {
        const BUCKETS: usize = 16;
        const DRAWS: usize = 32_000;

        for algorithm in Algorithm::ALL {
            let mut random = algorithm.from_seed(Seed(2024));
            let mut histogram = [0usize; BUCKETS];
            for _ in 0..DRAWS {
                histogram[random.range(0u32, BUCKETS as u32 - 1) as usize] += 1;
            }

            let expected = (DRAWS / BUCKETS) as f64;
            let chi_squared: f64 = histogram
                .iter()
                .map(|&observed| (observed as f64 - expected).powi(2) / expected)
                .sum();

            // 15 degrees of freedom, p = 0.001
            assert!(chi_squared < 37.7, "{}: chi-squared {} for {:?}", algorithm, chi_squared, histogram);
        }
    }

    #[test]
    fn test_no_modulo_bias_on_large_spans() {
        // With `x % n` the first third of this range would be hit half the time
        let n: u32 = 3 << 30;
        let mut random = Mwc::from_seed(Seed(77));
        let draws = 30_000;
        let low_third = (0..draws)
            .filter(|_| random.range(0u32, n - 1) < 1 << 30)
            .count();

        let ratio = low_third as f64 / draws as f64;
        assert!((0.30..0.37).contains(&ratio), "low third ratio {}", ratio);
    }

    #[test]
    fn test_small_sizes_stay_near_zero() {
        assert_eq!(sized_window(Size::MIN, i32::MIN, i32::MAX), (-1, 1));
        assert_eq!(sized_window(Size::MIN, u64::MIN, u64::MAX), (0, 1));
        assert_eq!(sized_window(Size::new(50), i64::MIN, i64::MAX), (-(1 << 32), 1 << 32));
        assert_eq!(sized_window(Size::MAX, i32::MIN, i32::MAX), (-(1 << 30), 1 << 30));
        assert_eq!(sized_window(Size::MAX, i8::MIN, i8::MAX), (i8::MIN, i8::MAX));
    }

    #[test]
    fn test_window_collapses_onto_bound_nearest_zero() {
        assert_eq!(sized_window(Size::MIN, 5i32, 10), (5, 5));
        assert_eq!(sized_window(Size::MIN, -10i32, -5), (-5, -5));
        assert_eq!(sized_window(Size::MIN, 5u32, 10), (5, 5));
        assert_eq!(sized_window(Size::new(10), 5i32, 10), (5, 10));
    }

    #[test]
    fn test_windows_widen_monotonically() {
        fn nested<T: Uniform + std::fmt::Debug>(low: T, high: T) {
            let mut previous = sized_window(Size::MIN, low, high);
            for size in 2..=100 {
                let window = sized_window(Size::new(size), low, high);
                assert!(
                    window.0 <= previous.0 && previous.1 <= window.1,
                    "window shrank at size {}: {:?} -> {:?}",
                    size,
                    previous,
                    window
                );
                previous = window;
            }
        }

        nested(i32::MIN, i32::MAX);
        nested(-70_000i32, 3);
        nested(1000i32, 1 << 20);
        nested(i64::MIN, i64::MAX);
        nested(u64::MIN, u64::MAX);
        nested(i8::MIN, i8::MAX);
        nested(100u16, 200);
        nested(-1e12f64, 1e3);
        nested(0.5f32, 1.0);
    }

    #[test]
    fn test_range_sized_stays_inside_window() {
        let mut random = Mwc::from_seed(Seed(8));
        for size in 1..=100 {
            let size = Size::new(size);
            let (lo, hi) = sized_window(size, i64::MIN, i64::MAX);
            for _ in 0..20 {
                let v = random.range_sized(size, i64::MIN, i64::MAX);
                assert!(lo <= v && v <= hi);
            }
        }
    }

    #[test]
    fn test_bool_range() {
        let mut random = Mwc::from_seed(Seed(1));
        assert!(random.range(true, true));
        assert!(!random.range(false, false));
        let trues = (0..1000).filter(|_| random.range(false, true)).count();
        assert!((350..650).contains(&trues));
    }

    #[test]
    fn test_float_range_handles_extremes() {
        let mut random = Mwc::from_seed(Seed(5));
        for _ in 0..100 {
            let v: f64 = random.range(f64::MIN, f64::MAX);
            assert!(v.is_finite());
        }
    }
}
