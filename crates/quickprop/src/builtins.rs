//! Built-in generators: every integer width, floats, `bool`, `char`,
//! `String`, and the sequence, option, tuple and map families.

use crate::generator::{Arbitrary, Composite, Entry, FamilyGenerator, Gen, Generator, Shape, Slots};
use crate::registry::Registration;
use crate::{GenerationError, Result};
use quickprop_random::{RandomRange, RandomSource, Size};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::sync::Arc;

/// Precision of the rational construction of `f64` values
const DOUBLE_PRECISION: i64 = 9_999_999_999_999;

/// Precision of the rational construction of `f32` values
const FLOAT_PRECISION: i64 = 9_999_999;

pub const VEC: Shape = Shape::generic("Vec", 1);
pub const VEC_DEQUE: Shape = Shape::generic("VecDeque", 1);
pub const HASH_SET: Shape = Shape::generic("HashSet", 1);
pub const BTREE_SET: Shape = Shape::generic("BTreeSet", 1);
pub const HASH_MAP: Shape = Shape::generic("HashMap", 2);
pub const BTREE_MAP: Shape = Shape::generic("BTreeMap", 2);
pub const OPTION: Shape = Shape::generic("Option", 1);
pub const TUPLE2: Shape = Shape::generic("Tuple", 2);
pub const TUPLE3: Shape = Shape::generic("Tuple", 3);

/// Every built-in registration
///
/// Starting from [`RegistryBuilder::new`](crate::RegistryBuilder::new) and
/// registering a filtered copy of this list replaces individual built-ins.
pub fn registrations() -> Vec<Registration> {
    vec![
        Registration::concrete::<i8>(IntegerGenerator),
        Registration::concrete::<i16>(IntegerGenerator),
        Registration::concrete::<i32>(IntegerGenerator),
        Registration::concrete::<i64>(IntegerGenerator),
        Registration::concrete::<isize>(IntegerGenerator),
        Registration::concrete::<u8>(IntegerGenerator),
        Registration::concrete::<u16>(IntegerGenerator),
        Registration::concrete::<u32>(IntegerGenerator),
        Registration::concrete::<u64>(IntegerGenerator),
        Registration::concrete::<usize>(IntegerGenerator),
        Registration::concrete::<f32>(RationalGenerator),
        Registration::concrete::<f64>(RationalGenerator),
        Registration::concrete::<bool>(BoolGenerator),
        Registration::concrete::<char>(CharGenerator),
        Registration::concrete::<String>(StringGenerator),
        Registration::family(VEC, SequenceGenerator),
        Registration::family(VEC_DEQUE, SequenceGenerator),
        Registration::family(Shape::Array, SequenceGenerator),
        Registration::family(HASH_SET, SequenceGenerator),
        Registration::family(BTREE_SET, SequenceGenerator),
        Registration::family(HASH_MAP, MapGenerator),
        Registration::family(BTREE_MAP, MapGenerator),
        Registration::family(OPTION, OptionGenerator),
        Registration::family(TUPLE2, TupleGenerator { arity: 2 }),
        Registration::family(TUPLE3, TupleGenerator { arity: 3 }),
    ]
}

/// Length of a generated collection: uniform in `[0, size - 1]`
fn length<R: RandomSource + ?Sized>(random: &mut R, size: Size) -> u32 {
    random.range(0, size.value() - 1)
}

// ============================================================================
// Scalars
// ============================================================================

/// Integers over the full domain, scaled by size
pub struct IntegerGenerator;

macro_rules! integer_generator {
    ($($t:ty),*) => {
        $(
            impl Arbitrary for $t {}

            impl Generator<$t> for IntegerGenerator {
                fn arbitrary(&self, gen: &mut Gen<'_>, size: Size) -> Result<$t> {
                    Ok(gen.range_sized(size, <$t>::MIN, <$t>::MAX))
                }
            }
        )*
    };
}

integer_generator!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Arbitrary for isize {}

impl Generator<isize> for IntegerGenerator {
    fn arbitrary(&self, gen: &mut Gen<'_>, size: Size) -> Result<isize> {
        Ok(gen.range_sized(size, isize::MIN as i64, isize::MAX as i64) as isize)
    }
}

impl Arbitrary for usize {}

impl Generator<usize> for IntegerGenerator {
    fn arbitrary(&self, gen: &mut Gen<'_>, size: Size) -> Result<usize> {
        Ok(gen.range_sized(size, 0, usize::MAX as u64) as usize)
    }
}

/// Floats built as a ratio `a / b` with `a` in `[-size * P, size * P]` and
/// `b` in `[1, P]`
pub struct RationalGenerator;

fn rational(gen: &mut Gen<'_>, size: Size, precision: i64) -> f64 {
    let bound = size.value() as i64 * precision;
    let numerator = gen.range(-bound, bound);
    let denominator = gen.range(1, precision);
    numerator as f64 / denominator as f64
}

impl Arbitrary for f64 {}

impl Generator<f64> for RationalGenerator {
    fn arbitrary(&self, gen: &mut Gen<'_>, size: Size) -> Result<f64> {
        Ok(rational(gen, size, DOUBLE_PRECISION))
    }
}

impl Arbitrary for f32 {}

impl Generator<f32> for RationalGenerator {
    fn arbitrary(&self, gen: &mut Gen<'_>, size: Size) -> Result<f32> {
        Ok(rational(gen, size, FLOAT_PRECISION) as f32)
    }
}

pub struct BoolGenerator;

impl Arbitrary for bool {}

impl Generator<bool> for BoolGenerator {
    fn arbitrary(&self, gen: &mut Gen<'_>, _size: Size) -> Result<bool> {
        Ok(gen.next_bool())
    }
}

/// Printable ASCII; above half size an increasing share of characters
/// comes from the rest of the Basic Multilingual Plane
pub struct CharGenerator;

impl Arbitrary for char {}

impl Generator<char> for CharGenerator {
    fn arbitrary(&self, gen: &mut Gen<'_>, size: Size) -> Result<char> {
        let wide = size.value() > 50 && gen.range(51, 150) <= size.value();
        let code: u32 = if wide {
            // Skip the C1 controls and the surrogates
            gen.range(0xa0, 0xd7ff)
        } else {
            gen.range(0x20, 0x7e)
        };
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}

/// Strings of `[0, size - 1]` characters drawn from the registered `char` generator
pub struct StringGenerator;

impl Arbitrary for String {}

impl Generator<String> for StringGenerator {
    fn arbitrary(&self, gen: &mut Gen<'_>, size: Size) -> Result<String> {
        let n = length(gen, size);
        (0..n).map(|_| gen.arbitrary::<char>(size)).collect()
    }
}

// ============================================================================
// Families
// ============================================================================

/// `[0, size - 1]` elements of the single type argument
pub struct SequenceGenerator;

impl FamilyGenerator for SequenceGenerator {
    fn arity(&self) -> usize {
        1
    }

    fn arbitrary(&self, slots: &mut Slots<'_>, size: Size) -> Result<()> {
        for _ in 0..length(slots, size) {
            slots.fill(0, size)?;
        }
        Ok(())
    }
}

/// `[0, size - 1]` key/value pairs
pub struct MapGenerator;

impl FamilyGenerator for MapGenerator {
    fn arity(&self) -> usize {
        2
    }

    fn arbitrary(&self, slots: &mut Slots<'_>, size: Size) -> Result<()> {
        for _ in 0..length(slots, size) {
            slots.fill(0, size)?;
            slots.fill(1, size)?;
        }
        Ok(())
    }
}

/// `None` or `Some` with equal probability
pub struct OptionGenerator;

impl FamilyGenerator for OptionGenerator {
    fn arity(&self) -> usize {
        1
    }

    fn arbitrary(&self, slots: &mut Slots<'_>, size: Size) -> Result<()> {
        if slots.next_bool() {
            slots.fill(0, size)?;
        }
        Ok(())
    }
}

/// One value per type argument, in order
pub struct TupleGenerator {
    pub arity: usize,
}

impl FamilyGenerator for TupleGenerator {
    fn arity(&self) -> usize {
        self.arity
    }

    fn arbitrary(&self, slots: &mut Slots<'_>, size: Size) -> Result<()> {
        for argument in 0..self.arity {
            slots.fill(argument, size)?;
        }
        Ok(())
    }
}

// ============================================================================
// Composites
// ============================================================================

macro_rules! family_member {
    ($shape:expr) => {
        fn shape() -> Shape {
            $shape
        }

        fn instantiate(entry: &Entry) -> Result<Arc<dyn Generator<Self>>> {
            entry.instantiate_family::<Self>()
        }
    };
}

/// Collections built by extending with every filled element
macro_rules! sequence_composite {
    ($ty:ident<T $(: $($bound:path),+)?>, $shape:expr) => {
        impl<T: Arbitrary $($(+ $bound)+)?> Arbitrary for $ty<T> {
            family_member!($shape);
        }

        impl<T: Arbitrary $($(+ $bound)+)?> Composite for $ty<T> {
            const ARITY: usize = 1;
            type Builder = Self;

            fn fill(builder: &mut Self, _argument: usize, gen: &mut Gen<'_>, size: Size) -> Result<()> {
                builder.extend(Some(gen.arbitrary::<T>(size)?));
                Ok(())
            }

            fn finish(builder: Self) -> Result<Self> {
                Ok(builder)
            }
        }
    };
}

sequence_composite!(Vec<T>, VEC);
sequence_composite!(VecDeque<T>, VEC_DEQUE);
sequence_composite!(HashSet<T: Eq, Hash>, HASH_SET);
sequence_composite!(BTreeSet<T: Ord>, BTREE_SET);

impl<T: Arbitrary> Arbitrary for Box<[T]> {
    family_member!(Shape::Array);
}

impl<T: Arbitrary> Composite for Box<[T]> {
    const ARITY: usize = 1;
    type Builder = Vec<T>;

    fn fill(builder: &mut Vec<T>, _argument: usize, gen: &mut Gen<'_>, size: Size) -> Result<()> {
        builder.push(gen.arbitrary(size)?);
        Ok(())
    }

    fn finish(builder: Vec<T>) -> Result<Self> {
        Ok(builder.into_boxed_slice())
    }
}

impl<T: Arbitrary> Arbitrary for Option<T> {
    family_member!(OPTION);
}

impl<T: Arbitrary> Composite for Option<T> {
    const ARITY: usize = 1;
    type Builder = Option<T>;

    fn fill(builder: &mut Option<T>, _argument: usize, gen: &mut Gen<'_>, size: Size) -> Result<()> {
        *builder = Some(gen.arbitrary(size)?);
        Ok(())
    }

    fn finish(builder: Option<T>) -> Result<Self> {
        Ok(builder)
    }
}

/// Maps collect keys and values in alternating fills
pub struct MapBuilder<K, M> {
    pending: Option<K>,
    map: M,
}

impl<K, M: Default> Default for MapBuilder<K, M> {
    fn default() -> Self {
        Self {
            pending: None,
            map: M::default(),
        }
    }
}

macro_rules! map_composite {
    ($ty:ident, $shape:expr, $($bound:path),+) => {
        impl<K: Arbitrary $(+ $bound)+, V: Arbitrary> Arbitrary for $ty<K, V> {
            family_member!($shape);
        }

        impl<K: Arbitrary $(+ $bound)+, V: Arbitrary> Composite for $ty<K, V> {
            const ARITY: usize = 2;
            type Builder = MapBuilder<K, $ty<K, V>>;

            fn fill(builder: &mut Self::Builder, argument: usize, gen: &mut Gen<'_>, size: Size) -> Result<()> {
                if argument == 0 {
                    builder.pending = Some(gen.arbitrary(size)?);
                    return Ok(());
                }
                let key = builder.pending.take().ok_or(GenerationError::IncompleteValue {
                    type_name: std::any::type_name::<Self>(),
                    argument: 0,
                })?;
                builder.map.insert(key, gen.arbitrary(size)?);
                Ok(())
            }

            fn finish(builder: Self::Builder) -> Result<Self> {
                match builder.pending {
                    Some(_) => Err(GenerationError::IncompleteValue {
                        type_name: std::any::type_name::<Self>(),
                        argument: 1,
                    }),
                    None => Ok(builder.map),
                }
            }
        }
    };
}

map_composite!(HashMap, HASH_MAP, Eq, Hash);
map_composite!(BTreeMap, BTREE_MAP, Ord);

macro_rules! tuple_composite {
    ($shape:expr, $arity:expr; $($name:ident $index:tt),+) => {
        impl<$($name: Arbitrary),+> Arbitrary for ($($name,)+) {
            family_member!($shape);
        }

        impl<$($name: Arbitrary),+> Composite for ($($name,)+) {
            const ARITY: usize = $arity;
            type Builder = ($(Option<$name>,)+);

            fn fill(builder: &mut Self::Builder, argument: usize, gen: &mut Gen<'_>, size: Size) -> Result<()> {
                match argument {
                    $($index => builder.$index = Some(gen.arbitrary(size)?),)+
                    _ => {
                        return Err(GenerationError::ArityMismatch {
                            shape: $shape.to_string(),
                            expected: $arity,
                            found: argument + 1,
                        })
                    }
                }
                Ok(())
            }

            fn finish(builder: Self::Builder) -> Result<Self> {
                Ok(($(builder.$index.ok_or(GenerationError::IncompleteValue {
                    type_name: std::any::type_name::<Self>(),
                    argument: $index,
                })?,)+))
            }
        }
    };
}

tuple_composite!(TUPLE2, 2; A 0, B 1);
tuple_composite!(TUPLE3, 3; A 0, B 1, C 2);
