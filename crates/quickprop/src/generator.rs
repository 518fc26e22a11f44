//! Generators and the capability traits that connect types to them.
//!
//! - [`Generator<T>`] produces values of one concrete type.
//! - [`FamilyGenerator`] describes how to build any member of an open
//!   family (`Vec<_>`, `(_, _)`, arrays) without knowing the element types:
//!   it decides the structure and asks [`Slots`] to fill type arguments.
//! - [`Composite`] is implemented by the concrete family members and turns
//!   those fills into a value.
//! - [`Arbitrary`] ties a type to its registry [`Shape`].

use crate::registry::Registry;
use crate::{GenerationError, Result};
use quickprop_random::{RandomSource, Size};
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

// ============================================================================
// Shape
// ============================================================================

/// The canonical registry key of a type
///
/// Concrete types map to themselves, every boxed slice maps to [`Shape::Array`]
/// and instantiated generic types map to their open definition, so `Vec<u8>`
/// and `Vec<String>` share the shape `Vec<_>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A concrete type
    Type { id: TypeId, name: &'static str },

    /// Any array, whatever its element type
    Array,

    /// An open generic definition with `arity` type arguments
    Generic { name: &'static str, arity: usize },
}

impl Shape {
    /// The shape of a concrete type
    pub fn of<T: ?Sized + 'static>() -> Self {
        Shape::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The shape of an open generic definition
    pub const fn generic(name: &'static str, arity: usize) -> Self {
        Shape::Generic { name, arity }
    }

    /// Number of type arguments generators of this shape are instantiated with
    pub fn arity(&self) -> usize {
        match self {
            Shape::Type { .. } => 0,
            Shape::Array => 1,
            Shape::Generic { arity, .. } => *arity,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Type { name, .. } => write!(f, "`{}`", name),
            Shape::Array => write!(f, "`[_]`"),
            Shape::Generic { name, arity } => {
                write!(f, "`{}<", name)?;
                for i in 0..*arity {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "_")?;
                }
                write!(f, ">`")
            }
        }
    }
}

// ============================================================================
// Generation Context
// ============================================================================

/// The context a generator draws from: one trial's random source and the
/// registry used to generate nested values
///
/// `Gen` is itself a [`RandomSource`], so range sampling and distributions
/// are available directly on it.
pub struct Gen<'a> {
    random: &'a mut dyn RandomSource,
    registry: &'a Registry,
}

impl<'a> Gen<'a> {
    pub fn new(random: &'a mut dyn RandomSource, registry: &'a Registry) -> Self {
        Self { random, registry }
    }

    /// Generate a value of any registered type
    pub fn arbitrary<T: Arbitrary>(&mut self, size: Size) -> Result<T> {
        let generator = self.registry.resolve::<T>()?;
        generator.arbitrary(self, size)
    }

    /// The underlying random source
    pub fn random(&mut self) -> &mut dyn RandomSource {
        &mut *self.random
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }
}

impl RandomSource for Gen<'_> {
    fn next_u32(&mut self) -> u32 {
        self.random.next_u32()
    }
}

// ============================================================================
// Generators
// ============================================================================

/// Produces arbitrary values of `T` at a given size
pub trait Generator<T>: Send + Sync + 'static {
    fn arbitrary(&self, gen: &mut Gen<'_>, size: Size) -> Result<T>;
}

/// A generator backed by a closure, see [`from_fn`]
pub struct FnGenerator<T, F> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

/// Build a generator from a closure
///
/// ```rust
/// use quickprop::{from_fn, Arbitrary, Registry, RandomRange, Seed, Size, Algorithm, RandomFactory};
///
/// #[derive(Debug, PartialEq)]
/// struct Percent(u8);
///
/// impl Arbitrary for Percent {}
///
/// let mut builder = Registry::builder();
/// builder
///     .register(from_fn(|gen, _size| Ok(Percent(gen.range(0, 100)))))
///     .unwrap();
/// let registry = builder.build();
///
/// let mut random = Algorithm::Mwc.from_seed(Seed(1));
/// let Percent(p) = registry.generate::<Percent>(&mut *random, Size::MAX).unwrap();
/// assert!(p <= 100);
/// ```
pub fn from_fn<T, F>(f: F) -> FnGenerator<T, F>
where
    F: Fn(&mut Gen<'_>, Size) -> Result<T> + Send + Sync + 'static,
{
    FnGenerator {
        f,
        _marker: PhantomData,
    }
}

impl<T, F> Generator<T> for FnGenerator<T, F>
where
    T: 'static,
    F: Fn(&mut Gen<'_>, Size) -> Result<T> + Send + Sync + 'static,
{
    fn arbitrary(&self, gen: &mut Gen<'_>, size: Size) -> Result<T> {
        (self.f)(gen, size)
    }
}

// ============================================================================
// Families
// ============================================================================

/// Builds members of an open generic family
///
/// A family generator never sees element values. It draws the structure
/// (a length, a branch) from [`Slots`] and calls [`Slots::fill`] for every
/// type argument value the result should contain; the requested
/// [`Composite`] type collects those values.
pub trait FamilyGenerator: Send + Sync + 'static {
    /// Number of type arguments of the family
    fn arity(&self) -> usize;

    fn arbitrary(&self, slots: &mut Slots<'_>, size: Size) -> Result<()>;
}

type Fill<'a> = dyn FnMut(&mut dyn RandomSource, usize, Size) -> Result<()> + 'a;

/// Type argument slots handed to a [`FamilyGenerator`]
pub struct Slots<'a> {
    random: &'a mut dyn RandomSource,
    fill: &'a mut Fill<'a>,
    arity: usize,
    /// Name of the composite type being built
    type_name: &'static str,
}

impl<'a> Slots<'a> {
    /// Generate one value of type argument `argument` and hand it to the value being built
    pub fn fill(&mut self, argument: usize, size: Size) -> Result<()> {
        if argument >= self.arity {
            return Err(GenerationError::ArityMismatch {
                shape: format!("`{}`", self.type_name),
                expected: self.arity,
                found: argument + 1,
            });
        }
        (self.fill)(&mut *self.random, argument, size)
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl RandomSource for Slots<'_> {
    fn next_u32(&mut self) -> u32 {
        self.random.next_u32()
    }
}

/// A concrete member of a generator family
///
/// `fill` receives type argument values one at a time, in the order the
/// family generator requests them; `finish` produces the value.
pub trait Composite: Sized + 'static {
    /// Number of type arguments
    const ARITY: usize;

    /// Partial state accumulated while slots are filled
    type Builder: Default;

    fn fill(builder: &mut Self::Builder, argument: usize, gen: &mut Gen<'_>, size: Size)
        -> Result<()>;

    fn finish(builder: Self::Builder) -> Result<Self>;
}

/// A family generator instantiated for one composite type
struct FamilyInstance<C> {
    family: Arc<dyn FamilyGenerator>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Composite> Generator<C> for FamilyInstance<C> {
    fn arbitrary(&self, gen: &mut Gen<'_>, size: Size) -> Result<C> {
        let registry = gen.registry();
        let mut builder = C::Builder::default();

        let mut fill = |random: &mut dyn RandomSource, argument: usize, size: Size| {
            let mut gen = Gen::new(random, registry);
            C::fill(&mut builder, argument, &mut gen, size)
        };
        let mut slots = Slots {
            random: gen.random(),
            fill: &mut fill,
            arity: C::ARITY,
            type_name: std::any::type_name::<C>(),
        };
        self.family.arbitrary(&mut slots, size)?;

        C::finish(builder)
    }
}

// ============================================================================
// Registry Entries
// ============================================================================

/// What a registry stores for a shape
#[derive(Clone)]
pub enum Entry {
    /// An `Arc<dyn Generator<T>>` for one concrete `T`
    Concrete(Arc<dyn Any + Send + Sync>),

    /// A generator for an open family
    Family(Arc<dyn FamilyGenerator>),
}

impl Entry {
    pub fn concrete<T: 'static>(generator: impl Generator<T>) -> Self {
        let generator: Arc<dyn Generator<T>> = Arc::new(generator);
        Entry::Concrete(Arc::new(generator))
    }

    pub fn family(generator: impl FamilyGenerator) -> Self {
        Entry::Family(Arc::new(generator))
    }

    /// Number of type arguments this entry is instantiated with
    pub fn arity(&self) -> usize {
        match self {
            Entry::Concrete(_) => 0,
            Entry::Family(family) => family.arity(),
        }
    }

    /// The stored generator of a concrete type
    pub fn instantiate_concrete<T: 'static>(&self) -> Result<Arc<dyn Generator<T>>> {
        match self {
            Entry::Concrete(any) => any
                .downcast_ref::<Arc<dyn Generator<T>>>()
                .cloned()
                .ok_or_else(|| GenerationError::NoGeneratorRegistered {
                    type_name: std::any::type_name::<T>().into(),
                    shape: Shape::of::<T>().to_string(),
                }),
            Entry::Family(family) => Err(GenerationError::ArityMismatch {
                shape: Shape::of::<T>().to_string(),
                expected: family.arity(),
                found: 0,
            }),
        }
    }

    /// Instantiate a family generator for composite type `C`
    pub fn instantiate_family<C: Composite>(&self) -> Result<Arc<dyn Generator<C>>> {
        match self {
            Entry::Family(family) if family.arity() == C::ARITY => Ok(Arc::new(FamilyInstance::<C> {
                family: Arc::clone(family),
                _marker: PhantomData,
            })),
            other => Err(GenerationError::ArityMismatch {
                shape: std::any::type_name::<C>().into(),
                expected: other.arity(),
                found: C::ARITY,
            }),
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Concrete(_) => write!(f, "Entry::Concrete"),
            Entry::Family(family) => write!(f, "Entry::Family(arity = {})", family.arity()),
        }
    }
}

// ============================================================================
// Arbitrary
// ============================================================================

/// Types the registry can generate
///
/// The defaults describe a concrete type with its own registered generator,
/// so a domain type only needs an empty impl plus a registration:
///
/// ```rust
/// use quickprop::{from_fn, Arbitrary, Registry};
///
/// struct UserId(u64);
///
/// impl Arbitrary for UserId {}
///
/// let mut builder = Registry::builder();
/// builder.register(from_fn(|gen, size| Ok(UserId(gen.arbitrary(size)?)))).unwrap();
/// ```
///
/// Members of generic families override both methods, see [`Composite`].
pub trait Arbitrary: Sized + 'static {
    /// The registry key this type is looked up by
    fn shape() -> Shape {
        Shape::of::<Self>()
    }

    /// Produce a generator for this type from the entry registered for its shape
    fn instantiate(entry: &Entry) -> Result<Arc<dyn Generator<Self>>> {
        entry.instantiate_concrete::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickprop_random::{Algorithm, RandomFactory, Seed};

    struct Constant;

    impl Generator<u8> for Constant {
        fn arbitrary(&self, _gen: &mut Gen<'_>, _size: Size) -> Result<u8> {
            Ok(7)
        }
    }

    struct Pairs;

    impl FamilyGenerator for Pairs {
        fn arity(&self) -> usize {
            2
        }

        fn arbitrary(&self, slots: &mut Slots<'_>, size: Size) -> Result<()> {
            slots.fill(0, size)?;
            slots.fill(1, size)
        }
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(Shape::of::<u8>().to_string(), "`u8`");
        assert_eq!(Shape::Array.to_string(), "`[_]`");
        assert_eq!(Shape::generic("HashMap", 2).to_string(), "`HashMap<_, _>`");
    }

    #[test]
    fn test_shapes_of_instantiations_are_equal() {
        assert_eq!(Shape::generic("Vec", 1), Shape::generic("Vec", 1));
        assert_ne!(Shape::generic("Tuple", 2), Shape::generic("Tuple", 3));
        assert_ne!(Shape::of::<u8>(), Shape::of::<i8>());
        assert_eq!(Shape::Array.arity(), 1);
    }

    #[test]
    fn test_concrete_entry_round_trips() {
        let entry = Entry::concrete::<u8>(Constant);
        assert_eq!(entry.arity(), 0);
        assert!(entry.instantiate_concrete::<u8>().is_ok());
        assert!(matches!(
            entry.instantiate_concrete::<u16>(),
            Err(GenerationError::NoGeneratorRegistered { .. })
        ));
    }

    /// Asks for a second type argument of a one-argument family
    struct Overreach;

    impl FamilyGenerator for Overreach {
        fn arity(&self) -> usize {
            1
        }

        fn arbitrary(&self, slots: &mut Slots<'_>, size: Size) -> Result<()> {
            slots.fill(1, size)
        }
    }

    #[test]
    fn test_out_of_range_fill_names_the_type() {
        let mut builder = Registry::builder();
        builder.register_family(Shape::generic("Vec", 1), Overreach).unwrap();
        let registry = builder.build();

        let mut random = Algorithm::Mwc.from_seed(Seed(1));
        let err = registry
            .generate::<Vec<u8>>(&mut *random, Size::MAX)
            .err()
            .unwrap();
        match err {
            GenerationError::ArityMismatch {
                shape,
                expected,
                found,
            } => {
                assert!(shape.contains("Vec<u8>"), "{}", shape);
                assert_eq!((expected, found), (1, 2));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_family_entry_checks_arity() {
        let entry = Entry::family(Pairs);
        assert!(entry.instantiate_family::<(u8, u8)>().is_ok());
        assert!(matches!(
            entry.instantiate_family::<Vec<u8>>(),
            Err(GenerationError::ArityMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
        assert!(matches!(
            entry.instantiate_concrete::<u8>(),
            Err(GenerationError::ArityMismatch { found: 0, .. })
        ));
    }
}
