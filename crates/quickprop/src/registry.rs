//! The generator registry.
//!
//! A [`RegistryBuilder`] collects registrations keyed by [`Shape`]; building
//! it freezes the table into a [`Registry`]. Resolution computes the
//! requested type's shape, looks up the registration and instantiates it for
//! the requested type. Instantiated generators are memoized per type.

use crate::builtins;
use crate::generator::{Arbitrary, Entry, FamilyGenerator, Gen, Generator, Shape};
use crate::{GenerationError, Result};
use parking_lot::RwLock;
use quickprop_random::{RandomSource, Size};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One generator together with the shape it serves
pub struct Registration {
    shape: Shape,
    entry: Entry,
}

impl Registration {
    /// A generator for the concrete type `T`
    pub fn concrete<T: Arbitrary>(generator: impl Generator<T>) -> Self {
        Self {
            shape: T::shape(),
            entry: Entry::concrete(generator),
        }
    }

    /// A generator for every member of an open family
    pub fn family(shape: Shape, generator: impl FamilyGenerator) -> Self {
        Self {
            shape,
            entry: Entry::family(generator),
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("shape", &self.shape)
            .field("entry", &self.entry)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects registrations; every shape may be claimed once
#[derive(Default)]
pub struct RegistryBuilder {
    entries: FxHashMap<Shape, Entry>,
}

impl RegistryBuilder {
    /// An empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder pre-populated with [`builtins::registrations`]
    pub fn with_builtins() -> Self {
        let mut builder = Self::new();
        for registration in builtins::registrations() {
            builder.entries.insert(registration.shape, registration.entry);
        }
        builder
    }

    /// Register a generator for the concrete type `T`
    pub fn register<T, G>(&mut self, generator: G) -> Result<&mut Self>
    where
        T: Arbitrary,
        G: Generator<T>,
    {
        self.add(Registration::concrete::<T>(generator))
    }

    /// Register a generator for an open family
    pub fn register_family(
        &mut self,
        shape: Shape,
        generator: impl FamilyGenerator,
    ) -> Result<&mut Self> {
        self.add(Registration::family(shape, generator))
    }

    /// Register a batch of generators, stopping at the first conflict
    pub fn register_all(
        &mut self,
        registrations: impl IntoIterator<Item = Registration>,
    ) -> Result<&mut Self> {
        for registration in registrations {
            self.add(registration)?;
        }
        Ok(self)
    }

    /// Whether a shape has been claimed
    pub fn contains(&self, shape: &Shape) -> bool {
        self.entries.contains_key(shape)
    }

    fn add(&mut self, registration: Registration) -> Result<&mut Self> {
        let Registration { shape, entry } = registration;
        if self.entries.contains_key(&shape) {
            return Err(GenerationError::AmbiguousRegistration {
                shape: shape.to_string(),
            });
        }

        debug!(%shape, arity = entry.arity(), "registered generator");
        self.entries.insert(shape, entry);
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            entries: self.entries,
            cache: RwLock::new(FxHashMap::default()),
        }
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("shapes", &self.entries.len())
            .finish()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// An immutable table of generators with a memo of instantiated ones
///
/// Registries are `Send + Sync`; resolution only ever adds to the memo, so a
/// registry can be shared by test suites running on different threads.
pub struct Registry {
    entries: FxHashMap<Shape, Entry>,
    /// `TypeId` of `T` => `Arc<dyn Generator<T>>`
    cache: RwLock<FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry holding only the built-in generators
    pub fn with_builtins() -> Self {
        RegistryBuilder::with_builtins().build()
    }

    /// Find (or instantiate) the generator for `T`
    pub fn resolve<T: Arbitrary>(&self) -> Result<Arc<dyn Generator<T>>> {
        let id = TypeId::of::<T>();
        if let Some(generator) = self
            .cache
            .read()
            .get(&id)
            .and_then(|cached| cached.downcast_ref::<Arc<dyn Generator<T>>>())
        {
            return Ok(Arc::clone(generator));
        }

        let shape = T::shape();
        let entry = self
            .entries
            .get(&shape)
            .ok_or_else(|| GenerationError::NoGeneratorRegistered {
                type_name: std::any::type_name::<T>().into(),
                shape: shape.to_string(),
            })?;

        let generator = T::instantiate(entry)?;
        debug!(
            type_name = std::any::type_name::<T>(),
            %shape,
            "instantiated generator"
        );

        self.cache
            .write()
            .insert(id, Arc::new(Arc::clone(&generator)));
        Ok(generator)
    }

    /// Generate one value of `T` from `random` at `size`
    pub fn generate<T: Arbitrary>(&self, random: &mut dyn RandomSource, size: Size) -> Result<T> {
        Gen::new(random, self).arbitrary(size)
    }

    /// Whether a generator is registered for a shape
    pub fn contains(&self, shape: &Shape) -> bool {
        self.entries.contains_key(shape)
    }

    /// Number of registered shapes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("shapes", &self.entries.len())
            .field("instantiated", &self.cache.read().len())
            .finish()
    }
}
