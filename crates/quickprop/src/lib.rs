//! quickprop: randomized property testing
//!
//! A property is an ordinary closure over typed arguments. The engine draws
//! a fresh seed for every trial, generates one value per argument at a size
//! that cycles through `1..=max_size`, and runs the closure. The first
//! failure stops the campaign and reports everything needed to replay it:
//!
//! - **Registry**: maps a requested type to a generator, including open
//!   families such as `Vec<_>` or `(_, _)` that are instantiated on demand
//! - **Testable**: wraps closures of up to four arguments; a property fails
//!   by returning `false`, returning `Err`, or panicking
//! - **Engine**: runs campaigns, replays a seed/size pair and renders
//!   failure reports
//!
//! No shrinking is performed; the reported arguments are the ones that
//! actually failed.
//!
//! # Example
//!
//! ```rust
//! use quickprop::{testable, Engine, TestResult};
//!
//! let engine = Engine::new();
//!
//! let result = engine
//!     .test(&testable(|a: i64, b: i64| a.wrapping_add(b) == b.wrapping_add(a)))
//!     .unwrap();
//! assert_eq!(result, TestResult::Success { tests: 250 });
//!
//! let short = testable(|xs: Vec<u8>| xs.len() < 10).named(["xs"]);
//! let result = engine.test(&short).unwrap();
//! let failure = result.failure().unwrap();
//!
//! // The seed and size reproduce the same arguments
//! let replayed = engine.replay(failure.seed, failure.size, &short).unwrap();
//! assert_eq!(replayed.args(), &failure.args);
//! ```

pub mod builtins;
pub mod config;
pub mod generator;
pub mod property;
pub mod registry;
pub mod result;
pub mod runner;

pub use config::{ConfigError, EngineConfig};
pub use generator::{
    from_fn, Arbitrary, Composite, Entry, FamilyGenerator, FnGenerator, Gen, Generator, Shape,
    Slots,
};
pub use property::{
    testable, Callable, PropertyFailure, PropertyOutput, TestArgs, Testable, TestableFn,
    TrialOutcome,
};
pub use registry::{Registration, Registry, RegistryBuilder};
pub use result::{Failure, TestResult};
pub use runner::{Engine, EngineBuilder};

pub use quickprop_data::{diff, impl_to_data, show, Data, DataDiff, Primitive, ToData};
pub use quickprop_random::{
    Algorithm, Distributions, RandomError, RandomFactory, RandomRange, RandomSource, Seed, Size,
};

use thiserror::Error;

// ============================================================================
// Generation Errors
// ============================================================================

/// Errors raised while resolving generators or generating values
///
/// These are fatal to the current campaign and are never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// No generator was registered for the requested type's shape
    #[error("no generator registered for `{type_name}` (shape {shape}), please register one")]
    NoGeneratorRegistered { type_name: String, shape: String },

    /// Two registrations claimed the same shape
    #[error("a generator for shape {shape} is already registered")]
    AmbiguousRegistration { shape: String },

    /// A distribution was sampled with malformed parameters
    #[error(transparent)]
    InvalidParameter(#[from] RandomError),

    /// A generator and the type it was asked to build disagree on the
    /// number of type arguments
    #[error("generator for {shape} takes {expected} type argument(s), but {found} were requested")]
    ArityMismatch {
        shape: String,
        expected: usize,
        found: usize,
    },

    /// A family generator finished without filling every required slot
    #[error("generator for `{type_name}` did not fill argument {argument}")]
    IncompleteValue {
        type_name: &'static str,
        argument: usize,
    },
}

/// Result type for generation
pub type Result<T> = std::result::Result<T, GenerationError>;
