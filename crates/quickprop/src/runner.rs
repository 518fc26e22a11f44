//! The property testing engine.
//!
//! An [`Engine`] runs campaigns of up to `max_trials` trials. Trial `i`
//! (zero-based) draws a fresh seed from the engine's [`RandomFactory`],
//! runs at size `i % max_size + 1` and stops the campaign on the first
//! failure. A failure records the seed and size so that [`Engine::replay`]
//! regenerates the exact same arguments.

use crate::config::{ConfigError, EngineConfig};
use crate::generator::{Arbitrary, Gen, Generator};
use crate::property::{Testable, TrialOutcome};
use crate::registry::Registry;
use crate::result::{Failure, TestResult};
use crate::Result;
use quickprop_random::{RandomFactory, Seed, Size};
use std::fmt;
use std::sync::Arc;
use tracing::{info, trace, warn};

// ============================================================================
// Engine
// ============================================================================

/// Runs properties against generated arguments
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    registry: Arc<Registry>,
    factory: Arc<dyn RandomFactory>,
}

impl Engine {
    /// An engine with the default configuration and built-in generators
    pub fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            factory: Arc::new(config.algorithm),
            registry: Arc::new(Registry::with_builtins()),
            config,
        }
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Resolve the generator the engine would use for `T`
    pub fn resolve<T: Arbitrary>(&self) -> Result<Arc<dyn Generator<T>>> {
        self.registry.resolve::<T>()
    }

    /// Generate one value of `T` from an explicit seed
    pub fn generate<T: Arbitrary>(&self, seed: Seed, size: Size) -> Result<T> {
        let mut random = self.factory.from_seed(seed);
        self.registry.generate(&mut *random, size)
    }

    /// Run a full campaign
    ///
    /// Generation errors abort the campaign and are returned as `Err`;
    /// property failures end it early with [`TestResult::Failure`].
    pub fn test<T: Testable + ?Sized>(&self, testable: &T) -> Result<TestResult> {
        let max_trials = self.config.max_trials;

        for trial in 0..max_trials {
            let size = self.config.size_for(trial);
            let (mut random, seed) = self.factory.new_random();
            trace!(trial = trial + 1, %seed, %size, "running trial");

            let mut gen = Gen::new(&mut *random, &self.registry);
            match testable.run_trial(&mut gen, size, self.config.catch_panics)? {
                TrialOutcome::Passed { .. } => {}
                TrialOutcome::Failed { args, cause } => {
                    let failure = Failure {
                        tests: trial + 1,
                        seed,
                        size,
                        args,
                        cause,
                    };
                    warn!(
                        tests = failure.tests,
                        %seed,
                        %size,
                        cause = %failure.cause,
                        "property falsified"
                    );
                    return Ok(TestResult::Failure(failure));
                }
            }
        }

        info!(tests = max_trials, "property passed");
        Ok(TestResult::Success { tests: max_trials })
    }

    /// Run one trial from a recorded seed and size
    pub fn replay<T: Testable + ?Sized>(
        &self,
        seed: Seed,
        size: Size,
        testable: &T,
    ) -> Result<TrialOutcome> {
        let mut random = self.factory.from_seed(seed);
        let mut gen = Gen::new(&mut *random, &self.registry);
        let outcome = testable.run_trial(&mut gen, size, self.config.catch_panics)?;
        info!(%seed, %size, passed = outcome.is_passed(), "replayed trial");
        Ok(outcome)
    }

    /// Run a campaign, panicking with the failure report if it fails
    pub fn check<T: Testable + ?Sized>(&self, testable: &T) {
        match self.test(testable) {
            Ok(TestResult::Success { .. }) => {}
            Ok(TestResult::Failure(failure)) => panic!("{}", failure),
            Err(err) => panic!("{}", err),
        }
    }

    /// Replay one trial, panicking with its arguments if it fails
    pub fn check_replay<T: Testable + ?Sized>(&self, seed: Seed, size: Size, testable: &T) {
        match self.replay(seed, size, testable) {
            Ok(TrialOutcome::Passed { .. }) => {}
            Ok(TrialOutcome::Failed { args, cause }) => {
                let mut report = format!("Falsified on replay (seed = {}, size = {})\n", seed, size);
                for (name, value) in args.iter() {
                    report.push_str(&format!("    {} = {}\n", name, value));
                }
                report.push_str(&format!("Cause: {}", cause));
                panic!("{}", report)
            }
            Err(err) => panic!("{}", err),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Engine`]
#[derive(Default)]
pub struct EngineBuilder {
    config: Option<EngineConfig>,
    registry: Option<Arc<Registry>>,
    factory: Option<Arc<dyn RandomFactory>>,
}

impl EngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use `registry` instead of the built-in generators alone
    pub fn registry(mut self, registry: impl Into<Arc<Registry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Draw seeds from `factory` instead of the configured algorithm
    pub fn factory(mut self, factory: impl RandomFactory + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn build(self) -> std::result::Result<Engine, ConfigError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(config.algorithm) as Arc<dyn RandomFactory>);
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(Registry::with_builtins()));

        Ok(Engine {
            config,
            registry,
            factory,
        })
    }
}
