//! Testables: properties the engine can generate arguments for and run.
//!
//! Closures of up to four arguments become testables through [`testable`].
//! A property passes by returning normally and fails by returning `false`,
//! returning `Err(_)` or panicking.
//!
//! ```rust
//! use quickprop::{testable, Engine};
//!
//! let reverse_twice = testable(|xs: Vec<i32>| {
//!     let mut ys = xs.clone();
//!     ys.reverse();
//!     ys.reverse();
//!     xs == ys
//! })
//! .named(["xs"]);
//!
//! Engine::new().check(&reverse_twice);
//! ```

use crate::generator::{Arbitrary, Gen};
use crate::Result;
use quickprop_data::{Data, ToData};
use quickprop_random::Size;
use smol_str::SmolStr;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};

// ============================================================================
// Arguments and Outcomes
// ============================================================================

/// The arguments of one trial, in parameter order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestArgs {
    args: Vec<(SmolStr, Data)>,
}

impl TestArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair values with parameter names; unnamed parameters become `arg0`, `arg1`, ...
    pub fn from_values(names: &[SmolStr], values: impl IntoIterator<Item = Data>) -> Self {
        let args = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let name = names
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| SmolStr::new(format!("arg{}", i)));
                (name, value)
            })
            .collect();
        Self { args }
    }

    pub fn push(&mut self, name: impl Into<SmolStr>, value: Data) {
        self.args.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&Data> {
        self.args
            .iter()
            .find(|(arg, _)| arg == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &Data)> {
        self.args.iter().map(|(name, value)| (name, value))
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Arguments as a record, so replayed arguments can be diffed
impl ToData for TestArgs {
    fn to_data(&self) -> Data {
        Data::record(
            "TestArgs",
            self.args.iter().map(|(name, value)| (name.clone(), value.clone())),
        )
    }
}

/// One `name = value` line per argument
impl fmt::Display for TestArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.args.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}

/// A property's own failure signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFailure {
    pub message: String,
}

impl PropertyFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Describe a caught panic payload
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        Self::new(format!("panicked: {}", message))
    }
}

impl fmt::Display for PropertyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The result of running a property once
#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    Passed { args: TestArgs },
    Failed { args: TestArgs, cause: PropertyFailure },
}

impl TrialOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TrialOutcome::Passed { .. })
    }

    pub fn args(&self) -> &TestArgs {
        match self {
            TrialOutcome::Passed { args } | TrialOutcome::Failed { args, .. } => args,
        }
    }

    pub fn cause(&self) -> Option<&PropertyFailure> {
        match self {
            TrialOutcome::Passed { .. } => None,
            TrialOutcome::Failed { cause, .. } => Some(cause),
        }
    }
}

// ============================================================================
// Property Output
// ============================================================================

/// Return types a property may have
pub trait PropertyOutput {
    /// `None` if the property held
    fn into_failure(self) -> Option<PropertyFailure>;
}

impl PropertyOutput for () {
    fn into_failure(self) -> Option<PropertyFailure> {
        None
    }
}

impl PropertyOutput for bool {
    fn into_failure(self) -> Option<PropertyFailure> {
        if self {
            None
        } else {
            Some(PropertyFailure::new("property returned false"))
        }
    }
}

impl<E: fmt::Display> PropertyOutput for std::result::Result<(), E> {
    fn into_failure(self) -> Option<PropertyFailure> {
        self.err().map(|e| PropertyFailure::new(e.to_string()))
    }
}

// ============================================================================
// Testable
// ============================================================================

/// Something the engine can run trials of
pub trait Testable {
    /// Parameter names, in argument order
    fn parameters(&self) -> Vec<SmolStr>;

    /// Generate arguments at `size` and run the property once
    ///
    /// Arguments are captured before the property runs so that they are
    /// reported even if it panics. With `catch_panics` unset a panicking
    /// property unwinds through the caller.
    fn run_trial(&self, gen: &mut Gen<'_>, size: Size, catch_panics: bool) -> Result<TrialOutcome>;
}

/// Closures that can be called with generated arguments of type `Args`
pub trait Callable<Args> {
    const ARITY: usize;

    fn call_with(
        &self,
        gen: &mut Gen<'_>,
        size: Size,
        names: &[SmolStr],
        catch_panics: bool,
    ) -> Result<TrialOutcome>;
}

fn conclude<O: PropertyOutput>(
    args: TestArgs,
    catch_panics: bool,
    call: impl FnOnce() -> O,
) -> TrialOutcome {
    let failure = if catch_panics {
        match panic::catch_unwind(AssertUnwindSafe(call)) {
            Ok(output) => output.into_failure(),
            Err(payload) => Some(PropertyFailure::from_panic(payload)),
        }
    } else {
        call().into_failure()
    };

    match failure {
        None => TrialOutcome::Passed { args },
        Some(cause) => TrialOutcome::Failed { args, cause },
    }
}

macro_rules! callable {
    ($arity:expr; $($arg:ident $value:ident),*) => {
        impl<Func, Out, $($arg),*> Callable<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Out,
            Out: PropertyOutput,
            $($arg: Arbitrary + ToData,)*
        {
            const ARITY: usize = $arity;

            #[allow(unused_variables)]
            fn call_with(
                &self,
                gen: &mut Gen<'_>,
                size: Size,
                names: &[SmolStr],
                catch_panics: bool,
            ) -> Result<TrialOutcome> {
                $(let $value = gen.arbitrary::<$arg>(size)?;)*
                let values: [Data; $arity] = [$($value.to_data()),*];
                let args = TestArgs::from_values(names, values);
                Ok(conclude(args, catch_panics, move || (self)($($value),*)))
            }
        }
    };
}

callable!(0;);
callable!(1; A a);
callable!(2; A a, B b);
callable!(3; A a, B b, C c);
callable!(4; A a, B b, C c, D d);

/// A closure wrapped as a [`Testable`]
pub struct TestableFn<F, Args> {
    f: F,
    names: Vec<SmolStr>,
    _marker: PhantomData<fn(Args)>,
}

/// Wrap a closure of up to four [`Arbitrary`] arguments
pub fn testable<F, Args>(f: F) -> TestableFn<F, Args>
where
    F: Callable<Args>,
{
    TestableFn {
        f,
        names: Vec::new(),
        _marker: PhantomData,
    }
}

impl<F, Args> TestableFn<F, Args>
where
    F: Callable<Args>,
{
    /// Name the parameters for failure reports
    pub fn named<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }
}

impl<F, Args> Testable for TestableFn<F, Args>
where
    F: Callable<Args>,
{
    fn parameters(&self) -> Vec<SmolStr> {
        (0..F::ARITY)
            .map(|i| {
                self.names
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| SmolStr::new(format!("arg{}", i)))
            })
            .collect()
    }

    fn run_trial(&self, gen: &mut Gen<'_>, size: Size, catch_panics: bool) -> Result<TrialOutcome> {
        self.f.call_with(gen, size, &self.names, catch_panics)
    }
}

impl<T: Testable + ?Sized> Testable for &T {
    fn parameters(&self) -> Vec<SmolStr> {
        (**self).parameters()
    }

    fn run_trial(&self, gen: &mut Gen<'_>, size: Size, catch_panics: bool) -> Result<TrialOutcome> {
        (**self).run_trial(gen, size, catch_panics)
    }
}

impl<T: Testable + ?Sized> Testable for Box<T> {
    fn parameters(&self) -> Vec<SmolStr> {
        (**self).parameters()
    }

    fn run_trial(&self, gen: &mut Gen<'_>, size: Size, catch_panics: bool) -> Result<TrialOutcome> {
        (**self).run_trial(gen, size, catch_panics)
    }
}
