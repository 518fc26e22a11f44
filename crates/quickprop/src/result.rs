//! Campaign results and failure reports.

use crate::property::{PropertyFailure, TestArgs};
use quickprop_random::{Seed, Size};
use std::fmt;

/// Everything needed to understand and replay a falsified property
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Trials run, including the failing one
    pub tests: usize,
    pub seed: Seed,
    pub size: Size,
    pub args: TestArgs,
    pub cause: PropertyFailure,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Falsified after {} test{} (seed = {}, size = {})",
            self.tests,
            if self.tests == 1 { "" } else { "s" },
            self.seed,
            self.size
        )?;
        for (name, value) in self.args.iter() {
            writeln!(f, "    {} = {}", name, value)?;
        }
        write!(f, "Cause: {}", self.cause)
    }
}

/// Outcome of a whole campaign
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    /// Every trial passed
    Success { tests: usize },
    /// The first failing trial
    Failure(Failure),
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TestResult::Success { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            TestResult::Success { .. } => None,
            TestResult::Failure(failure) => Some(failure),
        }
    }

    /// Number of trials that ran
    pub fn tests(&self) -> usize {
        match self {
            TestResult::Success { tests } => *tests,
            TestResult::Failure(failure) => failure.tests,
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Success { tests } => write!(f, "OK, passed {} tests", tests),
            TestResult::Failure(failure) => failure.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickprop_data::ToData;

    fn failure(tests: usize) -> Failure {
        let mut args = TestArgs::new();
        args.push("xs", vec![3u8, 1].to_data());
        args.push("flag", true.to_data());
        Failure {
            tests,
            seed: Seed(77),
            size: Size::new(12),
            args,
            cause: PropertyFailure::new("property returned false"),
        }
    }

    #[test]
    fn test_failure_report() {
        insta::assert_snapshot!(failure(8).to_string(), @r###"
        Falsified after 8 tests (seed = 77, size = 12)
            xs = [3, 1]
            flag = true
        Cause: property returned false
        "###);
    }

    #[test]
    fn test_single_test_is_singular() {
        assert!(failure(1).to_string().starts_with("Falsified after 1 test (seed"));
    }

    #[test]
    fn test_result_accessors() {
        let ok = TestResult::Success { tests: 250 };
        assert!(ok.is_success());
        assert_eq!(ok.tests(), 250);
        assert_eq!(ok.failure(), None);
        assert_eq!(ok.to_string(), "OK, passed 250 tests");

        let failed = TestResult::Failure(failure(3));
        assert!(!failed.is_success());
        assert_eq!(failed.tests(), 3);
        assert_eq!(failed.failure().map(|f| f.seed), Some(Seed(77)));
    }
}
