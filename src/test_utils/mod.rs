//! Shared test utilities for takt.

pub mod fixtures;
pub mod logging;

#[cfg(test)]
pub mod arbitrary;

/// One row of a table-driven test.
#[derive(Debug, Clone)]
pub struct TestCase<I, E> {
    pub name: &'static str,
    pub input: I,
    pub expected: E,
}

impl<I, E> TestCase<I, E> {
    pub const fn new(name: &'static str, input: I, expected: E) -> Self {
        Self {
            name,
            input,
            expected,
        }
    }
}

/// Run every case through `test_fn`, logging input and result per row.
pub fn run_table_tests<I, E, F>(cases: Vec<TestCase<I, E>>, test_fn: F)
where
    I: std::fmt::Debug,
    E: std::fmt::Debug + PartialEq,
    F: Fn(&I) -> E,
{
    let total = cases.len();
    for (idx, case) in cases.into_iter().enumerate() {
        let start = std::time::Instant::now();
        let actual = test_fn(&case.input);
        println!(
            "[TEST {}/{}] {}: {:?} -> {:?} ({:?})",
            idx + 1,
            total,
            case.name,
            case.input,
            actual,
            start.elapsed()
        );
        assert_eq!(actual, case.expected, "Test '{}' failed", case.name);
    }
}
