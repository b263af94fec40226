//! Property-based tests for the calendar and grid layout.

mod calendar_tests;
