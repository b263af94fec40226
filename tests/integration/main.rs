//! Integration tests: plan generation against a real database, the CLI
//! binary and the HTTP router.

mod fixture;

mod cli_workflow_tests;
mod generation_tests;
mod http_tests;
