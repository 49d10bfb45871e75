//! Integration tests for the sweep pipeline
//!
//! These tests use wiremock for the listing site and fake browser sessions
//! for the search form, so no real browser is needed.

mod common;
mod merge_tests;
mod paginator_tests;
