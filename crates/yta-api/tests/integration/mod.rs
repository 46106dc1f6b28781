//! Integration tests for the HTTP API.

pub mod routes_tests;
pub mod support;
