//! Integration tests entry point, following https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod fixtures;
mod tracing_utils;

mod consumers;
mod segmentation;
mod tracing_verification;
