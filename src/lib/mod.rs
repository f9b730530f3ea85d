//! Shared library modules providing error types, safe serialization, and telemetry initialization.

pub mod errors;
pub mod sanitize;
pub mod telemetry;
