//! Structured logging for the LMS server.
//!
//! Console output is emitted through `tracing-subscriber` in one of three
//! formats (pretty, compact, JSON) with `RUST_LOG`-style filtering.

mod tracing_init;

pub use tracing_init::*;
