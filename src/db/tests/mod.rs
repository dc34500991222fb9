//! Repository tests
//!
//! Each repository has a test module containing shared test functions that
//! take `&dyn XxxRepo` trait objects, plus a `sqlite_tests` module that wires
//! them to in-memory SQLite databases with the real migrations applied.
//!
//! Most tests exercise the scoping contract: a row outside the caller's
//! predicate must behave exactly like a missing row.

mod materials;
