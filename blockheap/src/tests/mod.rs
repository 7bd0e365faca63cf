//! Test-only modules. Kept inside `src/` rather than a `tests/` directory
//! so they can reach `sim::VecHeapSink` and crate-private internals without
//! wiring a self dev-dependency just to turn on the `sim` feature for an
//! integration-test binary.

mod properties;
mod scenarios;
