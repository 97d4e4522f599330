//! Deterministic random number generation
//!
//! Uses xorshift64* for delay sampling. Every engine owns its own
//! generator; there is no process-wide stream.

mod xorshift;

pub use xorshift::RngManager;
