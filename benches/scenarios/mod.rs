//! Real-world scenario benchmarks.
//!
//! Complete voice graphs per profile, and the whole renderer at full
//! polyphony with the shared signal chain.

mod polyphony;
mod voices;

pub use polyphony::bench_polyphony;
pub use voices::bench_voices;
