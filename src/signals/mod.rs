//! Signal synthesis from indicator snapshots.

pub mod synthesizer;

pub use synthesizer::SignalSynthesizer;
