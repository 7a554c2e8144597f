//! Mixer daemon clients for jmctl
//!
//! Implementations of [`jmctl_core::domain::MixerTarget`]:
//! - [`JamyxerClient`]: talks to the daemon over TCP
//! - [`MemoryMixer`]: keeps ports in process, for tests and dry runs

pub mod mixer;

pub use mixer::{JamyxerClient, MemoryMixer};
