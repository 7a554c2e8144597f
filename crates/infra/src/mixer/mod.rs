//! Mixer collaborators
//!
//! The daemon speaks newline-delimited JSON over TCP (see [`wire`]).

pub mod memory;
pub mod tcp;
pub mod wire;

pub use memory::MemoryMixer;
pub use tcp::JamyxerClient;
