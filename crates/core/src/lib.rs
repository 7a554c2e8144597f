//! Core of the jmctl mixer control client
//!
//! Everything between the command line and the daemon lives here: the alias
//! registry, the `get`/`set` grammar, port selection, the wait gate and the
//! executor that runs a parsed request against a [`MixerTarget`].
//!
//! [`MixerTarget`]: domain::MixerTarget

pub mod domain;
