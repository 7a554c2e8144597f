//! Cross-crate tests for jmctl
//!
//! Everything here drives the real argument parser and request grammar
//! against an in-process mixer, so no daemon is needed.

#[cfg(test)]
mod dispatch_integration;
#[cfg(test)]
mod grammar_properties;
