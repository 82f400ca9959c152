//! Core type definitions used across the DDUP workspace.

pub mod id;

pub use id::*;
