//! Live tree hosts.

pub mod memory;
