//! Outbound adapters: persistence and test doubles.

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod persistence;
