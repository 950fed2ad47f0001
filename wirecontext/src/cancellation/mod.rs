//! Cancellation and deadline signalling.
//!
//! This module provides:
//! - CancelSignal, a one-shot cancellation source with an optional deadline
//! - parent-to-child propagation for derived signals

mod signal;

pub use signal::{CancelCallback, CancelSignal};
