//! Core counter types for wrapcount.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod counter;

pub use counter::{BoundedCyclicCounter, CounterError, CounterSnapshot, Step};
