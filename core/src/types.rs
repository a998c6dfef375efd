//! Shared primitive types used across the entire simulation.

/// Simulation time. One unit = one model year.
pub type Years = f64;

/// The canonical run identifier used by the result store.
pub type RunId = String;
