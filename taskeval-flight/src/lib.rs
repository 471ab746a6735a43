//! Single-flight tracking for taskeval.
//!
//! At most one evaluation attempt may be in flight per identifier;
//! concurrent duplicates are rejected, never queued. Each attempt is
//! bounded by a wall-clock timeout, and the in-flight marker is released
//! on every exit path.

mod tracker;

pub use tracker::{FlightConfig, FlightPermit, FlightTracker};
