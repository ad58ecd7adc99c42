//! State module for tracking crawl progress
//!
//! - `RunPhase`: the phase a crawl run is in (discovering, extracting, merging, ...)

mod run_phase;

pub use run_phase::RunPhase;
