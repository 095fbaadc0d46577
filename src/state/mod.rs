//! Shared crawl state
//!
//! # Components
//!
//! - `TaskUnit`: one `(url, depth)` pair scheduled for a crawl step
//! - `VisitedSet`: the claim gate that keeps every URL to a single fetch
//! - `QuiescenceTracker`: outstanding-work counter that detects the end of a crawl

mod quiescence;
mod task;
mod visited;

pub use quiescence::{QuiescenceTracker, UnitGuard};
pub use task::TaskUnit;
pub use visited::VisitedSet;
