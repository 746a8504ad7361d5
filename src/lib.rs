//! habitree - a micro habit tracker that grows a tree
//!
//! Check off small daily habits; every completed day becomes a leaf.
//!
//! # Overview
//!
//! Habits keep a per-day completion map. From it habitree derives streaks,
//! consistency over a 7/14/30 day window, and a procedurally generated tree:
//! completed days in the window hang from the twigs, days marked as missed
//! lie on the ground.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`model`] | `Habit`, `Settings`, `AppData` and per-habit metrics |
//! | [`stats`] | Totals, overall streak, week strip, achievements |
//! | [`tree`] | Branch generation and leaf placement |
//! | [`store`] | JSON persistence behind the [`Storage`] trait |
//! | [`tracker`] | The state holder every front end goes through |
//! | [`tui`] | Terminal UI |
//!
//! # Quick Start
//!
//! ```no_run
//! use habitree::{model, JsonStore, Tracker};
//!
//! let mut tracker = Tracker::open(JsonStore::open("habits.json"));
//! let today = model::today();
//!
//! let id = tracker.add_habit("Drink water", "💧", today).unwrap();
//! tracker.toggle_today(&id, today).unwrap();
//!
//! println!("Leaves: {}", tracker.total_leaves());
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod stats;
pub mod store;
pub mod tracker;
pub mod tree;
pub mod tui;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{AppData, Habit, Settings};
pub use stats::{Achievement, Summary};
pub use store::{JsonStore, MemoryStore, Storage};
pub use tracker::Tracker;
pub use tree::{TreeLayout, TreeParams, TreeScene};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Core types are re-exported from the crate root
        let data = AppData::default();
        assert!(data.habits.is_empty());
        assert_eq!(TreeLayout::default(), TreeLayout::new(600.0, 410.0));
    }
}
