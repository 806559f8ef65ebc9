// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # zenith-planner
//!
//! A personal planning engine tracking hierarchical time-scoped goals
//! (daily → weekly → monthly) and academic structures (class → subject →
//! chapter), persisted locally as a JSON document.
//!
//! ## Architecture
//!
//! - **Period calculus** (`period`): pure mapping between calendar dates and
//!   canonical period identifiers, ISO-8601 week numbering included
//! - **Goal graph engine** (`engine`): mirrored parent/child links between
//!   adjacent granularities, bottom-up progress aggregation, referential
//!   integrity across deletions
//! - **Academics** (`academics`): class/subject/chapter tree with activity
//!   counters; goals reference chapters loosely by id
//! - **Storage** (`store`): `StateStore` collaborator committed to after
//!   every mutation; JSON file or in-memory backends
//! - **Interchange** (`export`): validated whole-document import, indented
//!   timestamped export
//!
//! ## Library usage
//!
//! ```
//! use zenith_planner::engine::Engine;
//! use zenith_planner::goal::GoalDraft;
//! use zenith_planner::period::Granularity;
//!
//! let mut engine = Engine::in_memory();
//! let week = engine
//!     .add_goal(GoalDraft::new("Ship the draft", Granularity::Weekly, "2024-W24"))
//!     .unwrap();
//! let day = engine
//!     .add_goal(GoalDraft::new("Outline", Granularity::Daily, "2024-06-12"))
//!     .unwrap();
//! engine.link_goals(&day.id, &week.id).unwrap();
//! engine.set_progress(&day.id, 50).unwrap();
//! assert_eq!(engine.goal(&week.id).unwrap().progress, 50);
//! ```

pub mod academics;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod goal;
pub mod paths;
pub mod period;
pub mod state;
pub mod store;
