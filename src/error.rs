//! Rich diagnostic error types for the zenith-planner engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know exactly what went wrong
//! and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::period::Granularity;

/// Top-level error type for the planner.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text, source chains) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum PlannerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Period(#[from] PeriodError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transfer(#[from] TransferError),
}

// ---------------------------------------------------------------------------
// Period calculus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PeriodError {
    #[error("malformed period identifier: \"{period_id}\"")]
    #[diagnostic(
        code(zenith::period::malformed),
        help(
            "Period identifiers must be one of: `YYYY-MM-DD` (daily), \
             `YYYY-Www` (weekly, ISO-8601 week numbering), or `YYYY-MM` (monthly). \
             Check for out-of-range components such as month 13 or week 54."
        )
    )]
    Malformed { period_id: String },
}

// ---------------------------------------------------------------------------
// Goal graph engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("title must not be empty")]
    #[diagnostic(
        code(zenith::engine::empty_title),
        help("Provide a non-empty title; leading and trailing whitespace is ignored.")
    )]
    EmptyTitle,

    #[error("progress {value} is out of range (must be 0..=100)")]
    #[diagnostic(
        code(zenith::engine::progress_range),
        help("Progress is a percentage. Pass a value between 0 and 100 inclusive.")
    )]
    ProgressOutOfRange { value: u8 },

    #[error("goal not found: {id}")]
    #[diagnostic(
        code(zenith::engine::goal_not_found),
        help("Verify the goal id. List goals with `zenith goal list`.")
    )]
    GoalNotFound { id: String },

    #[error("class not found: {id}")]
    #[diagnostic(
        code(zenith::engine::class_not_found),
        help("Verify the class id. List classes with `zenith class list`.")
    )]
    ClassNotFound { id: String },

    #[error("subject not found: {id}")]
    #[diagnostic(
        code(zenith::engine::subject_not_found),
        help("Verify the subject id within the chosen class.")
    )]
    SubjectNotFound { id: String },

    #[error("chapter not found: {id}")]
    #[diagnostic(
        code(zenith::engine::chapter_not_found),
        help("Verify the chapter id within the chosen subject.")
    )]
    ChapterNotFound { id: String },

    #[error("cannot link a {child} goal under a {parent} goal")]
    #[diagnostic(
        code(zenith::engine::link_granularity),
        help(
            "A link is only valid one granularity step up: daily goals link under \
             weekly goals, weekly goals under monthly goals. Monthly goals have \
             no coarser tier."
        )
    )]
    GranularityNotAdjacent {
        child: Granularity,
        parent: Granularity,
    },

    #[error("parent period \"{actual}\" does not cover the child's period (expected \"{expected}\")")]
    #[diagnostic(
        code(zenith::engine::link_period),
        help(
            "The parent goal must live in the period that covers the child's period. \
             Use `zenith goal parents <id>` to list valid link targets."
        )
    )]
    PeriodMismatch { expected: String, actual: String },

    #[error("period \"{period_id}\" is not a canonical {granularity} identifier")]
    #[diagnostic(
        code(zenith::engine::period_shape),
        help(
            "The period id must match the goal's granularity: `YYYY-MM-DD` for daily, \
             `YYYY-Www` for weekly, `YYYY-MM` for monthly."
        )
    )]
    PeriodShapeMismatch {
        period_id: String,
        granularity: Granularity,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Period(#[from] PeriodError),
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(zenith::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(zenith::store::serialize),
        help("Failed to serialize planner state. This is a bug — please report it.")
    )]
    Serialize { message: String },
}

// ---------------------------------------------------------------------------
// Import/export errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TransferError {
    #[error("document is not valid JSON: {message}")]
    #[diagnostic(
        code(zenith::transfer::parse),
        help("The file must be a JSON document produced by `zenith export`.")
    )]
    Parse { message: String },

    #[error("document is missing required `goals` and `classes` arrays")]
    #[diagnostic(
        code(zenith::transfer::malformed),
        help(
            "A planner document is an object with two array fields: \
             goals and classes. The existing state was left untouched."
        )
    )]
    MalformedDocument,

    #[error("failed to write export to {path}: {source}")]
    #[diagnostic(
        code(zenith::transfer::write),
        help("Check that the export directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for functions returning planner results.
pub type PlannerResult<T> = std::result::Result<T, PlannerError>;
