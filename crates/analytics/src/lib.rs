//! # Bridge Analytics Engine
//!
//! This crate turns a normalized ledger of bridge transfers into the metric
//! tables behind the program report.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files,
//!   terminals or configuration sources. It depends only on `core-types` (Layer 0).
//! - **Immutable Snapshots:** Every calculation borrows the event set and returns a
//!   freshly built table. Nothing is cached or mutated between metrics, so any two
//!   metrics can be computed independently and in any order.
//!
//! ## Public API
//!
//! - `partition`: splits events into before/during/after the program window.
//! - `AnalyticsEngine`: one method per metric table.
//! - `ReportBuilder`: assembles the three report sections and collects warnings.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod partition;
pub mod report;
pub mod tables;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, GroupField};
pub use error::AnalyticsError;
pub use partition::{Partitions, partition};
pub use report::{
    FullReport, OverviewReport, ProgramImpactReport, ProgramWindowSummary, ReportBuilder, ReportSettings,
    ReportWarning, SectionReport, UserBehaviorReport,
};
pub use tables::{
    CohortEntry, CohortWeek, DailyVolume, DirectionalFlow, GroupTotal, HistogramBin,
    HoldingPeriod, PhaseRate, RetentionFlag,
};
