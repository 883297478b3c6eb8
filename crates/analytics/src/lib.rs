//! # Gridiron Analytics
//!
//! This crate turns play-by-play and weekly box-score data into player
//! performance records. It is the part of the system that decides which plays
//! count and how they are reduced.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** It has no knowledge of where the data comes from. It
//!   depends only on `core-types`.
//! - **Stateless Calculation:** `AnalyticsEngine` holds no state. It takes
//!   slices of plays and produces records, so every scope (one game, a season,
//!   the league) goes through the same code.
//!
//! ## Public API
//!
//! - `resolver`: which of a team's games have been played, and the latest one.
//! - `filter`: which plays belong to a team and position group.
//! - `AnalyticsEngine`: per-role aggregates and league averages.
//! - `weekly`: per-player, per-week splits from box scores.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod filter;
pub mod report;
pub mod resolver;
mod stats;
pub mod weekly;

pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{
    LeagueAverage, PassingLine, PerformanceRecord, QbPerformance, RbPerformance, WrPerformance,
};
pub use weekly::{aggregate_weekly, WeeklyRecord};
