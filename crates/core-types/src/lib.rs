//! # Gridiron Core Types
//!
//! The shared data model for the whole workspace: schedule entries, play-by-play
//! rows, weekly box-score rows and team descriptors, plus the small enums used to
//! classify them. This crate has no knowledge of where the data comes from or
//! how it is aggregated.

pub mod enums;
pub mod error;
pub mod season;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{PlayType, Role};
pub use error::CoreError;
pub use season::{current_season, normalize_team, parse_team, same_team};
pub use structs::{Game, Participant, Participation, Play, TeamDescriptor, WeeklyStatRow};
