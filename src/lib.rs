//! Single-season fantasy leaderboard for wide receivers: PPR scoring,
//! usage qualification, weighted rank aggregation and top-N selection.

pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod leaderboard;
pub mod logging;
pub mod pipeline;
pub mod qualify;
pub mod rank;
pub mod report;
pub mod roster;
pub mod scoring;
pub mod stats;
pub mod store;
pub mod summary;
