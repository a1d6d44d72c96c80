//! Per-repository metrics and their per-team accumulation.

pub mod repository;
pub mod team;

pub use repository::RepositoryMetrics;
pub use team::{TeamAggregate, TeamRollup};
