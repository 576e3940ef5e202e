//! In-memory ranked leaderboard with asynchronous durable write-back
//!
//! Reads are served from a ranked store and prefix index held in memory.
//! Rating changes land there first and reach SQLite later through the
//! bounded update pipeline.

pub mod api;
pub mod config;
pub mod db;
pub mod deadline;
pub mod error;
pub mod pipeline;
pub mod ranking;
pub mod services;
pub mod sqlite_pragma;

pub use error::LeaderboardError;
