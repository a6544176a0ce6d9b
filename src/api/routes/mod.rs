//! API Routes
//!
//! Route handlers organized by functionality.

pub mod admin;
pub mod gameplay;
pub mod health;
pub mod leaderboard;
pub mod notifications;
pub mod payments;
pub mod profile;
pub mod scoring;
