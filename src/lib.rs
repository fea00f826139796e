//! Burnout self-assessment service: habit metrics in, a 0–100 burnout score,
//! tiered recommendations and per-user history out.

pub mod app;
pub mod assessment;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod notify;
pub mod state;
