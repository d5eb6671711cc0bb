//! Data models shared by both pipeline stages.

pub mod config;
pub mod event;
pub mod expense;
pub mod record;
