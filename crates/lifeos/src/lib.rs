//! LifeOS Backend Library
//!
//! Core components for the LifeOS personal productivity backend: the agent
//! relay, the chat turn loop, and the per-user records behind the dashboards.

pub mod api;
pub mod auth;
pub mod chat;
pub mod db;
pub mod kpi;
pub mod profile;
pub mod projects;
pub mod relay;
