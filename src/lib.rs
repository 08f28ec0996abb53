//! Gist CRM sync server library.
//!
//! Bridges a Pipedrive CRM with the GitHub gist API: tracked users are CRM
//! deals under a sentinel organization, and every new gist becomes an unseen
//! activity on the user's person record.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
