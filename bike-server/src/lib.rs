//! Bike-share station dashboard.
//!
//! Fetches a GBFS system's station status and station information feeds,
//! joins them into one record per station, assigns display availability
//! and serves summary metrics, rankings and filters over the result.

pub mod availability;
pub mod config;
pub mod domain;
pub mod gbfs;
pub mod metrics;
pub mod nearby;
pub mod reconcile;
pub mod session;
pub mod web;
