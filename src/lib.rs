//! Movie recommendation service.
//!
//! Turns a handful of liked movies into a ranked, genre-diversified list of
//! recommendations using collaborative signals from the like/favorite corpus,
//! adjusted by genre overlap, release era, recency and Bayesian smoothing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
