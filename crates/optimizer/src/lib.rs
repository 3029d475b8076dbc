//! Carbon optimizer service: HTTP surface over the optimization engine

pub mod api;
pub mod config;
