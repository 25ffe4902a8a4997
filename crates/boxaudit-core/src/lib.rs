//! Core types and the calculation pipeline for the boxaudit service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.
//!
//! The pipeline is pure and deterministic: a flat list of [`answer::Answer`]
//! records is extracted into structured aggregates ([`extract`]), projected
//! into named KPIs ([`kpi`]), scored against fixed business thresholds
//! ([`score`]), and turned into prioritised recommendations ([`recommend`]).

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod answer;
pub mod audit;
pub mod error;
pub mod extract;
pub mod health;
pub mod insights;
pub mod kpi;
pub mod pipeline;
pub mod recommend;
pub mod score;
pub mod store;
pub mod thresholds;

pub use error::{Error, Result};
