//! # Engine Module
//!
//! Configuration, error taxonomy, result records and progress reporting shared by the
//! scoring workflows.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Fingerprint parameters and resource paths, with a builder
//! - **Error Handling** ([`error`]) - Failures that prevent a pipeline from starting
//! - **Results** ([`result`]) - The per-molecule [`result::PredictionResult`] and its [`result::Status`]
//! - **Progress Monitoring** ([`progress`]) - Callback-based reporting for batch runs
//!
//! Scoring never returns an error. Every failure mode after startup is a
//! [`result::Status`] on the result record.

pub mod config;
pub mod error;
pub mod progress;
pub mod result;
