// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Terrasense` Fetch
//!
//! Resilient acquisition primitives for the `Terrasense` pipeline.
//!
//! This crate provides:
//!
//! - **[`HttpClient`]**: a single logical fetch against one upstream with
//!   bounded retries and backoff, classifying errors as retryable or terminal
//! - **[`RetryPolicy`]**: the retry policy object injected into the client
//! - **[`FallbackPipeline`]**: an ordered list of [`MoistureStrategy`] tiers
//!   tried in sequence until one produces a series
//! - **[`poll_until_done`]**: a bounded, cancellable poll driver for
//!   asynchronous extraction tasks
//! - **[`FetchError`]**: the error taxonomy shared by both provider adapters

pub mod client;
pub mod error;
pub mod pipeline;
pub mod poll;
pub mod retry;
pub mod strategy;

pub use client::HttpClient;
pub use error::FetchError;
pub use pipeline::{FallbackPipeline, PipelineOutcome, TierAttempt};
pub use poll::{poll_until_done, PollPolicy};
pub use retry::RetryPolicy;
pub use strategy::{MoistureStrategy, SourceTier, StrategyOutcome};
