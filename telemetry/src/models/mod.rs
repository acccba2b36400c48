//! Data models for the Lightbeam telemetry pipeline.
//!
//! This module contains the structures the pipeline buffers and exports:
//! log records and finished spans.

pub mod log;
pub mod trace;

pub use log::{LogRecord, Severity};
pub use trace::{SpanContext, SpanData, SpanEvent};
