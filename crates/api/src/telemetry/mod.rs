//! Tracing setup: structured JSON logs, plus OTLP trace export when configured.
//!
//! # Telemetry invariants
//!
//! - **No payload plaintext or key material** may appear in any span attribute
//!   or log field. Record ids and party ids are public metadata and may.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
