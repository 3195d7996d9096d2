//! Warden Metrics - Observability for governance decisions
//!
//! Two observers over the decision stream, both strictly isolated from
//! governance correctness: the kernel behaves identically whether they are
//! attached, failing, or absent.
//!
//! - [`GovernanceRegistry`] — Prometheus counters and gauges, exported in
//!   text format for scraping
//! - [`LocalMetricsSink`] — offline-first JSONL snapshot appender that
//!   never propagates a failure

pub mod local;
pub mod registry;

pub use local::LocalMetricsSink;
pub use registry::GovernanceRegistry;
