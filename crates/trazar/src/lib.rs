//! Trazar: quality-validation and stress-test harness for raster-to-vector
//! conversion services.
//!
//! Trazar (Spanish: "to trace/sketch") drives an HTTP vectorization service
//! through authenticated multipart uploads, judges the structural soundness of
//! the vector output it gets back, and exercises the service's protocol layer
//! under a bounded concurrent burst.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     TRAZAR Architecture                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌───────────┐   ┌────────────────────┐   │
//! │  │ Orchestrator │──►│ Transport │──►│ Vectorization      │   │
//! │  │ / Stress     │   │ + Session │   │ Service (external) │   │
//! │  └──────┬───────┘   └───────────┘   └────────────────────┘   │
//! │         │ svg output                                         │
//! │  ┌──────▼───────┐   ┌───────────┐                            │
//! │  │ Validator    │──►│ Report    │                            │
//! │  └──────────────┘   └───────────┘                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod multipart;
mod orchestrator;
mod report;
mod result;
mod session;
mod stress;
mod transport;
mod validator;

pub use multipart::{encode, MultipartBody};
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunOutcome, TestCase};
pub use report::{generate_report, render_text, write_json, MethodBreakdown, Report, ReportSummary};
pub use result::{TrazarError, TrazarResult};
pub use session::{Credentials, Session};
pub use stress::{
    burst_acceptable, CheckOutcome, CheckStatus, StressDriver, StressRunStats,
    ACCEPTED_BURST_STATUSES, BURST_SIZE,
};
pub use transport::{HttpReply, Transport};
pub use validator::{
    resolve_profile, validate, ComplexityTier, Method, QualityProfile, QualityValidator,
    TestResult, ValidationMetrics,
};
