//! Keysentry — keystroke capture analysis server
//!
//! Ingests streams of captured keystroke text tagged with a source
//! application, classifies each fragment for sensitive information
//! (credentials, PII, secrets), and persists both the raw text and the
//! classification verdict to a durable, human-auditable log file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   HTTP Listener (axum)                  │
//! │   POST /log        GET /health        GET /stats        │
//! └───────────┬─────────────────────────────────┬───────────┘
//!             │                                 │
//! ┌───────────▼───────────────┐     ┌───────────▼───────────┐
//! │      AnalysisEngine       │     │       AuditLog        │
//! │  primary: Gemini backend  │     │  serialized appends   │
//! │  fallback: regex patterns │     │  separator-scan stats │
//! └───────────────────────────┘     └───────────────────────┘
//! ```
//!
//! The engine is infallible: backend failures degrade to the local
//! fallback classifier and the submission path never observes which tier
//! produced the verdict. The audit log is the sole persisted state;
//! appends are serialized under one mutex and never interleave.
//!
//! ## Modules
//!
//! - [`analysis`]: two-tier sensitive-data classification
//! - [`audit`]: append-only audit log writer and statistics
//! - [`server`]: HTTP listener and handlers
//! - [`config`]: configuration management

pub mod analysis;
pub mod audit;
pub mod config;
pub mod error;
pub mod server;

pub use analysis::{AnalysisBackend, AnalysisEngine, FallbackAnalyzer, GeminiBackend, Verdict, VerdictSource};
pub use audit::{AuditLog, LogStats};
pub use config::KeysentryConfig;
pub use error::{Error, Result};
pub use server::{app_router, serve, AppState};
