//! Sensitive-data analysis
//!
//! Two-tier classification for captured keystroke text:
//! - Primary: free-text verdict from an external reasoning backend
//! - Fallback: local, deterministic regex pattern detection

pub mod backend;
pub mod engine;
pub mod fallback;

pub use backend::{classification_prompt, AnalysisBackend, GeminiBackend, SecretString};
pub use engine::{AnalysisEngine, Verdict, VerdictSource, MIN_ANALYZABLE_CHARS, SKIP_VERDICT};
pub use fallback::{FallbackAnalyzer, FallbackReport, FALLBACK_MARKER, NO_FINDINGS_VERDICT};
