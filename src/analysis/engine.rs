//! Two-tier analysis engine
//!
//! Chains the primary classifier (external reasoning backend) with the
//! deterministic fallback classifier. `analyze` is infallible: every
//! backend failure is absorbed here and resolved to a fallback verdict,
//! so the submission path never observes which tier produced the result.

use std::sync::Arc;

use crate::analysis::backend::{classification_prompt, AnalysisBackend};
use crate::analysis::fallback::FallbackAnalyzer;

/// Minimum text length (in characters) worth classifying.
pub const MIN_ANALYZABLE_CHARS: usize = 3;

/// Sentinel verdict for texts below the minimum length.
pub const SKIP_VERDICT: &str = "Analysis skipped (text too short)";

/// Which classifier produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSource {
    Primary,
    Fallback,
}

/// Classification verdict for one submission. Immutable once produced.
#[derive(Debug, Clone)]
pub struct Verdict {
    /// Free-text verdict, persisted verbatim to the audit log
    pub text: String,
    /// Classifier that produced the verdict
    pub source: VerdictSource,
    /// Advisory category names; populated by the fallback path only
    /// (primary verdicts are trusted but never parsed)
    pub categories: Vec<String>,
}

/// Two-tier sensitive-data analyzer. Stateless; concurrent calls are
/// independent and require no coordination.
pub struct AnalysisEngine {
    backend: Option<Arc<dyn AnalysisBackend>>,
    fallback: FallbackAnalyzer,
}

impl AnalysisEngine {
    /// Create an engine. `None` runs fallback-only.
    pub fn new(backend: Option<Arc<dyn AnalysisBackend>>) -> Self {
        Self {
            backend,
            fallback: FallbackAnalyzer::new(),
        }
    }

    /// Classify a text fragment in its application context.
    ///
    /// Never fails: backend errors degrade to the fallback classifier.
    pub async fn analyze(&self, text: &str, context_label: &str) -> Verdict {
        if text.chars().count() < MIN_ANALYZABLE_CHARS {
            return Verdict {
                text: SKIP_VERDICT.to_string(),
                source: VerdictSource::Fallback,
                categories: Vec::new(),
            };
        }

        if let Some(backend) = &self.backend {
            let prompt = classification_prompt(text, context_label);
            match backend.generate(&prompt).await {
                Ok(response) => {
                    let trimmed = response.trim();
                    if !trimmed.is_empty() {
                        return Verdict {
                            text: trimmed.to_string(),
                            source: VerdictSource::Primary,
                            categories: Vec::new(),
                        };
                    }
                    tracing::warn!(
                        backend = backend.identifier(),
                        "Primary classifier returned empty verdict, using fallback"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        backend = backend.identifier(),
                        error = %e,
                        "Primary classifier failed, using fallback"
                    );
                }
            }
        }

        let report = self.fallback.analyze(text);
        Verdict {
            text: report.verdict,
            source: VerdictSource::Fallback,
            categories: report.categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock backend returning a canned response and counting calls
    struct MockBackend {
        response: String,
        calls: AtomicUsize,
    }

    impl MockBackend {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AnalysisBackend for MockBackend {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        fn identifier(&self) -> &str {
            "mock"
        }
    }

    /// Mock backend that always fails with a transport-style error
    struct FailingBackend;

    #[async_trait]
    impl AnalysisBackend for FailingBackend {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(Error::Backend("connection refused".to_string()))
        }

        fn identifier(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_short_text_skips_both_classifiers() {
        let backend = Arc::new(MockBackend::new("should not be called"));
        let engine = AnalysisEngine::new(Some(backend.clone()));

        for text in ["", "a", "ab"] {
            let verdict = engine.analyze(text, "Notepad").await;
            assert_eq!(verdict.text, SKIP_VERDICT);
            assert_eq!(verdict.source, VerdictSource::Fallback);
            assert!(verdict.categories.is_empty());
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_success_returns_trimmed_verbatim() {
        let backend = Arc::new(MockBackend::new("  No sensitive information detected  \n"));
        let engine = AnalysisEngine::new(Some(backend));

        let verdict = engine.analyze("hello world", "Terminal").await;
        assert_eq!(verdict.text, "No sensitive information detected");
        assert_eq!(verdict.source, VerdictSource::Primary);
        assert!(verdict.categories.is_empty());
    }

    #[tokio::test]
    async fn test_primary_failure_matches_fallback_output() {
        let engine = AnalysisEngine::new(Some(Arc::new(FailingBackend)));
        let text = "my password is hunter2";

        let verdict = engine.analyze(text, "Notepad").await;
        assert_eq!(verdict.source, VerdictSource::Fallback);

        let expected = FallbackAnalyzer::new().analyze(text);
        assert_eq!(verdict.text, expected.verdict);
        assert_eq!(verdict.categories, expected.categories);
        assert!(verdict
            .text
            .contains("Potential password-related content detected (contains 'password')"));
    }

    #[tokio::test]
    async fn test_empty_primary_response_degrades_to_fallback() {
        let engine = AnalysisEngine::new(Some(Arc::new(MockBackend::new("   \n  "))));
        let verdict = engine.analyze("call 555-123-4567", "Dialer").await;
        assert_eq!(verdict.source, VerdictSource::Fallback);
        assert!(verdict.text.contains("Phone numbers: 555-123-4567"));
    }

    #[tokio::test]
    async fn test_no_backend_runs_fallback_only() {
        let engine = AnalysisEngine::new(None);
        let verdict = engine.analyze("nothing suspicious here really", "Editor").await;
        assert_eq!(verdict.source, VerdictSource::Fallback);
        assert_eq!(
            verdict.text,
            crate::analysis::fallback::NO_FINDINGS_VERDICT
        );
    }
}
