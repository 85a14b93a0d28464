//! Deterministic fallback classifier
//!
//! Pattern-based detection used whenever the reasoning backend is
//! unavailable or returns an unusable response. Total by construction:
//! no external calls, bounded running time, never fails. Detection is
//! intentionally conservative — false positives are acceptable, this is
//! a safety net rather than the primary detector.
//!
//! Detectors run in a fixed order that determines verdict line order:
//! email, phone, card, credential keyword, opaque token.

use regex::Regex;

/// Marker line identifying a verdict as fallback-sourced.
pub const FALLBACK_MARKER: &str = "[FALLBACK ANALYSIS]";

/// Fixed verdict when no detector matches.
pub const NO_FINDINGS_VERDICT: &str = "No sensitive information detected (fallback analysis)";

/// Case-insensitive credential indicators; only the first match is reported.
const CREDENTIAL_KEYWORDS: [&str; 7] = [
    "password", "passwd", "pwd", "pass", "secret", "key", "token",
];

/// Maximum opaque-token examples included in a verdict line.
const MAX_TOKEN_EXAMPLES: usize = 3;

/// One detector's contribution to a fallback verdict.
#[derive(Debug, Clone)]
pub struct Finding {
    /// Detector name (advisory category label)
    pub category: &'static str,
    /// Formatted verdict line for this detector
    pub line: String,
}

/// Combined fallback output: the verdict text plus the categories that fired.
#[derive(Debug, Clone)]
pub struct FallbackReport {
    pub verdict: String,
    pub categories: Vec<String>,
}

/// Regex-based fallback classifier with precompiled patterns.
pub struct FallbackAnalyzer {
    email: Regex,
    phone: Regex,
    card: Regex,
    token: Regex,
}

impl FallbackAnalyzer {
    pub fn new() -> Self {
        // Static patterns, compilation cannot fail
        Self {
            email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                .expect("email pattern should always compile"),
            phone: Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b")
                .expect("phone pattern should always compile"),
            card: Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b")
                .expect("card pattern should always compile"),
            token: Regex::new(r"\b[A-Za-z0-9]{20,}\b")
                .expect("token pattern should always compile"),
        }
    }

    /// Run all detectors over `text` and build the fallback report.
    pub fn analyze(&self, text: &str) -> FallbackReport {
        let findings = self.findings(text);

        if findings.is_empty() {
            return FallbackReport {
                verdict: NO_FINDINGS_VERDICT.to_string(),
                categories: Vec::new(),
            };
        }

        let lines: Vec<String> = findings
            .iter()
            .map(|f| format!("\u{2022} {}", f.line))
            .collect();
        FallbackReport {
            verdict: format!("{}\n{}", FALLBACK_MARKER, lines.join("\n")),
            categories: findings.iter().map(|f| f.category.to_string()).collect(),
        }
    }

    /// Independent detectors, invoked in the documented order.
    fn findings(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        let emails: Vec<&str> = self.email.find_iter(text).map(|m| m.as_str()).collect();
        if !emails.is_empty() {
            findings.push(Finding {
                category: "email",
                line: format!("Email addresses: {}", emails.join(", ")),
            });
        }

        let phones: Vec<&str> = self.phone.find_iter(text).map(|m| m.as_str()).collect();
        if !phones.is_empty() {
            findings.push(Finding {
                category: "phone",
                line: format!("Phone numbers: {}", phones.join(", ")),
            });
        }

        let cards: Vec<&str> = self.card.find_iter(text).map(|m| m.as_str()).collect();
        if !cards.is_empty() {
            findings.push(Finding {
                category: "credit_card",
                line: format!("Potential credit card numbers: {}", cards.join(", ")),
            });
        }

        let lower = text.to_lowercase();
        if let Some(keyword) = CREDENTIAL_KEYWORDS.iter().find(|kw| lower.contains(*kw)) {
            findings.push(Finding {
                category: "credential_keyword",
                line: format!(
                    "Potential password-related content detected (contains '{}')",
                    keyword
                ),
            });
        }

        let tokens: Vec<&str> = self.token.find_iter(text).map(|m| m.as_str()).collect();
        if !tokens.is_empty() {
            let truncated = if tokens.len() > MAX_TOKEN_EXAMPLES { "..." } else { "" };
            findings.push(Finding {
                category: "api_key",
                line: format!(
                    "Potential API keys: {}{}",
                    tokens[..tokens.len().min(MAX_TOKEN_EXAMPLES)].join(", "),
                    truncated
                ),
            });
        }

        findings
    }
}

impl Default for FallbackAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> FallbackAnalyzer {
        FallbackAnalyzer::new()
    }

    #[test]
    fn test_detect_email() {
        let report = analyzer().analyze("contact me at user@example.com please");
        assert!(report.verdict.starts_with(FALLBACK_MARKER));
        assert!(report
            .verdict
            .contains("Email addresses: user@example.com"));
        assert_eq!(report.categories, vec!["email"]);
    }

    #[test]
    fn test_detect_phone() {
        let report = analyzer().analyze("call 555-123-4567 tomorrow");
        assert!(report.verdict.contains("Phone numbers: 555-123-4567"));
    }

    #[test]
    fn test_detect_credit_card() {
        let report = analyzer().analyze("card 4111-1111-1111-1111 expires soon");
        assert!(report
            .verdict
            .contains("Potential credit card numbers: 4111-1111-1111-1111"));
        assert!(report.categories.contains(&"credit_card".to_string()));
    }

    #[test]
    fn test_detect_credential_keyword_first_only() {
        let report = analyzer().analyze("my password is hunter2 and the secret too");
        assert!(report
            .verdict
            .contains("Potential password-related content detected (contains 'password')"));
        // Only the first keyword is reported
        assert!(!report.verdict.contains("contains 'secret'"));
    }

    #[test]
    fn test_detect_tokens_capped_at_three() {
        let text = "AAAAAAAAAAAAAAAAAAAA1 BBBBBBBBBBBBBBBBBBBB2 CCCCCCCCCCCCCCCCCCCC3 DDDDDDDDDDDDDDDDDDDD4";
        let report = analyzer().analyze(text);
        assert!(report.verdict.contains("Potential API keys:"));
        assert!(report.verdict.ends_with("..."));
        assert!(!report.verdict.contains("DDDDDDDDDDDDDDDDDDDD4"));
    }

    #[test]
    fn test_tokens_without_truncation_marker() {
        let report = analyzer().analyze("token AAAAAAAAAAAAAAAAAAAA1 only");
        // "token" keyword also fires; the API key line must not be truncated
        assert!(report.verdict.contains("Potential API keys: AAAAAAAAAAAAAAAAAAAA1"));
        assert!(!report.verdict.ends_with("..."));
    }

    #[test]
    fn test_clean_text_fixed_message() {
        let report = analyzer().analyze("the weather is nice today");
        assert_eq!(report.verdict, NO_FINDINGS_VERDICT);
        assert!(report.categories.is_empty());
    }

    #[test]
    fn test_line_order_is_fixed() {
        let report = analyzer().analyze(
            "user@example.com 555-123-4567 4111 1111 1111 1111 password AAAAAAAAAAAAAAAAAAAA1",
        );
        let verdict = &report.verdict;
        let email_pos = verdict.find("Email addresses").unwrap();
        let phone_pos = verdict.find("Phone numbers").unwrap();
        let card_pos = verdict.find("Potential credit card").unwrap();
        let keyword_pos = verdict.find("password-related").unwrap();
        let token_pos = verdict.find("Potential API keys").unwrap();
        assert!(email_pos < phone_pos);
        assert!(phone_pos < card_pos);
        assert!(card_pos < keyword_pos);
        assert!(keyword_pos < token_pos);
        assert_eq!(
            report.categories,
            vec!["email", "phone", "credit_card", "credential_keyword", "api_key"]
        );
    }

    #[test]
    fn test_total_on_awkward_inputs() {
        let a = analyzer();
        assert_eq!(a.analyze("").verdict, NO_FINDINGS_VERDICT);
        let long = "x".repeat(1_000_000);
        let _ = a.analyze(&long);
        let _ = a.analyze("密码 пароль 🤷 \u{0} mixed");
    }

    #[test]
    fn test_multiple_emails_comma_joined() {
        let report = analyzer().analyze("a@example.com b@example.org");
        assert!(report
            .verdict
            .contains("Email addresses: a@example.com, b@example.org"));
    }
}
