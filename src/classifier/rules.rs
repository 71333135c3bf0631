//! Keyword rules classifier — regex pattern matching over the complaint text.
//!
//! The offline counterpart to the language-model classifier: each category
//! carries a compiled pattern, first match wins, and a complaint that matches
//! nothing lands in the fallback category. Patterns are deliberately broad;
//! the follow-up questions recover the detail.

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::classifier::{Classification, Classifier, Complaint};
use crate::error::ClassifierError;

/// A single category rule with a compiled regex.
#[derive(Debug, Clone)]
struct CategoryRule {
    /// Category this rule classifies into.
    category: String,
    /// Compiled regex matched against the complaint text.
    regex: Regex,
}

/// Rule-based classifier over complaint text.
pub struct KeywordClassifier {
    rules: Vec<CategoryRule>,
}

impl KeywordClassifier {
    /// Create a classifier with the default per-category patterns.
    pub fn default_rules() -> Self {
        let rule = |category: &str, pattern: &str| CategoryRule {
            category: category.to_string(),
            regex: Regex::new(pattern).unwrap(),
        };

        // Order matters: first match wins. The more specific crime patterns
        // come before the broad accident ones.
        let rules = vec![
            rule(
                "Child safety",
                r"(?i)\b(missing child|child (is |has gone )?missing|kidnap|abduct|lost (my |our )?(son|daughter|child))\b",
            ),
            rule(
                "Murder / serious crime incident",
                r"(?i)\b(murder|homicide|dead body|stabbed|shot (at|dead)|killed)\b",
            ),
            rule(
                "Cyber crime incident",
                r"(?i)\b(hack(ed|ing)?|phishing|otp|upi fraud|online (fraud|scam)|cyber|account (was )?compromised|identity theft)\b",
            ),
            rule(
                "Women help desk",
                r"(?i)\b(harass(ment|ed|ing)?|stalk(er|ed|ing)?|molest|dowry|domestic (violence|abuse)|eve[- ]teasing)\b",
            ),
            rule(
                "Fire accident",
                r"(?i)\b(fire|burning|blaze|smoke (coming|everywhere)|caught fire)\b",
            ),
            rule(
                "Road accident",
                r"(?i)\b(road accident|car (crash|accident)|collision|hit[- ]and[- ]run|run over|bike accident|truck (hit|crash))\b",
            ),
            rule(
                "Public healthcare",
                r"(?i)\b(disease|outbreak|epidemic|food poisoning|hospital (is |has )?(full|closed|refusing)|contaminated (water|food)|no (doctors?|medicines?))\b",
            ),
        ];

        Self { rules }
    }

    /// A classifier with no rules — everything falls back (for testing).
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a custom rule. Later rules are checked after the defaults.
    pub fn add_rule(&mut self, category: &str, pattern: &str) -> Result<(), regex::Error> {
        self.rules.push(CategoryRule {
            category: category.to_string(),
            regex: Regex::new(pattern)?,
        });
        Ok(())
    }

    fn evaluate(&self, text: &str) -> Option<&str> {
        for rule in &self.rules {
            if rule.regex.is_match(text) {
                debug!(category = %rule.category, "Complaint matched keyword rule");
                return Some(&rule.category);
            }
        }
        None
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::default_rules()
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword-rules"
    }

    async fn classify(&self, complaint: &Complaint) -> Result<Classification, ClassifierError> {
        match self.evaluate(&complaint.text) {
            Some(category) => Ok(Classification {
                category: category.to_string(),
                location: complaint.location.clone(),
                other_details: None,
            }),
            None => {
                debug!("No keyword rule matched; falling back");
                let mut fallback = Classification::fallback();
                fallback.location = complaint.location.clone();
                Ok(fallback)
            }
        }
    }
}
