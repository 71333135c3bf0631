//! Complaint classification.
//!
//! Two interchangeable classifiers sit behind the [`Classifier`] trait:
//! a regex keyword matcher (no network, always available) and a hosted
//! language-model call. Both resolve to a category drawn from the catalog's
//! closed set, with "issue recorded" as the fallback when nothing fits.

mod hf;
mod rules;

pub use hf::{HuggingFaceClassifier, HuggingFaceConfig, classification_prompt, parse_analysis};
pub use rules::KeywordClassifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// A citizen complaint as submitted, before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    /// Free-text description of the incident.
    pub text: String,
    /// Reporter name, if given.
    pub reporter_name: Option<String>,
    /// Reporter phone, if given.
    pub reporter_phone: Option<String>,
    /// Location as typed by the reporter, if given.
    pub location: Option<String>,
}

/// The classifier's verdict on a complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Category label; matched case-insensitively against the catalog.
    pub category: String,
    /// Location extracted from the complaint text, if any.
    pub location: Option<String>,
    /// Other extracted entities (time, people involved), free-form.
    pub other_details: Option<String>,
}

impl Classification {
    /// A bare fallback verdict with no extracted entities.
    pub fn fallback() -> Self {
        Self {
            category: crate::catalog::FALLBACK_CATEGORY.to_string(),
            location: None,
            other_details: None,
        }
    }
}

/// Maps a free-text complaint to an incident category.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short name for logging ("keyword-rules", "huggingface/...").
    fn name(&self) -> &str;

    /// Classify a complaint.
    ///
    /// Implementations return the fallback category rather than an error when
    /// the complaint simply doesn't fit anywhere; errors are reserved for the
    /// call itself failing (network, malformed model output).
    async fn classify(&self, complaint: &Complaint) -> Result<Classification, ClassifierError>;
}
