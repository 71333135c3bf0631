//! Category catalog — the static table of incident categories and their
//! ordered follow-up questions.
//!
//! Loaded once at startup (built-in table or a TOML file) and never mutated
//! afterwards, so it can be shared read-only across any number of concurrent
//! intake conversations. Lookup is case-insensitive: classifier output and
//! catalog keys are both lower-cased at the boundary.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// The category every classifier falls back to when it cannot place a
/// complaint. A valid catalog always contains it.
pub const FALLBACK_CATEGORY: &str = "issue recorded";

/// One category with its ordered follow-up question prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Display name, original casing preserved.
    pub name: String,
    /// Follow-up prompts, in the order they are asked.
    pub questions: Vec<String>,
}

/// Immutable mapping from category name to follow-up questions.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    entries: Vec<CategoryEntry>,
}

/// On-disk catalog format (TOML).
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "category")]
    categories: Vec<CategoryEntry>,
}

impl CategoryCatalog {
    /// The built-in category table: the eight incident categories the
    /// classifier can emit, fallback included.
    pub fn builtin() -> Self {
        let entry = |name: &str, questions: &[&str]| CategoryEntry {
            name: name.to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
        };

        Self {
            entries: vec![
                entry(
                    "Child safety",
                    &[
                        "Child's name",
                        "Child's age",
                        "Description of clothing last worn",
                        "Last known location and time",
                        "Any known associates or suspects",
                    ],
                ),
                entry(
                    "Cyber crime incident",
                    &[
                        "Type of cyber crime",
                        "Description of the incident",
                        "Date and time of the incident",
                        "Any known suspects or source of the attack",
                        "Account number (if bank involved) (Optional)",
                        "Bank details (Name, Branch, IFSC code) (Optional)",
                    ],
                ),
                entry(
                    "Women help desk",
                    &[
                        "Nature of the incident",
                        "Time and location of the incident",
                        "Description of the perpetrator",
                        "Immediate support needed",
                        "Any witnesses or evidence available",
                    ],
                ),
                entry(
                    "Public healthcare",
                    &[
                        "Type of health concern",
                        "Number of people affected",
                        "Location of the healthcare issue",
                        "Urgency of the situation",
                        "Availability of medical assistance",
                    ],
                ),
                entry(
                    "Road accident",
                    &[
                        "Location of the accident",
                        "Time of the accident",
                        "Vehicles involved",
                        "Injuries or fatalities",
                        "Witnesses or available surveillance footage",
                    ],
                ),
                entry(
                    "Murder / serious crime incident",
                    &[
                        "Description of the incident",
                        "Date and time of the incident",
                        "Location of the incident",
                        "Victim information",
                        "Suspect information",
                        "Evidence or leads",
                    ],
                ),
                entry(
                    "Fire accident",
                    &[
                        "Location of the fire",
                        "Time the fire started",
                        "Known cause of the fire",
                        "Injuries or fatalities",
                        "Current status of the fire",
                    ],
                ),
                entry(
                    "Issue recorded",
                    &[
                        "Description of the incident",
                        "Timing",
                        "Help needed (Yes/No)",
                        "Current location",
                    ],
                ),
            ],
        }
    }

    /// Build a catalog from explicit entries, validating the invariants:
    /// fallback present, no empty question lists, no duplicate keys after
    /// case normalization. Names are trimmed so a padded name in a config
    /// file still matches its own lookup key.
    pub fn from_entries(mut entries: Vec<CategoryEntry>) -> Result<Self, CatalogError> {
        for entry in &mut entries {
            entry.name = entry.name.trim().to_string();
        }
        let mut seen: Vec<String> = Vec::with_capacity(entries.len());
        for entry in &entries {
            let key = entry.name.to_lowercase();
            if seen.contains(&key) {
                return Err(CatalogError::DuplicateCategory(entry.name.clone()));
            }
            if entry.questions.is_empty() {
                return Err(CatalogError::EmptyQuestions(entry.name.clone()));
            }
            seen.push(key);
        }
        if !seen.iter().any(|k| k == FALLBACK_CATEGORY) {
            return Err(CatalogError::MissingFallback(FALLBACK_CATEGORY));
        }
        Ok(Self { entries })
    }

    /// Load a catalog from a TOML file.
    ///
    /// Format: repeated `[[category]]` tables with `name` and `questions`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CatalogFile = toml::from_str(&raw).map_err(|e| CatalogError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_entries(file.categories)
    }

    /// Case-insensitive lookup of a category entry.
    pub fn get(&self, category: &str) -> Option<&CategoryEntry> {
        let key = category.trim().to_lowercase();
        self.entries.iter().find(|e| e.name.to_lowercase() == key)
    }

    /// Whether the catalog knows this category (after normalization).
    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// All entries, in declaration order.
    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    /// Display names of all categories, in declaration order.
    pub fn category_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Display names of the categories a classifier should choose from —
    /// everything except the fallback, which is a failure outcome rather
    /// than a choice.
    pub fn classifiable_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase() != FALLBACK_CATEGORY)
            .map(|e| e.name.as_str())
            .collect()
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
