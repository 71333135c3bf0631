//! Persistence — append-only CSV report log and image uploads.

mod csv_store;
mod images;

pub use csv_store::CsvStore;
pub use images::ImageStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::StoreError;
use crate::geocode::Coordinates;

/// A completed intake report, ready for durable recording.
///
/// Primary fields first, then whatever the classifier extracted, then the
/// follow-up answers in question order. `answers` is empty when the category
/// had no catalog entry (the no-follow-up path).
#[derive(Debug, Clone, Serialize)]
pub struct IncidentReport {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub reporter_name: Option<String>,
    pub reporter_phone: Option<String>,
    pub complaint: String,
    pub category: String,
    pub location: Option<String>,
    pub other_details: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub image_file: Option<String>,
    /// Ordered `(question, answer)` pairs from the wizard.
    pub answers: Vec<(String, String)>,
    /// Reporter asked to stay anonymous.
    pub anonymous: bool,
}

impl IncidentReport {
    /// Flatten into one CSV record.
    ///
    /// Layout: id, received_at, name, phone, complaint, category, location,
    /// other details, latitude, longitude, image file, then one column per
    /// follow-up answer. Anonymous reports get blank name/phone columns no
    /// matter what was submitted.
    pub fn to_record(&self) -> Vec<String> {
        let (name, phone) = if self.anonymous {
            (String::new(), String::new())
        } else {
            (
                self.reporter_name.clone().unwrap_or_default(),
                self.reporter_phone.clone().unwrap_or_default(),
            )
        };

        let mut record = vec![
            self.id.to_string(),
            self.received_at.to_rfc3339(),
            name,
            phone,
            self.complaint.clone(),
            self.category.clone(),
            self.location.clone().unwrap_or_default(),
            self.other_details.clone().unwrap_or_default(),
            self.coordinates
                .map(|c| c.latitude.to_string())
                .unwrap_or_default(),
            self.coordinates
                .map(|c| c.longitude.to_string())
                .unwrap_or_default(),
            self.image_file.clone().unwrap_or_default(),
        ];
        record.extend(self.answers.iter().map(|(_, a)| a.clone()));
        record
    }
}

/// Durable report recording.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Append one report to the log.
    async fn append(&self, report: &IncidentReport) -> Result<(), StoreError>;
}
