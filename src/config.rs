//! Runtime configuration, read from the environment.

use std::path::PathBuf;

use secrecy::SecretString;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: String,
    /// CSV file for named reports.
    pub named_csv: PathBuf,
    /// CSV file for anonymous reports.
    pub anonymous_csv: PathBuf,
    /// Directory for uploaded incident images.
    pub uploads_dir: PathBuf,
    /// Optional TOML catalog file; the built-in table is used when absent.
    pub catalog_path: Option<PathBuf>,
    /// HuggingFace inference token; the keyword classifier is used when absent.
    pub hf_api_token: Option<SecretString>,
    /// Model repo id for the hosted classifier.
    pub hf_model: Option<String>,
    /// Mapbox access token; geocoding is skipped when absent.
    pub mapbox_token: Option<SecretString>,
}

impl IntakeConfig {
    /// Build from `SEVA_*` environment variables, with defaults matching the
    /// flat-file layout of the original intake system.
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("SEVA_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let bind_addr =
            std::env::var("SEVA_BIND_ADDR").unwrap_or_else(|_| format!("0.0.0.0:{port}"));

        let named_csv = std::env::var("SEVA_USER_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("user_data.csv"));
        let anonymous_csv = std::env::var("SEVA_ANONYMOUS_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("anonymous_data.csv"));
        let uploads_dir = std::env::var("SEVA_UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploaded_images"));

        let catalog_path = std::env::var("SEVA_CATALOG_FILE").ok().map(PathBuf::from);

        let hf_api_token = std::env::var("HUGGINGFACEHUB_API_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        let hf_model = std::env::var("SEVA_HF_MODEL").ok().filter(|s| !s.is_empty());

        let mapbox_token = std::env::var("MAPBOX_API_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        Self {
            bind_addr,
            named_csv,
            anonymous_csv,
            uploads_dir,
            catalog_path,
            hf_api_token,
            hf_model,
            mapbox_token,
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            named_csv: PathBuf::from("user_data.csv"),
            anonymous_csv: PathBuf::from("anonymous_data.csv"),
            uploads_dir: PathBuf::from("uploaded_images"),
            catalog_path: None,
            hf_api_token: None,
            hf_model: None,
            mapbox_token: None,
        }
    }
}
