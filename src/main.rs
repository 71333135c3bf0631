use std::sync::Arc;

use anyhow::Context;

use seva_intake::catalog::CategoryCatalog;
use seva_intake::classifier::{
    Classifier, HuggingFaceClassifier, HuggingFaceConfig, KeywordClassifier,
};
use seva_intake::config::IntakeConfig;
use seva_intake::geocode::MapboxGeocoder;
use seva_intake::server::{AppState, intake_routes};
use seva_intake::store::{CsvStore, ImageStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = IntakeConfig::from_env();

    let catalog = match &config.catalog_path {
        Some(path) => CategoryCatalog::load(path)
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => CategoryCatalog::builtin(),
    };

    let classifier: Arc<dyn Classifier> = match config.hf_api_token.clone() {
        Some(token) => {
            let mut hf_config = HuggingFaceConfig::new(token);
            if let Some(model) = config.hf_model.clone() {
                hf_config.model = model;
            }
            let categories = catalog
                .classifiable_names()
                .into_iter()
                .map(String::from)
                .collect();
            Arc::new(HuggingFaceClassifier::new(hf_config, categories))
        }
        None => Arc::new(KeywordClassifier::default_rules()),
    };

    let geocoder = config.mapbox_token.clone().map(MapboxGeocoder::new);
    let images = ImageStore::new(config.uploads_dir.clone());

    eprintln!("🚨 Seva Intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{}/api/complaints", config.bind_addr);
    eprintln!("   Classifier: {}", classifier.name());
    eprintln!("   Categories: {}", catalog.entries().len());
    eprintln!(
        "   Geocoding: {}",
        if geocoder.is_some() { "mapbox" } else { "disabled" }
    );
    eprintln!(
        "   Reports: {} / {} (anonymous)",
        config.named_csv.display(),
        config.anonymous_csv.display()
    );
    eprintln!("   Uploads: {}\n", images.dir().display());

    let store = Arc::new(CsvStore::new(
        config.named_csv.clone(),
        config.anonymous_csv.clone(),
    ));

    let state = AppState::new(catalog, classifier, store, images, geocoder);
    let app = intake_routes(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Intake server started");
    axum::serve(listener, app).await?;

    Ok(())
}
