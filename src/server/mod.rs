//! HTTP surface for the intake flow.
//!
//! One conversation per submitted complaint: `POST /api/complaints` classifies
//! the complaint and opens a follow-up wizard session; the client then drives
//! the session with `POST /api/complaints/{id}/answers` (one answer, a skip,
//! or the whole batch) until completion, at which point the report is appended
//! to the CSV log and the session is discarded.
//!
//! Sessions live in a keyed map behind one lock — a session is only ever
//! mutated by the request currently holding the lock, so two tabs racing on
//! the same conversation serialize instead of corrupting the cursor.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::CategoryCatalog;
use crate::classifier::{Classification, Classifier, Complaint};
use crate::error::WizardError;
use crate::geocode::{Coordinates, MapboxGeocoder};
use crate::store::{ImageStore, IncidentReport, ReportStore};
use crate::wizard::WizardSession;

/// Ceiling on simultaneously open conversations. Abandoned sessions are never
/// completed, so without a cap the map would grow for the life of the process.
const MAX_LIVE_CONVERSATIONS: usize = 1024;

/// An in-flight intake conversation: the complaint, what the classifier made
/// of it, and the wizard session walking the follow-up questions.
struct Conversation {
    complaint: Complaint,
    classification: Classification,
    coordinates: Option<Coordinates>,
    image_file: Option<String>,
    anonymous: bool,
    received_at: DateTime<Utc>,
    session: WizardSession,
    /// Monotonic touch sequence; the lowest value is evicted first when the
    /// map hits [`MAX_LIVE_CONVERSATIONS`].
    last_touched: u64,
}

impl Conversation {
    fn into_report(self, id: Uuid) -> IncidentReport {
        IncidentReport {
            id,
            received_at: self.received_at,
            reporter_name: self.complaint.reporter_name,
            reporter_phone: self.complaint.reporter_phone,
            complaint: self.complaint.text,
            category: self.classification.category,
            location: self.classification.location,
            other_details: self.classification.other_details,
            coordinates: self.coordinates,
            image_file: self.image_file,
            answers: self.session.into_answers(),
            anonymous: self.anonymous,
        }
    }
}

/// Shared state for the intake routes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: CategoryCatalog,
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn ReportStore>,
    images: ImageStore,
    geocoder: Option<MapboxGeocoder>,
    conversations: Mutex<HashMap<Uuid, Conversation>>,
    conversation_limit: usize,
    touch_counter: AtomicU64,
}

impl AppStateInner {
    fn next_touch(&self) -> u64 {
        self.touch_counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl AppState {
    pub fn new(
        catalog: CategoryCatalog,
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn ReportStore>,
        images: ImageStore,
        geocoder: Option<MapboxGeocoder>,
    ) -> Self {
        Self::with_conversation_limit(
            catalog,
            classifier,
            store,
            images,
            geocoder,
            MAX_LIVE_CONVERSATIONS,
        )
    }

    pub fn with_conversation_limit(
        catalog: CategoryCatalog,
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn ReportStore>,
        images: ImageStore,
        geocoder: Option<MapboxGeocoder>,
        conversation_limit: usize,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                classifier,
                store,
                images,
                geocoder,
                conversations: Mutex::new(HashMap::new()),
                conversation_limit,
                touch_counter: AtomicU64::new(0),
            }),
        }
    }
}

// ── JSON protocol ───────────────────────────────────────────────────

/// Body of `POST /api/complaints`.
#[derive(Debug, Deserialize)]
pub struct SubmitComplaint {
    /// Free-text complaint. Required.
    pub text: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Keep identity out of the named report log.
    #[serde(default)]
    pub anonymous: bool,
}

/// The follow-up question the client should render next.
#[derive(Debug, Serialize)]
pub struct FollowUp {
    pub question: String,
    pub index: usize,
    pub total: usize,
}

/// Response to a submitted complaint.
#[derive(Debug, Serialize)]
pub struct ComplaintOpened {
    pub id: Uuid,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// `None` means there are no follow-up questions for this complaint.
    pub follow_up: Option<FollowUp>,
    /// Whether the report has already been written to the log.
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Body of `POST /api/complaints/{id}/answers` — one answer, a skip, or the
/// full remaining batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AnswerRequest {
    Batch { answers: Vec<String> },
    Skip { skip: bool },
    One { answer: String },
}

/// Progress after an answer.
#[derive(Debug, Serialize)]
pub struct AnswerAck {
    pub id: Uuid,
    pub category: String,
    pub complete: bool,
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<FollowUp>,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

fn follow_up_of(session: &WizardSession) -> Option<FollowUp> {
    session.current_question().map(|q| FollowUp {
        question: q.to_string(),
        index: session.cursor(),
        total: session.total(),
    })
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/categories — the catalog, for clients that render question lists
/// up front.
async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.inner.catalog.entries().to_vec())
}

/// POST /api/complaints — classify a complaint and open the follow-up wizard.
async fn submit_complaint(
    State(state): State<AppState>,
    Json(body): Json<SubmitComplaint>,
) -> Response {
    if body.text.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "Complaint text is required");
    }

    let complaint = Complaint {
        text: body.text,
        reporter_name: body.name,
        reporter_phone: body.phone,
        location: body.location,
    };

    // Classification failures degrade to the fallback category — intake never
    // turns a citizen away because a model call failed.
    let classification = match state.inner.classifier.classify(&complaint).await {
        Ok(c) => c,
        Err(e) => {
            warn!(classifier = state.inner.classifier.name(), error = %e, "Classification failed; using fallback");
            let mut fallback = Classification::fallback();
            fallback.location = complaint.location.clone();
            fallback
        }
    };

    let coordinates = match (&state.inner.geocoder, classification.location.as_deref()) {
        (Some(geocoder), Some(place)) => match geocoder.forward(place).await {
            Ok(coords) => coords,
            Err(e) => {
                warn!(place, error = %e, "Geocoding failed");
                None
            }
        },
        _ => None,
    };

    let id = Uuid::new_v4();
    let received_at = Utc::now();

    match WizardSession::start(&classification.category, &state.inner.catalog) {
        Ok(session) => {
            info!(
                complaint_id = %id,
                category = session.category(),
                questions = session.total(),
                "Complaint classified; follow-up started"
            );
            let response = ComplaintOpened {
                id,
                category: session.category().to_string(),
                location: classification.location.clone(),
                other_details: classification.other_details.clone(),
                coordinates,
                follow_up: follow_up_of(&session),
                recorded: false,
                note: None,
            };
            let conversation = Conversation {
                complaint,
                classification,
                coordinates,
                image_file: None,
                anonymous: body.anonymous,
                received_at,
                session,
                last_touched: state.inner.next_touch(),
            };
            let mut conversations = state.inner.conversations.lock().await;
            // Abandoned sessions are reclaimed here: least-recently-touched
            // first, so active conversations survive a burst of openings.
            while conversations.len() >= state.inner.conversation_limit {
                let Some(stale) = conversations
                    .iter()
                    .min_by_key(|(_, c)| c.last_touched)
                    .map(|(stale_id, _)| *stale_id)
                else {
                    break;
                };
                conversations.remove(&stale);
                warn!(complaint_id = %stale, "Conversation limit reached; evicting stalest session");
            }
            conversations.insert(id, conversation);
            drop(conversations);
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(WizardError::UnknownCategory { category }) => {
            // Routine outcome: record the primary fields now and say plainly
            // that nothing category-specific was captured.
            warn!(complaint_id = %id, category = %category, "Category not in catalog; recording primary fields only");
            let report = IncidentReport {
                id,
                received_at,
                reporter_name: complaint.reporter_name,
                reporter_phone: complaint.reporter_phone,
                complaint: complaint.text,
                category: classification.category.clone(),
                location: classification.location.clone(),
                other_details: classification.other_details.clone(),
                coordinates,
                image_file: None,
                answers: Vec::new(),
                anonymous: body.anonymous,
            };
            if let Err(e) = state.inner.store.append(&report).await {
                warn!(complaint_id = %id, error = %e, "Failed to record report");
                return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record report");
            }
            let response = ComplaintOpened {
                id,
                category: classification.category,
                location: classification.location,
                other_details: classification.other_details,
                coordinates,
                follow_up: None,
                recorded: true,
                note: Some("No category-specific information was captured".to_string()),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// GET /api/complaints/{id} — current question and progress.
///
/// Completed conversations are discarded on completion, so only in-flight
/// ones are visible here.
async fn conversation_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let mut conversations = state.inner.conversations.lock().await;
    match conversations.get_mut(&id) {
        Some(conversation) => {
            conversation.last_touched = state.inner.next_touch();
            let ack = AnswerAck {
                id,
                category: conversation.session.category().to_string(),
                complete: conversation.session.is_complete(),
                recorded: false,
                follow_up: follow_up_of(&conversation.session),
            };
            Json(ack).into_response()
        }
        None => api_error(StatusCode::NOT_FOUND, "No such conversation"),
    }
}

/// POST /api/complaints/{id}/answers — advance the wizard.
async fn submit_answers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AnswerRequest>,
) -> Response {
    let mut conversations = state.inner.conversations.lock().await;
    let Some(conversation) = conversations.get_mut(&id) else {
        return api_error(StatusCode::NOT_FOUND, "No such conversation");
    };
    conversation.last_touched = state.inner.next_touch();

    let result = match body {
        AnswerRequest::One { answer } => conversation.session.submit_answer(answer),
        AnswerRequest::Skip { skip: true } => conversation.session.skip(),
        AnswerRequest::Skip { skip: false } => {
            return api_error(StatusCode::BAD_REQUEST, "skip must be true");
        }
        AnswerRequest::Batch { answers } => conversation.session.submit_all(answers),
    };

    if let Err(e) = result {
        let status = match e {
            WizardError::AlreadyComplete { .. } => StatusCode::CONFLICT,
            WizardError::AnswerCountMismatch { .. } => StatusCode::BAD_REQUEST,
            WizardError::UnknownCategory { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        return api_error(status, e.to_string());
    }

    if !conversation.session.is_complete() {
        let ack = AnswerAck {
            id,
            category: conversation.session.category().to_string(),
            complete: false,
            recorded: false,
            follow_up: follow_up_of(&conversation.session),
        };
        return Json(ack).into_response();
    }

    // All questions answered: persist and discard the session. The map entry
    // is removed before the store call so no other request can touch it.
    let Some(conversation) = conversations.remove(&id) else {
        return api_error(StatusCode::NOT_FOUND, "No such conversation");
    };
    drop(conversations);

    let category = conversation.session.category().to_string();
    let report = conversation.into_report(id);
    if let Err(e) = state.inner.store.append(&report).await {
        warn!(complaint_id = %id, error = %e, "Failed to record completed report");
        return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record report");
    }

    info!(complaint_id = %id, category = %category, "Follow-up complete; report recorded");
    let ack = AnswerAck {
        id,
        category,
        complete: true,
        recorded: true,
        follow_up: None,
    };
    Json(ack).into_response()
}

/// POST /api/complaints/{id}/image — attach an optional incident image.
async fn attach_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Response {
    // Only in-flight conversations can take an image.
    if !state.inner.conversations.lock().await.contains_key(&id) {
        return api_error(StatusCode::NOT_FOUND, "No such conversation");
    }

    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => return api_error(StatusCode::BAD_REQUEST, "No file in request"),
        Err(e) => return api_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let Some(original_name) = field.file_name().map(str::to_string) else {
        return api_error(StatusCode::BAD_REQUEST, "File field has no file name");
    };
    let bytes = match field.bytes().await {
        Ok(b) => b,
        Err(e) => return api_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    // Prefix with the conversation id so concurrent uploads never collide.
    let file_name = format!("{id}-{original_name}");
    if let Err(e) = state.inner.images.save(&file_name, &bytes).await {
        warn!(complaint_id = %id, error = %e, "Failed to save image");
        return api_error(StatusCode::BAD_REQUEST, e.to_string());
    }

    let mut conversations = state.inner.conversations.lock().await;
    match conversations.get_mut(&id) {
        Some(conversation) => {
            conversation.last_touched = state.inner.next_touch();
            conversation.image_file = Some(file_name.clone());
            Json(serde_json::json!({ "id": id, "image_file": file_name })).into_response()
        }
        // Conversation completed while the upload was in flight; the saved
        // file is referenced by no report, so drop it.
        None => {
            if let Err(e) = state.inner.images.remove(&file_name).await {
                warn!(complaint_id = %id, error = %e, "Failed to remove orphaned image");
            }
            api_error(StatusCode::NOT_FOUND, "No such conversation")
        }
    }
}

/// Build the intake router.
pub fn intake_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/complaints", post(submit_complaint))
        .route("/api/complaints/{id}", get(conversation_status))
        .route("/api/complaints/{id}/answers", post(submit_answers))
        .route("/api/complaints/{id}/image", post(attach_image))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::classifier::KeywordClassifier;
    use crate::error::ClassifierError;
    use crate::store::CsvStore;

    /// Classifier that always returns a fixed category (no rules, no network).
    struct FixedClassifier(&'static str);

    #[async_trait]
    impl Classifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn classify(&self, complaint: &Complaint) -> Result<Classification, ClassifierError> {
            Ok(Classification {
                category: self.0.to_string(),
                location: complaint.location.clone(),
                other_details: None,
            })
        }
    }

    fn test_state(classifier: Arc<dyn Classifier>) -> (AppState, tempfile::TempDir) {
        test_state_with_limit(classifier, MAX_LIVE_CONVERSATIONS)
    }

    fn test_state_with_limit(
        classifier: Arc<dyn Classifier>,
        limit: usize,
    ) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CsvStore::new(
            dir.path().join("user_data.csv"),
            dir.path().join("anonymous_data.csv"),
        ));
        let state = AppState::with_conversation_limit(
            CategoryCatalog::builtin(),
            classifier,
            store,
            ImageStore::new(dir.path().join("uploaded_images")),
            None,
            limit,
        );
        (state, dir)
    }

    async fn request_json(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn categories_endpoint_lists_catalog() {
        let (state, _dir) = test_state(Arc::new(KeywordClassifier::default_rules()));
        let router = intake_routes(state);
        let (status, body) = request_json(&router, "GET", "/api/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn complaint_opens_follow_up_and_answers_complete_it() {
        let (state, dir) = test_state(Arc::new(FixedClassifier("Road accident")));
        let router = intake_routes(state);

        let (status, opened) = request_json(
            &router,
            "POST",
            "/api/complaints",
            Some(serde_json::json!({
                "text": "car crash near the flyover",
                "name": "Asha",
                "phone": "9876543210"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(opened["category"], "Road accident");
        assert_eq!(opened["recorded"], false);
        assert_eq!(opened["follow_up"]["question"], "Location of the accident");
        assert_eq!(opened["follow_up"]["total"], 5);

        let id = opened["id"].as_str().unwrap().to_string();
        let answers = ["Main St", "14:02", "2 cars", "1 minor injury", "none"];
        for (i, answer) in answers.iter().enumerate() {
            let (status, ack) = request_json(
                &router,
                "POST",
                &format!("/api/complaints/{id}/answers"),
                Some(serde_json::json!({ "answer": answer })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            if i < answers.len() - 1 {
                assert_eq!(ack["complete"], false);
                assert_eq!(ack["follow_up"]["index"], i + 1);
            } else {
                assert_eq!(ack["complete"], true);
                assert_eq!(ack["recorded"], true);
            }
        }

        // Session discarded after completion.
        let (status, _) =
            request_json(&router, "GET", &format!("/api/complaints/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // One CSV row, answers in question order.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(dir.path().join("user_data.csv"))
            .unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][11], "Main St");
        assert_eq!(&rows[0][15], "none");
    }

    #[tokio::test]
    async fn unknown_category_records_primary_fields_only() {
        let (state, dir) = test_state(Arc::new(FixedClassifier("Traffic jam")));
        let router = intake_routes(state);

        let (status, opened) = request_json(
            &router,
            "POST",
            "/api/complaints",
            Some(serde_json::json!({ "text": "stuck for hours" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(opened["recorded"], true);
        assert!(opened["follow_up"].is_null());
        assert_eq!(
            opened["note"],
            "No category-specific information was captured"
        );

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(dir.path().join("user_data.csv"))
            .unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        // Primary fields only: no answer columns.
        assert_eq!(rows[0].len(), 11);
    }

    #[tokio::test]
    async fn batch_answers_complete_in_one_request() {
        let (state, _dir) = test_state(Arc::new(FixedClassifier("Fire accident")));
        let router = intake_routes(state);

        let (_, opened) = request_json(
            &router,
            "POST",
            "/api/complaints",
            Some(serde_json::json!({ "text": "warehouse on fire" })),
        )
        .await;
        let id = opened["id"].as_str().unwrap().to_string();

        let (status, ack) = request_json(
            &router,
            "POST",
            &format!("/api/complaints/{id}/answers"),
            Some(serde_json::json!({
                "answers": ["sector 9", "2am", "unknown", "none", "under control"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["complete"], true);
    }

    #[tokio::test]
    async fn batch_count_mismatch_is_rejected() {
        let (state, _dir) = test_state(Arc::new(FixedClassifier("Fire accident")));
        let router = intake_routes(state);

        let (_, opened) = request_json(
            &router,
            "POST",
            "/api/complaints",
            Some(serde_json::json!({ "text": "warehouse on fire" })),
        )
        .await;
        let id = opened["id"].as_str().unwrap().to_string();

        let (status, body) = request_json(
            &router,
            "POST",
            &format!("/api/complaints/{id}/answers"),
            Some(serde_json::json!({ "answers": ["too", "few"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Expected 5"));

        // Nothing consumed: the first question is still current.
        let (_, status_body) =
            request_json(&router, "GET", &format!("/api/complaints/{id}"), None).await;
        assert_eq!(status_body["follow_up"]["index"], 0);
    }

    #[tokio::test]
    async fn skip_advances_with_empty_answer() {
        let (state, _dir) = test_state(Arc::new(FixedClassifier("Child safety")));
        let router = intake_routes(state);

        let (_, opened) = request_json(
            &router,
            "POST",
            "/api/complaints",
            Some(serde_json::json!({ "text": "my daughter is missing" })),
        )
        .await;
        let id = opened["id"].as_str().unwrap().to_string();

        let (status, ack) = request_json(
            &router,
            "POST",
            &format!("/api/complaints/{id}/answers"),
            Some(serde_json::json!({ "skip": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["follow_up"]["index"], 1);
    }

    #[tokio::test]
    async fn stalest_conversation_is_evicted_at_the_limit() {
        let (state, _dir) = test_state_with_limit(Arc::new(FixedClassifier("Road accident")), 2);
        let router = intake_routes(state);

        let mut ids = Vec::new();
        for _ in 0..3 {
            let (status, opened) = request_json(
                &router,
                "POST",
                "/api/complaints",
                Some(serde_json::json!({ "text": "car crash near the flyover" })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            ids.push(opened["id"].as_str().unwrap().to_string());
        }

        // The first conversation was never touched again, so the third
        // opening reclaimed it; the later two are still live.
        let (status, _) =
            request_json(&router, "GET", &format!("/api/complaints/{}", ids[0]), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        for id in &ids[1..] {
            let (status, _) =
                request_json(&router, "GET", &format!("/api/complaints/{id}"), None).await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn answering_keeps_a_conversation_from_eviction() {
        let (state, _dir) = test_state_with_limit(Arc::new(FixedClassifier("Road accident")), 2);
        let router = intake_routes(state);

        let (_, first) = request_json(
            &router,
            "POST",
            "/api/complaints",
            Some(serde_json::json!({ "text": "car crash" })),
        )
        .await;
        let (_, second) = request_json(
            &router,
            "POST",
            "/api/complaints",
            Some(serde_json::json!({ "text": "another crash" })),
        )
        .await;
        let first_id = first["id"].as_str().unwrap().to_string();
        let second_id = second["id"].as_str().unwrap().to_string();

        // Touch the first one, so the second is now the stalest.
        let (status, _) = request_json(
            &router,
            "POST",
            &format!("/api/complaints/{first_id}/answers"),
            Some(serde_json::json!({ "answer": "Main St" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, _) = request_json(
            &router,
            "POST",
            "/api/complaints",
            Some(serde_json::json!({ "text": "a third crash" })),
        )
        .await;

        let (status, _) =
            request_json(&router, "GET", &format!("/api/complaints/{first_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) =
            request_json(&router, "GET", &format!("/api/complaints/{second_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn answers_for_unknown_conversation_are_404() {
        let (state, _dir) = test_state(Arc::new(KeywordClassifier::default_rules()));
        let router = intake_routes(state);
        let (status, _) = request_json(
            &router,
            "POST",
            &format!("/api/complaints/{}/answers", Uuid::new_v4()),
            Some(serde_json::json!({ "answer": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_complaint_text_is_rejected() {
        let (state, _dir) = test_state(Arc::new(KeywordClassifier::default_rules()));
        let router = intake_routes(state);
        let (status, _) = request_json(
            &router,
            "POST",
            "/api/complaints",
            Some(serde_json::json!({ "text": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn anonymous_complaint_lands_in_anonymous_file() {
        let (state, dir) = test_state(Arc::new(FixedClassifier("Traffic jam")));
        let router = intake_routes(state);

        let (_, opened) = request_json(
            &router,
            "POST",
            "/api/complaints",
            Some(serde_json::json!({
                "text": "stuck for hours",
                "name": "Ravi",
                "anonymous": true
            })),
        )
        .await;
        assert_eq!(opened["recorded"], true);

        assert!(!dir.path().join("user_data.csv").exists());
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(dir.path().join("anonymous_data.csv"))
            .unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "");
    }
}
