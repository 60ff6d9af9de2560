//! Shared helpers for integration tests
//!
//! [`FakeBackend`] is a small in-process clinic API built on axum. It keeps
//! patients and treatments in memory and enforces bearer authentication, so
//! tests can exercise real create/list/delete sequences over HTTP.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use clinic::models::{
    Credentials, NewPatient, NewTreatment, Patient, PatientUpdate, Treatment, TreatmentUpdate,
    UserInfo,
};
use clinic::{ApiConfig, ClinicClient, SessionContext};

pub const ADMIN_EMAIL: &str = "admin@clinic.test";
pub const ADMIN_PASSWORD: &str = "secret";

/// Builds an unsigned JWT-shaped token whose `exp` claim is `exp_offset`
/// from now.
pub fn make_token(exp_offset: Duration) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({
        "sub": "user-1",
        "email": ADMIN_EMAIL,
        "exp": (Utc::now() + exp_offset).timestamp(),
        "iat": Utc::now().timestamp(),
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

pub fn admin_user() -> UserInfo {
    UserInfo {
        id: "user-1".into(),
        name: "Clinic Admin".into(),
        email: ADMIN_EMAIL.into(),
    }
}

#[derive(Default)]
struct Db {
    patients: BTreeMap<Uuid, Patient>,
    treatments: BTreeMap<Uuid, Treatment>,
    tokens: Vec<String>,
}

#[derive(Clone, Default)]
struct AppState {
    db: Arc<Mutex<Db>>,
}

/// A running fake backend.
pub struct FakeBackend {
    pub addr: SocketAddr,
    state: AppState,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = AppState::default();
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/v1/patients", get(list_patients).post(create_patient))
            .route(
                "/api/v1/patients/:id",
                get(get_patient).put(update_patient).delete(delete_patient),
            )
            .route("/api/v1/patients/:id/toggle-status", put(toggle_status))
            .route(
                "/api/v1/patients/:id/treatments",
                get(list_patient_treatments).post(create_treatment),
            )
            .route(
                "/api/v1/patients/:pid/treatments/:tid",
                get(get_treatment)
                    .put(update_treatment)
                    .delete(delete_treatment),
            )
            .route("/api/v1/treatments", get(list_treatments))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend");
        });

        Self { addr, state }
    }

    /// `http://127.0.0.1:<port>/api`
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Invalidates every issued token, as a server restart with a new
    /// signing key would.
    pub fn revoke_all_tokens(&self) {
        self.state.db.lock().unwrap().tokens.clear();
    }

    /// A client with an in-memory session pointing at this backend.
    pub fn client(&self) -> ClinicClient {
        ClinicClient::new(
            ApiConfig::with_base_url(self.base_url()),
            Arc::new(SessionContext::in_memory()),
        )
        .expect("client")
    }

    /// A client that has already logged in.
    pub async fn logged_in_client(&self) -> ClinicClient {
        let client = self.client();
        client
            .auth()
            .login(&Credentials {
                email: ADMIN_EMAIL.into(),
                password: ADMIN_PASSWORD.into(),
            })
            .await
            .expect("login");
        client
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let Some(token) = value.strip_prefix("Bearer ") else {
        return false;
    };
    state.db.lock().unwrap().tokens.iter().any(|t| t == token)
}

macro_rules! require_auth {
    ($state:expr, $headers:expr) => {
        if !authorized(&$state, &$headers) {
            return error(StatusCode::UNAUTHORIZED, "Invalid or missing token");
        }
    };
}

async fn login(State(state): State<AppState>, Json(creds): Json<Credentials>) -> Response {
    if creds.email != ADMIN_EMAIL || creds.password != ADMIN_PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    let token = make_token(Duration::hours(24));
    state.db.lock().unwrap().tokens.push(token.clone());
    Json(json!({ "token": token, "user": admin_user() })).into_response()
}

async fn list_patients(State(state): State<AppState>, headers: HeaderMap) -> Response {
    require_auth!(state, headers);
    let db = state.db.lock().unwrap();
    let patients: Vec<&Patient> = db.patients.values().collect();
    Json(json!({ "patients": patients, "count": patients.len() })).into_response()
}

async fn create_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(new): Json<NewPatient>,
) -> Response {
    require_auth!(state, headers);
    let patient = Patient {
        id: Uuid::new_v4(),
        name: new.name,
        email: new.email,
        phone_number: new.phone_number,
        description: new.description,
        date: new.date.unwrap_or_else(Utc::now),
        active: true,
    };
    state
        .db
        .lock()
        .unwrap()
        .patients
        .insert(patient.id, patient.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Patient created successfully", "patient": patient })),
    )
        .into_response()
}

async fn get_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    require_auth!(state, headers);
    match state.db.lock().unwrap().patients.get(&id) {
        Some(patient) => Json(patient.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Patient not found"),
    }
}

async fn update_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(changes): Json<PatientUpdate>,
) -> Response {
    require_auth!(state, headers);
    let mut db = state.db.lock().unwrap();
    let Some(patient) = db.patients.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "Patient not found");
    };
    if let Some(name) = changes.name {
        patient.name = name;
    }
    if let Some(email) = changes.email {
        patient.email = email;
    }
    if let Some(phone) = changes.phone_number {
        patient.phone_number = phone;
    }
    if let Some(description) = changes.description {
        patient.description = description;
    }
    if let Some(date) = changes.date {
        patient.date = date;
    }
    Json(json!({ "message": "Patient updated successfully", "patient": patient })).into_response()
}

async fn delete_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    require_auth!(state, headers);
    let mut db = state.db.lock().unwrap();
    if db.patients.remove(&id).is_none() {
        return error(StatusCode::NOT_FOUND, "Patient not found");
    }
    db.treatments.retain(|_, t| t.patient_id != id);
    Json(json!({ "message": "Patient deleted successfully" })).into_response()
}

async fn toggle_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    require_auth!(state, headers);
    let mut db = state.db.lock().unwrap();
    let Some(patient) = db.patients.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "Patient not found");
    };
    patient.active = !patient.active;
    Json(json!({ "message": "Patient status updated", "patient": patient })).into_response()
}

async fn list_treatments(State(state): State<AppState>, headers: HeaderMap) -> Response {
    require_auth!(state, headers);
    let db = state.db.lock().unwrap();
    let all: Vec<&Treatment> = db.treatments.values().collect();
    Json(all).into_response()
}

async fn list_patient_treatments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    require_auth!(state, headers);
    let db = state.db.lock().unwrap();
    let list: Vec<&Treatment> = db
        .treatments
        .values()
        .filter(|t| t.patient_id == id)
        .collect();
    Json(list).into_response()
}

async fn create_treatment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(new): Json<NewTreatment>,
) -> Response {
    require_auth!(state, headers);
    let mut db = state.db.lock().unwrap();
    if !db.patients.contains_key(&id) {
        return (StatusCode::NOT_FOUND, Json("Patient not found")).into_response();
    }
    let treatment = Treatment {
        id: Uuid::new_v4(),
        patient_id: id,
        summary: new.summary,
        date: new.date.unwrap_or_else(Utc::now),
    };
    db.treatments.insert(treatment.id, treatment.clone());
    (StatusCode::CREATED, Json(treatment)).into_response()
}

async fn get_treatment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((pid, tid)): Path<(Uuid, Uuid)>,
) -> Response {
    require_auth!(state, headers);
    match state.db.lock().unwrap().treatments.get(&tid) {
        Some(t) if t.patient_id == pid => Json(t.clone()).into_response(),
        Some(_) => (
            StatusCode::NOT_FOUND,
            Json("Treatment not found for this patient"),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, Json("Treatment not found")).into_response(),
    }
}

async fn update_treatment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((pid, tid)): Path<(Uuid, Uuid)>,
    Json(changes): Json<TreatmentUpdate>,
) -> Response {
    require_auth!(state, headers);
    let mut db = state.db.lock().unwrap();
    match db.treatments.get_mut(&tid) {
        Some(t) if t.patient_id == pid => {
            if let Some(summary) = changes.summary {
                t.summary = summary;
            }
            if let Some(date) = changes.date {
                t.date = date;
            }
            Json(t.clone()).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json("Treatment not found")).into_response(),
    }
}

async fn delete_treatment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((pid, tid)): Path<(Uuid, Uuid)>,
) -> Response {
    require_auth!(state, headers);
    let mut db = state.db.lock().unwrap();
    match db.treatments.get(&tid) {
        Some(t) if t.patient_id == pid => {
            db.treatments.remove(&tid);
            StatusCode::NO_CONTENT.into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json("Treatment not found")).into_response(),
    }
}
