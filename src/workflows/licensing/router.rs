//! HTTP facade over the licensing service.
//!
//! Thin handlers only: parse, call the facade, map the typed failure onto a
//! status code. All workflow decisions stay in the engine.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use crate::config::RegisterConfig;
use crate::identity::StaffIdentity;

use super::domain::ApplicationId;
use super::engine::{Transition, TransitionError};
use super::notify::NotificationPublisher;
use super::service::{LicensingService, ServiceError};
use super::store::StoreError;
use super::submission::SubmissionForm;
use super::views::{self, RequestQuery, RequestsTab, SortOrder, ViewMode};

pub struct LicensingState<N> {
    pub service: Arc<LicensingService<N>>,
    pub register: RegisterConfig,
}

impl<N> Clone for LicensingState<N> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            register: self.register.clone(),
        }
    }
}

/// Router builder exposing the workflow, register views, and dashboards.
pub fn licensing_router<N>(
    service: Arc<LicensingService<N>>,
    register: RegisterConfig,
) -> Router
where
    N: NotificationPublisher + 'static,
{
    let state = LicensingState { service, register };
    Router::new()
        .route("/api/v1/licensing/applications", post(submit_handler::<N>))
        .route(
            "/api/v1/licensing/applications/:application_id",
            get(application_handler::<N>),
        )
        .route(
            "/api/v1/licensing/applications/:application_id/timeline",
            get(timeline_handler::<N>),
        )
        .route(
            "/api/v1/licensing/applications/:application_id/transitions",
            post(transition_handler::<N>),
        )
        .route(
            "/api/v1/licensing/register/sectional",
            get(sectional_register_handler::<N>),
        )
        .route(
            "/api/v1/licensing/register/safety",
            get(safety_register_handler::<N>),
        )
        .route(
            "/api/v1/licensing/dashboard/sectional",
            get(sectional_dashboard_handler::<N>),
        )
        .route(
            "/api/v1/licensing/dashboard/safety",
            get(safety_dashboard_handler::<N>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) submitted_on: Option<NaiveDate>,
    #[serde(flatten)]
    pub(crate) form: SubmissionForm,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    pub(crate) actor: StaffIdentity,
    #[serde(default)]
    pub(crate) occurred_on: Option<NaiveDate>,
    #[serde(flatten)]
    pub(crate) transition: Transition,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterParams {
    pub(crate) manager: String,
    #[serde(default)]
    pub(crate) mode: ViewMode,
    #[serde(default)]
    pub(crate) tab: RequestsTab,
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) sort: SortOrder,
    #[serde(default = "first_page")]
    pub(crate) page: usize,
    #[serde(default)]
    pub(crate) page_size: Option<usize>,
}

fn first_page() -> usize {
    1
}

impl RegisterParams {
    fn into_query(self, default_page_size: usize) -> (String, RequestQuery) {
        let query = RequestQuery {
            mode: self.mode,
            tab: self.tab,
            search: self.search,
            sort: self.sort,
            page: self.page,
            page_size: self.page_size.unwrap_or(default_page_size),
        };
        (self.manager, query)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManagerParams {
    pub(crate) manager: String,
}

pub(crate) async fn submit_handler<N>(
    State(state): State<LicensingState<N>>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    N: NotificationPublisher + 'static,
{
    let submitted_on = request
        .submitted_on
        .unwrap_or_else(|| Local::now().date_naive());
    match state.service.submit(request.form, submitted_on) {
        Ok(application) => (StatusCode::ACCEPTED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_handler<N>(
    State(state): State<LicensingState<N>>,
    Path(application_id): Path<String>,
) -> Response
where
    N: NotificationPublisher + 'static,
{
    let id = ApplicationId(application_id);
    match state.service.application(&id) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn timeline_handler<N>(
    State(state): State<LicensingState<N>>,
    Path(application_id): Path<String>,
) -> Response
where
    N: NotificationPublisher + 'static,
{
    let id = ApplicationId(application_id);
    match state.service.timeline(&id) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transition_handler<N>(
    State(state): State<LicensingState<N>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    N: NotificationPublisher + 'static,
{
    let id = ApplicationId(application_id);
    let occurred_on = request
        .occurred_on
        .unwrap_or_else(|| Local::now().date_naive());
    match state
        .service
        .execute(&id, &request.actor, occurred_on, &request.transition)
    {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn sectional_register_handler<N>(
    State(state): State<LicensingState<N>>,
    Query(params): Query<RegisterParams>,
) -> Response
where
    N: NotificationPublisher + 'static,
{
    let (manager, query) = params.into_query(state.register.sectional_page_size);
    let applications = state.service.applications();
    let page = views::sectional_requests(&applications, &manager, &query);
    (StatusCode::OK, axum::Json(page)).into_response()
}

pub(crate) async fn safety_register_handler<N>(
    State(state): State<LicensingState<N>>,
    Query(params): Query<RegisterParams>,
) -> Response
where
    N: NotificationPublisher + 'static,
{
    let (manager, query) = params.into_query(state.register.safety_page_size);
    let applications = state.service.applications();
    let page = views::safety_requests(&applications, &manager, &query);
    (StatusCode::OK, axum::Json(page)).into_response()
}

pub(crate) async fn sectional_dashboard_handler<N>(
    State(state): State<LicensingState<N>>,
    Query(params): Query<ManagerParams>,
) -> Response
where
    N: NotificationPublisher + 'static,
{
    let applications = state.service.applications();
    let counts = views::sectional_counts(&applications, &params.manager);
    (StatusCode::OK, axum::Json(counts)).into_response()
}

pub(crate) async fn safety_dashboard_handler<N>(
    State(state): State<LicensingState<N>>,
    Query(params): Query<ManagerParams>,
) -> Response
where
    N: NotificationPublisher + 'static,
{
    let applications = state.service.applications();
    let counts = views::safety_counts(&applications, &params.manager);
    (StatusCode::OK, axum::Json(counts)).into_response()
}

fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::NotFound | ServiceError::Store(StoreError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        ServiceError::Store(StoreError::Conflict(_))
        | ServiceError::Transition(TransitionError::InvalidTransition { .. }) => {
            StatusCode::CONFLICT
        }
        ServiceError::Transition(
            TransitionError::ValidationFailed(_) | TransitionError::PrerequisiteNotMet(_),
        )
        | ServiceError::Submission(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
