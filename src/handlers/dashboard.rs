//! # Dashboard API Handlers
//!
//! Routes behind the session middleware. Every query is scoped to the
//! [`CompanyContext`] the middleware resolved, except the slug check which
//! looks across all companies.

use axum::{
    extract::{Multipart, Path, State, multipart::MultipartRejection, rejection::JsonRejection},
    response::Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{CompanyContext, UNKNOWN_USER};
use crate::error::{ApiError, bad_request, internal, not_found, validation_failed};
use crate::events::EventWriter;
use crate::handlers::types::{
    CompanyDto, CompanyResponse, EventDetailDto, EventDto, EventResponse, EventsResponse,
    VerifySlugRequest, VerifySlugResponse,
};
use crate::repositories::{AccountRepository, EventRepository};
use crate::server::AppState;
use crate::validation::{EventForm, EventInput};

const EVENT_NOT_FOUND: &str = "Evento não encontrado";
const CREATE_FAILED: &str = "Erro ao criar evento";
const UPDATE_FAILED: &str = "Erro ao atualizar evento";
const SLUG_REQUIRED: &str = "Slug is required";

/// Parses and validates the multipart event form. Nothing is written on failure.
async fn read_event_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<EventInput, ApiError> {
    let mut multipart = multipart.map_err(|rejection| bad_request(&rejection.body_text()))?;
    let form = EventForm::from_multipart(&mut multipart).await?;

    form.into_input().map_err(|issues| {
        tracing::warn!(issue_count = issues.len(), "event form rejected");
        validation_failed(issues)
    })
}

/// Company of the current session
#[utoipa::path(
    get,
    path = "/dashboard/me",
    responses(
        (status = 200, description = "Company summary", body = CompanyResponse),
        (status = 401, description = "Missing session", body = ApiError),
        (status = 404, description = "Unknown account", body = ApiError)
    ),
    tag = "dashboard"
)]
pub async fn me(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<CompanyResponse>, ApiError> {
    let company = AccountRepository::new(&state.db)
        .find_company(ctx.company_id)
        .await?
        .ok_or_else(|| not_found(UNKNOWN_USER))?;

    Ok(Json(CompanyResponse {
        success: true,
        company: Some(CompanyDto::from(company)),
    }))
}

/// Events of the current company, earliest start first
#[utoipa::path(
    get,
    path = "/dashboard/events",
    responses(
        (status = 200, description = "Company events with their status", body = EventsResponse),
        (status = 401, description = "Missing session", body = ApiError)
    ),
    tag = "dashboard"
)]
pub async fn list_events(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<EventsResponse>, ApiError> {
    let events = EventRepository::new(&state.db)
        .list_for_company(ctx.company_id)
        .await?;

    let now = Utc::now();
    Ok(Json(EventsResponse {
        success: true,
        events: events
            .into_iter()
            .map(|event| EventDto::from_model(event, now))
            .collect(),
    }))
}

/// One event of the current company, by slug
#[utoipa::path(
    get,
    path = "/dashboard/event/{key}",
    params(("key" = String, Path, description = "Event slug")),
    responses(
        (status = 200, description = "Event with address and configuration", body = EventResponse),
        (status = 404, description = "No such event for this company", body = ApiError)
    ),
    tag = "dashboard"
)]
pub async fn get_event(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Path(slug): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let details = EventRepository::new(&state.db)
        .find_by_slug_for_company(ctx.company_id, &slug)
        .await?
        .ok_or_else(|| {
            tracing::debug!(company_id = %ctx.company_id, slug = %slug, "event not found");
            not_found(EVENT_NOT_FOUND)
        })?;

    Ok(Json(EventResponse {
        success: true,
        event: EventDetailDto::from_details(details, Utc::now()),
    }))
}

/// Create an event from the multipart form
///
/// Text parts use the camelCase field names; an optional `logo` file part
/// (JPEG or PNG, at most 3 MiB) is uploaded inside the same transaction.
#[utoipa::path(
    post,
    path = "/dashboard/event",
    responses(
        (status = 200, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Write or upload failed, nothing was stored", body = ApiError)
    ),
    tag = "dashboard"
)]
pub async fn create_event(
    State(state): State<AppState>,
    ctx: CompanyContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EventResponse>, ApiError> {
    let input = read_event_form(multipart).await?;
    let slug = input.slug.clone();

    let details = EventWriter::new(&state.db, state.storage.as_ref())
        .create(ctx.company_id, input)
        .await
        .map_err(|e| {
            tracing::error!(company_id = %ctx.company_id, slug = %slug, error = %e, "event create failed");
            internal(CREATE_FAILED)
        })?;

    tracing::info!(company_id = %ctx.company_id, event_id = %details.event.id, slug = %slug, "event created");
    Ok(Json(EventResponse {
        success: true,
        event: EventDetailDto::from_details(details, Utc::now()),
    }))
}

/// Update an event of the current company from the multipart form
#[utoipa::path(
    put,
    path = "/dashboard/event/{key}",
    params(("key" = Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "No such event for this company", body = ApiError),
        (status = 500, description = "Write or upload failed, nothing was changed", body = ApiError)
    ),
    tag = "dashboard"
)]
pub async fn update_event(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EventResponse>, ApiError> {
    let input = read_event_form(multipart).await?;

    // A malformed id cannot name an event of this company
    let event_id = Uuid::parse_str(&id).map_err(|_| not_found(EVENT_NOT_FOUND))?;
    let existing = EventRepository::new(&state.db)
        .find_by_id_for_company(ctx.company_id, event_id)
        .await?
        .ok_or_else(|| not_found(EVENT_NOT_FOUND))?;

    let details = EventWriter::new(&state.db, state.storage.as_ref())
        .update(existing, input)
        .await
        .map_err(|e| {
            tracing::error!(company_id = %ctx.company_id, event_id = %event_id, error = %e, "event update failed");
            internal(UPDATE_FAILED)
        })?;

    tracing::info!(company_id = %ctx.company_id, event_id = %event_id, "event updated");
    Ok(Json(EventResponse {
        success: true,
        event: EventDetailDto::from_details(details, Utc::now()),
    }))
}

/// Whether a slug is held by a live or recently ended event of any company
#[utoipa::path(
    post,
    path = "/dashboard/verify-slug",
    request_body = VerifySlugRequest,
    responses(
        (status = 200, description = "Slug availability", body = VerifySlugResponse),
        (status = 400, description = "Slug missing", body = ApiError)
    ),
    tag = "dashboard"
)]
pub async fn verify_slug(
    State(state): State<AppState>,
    _ctx: CompanyContext,
    payload: Result<Json<VerifySlugRequest>, JsonRejection>,
) -> Result<Json<VerifySlugResponse>, ApiError> {
    let Json(request) = payload?;
    let slug = request
        .slug
        .filter(|slug| !slug.is_empty())
        .ok_or_else(|| bad_request(SLUG_REQUIRED))?;

    let exists = EventRepository::new(&state.db)
        .slug_in_use(&slug, Utc::now())
        .await?;

    tracing::debug!(slug = %slug, exists, "slug checked");
    Ok(Json(VerifySlugResponse { exists }))
}
