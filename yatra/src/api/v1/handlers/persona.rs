//! v1 Persona handlers.

use axum::extract::{Path, State};

use crate::api::v1::dto::{ListPersonasResponse, PersonaResponse};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

/// `GET /api/v1/personas`
#[utoipa::path(
    get,
    path = "/api/v1/personas",
    tag = "personas",
    responses(
        (status = 200, description = "Available guides", body = ListPersonasResponse),
    )
)]
pub async fn list_personas(State(state): State<AppState>) -> ApiResponse<ListPersonasResponse> {
    ApiResponse::success(ListPersonasResponse {
        personas: state.personas.list().iter().map(Into::into).collect(),
        default_persona_id: state.personas.default_persona().id,
    })
}

/// `GET /api/v1/personas/{personaId}`
///
/// Unlike dialogue turns, an unknown id is a 404 here, not a fallback.
#[utoipa::path(
    get,
    path = "/api/v1/personas/{personaId}",
    tag = "personas",
    params(("personaId" = String, Path, description = "Persona ID")),
    responses(
        (status = 200, description = "Persona", body = PersonaResponse),
        (status = 404, description = "Persona not found", body = ApiError),
    )
)]
pub async fn get_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<PersonaResponse> {
    match state.personas.get(&id) {
        Some(persona) => ApiResponse::success(persona.into()),
        None => ApiResponse::error(ErrorCode::NotFound, format!("Persona {id} not found")),
    }
}
