use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::{CurrentUser, RequestId},
    models::{Movie, MovieId, SuggestionPage},
};

use super::{pagination::pagination_headers, AppState};

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// GET /api/movies/:id
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> AppResult<Json<Movie>> {
    let movie = state.recommendations.find_movie(id).await?;
    Ok(Json(movie))
}

/// GET /api/suggestion/:id
///
/// An unknown movie is answered with 200 and an empty body.
pub async fn get_suggestions_for_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<MovieId>,
    Query(params): Query<PageParams>,
) -> AppResult<Response> {
    let request = state.page_request(params.page, params.size);
    tracing::info!(
        request_id = %request_id,
        movie_id = id,
        page = request.page,
        size = request.size,
        "Request to get suggestions for movie"
    );

    let page = state
        .recommendations
        .suggestions_for_movie(id, request)
        .await?;

    Ok(suggestions_response(page, uri.path(), &request_id))
}

/// GET /api/suggestion/user/:id
///
/// Personalized to the caller named by the `x-user-login` header. An
/// unknown movie or a missing or unknown caller is answered with 200 and an
/// empty body.
pub async fn get_suggestions_for_movie_and_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current_user: CurrentUser,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<MovieId>,
    Query(params): Query<PageParams>,
) -> AppResult<Response> {
    let request = state.page_request(params.page, params.size);
    tracing::info!(
        request_id = %request_id,
        movie_id = id,
        login = current_user.login().unwrap_or("-"),
        page = request.page,
        size = request.size,
        "Request to get suggestions for movie and user"
    );

    let page = state
        .recommendations
        .suggestions_for_movie_and_user(id, current_user.login(), request)
        .await?;

    Ok(suggestions_response(page, uri.path(), &request_id))
}

fn suggestions_response(
    page: Option<SuggestionPage>,
    path: &str,
    request_id: &RequestId,
) -> Response {
    match page {
        Some(page) => {
            tracing::info!(
                request_id = %request_id,
                returned = page.content.len(),
                total = page.total_elements,
                "Suggestions computed"
            );
            let headers = pagination_headers(&page, path);
            (StatusCode::OK, headers, Json(page.content)).into_response()
        }
        None => StatusCode::OK.into_response(),
    }
}
