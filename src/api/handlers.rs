use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{genre_key, Emotion, Movie},
    services::{
        recommendations::{enrich_posters, parse_selection, pick_genre, unknown_genre},
        Selection,
    },
};

use super::AppState;

// Request/Response types

/// Body of the text-only POST endpoints
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: Option<String>,
}

/// Body of `/recommendy`
#[derive(Debug, Deserialize)]
pub struct TextGenreRequest {
    pub text: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub genre: Option<String>,
    pub count: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub data_loaded: bool,
    pub movie_count: usize,
    pub genre_count: usize,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EmotionResponse {
    pub emotion: Emotion,
}

#[derive(Debug, Serialize)]
pub struct EmotionDetailResponse {
    pub text: String,
    pub emotion: Emotion,
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub genre: String,
    pub sorted: bool,
    pub count: usize,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Serialize)]
pub struct EmotionRecommendResponse {
    pub emotion: Emotion,
    pub genre: Option<String>,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    pub movies: Vec<Movie>,
}

// Validation

fn required(field: &str, value: Option<String>) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("'{}' is required", field)))
}

fn text_from(payload: Result<Json<TextRequest>, JsonRejection>) -> AppResult<String> {
    let Json(request) = payload?;
    required("text", request.text)
}

/// Samples from the catalog and enriches the result with posters.
///
/// Sampling happens before any await so the thread-local RNG never crosses
/// a suspension point.
async fn recommend_in_genre(
    state: &AppState,
    genre: &str,
    count: usize,
    selection: Selection,
) -> AppResult<Vec<Movie>> {
    let picked = state
        .catalog
        .recommend(genre, count, selection, &mut rand::thread_rng())
        .ok_or_else(|| unknown_genre(&state.catalog, genre))?;

    Ok(enrich_posters(state.posters.clone(), picked).await)
}

// Handlers

/// Liveness message
pub async fn home() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Cinemood backend is running!",
    })
}

/// Health check with model and data load flags
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.model_loaded(),
        data_loaded: state.data_loaded,
        movie_count: state.catalog.movie_count(),
        genre_count: state.catalog.genre_count(),
        started_at: state.started_at,
    })
}

/// List known genres
pub async fn list_genres(State(state): State<AppState>) -> Json<GenresResponse> {
    Json(GenresResponse {
        genres: state.catalog.genres(),
    })
}

/// Detect the emotion of a text and list the genres it maps to
pub async fn detect_emotion(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> AppResult<Json<EmotionDetailResponse>> {
    let text = text_from(payload)?;
    let emotion = state.detect_emotion(&text).await?;

    tracing::info!(request_id = %request_id, emotion = %emotion, "Emotion detected");

    Ok(Json(EmotionDetailResponse {
        genres: state.emotion_genres.genres_for(emotion).to_vec(),
        text,
        emotion,
    }))
}

/// Emotion only, without the genre mapping
pub async fn emotion(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> AppResult<Json<EmotionResponse>> {
    let text = text_from(payload)?;
    let emotion = state.detect_emotion(&text).await?;
    Ok(Json(EmotionResponse { emotion }))
}

/// Recommend movies from a genre
pub async fn recommend_by_genre(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<RecommendResponse>> {
    let genre = genre_key(&required("genre", params.genre)?);
    let count = state.limits.resolve_count(params.count.as_deref())?;
    let selection = parse_selection(params.sort.as_deref());

    tracing::info!(
        request_id = %request_id,
        genre = %genre,
        count,
        selection = ?selection,
        "Processing recommendation request"
    );

    let movies = recommend_in_genre(&state, &genre, count, selection).await?;

    Ok(Json(RecommendResponse {
        genre,
        sorted: selection == Selection::TopRated,
        count: movies.len(),
        movies,
    }))
}

/// Detect an emotion and recommend from the first matching genre
pub async fn recommend_for_text(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> AppResult<Json<EmotionRecommendResponse>> {
    let text = text_from(payload)?;
    let emotion = state.detect_emotion(&text).await?;

    let genre = pick_genre(&state.catalog, state.emotion_genres.genres_for(emotion))
        .map(str::to_string);

    let movies = match &genre {
        Some(genre) => {
            let count = state.limits.resolve_count(None)?;
            recommend_in_genre(&state, genre, count, Selection::Random).await?
        }
        // Unknown emotion, or none of its genres are in the catalog
        None => Vec::new(),
    };

    tracing::info!(
        request_id = %request_id,
        emotion = %emotion,
        genre = ?genre,
        movies = movies.len(),
        "Emotion recommendation completed"
    );

    Ok(Json(EmotionRecommendResponse {
        emotion,
        genre,
        movies,
    }))
}

/// Detect an emotion and recommend from a caller-chosen genre
pub async fn recommend_for_text_and_genre(
    State(state): State<AppState>,
    payload: Result<Json<TextGenreRequest>, JsonRejection>,
) -> AppResult<Json<EmotionRecommendResponse>> {
    let Json(request) = payload?;
    let text = required("text", request.text)?;
    let genre = genre_key(&required("genre", request.genre)?);

    let emotion = state.detect_emotion(&text).await?;
    let count = state.limits.resolve_count(None)?;
    let movies = recommend_in_genre(&state, &genre, count, Selection::Random).await?;

    Ok(Json(EmotionRecommendResponse {
        emotion,
        genre: Some(genre),
        movies,
    }))
}

/// Every movie, read straight from the store
pub async fn list_movies(State(state): State<AppState>) -> AppResult<Json<MoviesResponse>> {
    let movies = state.store.fetch_movies().await?;
    Ok(Json(MoviesResponse { movies }))
}
