/// Firestore movie store
///
/// Lists the documents of one collection through the Firestore REST API:
/// `GET {api}/projects/{project}/databases/(default)/documents/{collection}`,
/// following `nextPageToken` until the collection is exhausted.
use crate::{
    error::{AppError, AppResult},
    models::{FirestoreListResponse, Movie, MovieRecord},
    services::providers::MovieStore,
};
use reqwest::Client as HttpClient;

const PAGE_SIZE: &str = "300";

#[derive(Clone)]
pub struct FirestoreMovieStore {
    http_client: HttpClient,
    api_url: String,
    project_id: String,
    collection: String,
    access_token: Option<String>,
    api_key: Option<String>,
}

impl FirestoreMovieStore {
    pub fn new(api_url: String, project_id: String, collection: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            project_id,
            collection,
            access_token: None,
            api_key: None,
        }
    }

    /// OAuth2 bearer token sent with every request
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    /// Web API key appended as the `key` query parameter
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.api_url.trim_end_matches('/'),
            self.project_id,
            self.collection
        )
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> AppResult<FirestoreListResponse> {
        let mut query: Vec<(&str, &str)> = vec![("pageSize", PAGE_SIZE)];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }

        let mut request = self.http_client.get(self.collection_url()).query(&query);
        if let Some(token) = self.access_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "Firestore returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Fetches every document as plain JSON, with the document id under `id`
    pub async fn fetch_documents(
        &self,
    ) -> AppResult<Vec<serde_json::Map<String, serde_json::Value>>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(page_token.as_deref()).await?;
            documents.extend(page.documents.into_iter().map(|doc| doc.into_json()));

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(documents)
    }
}

/// Converts flattened documents into movies, skipping those without a title
pub fn documents_to_movies(
    documents: Vec<serde_json::Map<String, serde_json::Value>>,
) -> Vec<Movie> {
    let mut movies = Vec::with_capacity(documents.len());

    for (position, document) in documents.into_iter().enumerate() {
        let id = document
            .get("id")
            .and_then(|id| id.as_str())
            .unwrap_or_default()
            .to_string();

        match serde_json::from_value::<MovieRecord>(serde_json::Value::Object(document)) {
            Ok(record) => match record.into_movie(position) {
                Some(movie) => movies.push(movie),
                None => tracing::warn!(document_id = %id, "Skipping movie document without a title"),
            },
            Err(e) => {
                tracing::warn!(document_id = %id, error = %e, "Skipping malformed movie document")
            }
        }
    }

    movies
}

#[async_trait::async_trait]
impl MovieStore for FirestoreMovieStore {
    async fn fetch_movies(&self) -> AppResult<Vec<Movie>> {
        let documents = self.fetch_documents().await?;
        let document_count = documents.len();
        let movies = documents_to_movies(documents);

        tracing::info!(
            project = %self.project_id,
            collection = %self.collection,
            documents = document_count,
            movies = movies.len(),
            store = self.name(),
            "Movies loaded"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "firestore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FirestoreDocument;
    use axum::{extract::Query, http::HeaderMap, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const COLLECTION_PATH: &str = "/projects/cinemood/databases/(default)/documents/movies";

    /// Two pages of documents; the second ends with an empty page token
    async fn list_documents(
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, StatusCode> {
        let bearer = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok());
        if bearer != Some("Bearer secret-token")
            || params.get("key").map(String::as_str) != Some("web-key")
        {
            return Err(StatusCode::UNAUTHORIZED);
        }
        if params.get("pageSize").map(String::as_str) != Some(PAGE_SIZE) {
            return Err(StatusCode::BAD_REQUEST);
        }

        let doc = |id: &str, title: &str| {
            json!({
                "name": format!("projects/cinemood/databases/(default)/documents/movies/{}", id),
                "fields": {
                    "title": { "stringValue": title },
                    "genres": { "arrayValue": { "values": [{ "stringValue": "Animation" }] } }
                }
            })
        };

        match params.get("pageToken").map(String::as_str) {
            None => Ok(Json(json!({
                "documents": [doc("inside-out", "Inside Out"), doc("coco", "Coco")],
                "nextPageToken": "page-2"
            }))),
            Some("page-2") => Ok(Json(json!({
                "documents": [doc("up", "Up")],
                "nextPageToken": ""
            }))),
            Some(_) => Err(StatusCode::BAD_REQUEST),
        }
    }

    async fn spawn_firestore() -> String {
        let router = Router::new().route(COLLECTION_PATH, get(list_documents));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn document(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        serde_json::from_value::<FirestoreDocument>(value)
            .unwrap()
            .into_json()
    }

    #[test]
    fn test_collection_url() {
        let store = FirestoreMovieStore::new(
            "https://firestore.googleapis.com/v1/".to_string(),
            "cinemood".to_string(),
            "movies".to_string(),
        );
        assert_eq!(
            store.collection_url(),
            "https://firestore.googleapis.com/v1/projects/cinemood/databases/(default)/documents/movies"
        );
    }

    #[test]
    fn test_documents_to_movies() {
        let documents = vec![
            document(json!({
                "name": "projects/p/databases/(default)/documents/movies/inside-out",
                "fields": {
                    "title": { "stringValue": "Inside Out" },
                    "genre": { "stringValue": "Animation, Comedy" },
                    "rating": { "integerValue": "4" },
                    "poster": { "stringValue": "https://img.example/inside-out.jpg" }
                }
            })),
            document(json!({
                "name": "projects/p/databases/(default)/documents/movies/untitled",
                "fields": {
                    "genre": { "stringValue": "Drama" }
                }
            })),
            document(json!({
                "name": "projects/p/databases/(default)/documents/movies/broken",
                "fields": {
                    "title": { "stringValue": "Broken" },
                    "rating": { "stringValue": "five stars" }
                }
            })),
        ];

        let movies = documents_to_movies(documents);
        assert_eq!(movies.len(), 1);

        let movie = &movies[0];
        assert_eq!(movie.id, "inside-out");
        assert_eq!(movie.title, "Inside Out");
        assert_eq!(movie.genres, vec!["Animation", "Comedy"]);
        assert_eq!(movie.rating, 4.0);
        assert_eq!(
            movie.poster_url.as_deref(),
            Some("https://img.example/inside-out.jpg")
        );
    }

    #[tokio::test]
    async fn test_fetch_follows_page_tokens() {
        let store = FirestoreMovieStore::new(
            spawn_firestore().await,
            "cinemood".to_string(),
            "movies".to_string(),
        )
        .with_access_token(Some("secret-token".to_string()))
        .with_api_key(Some("web-key".to_string()));

        let documents = store.fetch_documents().await.unwrap();
        let ids: Vec<&str> = documents
            .iter()
            .map(|doc| doc["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["inside-out", "coco", "up"]);

        let movies = store.fetch_movies().await.unwrap();
        let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Inside Out", "Coco", "Up"]);
        assert_eq!(movies[2].id, "up");
        assert_eq!(movies[2].genres, vec!["Animation"]);
    }

    #[tokio::test]
    async fn test_rejected_request_is_store_error() {
        let store = FirestoreMovieStore::new(
            spawn_firestore().await,
            "cinemood".to_string(),
            "movies".to_string(),
        );

        let result = store.fetch_movies().await;
        assert!(matches!(result, Err(AppError::Store(msg)) if msg.contains("401")));
    }
}
