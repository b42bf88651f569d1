/// OMDb poster provider
///
/// Looks titles up with `GET {api}/?t={title}&apikey={key}`. Lookups are best
/// effort: network errors, error statuses and not-found answers all yield no
/// poster, and nothing is retried.
use crate::{
    error::{AppError, AppResult},
    models::{OmdbTitle, Poster},
    services::providers::PosterProvider,
};
use reqwest::Client as HttpClient;

#[derive(Clone)]
pub struct OmdbPosterProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbPosterProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    async fn fetch_title(&self, title: &str) -> AppResult<OmdbTitle> {
        let url = format!("{}/", self.api_url.trim_end_matches('/'));

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("t", title),
                ("type", "movie"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "OMDb returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl PosterProvider for OmdbPosterProvider {
    async fn lookup(&self, title: &str) -> Option<Poster> {
        if title.trim().is_empty() {
            return None;
        }

        match self.fetch_title(title).await {
            Ok(found) => {
                let poster = found.into_poster();
                tracing::debug!(
                    title = %title,
                    found = poster.is_some(),
                    provider = self.name(),
                    "Poster lookup completed"
                );
                poster
            }
            Err(e) => {
                tracing::warn!(title = %title, error = %e, provider = self.name(), "Poster lookup failed");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
