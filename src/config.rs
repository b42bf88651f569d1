use serde::Deserialize;
use std::path::PathBuf;

/// Where the movie catalog is read from at startup
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MovieSourceKind {
    /// Local CSV snapshot
    #[default]
    Csv,
    /// Firestore collection read over the REST API
    Firestore,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Source of the movie catalog
    #[serde(default)]
    pub movie_source: MovieSourceKind,

    /// CSV snapshot used when `movie_source` is `csv`
    #[serde(default = "default_movies_csv_path")]
    pub movies_csv_path: PathBuf,

    /// Google Cloud project hosting the Firestore database
    pub firestore_project_id: Option<String>,

    /// Firestore collection holding one document per movie
    #[serde(default = "default_firestore_collection")]
    pub firestore_collection: String,

    /// Firestore REST API base URL
    #[serde(default = "default_firestore_api_url")]
    pub firestore_api_url: String,

    /// OAuth2 bearer token for Firestore
    pub firestore_access_token: Option<String>,

    /// Web API key for Firestore
    pub firestore_api_key: Option<String>,

    /// Directory holding `model.onnx`, `tokenizer.json` and `config.json`
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Poster lookup API base URL (OMDb compatible)
    #[serde(default = "default_poster_api_url")]
    pub poster_api_url: String,

    /// Poster lookup API key. Enrichment is disabled without one.
    pub poster_api_key: Option<String>,

    /// Optional JSON file overriding the emotion to genre mapping
    pub emotion_genres_path: Option<PathBuf>,

    /// Number of recommendations returned when the caller does not ask for a count
    #[serde(default = "default_recommendation_count")]
    pub default_recommendation_count: usize,

    /// Upper bound on the number of recommendations per response
    #[serde(default = "default_max_recommendation_count")]
    pub max_recommendation_count: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_movies_csv_path() -> PathBuf {
    PathBuf::from("data/movies.csv")
}

fn default_firestore_collection() -> String {
    "movies".to_string()
}

fn default_firestore_api_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("model")
}

fn default_poster_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_recommendation_count() -> usize {
    5
}

fn default_max_recommendation_count() -> usize {
    20
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?
            .validated()
    }

    fn validated(self) -> anyhow::Result<Self> {
        anyhow::ensure!(
            self.max_recommendation_count > 0,
            "MAX_RECOMMENDATION_COUNT must be at least 1"
        );
        anyhow::ensure!(
            self.default_recommendation_count > 0,
            "DEFAULT_RECOMMENDATION_COUNT must be at least 1"
        );
        if self.movie_source == MovieSourceKind::Firestore {
            anyhow::ensure!(
                self.firestore_project_id.is_some(),
                "FIRESTORE_PROJECT_ID is required when MOVIE_SOURCE=firestore"
            );
        }
        Ok(self)
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()));
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("{}", e))?
            .validated()
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.movie_source, MovieSourceKind::Csv);
        assert_eq!(config.movies_csv_path, PathBuf::from("data/movies.csv"));
        assert_eq!(config.firestore_collection, "movies");
        assert_eq!(config.default_recommendation_count, 5);
        assert_eq!(config.max_recommendation_count, 20);
        assert!(config.poster_api_key.is_none());
    }

    #[test]
    fn test_firestore_source_parses() {
        let config = from_pairs(&[
            ("MOVIE_SOURCE", "firestore"),
            ("FIRESTORE_PROJECT_ID", "cinemood-dev"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(config.movie_source, MovieSourceKind::Firestore);
        assert_eq!(config.firestore_project_id.as_deref(), Some("cinemood-dev"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_firestore_requires_project() {
        assert!(from_pairs(&[("MOVIE_SOURCE", "firestore")]).is_err());
    }

    #[test]
    fn test_zero_max_count_rejected() {
        assert!(from_pairs(&[("MAX_RECOMMENDATION_COUNT", "0")]).is_err());
    }
}
