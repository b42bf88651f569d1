use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::{Config, MovieSourceKind};
use crate::error::AppResult;
use crate::models::{Emotion, Movie};
use crate::services::{
    classifier::{self, EmotionClassifier},
    providers::{CsvMovieStore, FirestoreMovieStore, MovieStore, OmdbPosterProvider, PosterProvider},
    EmotionGenreMap, MovieCatalog, RecommendLimits,
};

/// Shared application state.
///
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<MovieCatalog>,
    /// Whether the catalog was loaded from the store
    pub data_loaded: bool,
    pub store: Arc<dyn MovieStore>,
    pub classifier: Option<Arc<dyn EmotionClassifier>>,
    pub posters: Option<Arc<dyn PosterProvider>>,
    pub emotion_genres: Arc<EmotionGenreMap>,
    pub limits: RecommendLimits,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates a state with an empty catalog, no model and no poster lookups
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self {
            catalog: Arc::new(MovieCatalog::default()),
            data_loaded: false,
            store,
            classifier: None,
            posters: None,
            emotion_genres: Arc::new(EmotionGenreMap::default()),
            limits: RecommendLimits::default(),
            started_at: Utc::now(),
        }
    }

    /// Builds the catalog from already fetched movies
    pub fn with_movies(mut self, movies: Vec<Movie>) -> Self {
        self.catalog = Arc::new(MovieCatalog::new(movies));
        self.data_loaded = true;
        self
    }

    pub fn with_classifier(mut self, classifier: Option<Arc<dyn EmotionClassifier>>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_poster_provider(mut self, posters: Option<Arc<dyn PosterProvider>>) -> Self {
        self.posters = posters;
        self
    }

    pub fn with_emotion_genres(mut self, emotion_genres: EmotionGenreMap) -> Self {
        self.emotion_genres = Arc::new(emotion_genres);
        self
    }

    pub fn with_limits(mut self, limits: RecommendLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Fetches the catalog from the store.
    ///
    /// A failed load is logged and leaves `data_loaded` unset instead of
    /// aborting startup.
    pub async fn load_catalog(self) -> Self {
        match self.store.fetch_movies().await {
            Ok(movies) => self.with_movies(movies),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    store = self.store.name(),
                    "Failed to load movie data, serving without a catalog"
                );
                self
            }
        }
    }

    /// Assembles the state from configuration. Never fails.
    pub async fn from_config(config: &Config) -> Self {
        let store: Arc<dyn MovieStore> = match config.movie_source {
            MovieSourceKind::Csv => Arc::new(CsvMovieStore::new(config.movies_csv_path.clone())),
            MovieSourceKind::Firestore => Arc::new(
                FirestoreMovieStore::new(
                    config.firestore_api_url.clone(),
                    config.firestore_project_id.clone().unwrap_or_default(),
                    config.firestore_collection.clone(),
                )
                .with_access_token(config.firestore_access_token.clone())
                .with_api_key(config.firestore_api_key.clone()),
            ),
        };

        let posters: Option<Arc<dyn PosterProvider>> = match &config.poster_api_key {
            Some(key) => Some(Arc::new(OmdbPosterProvider::new(
                key.clone(),
                config.poster_api_url.clone(),
            ))),
            None => {
                tracing::info!("POSTER_API_KEY not set, poster enrichment disabled");
                None
            }
        };

        let emotion_genres = match &config.emotion_genres_path {
            Some(path) => EmotionGenreMap::from_file(path).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Invalid emotion genre map, using built-in mapping");
                EmotionGenreMap::default()
            }),
            None => EmotionGenreMap::default(),
        };

        let state = Self::new(store)
            .with_classifier(classifier::load_classifier(&config.model_dir))
            .with_poster_provider(posters)
            .with_emotion_genres(emotion_genres)
            .with_limits(RecommendLimits {
                default_count: config.default_recommendation_count,
                max_count: config.max_recommendation_count,
            })
            .load_catalog()
            .await;

        tracing::info!(
            model_loaded = state.model_loaded(),
            data_loaded = state.data_loaded,
            movies = state.catalog.movie_count(),
            genres = state.catalog.genre_count(),
            "Application state ready"
        );

        state
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    /// Detects the emotion of `text`, or [`Emotion::Unknown`] without a model
    pub async fn detect_emotion(&self, text: &str) -> AppResult<Emotion> {
        match &self.classifier {
            Some(classifier) => {
                let emotion =
                    classifier::classify_blocking(Arc::clone(classifier), text.to_string()).await?;
                tracing::debug!(emotion = %emotion, backend = classifier.name(), "Emotion detected");
                Ok(emotion)
            }
            None => Ok(Emotion::Unknown),
        }
    }
}
