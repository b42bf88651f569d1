use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Movie,
    services::{catalog::MovieCatalog, catalog::Selection, providers::PosterProvider},
};

/// Bounds on how many movies a single response may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendLimits {
    pub default_count: usize,
    pub max_count: usize,
}

impl Default for RecommendLimits {
    fn default() -> Self {
        Self {
            default_count: 5,
            max_count: 20,
        }
    }
}

impl RecommendLimits {
    /// Resolves the `count` query parameter.
    ///
    /// Absent means the default; larger than the maximum is capped.
    pub fn resolve_count(&self, raw: Option<&str>) -> AppResult<usize> {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(self.default_count.min(self.max_count));
        };

        let count: usize = raw.parse().map_err(|_| {
            AppError::InvalidInput(format!("count must be a positive integer, got '{}'", raw))
        })?;
        if count == 0 {
            return Err(AppError::InvalidInput(
                "count must be a positive integer, got '0'".to_string(),
            ));
        }

        Ok(count.min(self.max_count))
    }
}

/// Interprets the `sort` query parameter; only truthy values sort by rating
pub fn parse_selection(raw: Option<&str>) -> Selection {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1" | "yes" | "on") => Selection::TopRated,
        _ => Selection::Random,
    }
}

/// First candidate genre present in the catalog, in preference order
pub fn pick_genre<'a>(catalog: &MovieCatalog, candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .map(String::as_str)
        .find(|genre| catalog.contains_genre(genre))
}

/// The 404 for a genre missing from the catalog, with the known genres as a hint
pub fn unknown_genre(catalog: &MovieCatalog, genre: &str) -> AppError {
    AppError::UnknownGenre {
        genre: genre.to_string(),
        available_genres: catalog.genres(),
    }
}

/// Fills in missing posters and external ratings.
///
/// Lookups run concurrently and never fail the response: movies whose lookup
/// fails are returned unchanged, in input order.
pub async fn enrich_posters(
    provider: Option<Arc<dyn PosterProvider>>,
    movies: Vec<Movie>,
) -> Vec<Movie> {
    let Some(provider) = provider else {
        return movies;
    };

    let mut tasks = Vec::with_capacity(movies.len());
    for movie in movies {
        if movie.poster_url.is_some() {
            tasks.push((movie, None));
            continue;
        }
        let provider = Arc::clone(&provider);
        let title = movie.title.clone();
        let task = tokio::spawn(async move { provider.lookup(&title).await });
        tasks.push((movie, Some(task)));
    }

    let mut enriched = Vec::with_capacity(tasks.len());
    let mut found = 0usize;

    for (mut movie, task) in tasks {
        if let Some(task) = task {
            match task.await {
                Ok(Some(poster)) => {
                    movie.poster_url = Some(poster.url);
                    if movie.external_rating.is_none() {
                        movie.external_rating = poster.external_rating;
                    }
                    found += 1;
                }
                Ok(None) => {}
                Err(e) => tracing::error!(error = %e, "Poster lookup task failed"),
            }
        }
        enriched.push(movie);
    }

    tracing::debug!(
        movies = enriched.len(),
        posters_found = found,
        provider = provider.name(),
        "Poster enrichment completed"
    );

    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Poster;
    use crate::services::providers::MockPosterProvider;

    fn movie(id: &str, title: &str, poster_url: Option<&str>) -> Movie {
        Movie {
            id: id.to_string(),
            title: title.to_string(),
            genres: vec!["Drama".to_string()],
            rating: 3.0,
            external_rating: None,
            poster_url: poster_url.map(str::to_string),
        }
    }

    #[test]
    fn test_resolve_count() {
        let limits = RecommendLimits {
            default_count: 5,
            max_count: 10,
        };
        assert_eq!(limits.resolve_count(None).unwrap(), 5);
        assert_eq!(limits.resolve_count(Some("")).unwrap(), 5);
        assert_eq!(limits.resolve_count(Some("3")).unwrap(), 3);
        assert_eq!(limits.resolve_count(Some("500")).unwrap(), 10);
        assert!(matches!(
            limits.resolve_count(Some("0")),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            limits.resolve_count(Some("-2")),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            limits.resolve_count(Some("many")),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection(Some("true")), Selection::TopRated);
        assert_eq!(parse_selection(Some("TRUE")), Selection::TopRated);
        assert_eq!(parse_selection(Some("1")), Selection::TopRated);
        assert_eq!(parse_selection(Some("false")), Selection::Random);
        assert_eq!(parse_selection(Some("banana")), Selection::Random);
        assert_eq!(parse_selection(None), Selection::Random);
    }

    #[test]
    fn test_pick_genre_skips_missing_candidates() {
        let catalog = MovieCatalog::new(vec![movie("1", "Heat", None)]);
        let candidates = vec!["romance".to_string(), "drama".to_string()];
        assert_eq!(pick_genre(&catalog, &candidates), Some("drama"));
        assert_eq!(pick_genre(&catalog, &candidates[..1]), None);
    }

    #[tokio::test]
    async fn test_enrich_without_provider_is_identity() {
        let movies = vec![movie("1", "Heat", None)];
        let enriched = enrich_posters(None, movies.clone()).await;
        assert_eq!(enriched, movies);
    }

    #[tokio::test]
    async fn test_enrich_fills_missing_posters_only() {
        let mut provider = MockPosterProvider::new();
        provider
            .expect_lookup()
            .withf(|title| title == "Heat")
            .times(1)
            .returning(|_| {
                Some(Poster {
                    url: "https://img.example/heat.jpg".to_string(),
                    external_rating: Some(8.3),
                })
            });
        provider
            .expect_lookup()
            .withf(|title| title == "Obscure")
            .times(1)
            .returning(|_| None);
        provider.expect_name().return_const("mock");

        let movies = vec![
            movie("1", "Heat", None),
            movie("2", "Alien", Some("https://img.example/alien.jpg")),
            movie("3", "Obscure", None),
        ];

        let enriched = enrich_posters(Some(Arc::new(provider)), movies).await;

        let ids: Vec<&str> = enriched.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(enriched[0].poster_url.as_deref(), Some("https://img.example/heat.jpg"));
        assert_eq!(enriched[0].external_rating, Some(8.3));
        assert_eq!(enriched[1].poster_url.as_deref(), Some("https://img.example/alien.jpg"));
        assert_eq!(enriched[2].poster_url, None);
    }
}
