use rand::{seq::SliceRandom, Rng};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{genre_key, Movie};

/// How recommendations are picked from a genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Random sample, for variety
    #[default]
    Random,
    /// Highest rated first
    TopRated,
}

/// In-memory movie catalog with a genre index.
///
/// Built once at startup and never mutated; the index reflects the dataset at
/// load time. Genre keys are lowercase.
#[derive(Debug, Default)]
pub struct MovieCatalog {
    movies: Vec<Arc<Movie>>,
    by_genre: HashMap<String, Vec<Arc<Movie>>>,
}

impl MovieCatalog {
    /// Builds the catalog and its genre index
    pub fn new(movies: Vec<Movie>) -> Self {
        let movies: Vec<Arc<Movie>> = movies.into_iter().map(Arc::new).collect();
        let mut by_genre: HashMap<String, Vec<Arc<Movie>>> = HashMap::new();

        for movie in &movies {
            let keys: HashSet<String> = movie
                .genres
                .iter()
                .map(|genre| genre_key(genre))
                .filter(|key| !key.is_empty())
                .collect();
            for key in keys {
                by_genre.entry(key).or_default().push(Arc::clone(movie));
            }
        }

        tracing::info!(
            movies = movies.len(),
            genres = by_genre.len(),
            "Built genre index"
        );

        Self { movies, by_genre }
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn genre_count(&self) -> usize {
        self.by_genre.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Known genres, sorted
    pub fn genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = self.by_genre.keys().cloned().collect();
        genres.sort_unstable();
        genres
    }

    pub fn contains_genre(&self, genre: &str) -> bool {
        self.by_genre.contains_key(&genre_key(genre))
    }

    /// Movies indexed under `genre`, in dataset order
    pub fn movies_in(&self, genre: &str) -> Option<&[Arc<Movie>]> {
        self.by_genre
            .get(&genre_key(genre))
            .map(Vec::as_slice)
    }

    /// Picks up to `count` movies from `genre`.
    ///
    /// Returns `None` when the genre is not indexed.
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        genre: &str,
        count: usize,
        selection: Selection,
        rng: &mut R,
    ) -> Option<Vec<Movie>> {
        let candidates = self.movies_in(genre)?;

        let picked = match selection {
            Selection::Random => candidates
                .choose_multiple(rng, count)
                .map(|movie| Movie::clone(movie))
                .collect(),
            Selection::TopRated => {
                let mut sorted: Vec<&Arc<Movie>> = candidates.iter().collect();
                // Stable, so ties keep dataset order
                sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating));
                sorted
                    .into_iter()
                    .take(count)
                    .map(|movie| Movie::clone(movie))
                    .collect()
            }
        };

        Some(picked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn movie(id: &str, genres: &[&str], rating: f64) -> Movie {
        Movie {
            id: id.to_string(),
            title: format!("Movie {}", id),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            rating,
            external_rating: None,
            poster_url: None,
        }
    }

    fn catalog() -> MovieCatalog {
        MovieCatalog::new(vec![
            movie("1", &["Comedy", "Romance"], 3.5),
            movie("2", &["Drama"], 4.8),
            movie("3", &["Comedy"], 2.1),
            movie("4", &["Drama", "Comedy"], 4.8),
            movie("5", &["Horror"], 3.0),
            movie("6", &["drama"], 1.2),
            movie("7", &["Comedy"], 4.0),
        ])
    }

    #[test]
    fn test_index_lowercases_genres() {
        let catalog = catalog();
        assert_eq!(catalog.movie_count(), 7);
        assert_eq!(catalog.genres(), vec!["comedy", "drama", "horror", "romance"]);
        assert_eq!(catalog.movies_in("DRAMA").unwrap().len(), 3);
        assert!(catalog.contains_genre(" Horror "));
        assert!(!catalog.contains_genre("western"));
    }

    #[test]
    fn test_random_selection_respects_count_and_genre() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(7);

        let picked = catalog
            .recommend("comedy", 3, Selection::Random, &mut rng)
            .unwrap();

        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|m| m.has_genre("comedy")));
        let ids: HashSet<&str> = picked.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 3, "sampling must not repeat movies");
    }

    #[test]
    fn test_count_larger_than_genre() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(1);

        let picked = catalog
            .recommend("horror", 10, Selection::Random, &mut rng)
            .unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id, "5");
    }

    #[test]
    fn test_top_rated_is_non_increasing_and_stable() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(0);

        let picked = catalog
            .recommend("Drama", 10, Selection::TopRated, &mut rng)
            .unwrap();

        let ids: Vec<&str> = picked.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "6"]);
        assert!(picked.windows(2).all(|w| w[0].rating >= w[1].rating));
    }

    #[test]
    fn test_movie_indexed_once_per_genre() {
        let catalog = MovieCatalog::new(vec![
            movie("1", &["Ação", "AÇÃO", "ação "], 4.0),
            movie("2", &["Drama"], 3.0),
        ]);
        assert_eq!(catalog.movies_in("ação").unwrap().len(), 1);
        assert_eq!(catalog.genres(), vec!["ação", "drama"]);

        let mut rng = StdRng::seed_from_u64(3);
        let picked = catalog
            .recommend("AÇÃO", 5, Selection::Random, &mut rng)
            .unwrap();
        let ids: Vec<&str> = picked.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_unknown_genre() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(catalog
            .recommend("western", 3, Selection::Random, &mut rng)
            .is_none());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = MovieCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.genres().is_empty());
        assert_eq!(catalog.genre_count(), 0);
    }
}
