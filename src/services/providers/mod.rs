/// External data providers
///
/// Movie records come from a [`MovieStore`] (CSV snapshot or Firestore) and
/// posters from a [`PosterProvider`]. Both sit behind traits so the HTTP layer
/// can be tested with in-memory doubles.
use crate::{error::AppResult, models::Movie, models::Poster};

pub mod csv_store;
pub mod firestore;
pub mod omdb;

pub use csv_store::CsvMovieStore;
pub use firestore::FirestoreMovieStore;
pub use omdb::OmdbPosterProvider;

/// Read-only source of movie records
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieStore: Send + Sync {
    /// Fetches every movie in the store
    async fn fetch_movies(&self) -> AppResult<Vec<Movie>>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Best-effort poster lookup by title
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    /// Looks up a poster for `title`.
    ///
    /// Any failure, including not-found, yields `None`.
    async fn lookup(&self, title: &str) -> Option<Poster>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
