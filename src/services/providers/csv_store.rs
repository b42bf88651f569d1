use std::io::Read;
use std::path::PathBuf;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieRecord, RecordId},
    services::providers::MovieStore,
};

/// Movie store backed by a CSV snapshot on disk
#[derive(Debug, Clone)]
pub struct CsvMovieStore {
    path: PathBuf,
}

impl CsvMovieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parses movies from CSV with a header row.
///
/// Ids are taken verbatim from the `id` column, so `007` stays `007`. Rows
/// without a title or with unparseable values are skipped with a warning.
pub fn read_movies<R: Read>(reader: R) -> AppResult<Vec<Movie>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let id_column = headers.iter().position(|h| h == "id");

    let mut movies = Vec::new();
    let mut skipped = 0usize;

    for (position, row) in reader.records().enumerate() {
        let row = row?;
        let mut record = match row.deserialize::<MovieRecord>(Some(&headers)) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row = position, error = %e, "Skipping malformed CSV row");
                skipped += 1;
                continue;
            }
        };

        // The reader infers numbers, which would turn `007` into `7`
        if let Some(column) = id_column {
            record.id = row
                .get(column)
                .filter(|id| !id.is_empty())
                .map(RecordId::from);
        }

        match record.into_movie(position) {
            Some(movie) => movies.push(movie),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Skipped CSV rows");
    }

    Ok(movies)
}

#[async_trait::async_trait]
impl MovieStore for CsvMovieStore {
    async fn fetch_movies(&self) -> AppResult<Vec<Movie>> {
        let path = self.path.clone();

        let movies = tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&path)?;
            read_movies(file)
        })
        .await
        .map_err(|e| AppError::Internal(format!("CSV reader task failed: {}", e)))??;

        tracing::info!(
            path = %self.path.display(),
            movies = movies.len(),
            store = self.name(),
            "Movies loaded"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}
