use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Highest rating on the catalog's scale
pub const MAX_RATING: f64 = 5.0;

/// Key genres are compared and indexed under
pub fn genre_key(genre: &str) -> String {
    genre.trim().to_lowercase()
}

/// A movie as served to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub genres: Vec<String>,
    /// Rating on a 0-5 scale
    pub rating: f64,
    /// Rating as reported by the source, on its own scale (usually 0-10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

impl Movie {
    /// Case-insensitive genre membership
    pub fn has_genre(&self, genre: &str) -> bool {
        let key = genre_key(genre);
        self.genres.iter().any(|g| genre_key(g) == key)
    }
}

/// Raw movie record as stored in the CSV snapshot or a Firestore document.
///
/// Field names vary between exports, so the common spellings are accepted
/// as aliases and every field except the title is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MovieRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "genre")]
    pub genres: Option<GenreField>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "vote_average", alias = "imdb_rating")]
    pub external_rating: Option<f64>,
    #[serde(default, alias = "poster", alias = "poster_path")]
    pub poster_url: Option<String>,
}

/// Record identifier, kept as text whatever type the source used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.trim().to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct RecordIdVisitor;

impl<'de> de::Visitor<'de> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or numeric id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RecordId, E> {
        Ok(RecordId::from(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<RecordId, E> {
        Ok(RecordId(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RecordId, E> {
        Ok(RecordId(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RecordId, E> {
        Ok(RecordId(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RecordId, E> {
        Ok(RecordId(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RecordIdVisitor)
    }
}

/// Genres are either a delimited string (`Drama|Comedy`, `Drama, Comedy`) or a list
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GenreField {
    List(Vec<String>),
    Delimited(String),
}

impl GenreField {
    /// Splits into trimmed genre names, dropping empties and duplicates
    pub fn into_genres(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            GenreField::List(list) => list,
            GenreField::Delimited(text) => text
                .split(['|', ','])
                .map(str::to_string)
                .collect(),
        };

        let mut seen = HashSet::with_capacity(raw.len());
        raw.into_iter()
            .map(|genre| genre.trim().to_string())
            .filter(|genre| !genre.is_empty() && seen.insert(genre_key(genre)))
            .collect()
    }
}

/// Normalizes a rating onto the 0-5 scale
fn clamp_rating(rating: f64) -> f64 {
    if rating.is_finite() {
        rating.clamp(0.0, MAX_RATING)
    } else {
        0.0
    }
}

impl MovieRecord {
    /// Converts the raw record into a [`Movie`].
    ///
    /// `position` is the record's row index and stands in for a missing id.
    /// Returns `None` for records without a usable title.
    pub fn into_movie(self, position: usize) -> Option<Movie> {
        let title = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;

        let rating = self
            .rating
            .or_else(|| self.external_rating.map(|r| r / 2.0))
            .map(clamp_rating)
            .unwrap_or(0.0);

        let id = self
            .id
            .map(|id| id.to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| position.to_string());

        Some(Movie {
            id,
            title,
            genres: self.genres.map(GenreField::into_genres).unwrap_or_default(),
            rating,
            external_rating: self.external_rating.filter(|r| r.is_finite()),
            poster_url: self.poster_url.filter(|url| !url.trim().is_empty()),
        })
    }
}
