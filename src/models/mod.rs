use serde::Deserialize;
use std::collections::HashMap;

pub mod emotion;
pub mod movie;

pub use emotion::Emotion;
pub use movie::{genre_key, GenreField, Movie, MovieRecord, RecordId};

// ============================================================================
// OMDb API Types
// ============================================================================

/// Response from the OMDb lookup-by-title endpoint (`/?t=...`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbTitle {
    /// "True" or "False"
    pub response: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Image URL, or "N/A"
    #[serde(default)]
    pub poster: Option<String>,
    /// Rating on a 0-10 scale as text, or "N/A"
    #[serde(default, rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Poster details found for a title
#[derive(Debug, Clone, PartialEq)]
pub struct Poster {
    pub url: String,
    pub external_rating: Option<f64>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("N/A"))
}

impl OmdbTitle {
    /// Extracts the poster, if the lookup found one
    pub fn into_poster(self) -> Option<Poster> {
        if !self.response.eq_ignore_ascii_case("true") {
            return None;
        }
        let url = present(self.poster)?;
        let external_rating = present(self.imdb_rating).and_then(|r| r.parse::<f64>().ok());
        Some(Poster {
            url,
            external_rating,
        })
    }
}

// ============================================================================
// Firestore REST API Types
// ============================================================================

/// Page of documents from `documents/{collection}`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreListResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A single Firestore document
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreDocument {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{collection}/{id}`
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
}

impl FirestoreDocument {
    /// The document id, i.e. the last segment of the resource name
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Flattens the typed fields into plain JSON and adds the document id
    pub fn into_json(self) -> serde_json::Map<String, serde_json::Value> {
        let id = self.id().to_string();
        let mut map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .into_iter()
            .map(|(key, value)| (key, value.into_json()))
            .collect();
        map.insert("id".to_string(), serde_json::Value::String(id));
        map
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FirestoreArray {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FirestoreMap {
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreGeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// Typed Firestore value, one key per variant
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue(serde_json::Value),
    BooleanValue(bool),
    /// int64 values are transported as strings
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(FirestoreGeoPoint),
    ArrayValue(FirestoreArray),
    MapValue(FirestoreMap),
}

impl FirestoreValue {
    /// Converts to plain JSON, dropping the type tags
    pub fn into_json(self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            FirestoreValue::NullValue(_) => Value::Null,
            FirestoreValue::BooleanValue(b) => Value::Bool(b),
            FirestoreValue::IntegerValue(raw) => raw
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(raw)),
            FirestoreValue::DoubleValue(d) => serde_json::Number::from_f64(d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FirestoreValue::TimestampValue(s)
            | FirestoreValue::StringValue(s)
            | FirestoreValue::BytesValue(s)
            | FirestoreValue::ReferenceValue(s) => Value::String(s),
            FirestoreValue::GeoPointValue(point) => serde_json::json!({
                "latitude": point.latitude,
                "longitude": point.longitude,
            }),
            FirestoreValue::ArrayValue(array) => Value::Array(
                array
                    .values
                    .into_iter()
                    .map(FirestoreValue::into_json)
                    .collect(),
            ),
            FirestoreValue::MapValue(map) => Value::Object(
                map.fields
                    .into_iter()
                    .map(|(key, value)| (key, value.into_json()))
                    .collect(),
            ),
        }
    }
}
