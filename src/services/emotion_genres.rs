use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use crate::models::{genre_key, Emotion};

/// Maps each emotion to an ordered list of candidate genres (lowercase)
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionGenreMap {
    genres: HashMap<Emotion, Vec<String>>,
}

impl Default for EmotionGenreMap {
    fn default() -> Self {
        let entries: [(Emotion, &[&str]); 6] = [
            (Emotion::Joy, &["comedy", "adventure", "animation", "family"]),
            (Emotion::Sadness, &["drama", "romance", "music"]),
            (Emotion::Anger, &["action", "thriller", "crime"]),
            (Emotion::Fear, &["horror", "thriller", "mystery"]),
            (Emotion::Surprise, &["mystery", "science fiction", "fantasy"]),
            (Emotion::Love, &["romance", "drama", "comedy"]),
        ];

        Self {
            genres: entries
                .into_iter()
                .map(|(emotion, genres)| {
                    (emotion, genres.iter().map(|g| g.to_string()).collect())
                })
                .collect(),
        }
    }
}

impl EmotionGenreMap {
    /// Loads a mapping from a JSON object of `emotion -> [genre, ...]`.
    ///
    /// Emotions missing from the file keep their built-in genres.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let raw: HashMap<String, Vec<String>> =
            serde_json::from_str(json).context("emotion genre map must be an object of lists")?;

        let mut map = Self::default();
        for (label, genres) in raw {
            let emotion: Emotion = label.parse()?;
            anyhow::ensure!(
                emotion != Emotion::Unknown,
                "genres cannot be assigned to 'unknown'"
            );
            let genres = genres
                .into_iter()
                .map(|g| genre_key(&g))
                .filter(|g| !g.is_empty())
                .collect();
            map.genres.insert(emotion, genres);
        }
        Ok(map)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading emotion genre map {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Candidate genres for an emotion, most preferred first
    pub fn genres_for(&self, emotion: Emotion) -> &[String] {
        self.genres
            .get(&emotion)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
