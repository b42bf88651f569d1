use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Emotion predicted from free text.
///
/// The first six variants are the classes the model was trained on, listed in
/// the sorted order a fitted label encoder assigns to class indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Fear,
    Joy,
    Love,
    Sadness,
    Surprise,
    /// Reported when no model is loaded or the model emits an unexpected label
    Unknown,
}

impl Emotion {
    /// The classes a model can produce, in class-index order
    pub const LABELS: [Emotion; 6] = [
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Joy,
        Emotion::Love,
        Emotion::Sadness,
        Emotion::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Love => "love",
            Emotion::Sadness => "sadness",
            Emotion::Surprise => "surprise",
            Emotion::Unknown => "unknown",
        }
    }

    /// Maps a model label to an emotion, degrading to [`Emotion::Unknown`]
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_else(|_| {
            tracing::warn!(label = %label, "Classifier produced an unrecognized label");
            Emotion::Unknown
        })
    }
}

impl Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized emotion label '{0}'")]
pub struct UnknownEmotionLabel(pub String);

impl FromStr for Emotion {
    type Err = UnknownEmotionLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anger" | "angry" => Ok(Emotion::Anger),
            "fear" => Ok(Emotion::Fear),
            "joy" | "happy" | "happiness" => Ok(Emotion::Joy),
            "love" => Ok(Emotion::Love),
            "sadness" | "sad" => Ok(Emotion::Sadness),
            "surprise" => Ok(Emotion::Surprise),
            "unknown" => Ok(Emotion::Unknown),
            _ => Err(UnknownEmotionLabel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_sorted() {
        let names: Vec<&str> = Emotion::LABELS.iter().map(Emotion::as_str).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Joy".parse::<Emotion>().unwrap(), Emotion::Joy);
        assert_eq!(" SADNESS ".parse::<Emotion>().unwrap(), Emotion::Sadness);
    }

    #[test]
    fn test_from_label_degrades_to_unknown() {
        assert_eq!(Emotion::from_label("neutral"), Emotion::Unknown);
        assert_eq!(Emotion::from_label("fear"), Emotion::Fear);
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Emotion::Surprise).unwrap(), "\"surprise\"");
        assert_eq!(serde_json::to_string(&Emotion::Unknown).unwrap(), "\"unknown\"");
    }
}
