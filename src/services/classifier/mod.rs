//! Emotion classification.
//!
//! The service talks to the model through [`EmotionClassifier`] so handlers can
//! be exercised without model weights. The ONNX Runtime backend is compiled in
//! with the `onnx` feature.

use std::path::Path;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Emotion,
};

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmotionClassifier;

/// Predicts the dominant emotion of a piece of text
#[cfg_attr(test, mockall::automock)]
pub trait EmotionClassifier: Send + Sync {
    /// Returns the highest-probability label for `text`.
    ///
    /// Callers reject empty text before reaching the classifier.
    fn classify(&self, text: &str) -> AppResult<Emotion>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Runs the classifier on the blocking pool, since inference is CPU-bound
pub async fn classify_blocking(
    classifier: Arc<dyn EmotionClassifier>,
    text: String,
) -> AppResult<Emotion> {
    tokio::task::spawn_blocking(move || classifier.classify(&text))
        .await
        .map_err(|e| AppError::Internal(format!("Classifier task failed: {}", e)))?
}

/// Loads the classifier from `model_dir`.
///
/// Never fails: a missing or broken model leaves the service without a
/// classifier, and emotion detection reports [`Emotion::Unknown`].
pub fn load_classifier(model_dir: &Path) -> Option<Arc<dyn EmotionClassifier>> {
    #[cfg(feature = "onnx")]
    {
        match OnnxEmotionClassifier::load(model_dir) {
            Ok(classifier) => Some(Arc::new(classifier)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    model_dir = %model_dir.display(),
                    "Failed to load emotion model, emotions will be reported as unknown"
                );
                None
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        tracing::warn!(
            model_dir = %model_dir.display(),
            "Built without the `onnx` feature, emotions will be reported as unknown"
        );
        None
    }
}

/// Resolves class names for the model's output indices.
///
/// Reads `id2label` from a Hugging Face `config.json` when one is present and
/// falls back to the sorted label order a fitted label encoder uses.
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
pub fn load_labels(model_dir: &Path) -> anyhow::Result<Vec<String>> {
    let config_path = model_dir.join("config.json");
    if !config_path.exists() {
        return Ok(default_labels());
    }

    let config: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
    match config.get("id2label").and_then(|v| v.as_object()) {
        Some(id2label) => labels_from_id2label(id2label),
        None => Ok(default_labels()),
    }
}

#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
fn default_labels() -> Vec<String> {
    Emotion::LABELS.iter().map(|e| e.as_str().to_string()).collect()
}

#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
fn labels_from_id2label(
    id2label: &serde_json::Map<String, serde_json::Value>,
) -> anyhow::Result<Vec<String>> {
    let mut indexed: Vec<(usize, String)> = id2label
        .iter()
        .map(|(index, label)| {
            let index: usize = index
                .parse()
                .map_err(|_| anyhow::anyhow!("id2label key '{}' is not an index", index))?;
            let label = label
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("id2label value for {} is not a string", index))?;
            Ok((index, label.to_string()))
        })
        .collect::<anyhow::Result<_>>()?;
    indexed.sort_by_key(|(index, _)| *index);

    for (expected, (index, _)) in indexed.iter().enumerate() {
        anyhow::ensure!(*index == expected, "id2label is missing index {}", expected);
    }

    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}

/// Index of the largest logit
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
pub(crate) fn argmax(logits: &[f32]) -> Option<usize> {
    logits
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(index, _)| index)
}
