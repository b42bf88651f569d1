//! ONNX Runtime backend for a DistilBERT sequence-classification model.
//!
//! The model directory must contain `model.onnx` and `tokenizer.json`;
//! `config.json` supplies the class names when present.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use super::{argmax, load_labels, EmotionClassifier};
use crate::{
    error::{AppError, AppResult},
    models::Emotion,
};

/// DistilBERT accepts at most 512 positions
const MAX_SEQUENCE_LENGTH: usize = 512;

pub struct OnnxEmotionClassifier {
    // Session::run needs exclusive access
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
}

impl OnnxEmotionClassifier {
    /// Load a classifier from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        // Single inputs need no padding
        tokenizer.with_padding(None);

        let labels = load_labels(model_dir)?;
        anyhow::ensure!(!labels.is_empty(), "model has no class labels");

        info!(
            model = %model_path.display(),
            classes = labels.len(),
            "Loaded emotion model"
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
        })
    }

    fn logits(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&mask| mask as i64)
            .collect();
        let shape = [1_i64, input_ids.len() as i64];

        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("inference session lock poisoned"))?;

        // DistilBERT takes no token_type_ids
        let outputs = session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
        ])?;

        // Logits: [1, num_labels]
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[0] == 1 && dims[1] as usize == self.labels.len(),
            "unexpected output shape: {dims:?}, expected [1, {}]",
            self.labels.len()
        );

        Ok(output_data.to_vec())
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&self, text: &str) -> AppResult<Emotion> {
        let logits = self
            .logits(text)
            .map_err(|e| AppError::Inference(e.to_string()))?;

        let index = argmax(&logits)
            .ok_or_else(|| AppError::Inference("model returned no logits".to_string()))?;

        Ok(Emotion::from_label(&self.labels[index]))
    }

    fn name(&self) -> &'static str {
        "onnx-distilbert"
    }
}
