//! Zero-shot classifier using an MNLI entailment model via ONNX Runtime.
//!
//! Each candidate label becomes a hypothesis paired with the transcript as
//! premise. The label's score is the entailment probability after a softmax
//! over the contradiction and entailment logits, so labels are scored
//! independently of each other.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ndarray::Array2;
use ort::session::{Session, SessionInputValue};
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams, TruncationStrategy};

use super::execution_provider::preferred_execution_providers;
use crate::classification::domain::classification_result::{ClassificationResult, ScoredLabel};
use crate::classification::domain::zero_shot_classifier::ZeroShotClassifier;
use crate::shared::constants::{NLI_HYPOTHESIS_TEMPLATE, NLI_MODEL_FILE, NLI_TOKENIZER_FILE};
use crate::shared::error::CollaboratorError;

/// Logit index of the "contradiction" class for bart-large-mnli.
const CONTRADICTION_INDEX: usize = 0;

/// Logit index of the "entailment" class for bart-large-mnli.
const ENTAILMENT_INDEX: usize = 2;

/// Token budget for one premise/hypothesis pair. The premise is truncated first.
const MAX_SEQUENCE_LENGTH: usize = 1024;

pub struct OnnxNliClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    wants_token_type_ids: bool,
}

impl OnnxNliClassifier {
    /// Load `model.onnx` and `tokenizer.json` from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, CollaboratorError> {
        let model_path = model_dir.join(NLI_MODEL_FILE);
        let tokenizer_path = model_dir.join(NLI_TOKENIZER_FILE);
        if !model_path.exists() {
            return Err(format!("NLI model not found at: {}", model_path.display()).into());
        }
        if !tokenizer_path.exists() {
            return Err(format!("Tokenizer not found at: {}", tokenizer_path.display()).into());
        }

        let session = Session::builder()
            .map_err(|e| format!("Failed to create ONNX session: {e}"))?
            .with_execution_providers(preferred_execution_providers())
            .map_err(|e| format!("Failed to register execution providers: {e}"))?
            .commit_from_file(&model_path)
            .map_err(|e| format!("Failed to load NLI model: {e}"))?;

        let wants_token_type_ids = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| format!("Failed to load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                strategy: TruncationStrategy::OnlyFirst,
                ..Default::default()
            }))
            .map_err(|e| format!("Failed to configure truncation: {e}"))?;

        log::info!("NLI classifier loaded from {}", model_dir.display());

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            wants_token_type_ids,
        })
    }

    fn score_label(&self, text: &str, label: &str) -> Result<f32, CollaboratorError> {
        let hypothesis = hypothesis_for(NLI_HYPOTHESIS_TEMPLATE, label);
        let encoding = self
            .tokenizer
            .encode((text, hypothesis.as_str()), true)
            .map_err(|e| format!("Tokenization failed: {e}"))?;

        let seq_len = encoding.get_ids().len();
        let ids = to_i64_row(encoding.get_ids(), seq_len)?;
        let mask = to_i64_row(encoding.get_attention_mask(), seq_len)?;

        let mut inputs: Vec<(&str, SessionInputValue<'_>)> = vec![
            ("input_ids", to_tensor(ids)?),
            ("attention_mask", to_tensor(mask)?),
        ];
        if self.wants_token_type_ids {
            let type_ids = to_i64_row(encoding.get_type_ids(), seq_len)?;
            inputs.push(("token_type_ids", to_tensor(type_ids)?));
        }

        let mut session = lock_session(&self.session);
        let outputs = session
            .run(inputs)
            .map_err(|e| format!("NLI inference failed: {e}"))?;
        if outputs.len() == 0 {
            return Err("NLI model produced no outputs".into());
        }

        let logits = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| format!("Cannot read NLI logits: {e}"))?;
        let row: Vec<f32> = logits.iter().copied().collect();
        entailment_probability(&row, CONTRADICTION_INDEX, ENTAILMENT_INDEX)
    }
}

impl ZeroShotClassifier for OnnxNliClassifier {
    fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ClassificationResult, CollaboratorError> {
        let mut scored = Vec::with_capacity(candidate_labels.len());
        for label in candidate_labels {
            let score = self.score_label(text, label)?;
            scored.push(ScoredLabel::new(label.clone(), score));
        }
        Ok(ClassificationResult::ranked(scored))
    }
}

/// A task that panicked mid-inference leaves nothing half-written in the
/// session, so a poisoned lock is taken over as-is.
fn lock_session<T>(session: &Mutex<T>) -> MutexGuard<'_, T> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn hypothesis_for(template: &str, label: &str) -> String {
    template.replacen("{}", label, 1)
}

fn to_i64_row(values: &[u32], seq_len: usize) -> Result<Array2<i64>, CollaboratorError> {
    let data: Vec<i64> = values.iter().map(|&v| v as i64).collect();
    Ok(Array2::from_shape_vec((1, seq_len), data)?)
}

fn to_tensor(array: Array2<i64>) -> Result<SessionInputValue<'static>, CollaboratorError> {
    let tensor = Tensor::from_array(array).map_err(|e| format!("Cannot build input tensor: {e}"))?;
    Ok(tensor.into())
}

/// Softmax over the contradiction and entailment logits, returning the
/// entailment share. The neutral logit is ignored.
fn entailment_probability(
    logits: &[f32],
    contradiction: usize,
    entailment: usize,
) -> Result<f32, CollaboratorError> {
    let (c, e) = match (logits.get(contradiction), logits.get(entailment)) {
        (Some(&c), Some(&e)) => (c, e),
        _ => {
            return Err(format!(
                "NLI logits have {} classes, need indices {contradiction} and {entailment}",
                logits.len()
            )
            .into())
        }
    };
    let max = c.max(e);
    let ec = (c - max).exp();
    let ee = (e - max).exp();
    Ok(ee / (ec + ee))
}
