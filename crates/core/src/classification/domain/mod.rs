pub mod classification_result;
pub mod zero_shot_classifier;
