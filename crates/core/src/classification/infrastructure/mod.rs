pub mod execution_provider;
pub mod onnx_nli_classifier;
