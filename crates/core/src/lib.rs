//! Extraction of customer requirements, discussed company policies and
//! customer objections from sales-call transcripts.
//!
//! Layout follows domain / infrastructure lines: `*::domain` modules hold
//! types and collaborator traits, `*::infrastructure` modules hold concrete
//! adapters (ONNX Runtime, regex), and `pipeline` orchestrates one
//! transcript end to end.

pub mod classification;
pub mod entities;
pub mod extraction;
pub mod pipeline;
pub mod shared;
pub mod text;
