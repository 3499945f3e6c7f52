pub mod entity_pattern;
pub mod entity_recognizer;
pub mod entity_span;
