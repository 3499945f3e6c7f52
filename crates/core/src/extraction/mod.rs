pub mod category_spec;
pub mod extraction_config;
pub mod extraction_record;
pub mod requirement_extractor;
pub mod topic_extractor;
