pub mod quantity_entity_recognizer;
