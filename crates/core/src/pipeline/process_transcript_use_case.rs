use crate::classification::domain::zero_shot_classifier::ZeroShotClassifier;
use crate::entities::domain::entity_recognizer::EntityRecognizer;
use crate::entities::domain::entity_span::EntitySpan;
use crate::extraction::category_spec::CategorySpec;
use crate::extraction::extraction_config::ExtractionConfig;
use crate::extraction::extraction_record::{ExtractionRecord, RequirementValue, TopicOutcome};
use crate::extraction::requirement_extractor::{CallOutcome, RequirementExtractor};
use crate::extraction::topic_extractor::TopicExtractor;
use crate::pipeline::task_executor::{
    ExtractionTask, TaskExecutor, TaskKey, TaskOutput, TaskResult,
};
use crate::shared::error::ExtractionError;
use crate::text::normalizer::TextNormalizer;

/// Turns one transcript into an `ExtractionRecord`.
///
/// Collaborators are injected, and nothing is remembered between calls.
pub struct ProcessTranscriptUseCase {
    classifier: Box<dyn ZeroShotClassifier>,
    recognizer: Box<dyn EntityRecognizer>,
    config: ExtractionConfig,
    executor: Box<dyn TaskExecutor>,
}

impl ProcessTranscriptUseCase {
    pub fn new(
        classifier: Box<dyn ZeroShotClassifier>,
        recognizer: Box<dyn EntityRecognizer>,
        config: ExtractionConfig,
        executor: Box<dyn TaskExecutor>,
    ) -> Self {
        Self {
            classifier,
            recognizer,
            config,
            executor,
        }
    }

    /// Normalize raw text, then `process` it.
    pub fn process_raw(
        &self,
        raw: &str,
        conversation_id: &str,
    ) -> Result<ExtractionRecord, ExtractionError> {
        let text = TextNormalizer::normalize(raw);
        self.process(&text, conversation_id)
    }

    /// Extract a record from already-normalized text.
    ///
    /// A failed collaborator call only fails its own category or topic list.
    /// When every call fails, no partial record is built.
    pub fn process(
        &self,
        text: &str,
        conversation_id: &str,
    ) -> Result<ExtractionRecord, ExtractionError> {
        let tasks = self.build_tasks(text);
        let results = self.executor.execute(tasks);

        for (key, result) in &results {
            if let Err(message) = result {
                log::warn!("[{conversation_id}] {key:?} failed: {message}");
            }
        }
        if let Some(first_error) = all_failed(&results) {
            return Err(ExtractionError::AllCollaboratorsFailed {
                conversation_id: conversation_id.to_string(),
                first_error,
            });
        }

        let record = self.assemble(conversation_id, results);
        log::debug!(
            "[{conversation_id}] extracted {} requirements",
            record.customer_requirements.len()
        );
        Ok(record)
    }

    fn build_tasks<'a>(&'a self, text: &'a str) -> Vec<ExtractionTask<'a>> {
        let classifier: &'a dyn ZeroShotClassifier = self.classifier.as_ref();
        let recognizer: &'a dyn EntityRecognizer = self.recognizer.as_ref();
        let config = &self.config;
        let mut tasks = Vec::new();

        for (index, category) in config.categories.iter().enumerate() {
            if let CategorySpec::Classified { labels, .. } = category {
                tasks.push(ExtractionTask::new(TaskKey::Requirement(index), move || {
                    RequirementExtractor::classify_category(
                        classifier,
                        text,
                        labels,
                        config.requirement_threshold,
                    )
                    .map(TaskOutput::Requirement)
                    .map_err(|e| e.to_string())
                }));
            }
        }

        if config.categories.iter().any(CategorySpec::is_pattern) {
            tasks.push(ExtractionTask::new(TaskKey::Entities, move || {
                recognizer
                    .recognize(text)
                    .map(TaskOutput::Entities)
                    .map_err(|e| e.to_string())
            }));
        }

        tasks.push(topic_task(
            TaskKey::CompanyPolicies,
            classifier,
            text,
            &config.company_policies,
            config.topic_threshold,
        ));
        tasks.push(topic_task(
            TaskKey::CustomerObjections,
            classifier,
            text,
            &config.customer_objections,
            config.topic_threshold,
        ));
        tasks
    }

    fn assemble(
        &self,
        conversation_id: &str,
        results: Vec<(TaskKey, TaskResult)>,
    ) -> ExtractionRecord {
        let categories = &self.config.categories;
        let mut classified: Vec<Option<CallOutcome<RequirementValue>>> =
            vec![None; categories.len()];
        let mut entities: Option<CallOutcome<Vec<EntitySpan>>> = None;
        let mut policies = not_evaluated_topics();
        let mut objections = not_evaluated_topics();

        for (key, result) in results {
            match key {
                TaskKey::Requirement(index) => {
                    let outcome = result.and_then(|output| match output {
                        TaskOutput::Requirement(value) => Ok(value),
                        other => Err(unexpected_output(key, &other)),
                    });
                    if let Some(slot) = classified.get_mut(index) {
                        *slot = Some(outcome);
                    }
                }
                TaskKey::Entities => {
                    entities = Some(result.and_then(|output| match output {
                        TaskOutput::Entities(spans) => Ok(spans),
                        other => Err(unexpected_output(key, &other)),
                    }));
                }
                TaskKey::CompanyPolicies => policies = topic_outcome(key, result),
                TaskKey::CustomerObjections => objections = topic_outcome(key, result),
            }
        }

        ExtractionRecord {
            conversation_id: conversation_id.to_string(),
            customer_requirements: RequirementExtractor::assemble(
                categories,
                classified,
                entities.as_ref(),
            ),
            company_policies_discussed: policies,
            customer_objections: objections,
        }
    }
}

fn topic_task<'a>(
    key: TaskKey,
    classifier: &'a dyn ZeroShotClassifier,
    text: &'a str,
    labels: &'a [String],
    threshold: f32,
) -> ExtractionTask<'a> {
    ExtractionTask::new(key, move || {
        TopicExtractor::extract(classifier, text, labels, threshold)
            .map(TaskOutput::Topics)
            .map_err(|e| e.to_string())
    })
}

fn topic_outcome(key: TaskKey, result: TaskResult) -> TopicOutcome {
    match result {
        Ok(TaskOutput::Topics(topics)) => TopicOutcome::Detected(topics),
        Ok(other) => TopicOutcome::Failed(unexpected_output(key, &other)),
        Err(message) => TopicOutcome::Failed(message),
    }
}

fn not_evaluated_topics() -> TopicOutcome {
    TopicOutcome::Failed("topics were not evaluated".to_string())
}

fn unexpected_output(key: TaskKey, output: &TaskOutput) -> String {
    format!("task {key:?} returned unexpected output {output:?}")
}

/// The first error message if every result failed, `None` otherwise.
fn all_failed(results: &[(TaskKey, TaskResult)]) -> Option<String> {
    if results.is_empty() || results.iter().any(|(_, r)| r.is_ok()) {
        return None;
    }
    results.iter().find_map(|(_, r)| r.clone().err())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::domain::classification_result::{
        ClassificationResult, ScoredLabel,
    };
    use crate::entities::domain::entity_span::EntityLabel;
    use crate::entities::infrastructure::quantity_entity_recognizer::QuantityEntityRecognizer;
    use crate::pipeline::infrastructure::sequential_task_executor::SequentialTaskExecutor;
    use crate::pipeline::infrastructure::threaded_task_executor::ThreadedTaskExecutor;
    use crate::shared::error::CollaboratorError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // ─── Stubs ───

    /// Scores labels from a fixed table; unknown labels score 0.0.
    /// Labels named in `failing` make the whole call fail.
    struct ScriptedClassifier {
        scores: HashMap<&'static str, f32>,
        failing: Vec<&'static str>,
        calls: Arc<Mutex<usize>>,
    }

    impl ScriptedClassifier {
        fn new(scores: &[(&'static str, f32)]) -> Self {
            Self {
                scores: scores.iter().copied().collect(),
                failing: Vec::new(),
                calls: Arc::new(Mutex::new(0)),
            }
        }

        fn failing_on(mut self, label: &'static str) -> Self {
            self.failing.push(label);
            self
        }
    }

    impl ZeroShotClassifier for ScriptedClassifier {
        fn classify(
            &self,
            _: &str,
            candidate_labels: &[String],
        ) -> Result<ClassificationResult, CollaboratorError> {
            *self.calls.lock().unwrap() += 1;
            if candidate_labels
                .iter()
                .any(|l| self.failing.contains(&l.as_str()))
            {
                return Err("classifier unreachable".into());
            }
            Ok(ClassificationResult::ranked(
                candidate_labels
                    .iter()
                    .map(|l| ScoredLabel::new(l.clone(), *self.scores.get(l.as_str()).unwrap_or(&0.0)))
                    .collect(),
            ))
        }
    }

    struct FailingClassifier;

    impl ZeroShotClassifier for FailingClassifier {
        fn classify(&self, _: &str, _: &[String]) -> Result<ClassificationResult, CollaboratorError> {
            Err("classifier unreachable".into())
        }
    }

    struct StubRecognizer {
        spans: Vec<EntitySpan>,
    }

    impl EntityRecognizer for StubRecognizer {
        fn recognize(&self, _: &str) -> Result<Vec<EntitySpan>, CollaboratorError> {
            Ok(self.spans.clone())
        }
    }

    struct FailingRecognizer;

    impl EntityRecognizer for FailingRecognizer {
        fn recognize(&self, _: &str) -> Result<Vec<EntitySpan>, CollaboratorError> {
            Err("ner unreachable".into())
        }
    }

    fn no_entities() -> Box<dyn EntityRecognizer> {
        Box::new(StubRecognizer { spans: vec![] })
    }

    fn use_case(
        classifier: impl ZeroShotClassifier + 'static,
        recognizer: Box<dyn EntityRecognizer>,
        executor: Box<dyn TaskExecutor>,
    ) -> ProcessTranscriptUseCase {
        ProcessTranscriptUseCase::new(
            Box::new(classifier),
            recognizer,
            ExtractionConfig::default(),
            executor,
        )
    }

    fn suv_scores() -> Vec<(&'static str, f32)> {
        vec![
            ("SUV", 0.9),
            ("Petrol", 0.3),
            ("Return Policy", 0.7),
            ("Free RC Transfer", 0.4),
            ("Price Issues", 0.65),
        ]
    }

    fn label(s: &str) -> RequirementValue {
        RequirementValue::Label(s.to_string())
    }

    #[test]
    fn test_end_to_end_thresholds_and_absences() {
        let uc = use_case(
            ScriptedClassifier::new(&suv_scores()),
            no_entities(),
            Box::new(SequentialTaskExecutor),
        );

        let record = uc.process("I want an SUV", "transcript_001").unwrap();

        let reqs = &record.customer_requirements;
        assert_eq!(record.conversation_id, "transcript_001");
        assert_eq!(reqs.len(), 6);
        assert_eq!(reqs.get("Car Type"), Some(&label("SUV")));
        assert_eq!(reqs.get("Fuel Type"), Some(&RequirementValue::Absent));
        assert_eq!(reqs.get("Color"), Some(&RequirementValue::Absent));
        assert_eq!(reqs.get("Make Year"), Some(&RequirementValue::Absent));
        assert_eq!(reqs.get("Distance Travelled"), Some(&RequirementValue::Absent));
        assert_eq!(record.company_policies_discussed, TopicOutcome::Detected(vec![]));
        assert_eq!(record.customer_objections, TopicOutcome::Detected(vec![]));
    }

    #[test]
    fn test_topics_and_entities_are_reported() {
        let classifier = ScriptedClassifier::new(&[
            ("Automatic", 0.8),
            ("5-Day Money Back Guarantee", 0.92),
            ("Return Policy", 0.75),
            ("Refurbishment Quality", 0.71),
        ]);
        let recognizer = StubRecognizer {
            spans: vec![
                EntitySpan::new("2019", EntityLabel::Date, 0, 4),
                EntitySpan::new("45,000 km", EntityLabel::Quantity, 10, 19),
            ],
        };
        let uc = use_case(classifier, Box::new(recognizer), Box::new(SequentialTaskExecutor));

        let record = uc.process("text", "c-42").unwrap();

        let reqs = &record.customer_requirements;
        assert_eq!(reqs.get("Transmission Type"), Some(&label("Automatic")));
        assert_eq!(
            reqs.get("Make Year"),
            Some(&RequirementValue::Matches(vec!["2019".to_string()]))
        );
        assert_eq!(
            reqs.get("Distance Travelled"),
            Some(&RequirementValue::Matches(vec!["45,000 km".to_string()]))
        );
        assert_eq!(
            record.company_policies_discussed,
            TopicOutcome::Detected(vec![
                "5-Day Money Back Guarantee".to_string(),
                "Return Policy".to_string()
            ])
        );
        assert_eq!(
            record.customer_objections,
            TopicOutcome::Detected(vec!["Refurbishment Quality".to_string()])
        );
    }

    #[test]
    fn test_one_call_per_classified_category_and_topic_set() {
        let classifier = ScriptedClassifier::new(&[]);
        let calls = classifier.calls.clone();
        let uc = use_case(classifier, no_entities(), Box::new(SequentialTaskExecutor));

        uc.process("text", "id").unwrap();

        // 4 classified categories + policies + objections
        assert_eq!(*calls.lock().unwrap(), 6);
    }

    #[test]
    fn test_failed_category_is_isolated() {
        let classifier = ScriptedClassifier::new(&suv_scores()).failing_on("Red");
        let uc = use_case(classifier, no_entities(), Box::new(SequentialTaskExecutor));

        let record = uc.process("text", "id").unwrap();

        let reqs = &record.customer_requirements;
        assert_eq!(
            reqs.get("Color"),
            Some(&RequirementValue::Failed("classifier unreachable".to_string()))
        );
        assert_eq!(reqs.get("Car Type"), Some(&label("SUV")));
        assert_eq!(record.customer_objections, TopicOutcome::Detected(vec![]));
    }

    #[test]
    fn test_failed_topic_call_is_error_not_empty() {
        let classifier = ScriptedClassifier::new(&suv_scores()).failing_on("Price Issues");
        let uc = use_case(classifier, no_entities(), Box::new(SequentialTaskExecutor));

        let record = uc.process("text", "id").unwrap();

        assert_eq!(
            record.customer_objections,
            TopicOutcome::Failed("classifier unreachable".to_string())
        );
        assert_eq!(record.company_policies_discussed, TopicOutcome::Detected(vec![]));
    }

    #[test]
    fn test_recognizer_failure_only_fails_pattern_categories() {
        let uc = use_case(
            ScriptedClassifier::new(&suv_scores()),
            Box::new(FailingRecognizer),
            Box::new(SequentialTaskExecutor),
        );

        let record = uc.process("text", "id").unwrap();

        let reqs = &record.customer_requirements;
        assert!(reqs.get("Make Year").unwrap().is_failed());
        assert!(reqs.get("Distance Travelled").unwrap().is_failed());
        assert_eq!(reqs.get("Car Type"), Some(&label("SUV")));
    }

    #[test]
    fn test_all_collaborators_down_is_single_error() {
        let uc = use_case(
            FailingClassifier,
            Box::new(FailingRecognizer),
            Box::new(SequentialTaskExecutor),
        );

        let err = uc.process("text", "transcript_009").unwrap_err();

        match err {
            ExtractionError::AllCollaboratorsFailed {
                conversation_id,
                first_error,
            } => {
                assert_eq!(conversation_id, "transcript_009");
                assert_eq!(first_error, "classifier unreachable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_process_raw_normalizes_before_extraction() {
        let uc = use_case(
            ScriptedClassifier::new(&[]),
            Box::new(QuantityEntityRecognizer::new().unwrap()),
            Box::new(SequentialTaskExecutor),
        );

        let record = uc
            .process_raw(
                "Customer: It's a 2018 model,\r\nI've driven ~45,000 km already!",
                "id",
            )
            .unwrap();

        let reqs = &record.customer_requirements;
        assert_eq!(
            reqs.get("Make Year"),
            Some(&RequirementValue::Matches(vec!["2018".to_string()]))
        );
        assert_eq!(
            reqs.get("Distance Travelled"),
            Some(&RequirementValue::Matches(vec!["45,000 km".to_string()]))
        );
    }

    #[test]
    fn test_empty_transcript_degrades_to_absences() {
        let uc = use_case(
            ScriptedClassifier::new(&[]),
            Box::new(QuantityEntityRecognizer::new().unwrap()),
            Box::new(SequentialTaskExecutor),
        );

        let record = uc.process_raw("", "id").unwrap();

        assert!(record
            .customer_requirements
            .iter()
            .all(|(_, v)| *v == RequirementValue::Absent));
        assert_eq!(record.company_policies_discussed, TopicOutcome::Detected(vec![]));
        assert_eq!(record.customer_objections, TopicOutcome::Detected(vec![]));
    }

    #[test]
    fn test_identical_inputs_give_identical_records_except_id() {
        let uc = use_case(
            ScriptedClassifier::new(&suv_scores()),
            no_entities(),
            Box::new(SequentialTaskExecutor),
        );

        let a = uc.process("same text", "first").unwrap();
        let b = uc.process("same text", "second").unwrap();

        let json_a = serde_json::to_string(&a).unwrap().replace("first", "ID");
        let json_b = serde_json::to_string(&b).unwrap().replace("second", "ID");
        assert_eq!(json_a, json_b);
    }

    #[test]
    fn test_threaded_and_sequential_executors_agree() {
        let recognizer = || -> Box<dyn EntityRecognizer> {
            Box::new(StubRecognizer {
                spans: vec![EntitySpan::new("1998", EntityLabel::Date, 0, 4)],
            })
        };
        let sequential = use_case(
            ScriptedClassifier::new(&suv_scores()).failing_on("Manual"),
            recognizer(),
            Box::new(SequentialTaskExecutor),
        );
        let threaded = use_case(
            ScriptedClassifier::new(&suv_scores()).failing_on("Manual"),
            recognizer(),
            Box::new(ThreadedTaskExecutor::new()),
        );

        let a = sequential.process("text", "id").unwrap();
        let b = threaded.process("text", "id").unwrap();

        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_pattern_free_config_skips_recognizer() {
        let config = ExtractionConfig {
            categories: vec![CategorySpec::classified("Car Type", &["SUV", "Sedan"])],
            ..ExtractionConfig::default()
        };
        let uc = ProcessTranscriptUseCase::new(
            Box::new(ScriptedClassifier::new(&suv_scores())),
            Box::new(FailingRecognizer),
            config,
            Box::new(SequentialTaskExecutor),
        );

        let record = uc.process("text", "id").unwrap();

        assert_eq!(record.customer_requirements.len(), 1);
        assert_eq!(record.customer_requirements.get("Car Type"), Some(&label("SUV")));
    }
}
