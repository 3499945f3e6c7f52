use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use salescall_core::classification::domain::zero_shot_classifier::ZeroShotClassifier;
use salescall_core::classification::infrastructure::onnx_nli_classifier::OnnxNliClassifier;
use salescall_core::entities::infrastructure::quantity_entity_recognizer::QuantityEntityRecognizer;
use salescall_core::extraction::extraction_config::ExtractionConfig;
use salescall_core::extraction::extraction_record::ExtractionRecord;
use salescall_core::pipeline::infrastructure::sequential_task_executor::SequentialTaskExecutor;
use salescall_core::pipeline::infrastructure::threaded_task_executor::ThreadedTaskExecutor;
use salescall_core::pipeline::process_transcript_use_case::ProcessTranscriptUseCase;
use salescall_core::pipeline::task_executor::TaskExecutor;
use salescall_core::shared::constants::{
    DEFAULT_CONVERSATION_ID, NLI_MODEL_FILE, NLI_MODEL_NAME, NLI_MODEL_URL, NLI_TOKENIZER_FILE,
    NLI_TOKENIZER_URL,
};
use salescall_core::shared::model_resolver::{self, ModelFile};

/// Extract customer requirements, policies and objections from sales-call transcripts.
#[derive(Parser)]
#[command(name = "salescall-extract")]
struct Cli {
    /// Transcript text files (UTF-8).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Conversation id for the record (single input only; defaults to the file stem).
    #[arg(long)]
    conversation_id: Option<String>,

    /// JSON file overriding categories, label sets or thresholds.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing model.onnx and tokenizer.json (skips download).
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Run collaborator calls one at a time instead of in parallel.
    #[arg(long)]
    sequential: bool,

    /// Print single-line JSON.
    #[arg(long)]
    compact: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = match &cli.config {
        Some(path) => ExtractionConfig::from_json_file(path)?,
        None => ExtractionConfig::default(),
    };

    let use_case = ProcessTranscriptUseCase::new(
        build_classifier(cli.model_dir.as_deref())?,
        Box::new(QuantityEntityRecognizer::new().map_err(|e| -> Box<dyn Error> { e })?),
        config,
        build_executor(cli.sequential),
    );

    let (records, failures) =
        process_inputs(&use_case, &cli.inputs, cli.conversation_id.as_deref());

    if !records.is_empty() {
        println!("{}", render(&records, cli.inputs.len() > 1, cli.compact)?);
    }
    for failure in &failures {
        eprintln!("Error: {failure}");
    }
    if !failures.is_empty() {
        return Err(format!(
            "{} of {} transcripts failed",
            failures.len(),
            cli.inputs.len()
        )
        .into());
    }
    Ok(())
}

/// Processes every input independently. A failed transcript is reported
/// with its path and does not stop the others.
fn process_inputs(
    use_case: &ProcessTranscriptUseCase,
    inputs: &[PathBuf],
    explicit_id: Option<&str>,
) -> (Vec<ExtractionRecord>, Vec<String>) {
    let mut records = Vec::with_capacity(inputs.len());
    let mut failures = Vec::new();
    for input in inputs {
        let raw = match fs::read_to_string(input) {
            Ok(raw) => raw,
            Err(e) => {
                failures.push(format!("Failed to read {}: {e}", input.display()));
                continue;
            }
        };
        let conversation_id = conversation_id_for(explicit_id, input);
        log::info!("Processing {} as {conversation_id}", input.display());
        match use_case.process_raw(&raw, &conversation_id) {
            Ok(record) => records.push(record),
            Err(e) => failures.push(format!("{}: {e}", input.display())),
        }
    }
    (records, failures)
}

fn build_classifier(model_dir: Option<&Path>) -> Result<Box<dyn ZeroShotClassifier>, Box<dyn Error>> {
    let dir = match model_dir {
        Some(dir) => dir.to_path_buf(),
        None => {
            log::info!("Resolving model: {NLI_MODEL_NAME}");
            let dir = model_resolver::resolve_model_dir(
                NLI_MODEL_NAME,
                &[
                    ModelFile {
                        name: NLI_MODEL_FILE,
                        url: NLI_MODEL_URL,
                    },
                    ModelFile {
                        name: NLI_TOKENIZER_FILE,
                        url: NLI_TOKENIZER_URL,
                    },
                ],
                None,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            dir
        }
    };
    let classifier = OnnxNliClassifier::load(&dir).map_err(|e| -> Box<dyn Error> { e })?;
    Ok(Box::new(classifier))
}

fn build_executor(sequential: bool) -> Box<dyn TaskExecutor> {
    if sequential {
        Box::new(SequentialTaskExecutor)
    } else {
        Box::new(ThreadedTaskExecutor::new())
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn Error>> {
    for input in &cli.inputs {
        if !input.is_file() {
            return Err(format!("Input file not found: {}", input.display()).into());
        }
    }
    if cli.conversation_id.is_some() && cli.inputs.len() > 1 {
        return Err("--conversation-id can only be used with a single input".into());
    }
    if let Some(dir) = &cli.model_dir {
        if !dir.is_dir() {
            return Err(format!("Model directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}

fn conversation_id_for(explicit: Option<&str>, input: &Path) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| {
            input
                .file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| !stem.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_CONVERSATION_ID.to_string())
}

/// A single-input run prints one object; batches print an array.
fn render(
    records: &[ExtractionRecord],
    as_array: bool,
    compact: bool,
) -> Result<String, serde_json::Error> {
    match (records, as_array, compact) {
        ([record], false, true) => serde_json::to_string(record),
        ([record], false, false) => serde_json::to_string_pretty(record),
        (all, _, true) => serde_json::to_string(all),
        (all, _, false) => serde_json::to_string_pretty(all),
    }
}

fn download_progress(file: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {file}... {pct}%");
    } else {
        eprint!("\rDownloading {file}... {downloaded} bytes");
    }
}
