/// Minimum top-label confidence (exclusive) for a classified requirement.
pub const REQUIREMENT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Minimum confidence (exclusive) for a policy or objection to be reported.
pub const TOPIC_CONFIDENCE_THRESHOLD: f32 = 0.7;

pub const CAR_TYPE: &str = "Car Type";
pub const FUEL_TYPE: &str = "Fuel Type";
pub const COLOR: &str = "Color";
pub const DISTANCE_TRAVELLED: &str = "Distance Travelled";
pub const MAKE_YEAR: &str = "Make Year";
pub const TRANSMISSION_TYPE: &str = "Transmission Type";

pub const CAR_TYPE_LABELS: &[&str] = &["Hatchback", "SUV", "Sedan"];
pub const FUEL_TYPE_LABELS: &[&str] = &["Petrol", "Diesel", "Electric"];
pub const COLOR_LABELS: &[&str] = &["White", "Black", "Red", "Blue", "Silver", "Gray", "Green"];
pub const TRANSMISSION_TYPE_LABELS: &[&str] = &["Automatic", "Manual"];

pub const COMPANY_POLICIES: &[&str] = &[
    "Free RC Transfer",
    "5-Day Money Back Guarantee",
    "Free RSA for One Year",
    "Return Policy",
];

pub const CUSTOMER_OBJECTIONS: &[&str] = &[
    "Refurbishment Quality",
    "Car Issues",
    "Price Issues",
    "Customer Experience Issues",
];

/// Conversation id used when the caller supplies none.
pub const DEFAULT_CONVERSATION_ID: &str = "transcript_001";

pub const NLI_MODEL_NAME: &str = "bart-large-mnli";
pub const NLI_MODEL_FILE: &str = "model.onnx";
pub const NLI_TOKENIZER_FILE: &str = "tokenizer.json";
pub const NLI_MODEL_URL: &str =
    "https://huggingface.co/Xenova/bart-large-mnli/resolve/main/onnx/model_quantized.onnx";
pub const NLI_TOKENIZER_URL: &str =
    "https://huggingface.co/Xenova/bart-large-mnli/resolve/main/tokenizer.json";

/// Hypothesis template; `{}` is replaced by the candidate label.
pub const NLI_HYPOTHESIS_TEMPLATE: &str = "This example is {}.";
