pub mod types;
pub mod prompt;
pub mod llm;
pub mod interpret;
pub mod report;
pub mod render;
pub mod extraction;
pub mod analyzer;

pub use types::*;
pub use prompt::*;
pub use llm::*;
pub use interpret::*;
pub use report::*;
pub use render::*;
pub use extraction::*;
pub use analyzer::*;

use thiserror::Error;

use crate::config::ConfigError;

/// Problems with what the user submitted. Raised before any LLM call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Document is empty; nothing to analyze")]
    EmptyDocument,

    #[error("Unsupported file type '{0}'; upload a PDF or plain-text file")]
    UnsupportedType(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Text encoding error: {0}")]
    Encoding(String),
}

/// Everything a single analysis request can fail with.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Analysis request failed: {0}")]
    Transport(#[from] LlmError),

    #[error("Could not interpret analysis: {0}")]
    MalformedResponse(#[from] InterpretError),
}
