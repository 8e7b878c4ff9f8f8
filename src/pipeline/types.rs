use serde::Serialize;
use uuid::Uuid;

use super::report::ComplianceReport;

/// Which of the two analysis pipelines a request runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Free-text explanation of an HL7v2 message.
    Hl7Narrative,
    /// Structured HIPAA compliance scoring of a document.
    HipaaCompliance,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hl7Narrative => "hl7_narrative",
            Self::HipaaCompliance => "hipaa_compliance",
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hl7Narrative => write!(f, "HL7v2 analysis"),
            Self::HipaaCompliance => write!(f, "HIPAA compliance analysis"),
        }
    }
}

/// One user-initiated analysis. The id only correlates log lines.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub id: Uuid,
    pub document_text: String,
}

impl AnalysisRequest {
    pub fn new(document_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_text: document_text.into(),
        }
    }
}

/// System instruction plus user message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub system_instruction: String,
    pub user_content: String,
}

/// Unprocessed completion text returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub text: String,
}

impl RawResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Interpreted result of one analysis, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum Analysis {
    Narrative(String),
    Compliance(ComplianceReport),
}

impl Analysis {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::Narrative(_) => AnalysisKind::Hl7Narrative,
            Self::Compliance(_) => AnalysisKind::HipaaCompliance,
        }
    }
}
