use super::extraction::extract_text;
use super::interpret::{interpret_narrative, parse_compliance_report};
use super::llm::LlmClient;
use super::prompt::build_prompt;
use super::report::ComplianceReport;
use super::types::{Analysis, AnalysisKind, AnalysisRequest, RawResponse};
use super::{AnalysisError, InputError};
use crate::config::ModelSelection;

/// Runs one document through prompt → LLM → interpretation.
///
/// Holds no per-request state: every call builds its own prompt, issues
/// exactly one completion and interprets it. Safe to share across threads.
pub struct Analyzer {
    llm: Box<dyn LlmClient>,
    models: ModelSelection,
}

impl Analyzer {
    pub fn new(llm: Box<dyn LlmClient>, models: ModelSelection) -> Self {
        Self { llm, models }
    }

    /// Model identifier used for a pipeline.
    pub fn model_for(&self, kind: AnalysisKind) -> &str {
        match kind {
            AnalysisKind::Hl7Narrative => &self.models.hl7,
            AnalysisKind::HipaaCompliance => &self.models.hipaa,
        }
    }

    /// Analyze a document with the chosen pipeline.
    pub fn analyze(&self, kind: AnalysisKind, document_text: &str) -> Result<Analysis, AnalysisError> {
        match kind {
            AnalysisKind::Hl7Narrative => self.analyze_hl7(document_text).map(Analysis::Narrative),
            AnalysisKind::HipaaCompliance => {
                self.analyze_compliance(document_text).map(Analysis::Compliance)
            }
        }
    }

    /// Free-text HL7v2 explanation, returned as markdown.
    pub fn analyze_hl7(&self, document_text: &str) -> Result<String, AnalysisError> {
        let request = AnalysisRequest::new(document_text);
        let _span = tracing::info_span!(
            "analyze",
            request_id = %request.id,
            kind = AnalysisKind::Hl7Narrative.as_str()
        )
        .entered();

        let raw = self.complete(AnalysisKind::Hl7Narrative, &request)?;
        let markdown = interpret_narrative(raw);
        tracing::info!(response_chars = markdown.len(), "Analysis complete");
        Ok(markdown)
    }

    /// Structured HIPAA compliance score.
    pub fn analyze_compliance(&self, document_text: &str) -> Result<ComplianceReport, AnalysisError> {
        let request = AnalysisRequest::new(document_text);
        let _span = tracing::info_span!(
            "analyze",
            request_id = %request.id,
            kind = AnalysisKind::HipaaCompliance.as_str()
        )
        .entered();

        let raw = self.complete(AnalysisKind::HipaaCompliance, &request)?;
        let report = parse_compliance_report(&raw).map_err(|e| {
            tracing::warn!(error = %e, "Compliance response could not be interpreted");
            e
        })?;
        tracing::info!(
            overall_score = report.overall_compliance_score,
            recommendations = report.recommendations.len(),
            "Analysis complete"
        );
        Ok(report)
    }

    /// Extract an uploaded PDF or text file and score it.
    pub fn analyze_upload(&self, bytes: &[u8], mime_type: &str) -> Result<ComplianceReport, AnalysisError> {
        let text = extract_text(bytes, mime_type)?;
        self.analyze_compliance(&text)
    }

    fn complete(&self, kind: AnalysisKind, request: &AnalysisRequest) -> Result<RawResponse, AnalysisError> {
        if request.document_text.trim().is_empty() {
            return Err(InputError::EmptyDocument.into());
        }

        let prompt = build_prompt(kind, &request.document_text);
        let model = self.model_for(kind);
        tracing::info!(
            model,
            document_chars = request.document_text.len(),
            "Submitting document for analysis"
        );

        self.llm.complete(model, &prompt).map_err(|e| {
            tracing::warn!(model, error = %e, "LLM call failed");
            AnalysisError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::pipeline::llm::{LlmError, MockLlmClient};
    use crate::pipeline::interpret::InterpretError;
    use crate::pipeline::prompt::{HIPAA_SYSTEM_PROMPT, HL7_SYSTEM_PROMPT};
    use crate::pipeline::render::{render_analysis, render_compliance, render_narrative};

    const ADT: &str = "MSH|^~&|A|B|C|D|20220101||ADT^A01|1|P|2.3";

    const REPORT_JSON: &str = r#"{"overall_compliance_score": 7, "detailed_scores": {
        "privacy_rule_compliance": {"score": 7, "justification": "a"},
        "security_rule_compliance": {"score": 6, "justification": "b"},
        "breach_notification_rule": {"score": 5, "justification": "c"},
        "employee_training": {"score": 8, "justification": "d"},
        "data_access_encryption": {"score": 9, "justification": "e"},
        "third_party_agreements": {"score": 4, "justification": "f"}},
        "summary": "ok", "recommendations": ["do X"]}"#;

    fn analyzer_with(mock: &Arc<MockLlmClient>) -> Analyzer {
        Analyzer::new(Box::new(Arc::clone(mock)), ModelSelection::default())
    }

    #[test]
    fn hl7_end_to_end_renders_markdown_unchanged() {
        let stub = "## MSH\n- Sending Application: A";
        let mock = Arc::new(MockLlmClient::new(stub));
        let analyzer = analyzer_with(&mock);

        let markdown = analyzer.analyze_hl7(ADT).unwrap();
        assert_eq!(markdown, stub);
        assert!(render_narrative(&markdown).contains(stub));

        let (model, prompt) = mock.last_call().unwrap();
        assert_eq!(model, "gpt-4o-mini");
        assert_eq!(prompt.system_instruction, HL7_SYSTEM_PROMPT);
        assert!(prompt.user_content.contains(ADT));
    }

    #[test]
    fn hipaa_end_to_end_renders_score_summary_and_recommendation() {
        let mock = Arc::new(MockLlmClient::new(REPORT_JSON));
        let analyzer = analyzer_with(&mock);

        let report = analyzer.analyze_compliance("We encrypt laptops.").unwrap();
        assert_eq!(report.overall_compliance_score, 7);
        assert_eq!(report.summary, "ok");
        assert_eq!(report.recommendations, vec!["do X"]);

        let rendered = render_compliance(&report);
        assert!(rendered.contains("**Overall Compliance Score:** 7/10"));
        assert!(rendered.contains("\nok\n"));
        assert!(rendered.contains("1. do X"));
        assert!(!rendered.contains("2. "));

        let (model, prompt) = mock.last_call().unwrap();
        assert_eq!(model, "gpt-4o");
        assert_eq!(prompt.system_instruction, HIPAA_SYSTEM_PROMPT);
    }

    #[test]
    fn analyze_dispatches_by_kind() {
        let mock = Arc::new(MockLlmClient::new(REPORT_JSON));
        let analyzer = analyzer_with(&mock);
        let analysis = analyzer.analyze(AnalysisKind::HipaaCompliance, "policy").unwrap();
        assert_eq!(analysis.kind(), AnalysisKind::HipaaCompliance);
        assert!(render_analysis(&analysis).contains("7/10"));

        let analysis = analyzer.analyze(AnalysisKind::Hl7Narrative, ADT).unwrap();
        assert_eq!(analysis, Analysis::Narrative(REPORT_JSON.to_string()));
    }

    #[test]
    fn empty_document_rejected_before_llm_call() {
        let mock = Arc::new(MockLlmClient::new("unused"));
        let analyzer = analyzer_with(&mock);

        for text in ["", "   \n\t"] {
            let err = analyzer.analyze_hl7(text).unwrap_err();
            assert!(matches!(err, AnalysisError::Input(InputError::EmptyDocument)));
            let err = analyzer.analyze_compliance(text).unwrap_err();
            assert!(matches!(err, AnalysisError::Input(InputError::EmptyDocument)));
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn unsupported_upload_rejected_before_llm_call() {
        let mock = Arc::new(MockLlmClient::new(REPORT_JSON));
        let analyzer = analyzer_with(&mock);

        let err = analyzer.analyze_upload(b"\x89PNG....", "image/png").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Input(InputError::UnsupportedType(ref t)) if t == "image/png"
        ));
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn plain_text_upload_is_scored() {
        let mock = Arc::new(MockLlmClient::new(REPORT_JSON));
        let analyzer = analyzer_with(&mock);

        let report = analyzer
            .analyze_upload(b"Access to ePHI is logged.", "text/plain")
            .unwrap();
        assert_eq!(report.overall_compliance_score, 7);

        let (_, prompt) = mock.last_call().unwrap();
        assert!(prompt.user_content.contains("Access to ePHI is logged."));
    }

    #[test]
    fn transport_failure_propagates_distinctly() {
        let mock = Arc::new(MockLlmClient::failing(LlmError::Authentication {
            status: 401,
            body: "bad key".into(),
        }));
        let analyzer = analyzer_with(&mock);

        let err = analyzer.analyze_hl7(ADT).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Transport(LlmError::Authentication { status: 401, .. })
        ));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn truncated_json_recovered_with_single_call() {
        let truncated = REPORT_JSON.trim_end().strip_suffix('}').unwrap();
        let mock = Arc::new(MockLlmClient::new(truncated));
        let analyzer = analyzer_with(&mock);

        let report = analyzer.analyze_compliance("policy").unwrap();
        assert_eq!(report.recommendations, vec!["do X"]);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn unrecoverable_json_is_malformed_response_without_retry() {
        let mock = Arc::new(MockLlmClient::new(r#"{"overall_compliance_score": 7, "summ"#));
        let analyzer = analyzer_with(&mock);

        let err = analyzer.analyze_compliance("policy").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MalformedResponse(InterpretError::Json { .. })
        ));
        assert!(err.to_string().starts_with("Could not interpret analysis"));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn missing_category_is_malformed_response() {
        let json = REPORT_JSON.replace("employee_training", "staff_training");
        let mock = Arc::new(MockLlmClient::new(&json));
        let analyzer = analyzer_with(&mock);

        let err = analyzer.analyze_compliance("policy").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MalformedResponse(InterpretError::MissingField(ref f))
                if f == "detailed_scores.employee_training"
        ));
    }

    #[test]
    fn identical_requests_yield_identical_results() {
        let mock = Arc::new(MockLlmClient::new("## PID\n- Patient ID: 1"));
        let analyzer = analyzer_with(&mock);
        let first = analyzer.analyze_hl7(ADT).unwrap();
        let second = analyzer.analyze_hl7(ADT).unwrap();
        assert_eq!(first, second);
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn custom_models_are_used() {
        let mock = Arc::new(MockLlmClient::new(REPORT_JSON));
        let analyzer = Analyzer::new(
            Box::new(Arc::clone(&mock)),
            ModelSelection {
                hl7: "local-small".into(),
                hipaa: "local-large".into(),
            },
        );
        analyzer.analyze_compliance("policy").unwrap();
        assert_eq!(mock.last_call().unwrap().0, "local-large");
        assert_eq!(analyzer.model_for(AnalysisKind::Hl7Narrative), "local-small");
    }

    #[test]
    fn concurrent_requests_are_independent() {
        let mock = Arc::new(MockLlmClient::new(REPORT_JSON));
        let analyzer = analyzer_with(&mock);

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let analyzer = &analyzer;
                    s.spawn(move || analyzer.analyze_compliance(&format!("policy {i}")))
                })
                .collect();
            for handle in handles {
                let report = handle.join().unwrap().unwrap();
                assert_eq!(report.overall_compliance_score, 7);
            }
        });
        assert_eq!(mock.call_count(), 4);
    }
}
