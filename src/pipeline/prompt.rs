use super::types::{AnalysisKind, Prompt};

pub const HL7_SYSTEM_PROMPT: &str = "You are an HL7v2 expert.";

pub const HIPAA_SYSTEM_PROMPT: &str = "You are a HIPAA compliance expert.";

/// Worked example of the narrative breakdown the HL7 pipeline asks for.
const HL7_EXAMPLE_OUTPUT: &str = r#"MSH (Message Header)
Sending Application: MegaReg
Sending Facility: XYZHospC
Receiving Application: SuperOE
Receiving Facility: XYZImgCtr
Message Timestamp: 2006-05-29 09:01:31 -0500
Message Type: ADT^A01 (Patient Admit)
Message Control ID: 01052901
HL7 Version: 2.5

EVN (Event Type)
Event Occurred Timestamp: 2006-05-29 09:01
Recorded Timestamp: 2006-05-29 09:00

PID (Patient Identification)
Patient ID: 56782445 (assigned by UAReg)
Patient Name: BARRY Q KLEINSAMPLE JR
Date of Birth: 1962-09-10
Gender: Male
Race: 2028-9 (American Indian or Alaska Native) (from HL70005)
Addresses:
260 Goodwin Crest Drive, Birmingham, AL 35209 (Mailing)
Nickell's Pickles, 10000 W 100th Ave, Birmingham, AL 35200 (Office)
Patient Account Number: 0105I30001 (assigned by 99DEF)

PV1 (Patient Visit Information)
Patient Class: Inpatient (I)
Assigned Location: Ward W, Room 389, Bed 1, UABH
Admitting Doctor: Dr. Rex Morgan, MD (ID: 12345)
Attending Doctor: Dr. Lucy Grainger, MD (ID: 67890)
Consulting Doctor: Dr. Sherman Potter, MD (ID: 13579)
Admission Date/Time: 2006-05-29 09:00
Visit Number: 8675309

OBX (Observation Result)
Body Height: 1.80 m (Normal)
Body Weight: 79 kg (Normal)

AL1 (Allergy Information)
Aspirin Allergy

DG1 (Diagnosis)
Diagnosis Code: 786.50 (Chest Pain, Unspecified)
ICD Version: ICD-9
Diagnosis Type: Admitting Diagnosis (A)"#;

/// Worked example of the JSON object the HIPAA pipeline asks for.
const HIPAA_EXAMPLE_OUTPUT: &str = r#"{
  "overall_compliance_score": 6,
  "detailed_scores": {
    "privacy_rule_compliance": {"score": 7, "justification": "Notice of privacy practices is present but omits patient access timelines."},
    "security_rule_compliance": {"score": 5, "justification": "Administrative safeguards are described; technical safeguards are vague."},
    "breach_notification_rule": {"score": 4, "justification": "No notification timeline or responsible party is defined."},
    "employee_training": {"score": 6, "justification": "Annual training is mentioned without role-specific content."},
    "data_access_encryption": {"score": 7, "justification": "Encryption at rest is stated; access review cadence is missing."},
    "third_party_agreements": {"score": 5, "justification": "Business associate agreements are referenced but not inventoried."}
  },
  "summary": "The document covers core privacy practices but leaves breach response and vendor oversight underspecified.",
  "recommendations": [
    "Define a 60-day breach notification procedure with named owners.",
    "Maintain an inventory of business associate agreements.",
    "Add role-based security training with completion tracking."
  ]
}"#;

/// Build the narrative HL7v2 analysis prompt.
pub fn build_hl7_prompt(document_text: &str) -> Prompt {
    let user_content = format!(
        r#"You are an expert in healthcare interoperability and HL7v2 message parsing.

Analyze the following HL7v2 message, and return your message in the following structure (an example, but feel free to modify it if needed):

{HL7_EXAMPLE_OUTPUT}

===

Provide your answer in markdown. Be fast!

Here is the document to analyze:
```
{document_text}
```
"#
    );

    Prompt {
        system_instruction: HL7_SYSTEM_PROMPT.to_string(),
        user_content,
    }
}

/// Build the strict-JSON HIPAA compliance scoring prompt.
pub fn build_hipaa_prompt(document_text: &str) -> Prompt {
    let user_content = format!(
        r#"You are an expert in HIPAA regulations reviewing an organization's document for compliance.

Score the document from 1 (non-compliant) to 10 (fully compliant) on each of these areas:
- privacy_rule_compliance: Privacy Rule (uses and disclosures of PHI, patient rights)
- security_rule_compliance: Security Rule (administrative, physical, technical safeguards for ePHI)
- breach_notification_rule: Breach Notification Rule (detection, timelines, notification duties)
- employee_training: workforce training and sanctions
- data_access_encryption: access control, audit and encryption of ePHI
- third_party_agreements: business associate agreements and vendor oversight

RULES:
1. Respond with ONE JSON object and nothing else. No markdown, no commentary.
2. Every key shown in the example is required.
3. Every score is an integer between 1 and 10.
4. "recommendations" is an ordered list, most important first.

Example of the required output format:
{HIPAA_EXAMPLE_OUTPUT}

Here is the document to analyze:
```
{document_text}
```
"#
    );

    Prompt {
        system_instruction: HIPAA_SYSTEM_PROMPT.to_string(),
        user_content,
    }
}

/// Build the prompt for the given pipeline.
pub fn build_prompt(kind: AnalysisKind, document_text: &str) -> Prompt {
    match kind {
        AnalysisKind::Hl7Narrative => build_hl7_prompt(document_text),
        AnalysisKind::HipaaCompliance => build_hipaa_prompt(document_text),
    }
}
