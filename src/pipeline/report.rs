use serde::Serialize;

/// Lowest score the model is asked to give.
pub const MIN_SCORE: u8 = 1;

/// Highest score the model is asked to give.
pub const MAX_SCORE: u8 = 10;

/// The six HIPAA areas every report scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreCategory {
    PrivacyRuleCompliance,
    SecurityRuleCompliance,
    BreachNotificationRule,
    EmployeeTraining,
    DataAccessEncryption,
    ThirdPartyAgreements,
}

impl ScoreCategory {
    /// Fixed render order.
    pub const ALL: [ScoreCategory; 6] = [
        Self::PrivacyRuleCompliance,
        Self::SecurityRuleCompliance,
        Self::BreachNotificationRule,
        Self::EmployeeTraining,
        Self::DataAccessEncryption,
        Self::ThirdPartyAgreements,
    ];

    /// JSON key used in `detailed_scores`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::PrivacyRuleCompliance => "privacy_rule_compliance",
            Self::SecurityRuleCompliance => "security_rule_compliance",
            Self::BreachNotificationRule => "breach_notification_rule",
            Self::EmployeeTraining => "employee_training",
            Self::DataAccessEncryption => "data_access_encryption",
            Self::ThirdPartyAgreements => "third_party_agreements",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PrivacyRuleCompliance => "Privacy Rule Compliance",
            Self::SecurityRuleCompliance => "Security Rule Compliance",
            Self::BreachNotificationRule => "Breach Notification Rule",
            Self::EmployeeTraining => "Employee Training",
            Self::DataAccessEncryption => "Data Access & Encryption",
            Self::ThirdPartyAgreements => "Third-Party Agreements",
        }
    }
}

/// Score and reasoning for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub score: u8,
    pub justification: String,
}

/// Per-category breakdown. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedScores {
    pub privacy_rule_compliance: CategoryScore,
    pub security_rule_compliance: CategoryScore,
    pub breach_notification_rule: CategoryScore,
    pub employee_training: CategoryScore,
    pub data_access_encryption: CategoryScore,
    pub third_party_agreements: CategoryScore,
}

impl DetailedScores {
    pub fn get(&self, category: ScoreCategory) -> &CategoryScore {
        match category {
            ScoreCategory::PrivacyRuleCompliance => &self.privacy_rule_compliance,
            ScoreCategory::SecurityRuleCompliance => &self.security_rule_compliance,
            ScoreCategory::BreachNotificationRule => &self.breach_notification_rule,
            ScoreCategory::EmployeeTraining => &self.employee_training,
            ScoreCategory::DataAccessEncryption => &self.data_access_encryption,
            ScoreCategory::ThirdPartyAgreements => &self.third_party_agreements,
        }
    }

    /// Categories with their scores, in render order.
    pub fn iter(&self) -> impl Iterator<Item = (ScoreCategory, &CategoryScore)> + '_ {
        ScoreCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Structured result of the HIPAA compliance pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceReport {
    pub overall_compliance_score: u8,
    pub detailed_scores: DetailedScores,
    pub summary: String,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_keys_match_serde_field_names() {
        let score = CategoryScore {
            score: 5,
            justification: "x".into(),
        };
        let detailed = DetailedScores {
            privacy_rule_compliance: score.clone(),
            security_rule_compliance: score.clone(),
            breach_notification_rule: score.clone(),
            employee_training: score.clone(),
            data_access_encryption: score.clone(),
            third_party_agreements: score,
        };
        let value = serde_json::to_value(&detailed).unwrap();
        for category in ScoreCategory::ALL {
            assert!(
                value.get(category.key()).is_some(),
                "missing serialized key {}",
                category.key()
            );
        }
    }

    #[test]
    fn iter_follows_render_order() {
        let make = |n: u8| CategoryScore {
            score: n,
            justification: String::new(),
        };
        let detailed = DetailedScores {
            privacy_rule_compliance: make(1),
            security_rule_compliance: make(2),
            breach_notification_rule: make(3),
            employee_training: make(4),
            data_access_encryption: make(5),
            third_party_agreements: make(6),
        };
        let scores: Vec<u8> = detailed.iter().map(|(_, s)| s.score).collect();
        assert_eq!(scores, vec![1, 2, 3, 4, 5, 6]);
    }
}
