use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for stored applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    /// Timestamp-derived id of the form `app-YYYYMMDDHHMMSS` (UTC).
    pub fn generate(now: DateTime<Utc>) -> Self {
        Self(format!("app-{}", now.format("%Y%m%d%H%M%S")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepts whole or fractional impact levels (`2`, `2.0`, `2.6`) and rounds to the nearest level.
pub(crate) fn lenient_impact_level<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(level) if level.is_finite() => Ok(Some(level.round() as i64)),
        Some(level) => Err(serde::de::Error::custom(format!(
            "impact level must be a finite number (found {level})"
        ))),
    }
}

/// Persisted application record.
///
/// Only a handful of fields feed the scoring engine (financials, loan amount, collateral,
/// tenure, impact level and credit band); the rest travel with the record for display.
/// Every field is optional so partially filled or hand-edited files still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanApplication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ApplicantContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_ein: Option<String>,
    pub years_in_business: Option<f64>,
    pub loan_amount_requested: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_term_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_purpose: Option<String>,
    pub monthly_revenue: Option<f64>,
    pub monthly_expenses: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_debt_monthly_payment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral_type: Option<String>,
    pub collateral_value: Option<f64>,
    pub credit_score_band: Option<String>,
    /// Revolving utilization reported at intake. Feeds the bureau lookup on every rescore.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_impact_level")]
    pub impact_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs_estimate: Option<u32>,
    pub compliance: ComplianceChecklist,
    pub consents: Consents,
    pub references: Vec<BusinessReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SubmissionMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Document checklist captured at intake. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceChecklist {
    pub has_articles: bool,
    pub good_standing: bool,
    pub has_license: bool,
    pub has_insurance: bool,
}

impl ComplianceChecklist {
    pub fn outstanding(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_articles {
            missing.push("Articles of Organization");
        }
        if !self.good_standing {
            missing.push("Certificate of Good Standing");
        }
        if !self.has_license {
            missing.push("Business license");
        }
        if !self.has_insurance {
            missing.push("Liability insurance");
        }
        missing
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Consents {
    pub soft_pull_consent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessReference {
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub submitted_at: String,
    pub channel: String,
    pub status: String,
}

/// Result of a (mock) soft credit pull. Only consulted when `ok` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftPullRecord {
    pub ok: bool,
    pub score_band: Option<String>,
    pub utilization_pct: Option<f64>,
}

impl SoftPullRecord {
    pub fn approved(score_band: Option<String>, utilization_pct: Option<f64>) -> Self {
        Self {
            ok: true,
            score_band,
            utilization_pct,
        }
    }
}

/// Risk bucket derived from the composite score percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    A,
    B,
    C,
    D,
    F,
}

impl RiskTier {
    pub const fn ordered() -> [Self; 5] {
        [Self::A, Self::B, Self::C, Self::D, Self::F]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    pub const fn decision(self) -> UnderwritingDecision {
        match self {
            Self::A => UnderwritingDecision::AutoApprove,
            Self::B | Self::C => UnderwritingDecision::ManualReview,
            Self::D | Self::F => UnderwritingDecision::Decline,
        }
    }

    /// Fundable tiers that should be disbursed in stages.
    pub const fn requires_tranche(self) -> bool {
        matches!(self, Self::C | Self::D)
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderwritingDecision {
    AutoApprove,
    ManualReview,
    Decline,
}

impl UnderwritingDecision {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AutoApprove => "auto_approve",
            Self::ManualReview => "manual_review",
            Self::Decline => "decline",
        }
    }
}

impl std::fmt::Display for UnderwritingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The five independent subscores, each on the 0-4 scale in half steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Subscores {
    pub cashflow: f64,
    pub credit_util: f64,
    pub collateral_ltv: f64,
    pub competency: f64,
    pub community_impact: f64,
}

impl Subscores {
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("cashflow", self.cashflow),
            ("credit_util", self.credit_util),
            ("collateral_ltv", self.collateral_ltv),
            ("competency", self.competency),
            ("community_impact", self.community_impact),
        ]
    }
}

/// APR terms before the floor/ceiling clamp is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AprBreakdown {
    pub base: f64,
    pub dscr_adjustment: f64,
    pub utilization_adjustment: f64,
    pub collateral_adjustment: f64,
}

impl AprBreakdown {
    pub fn unclamped(&self) -> f64 {
        self.base + self.dscr_adjustment + self.utilization_adjustment + self.collateral_adjustment
    }
}

/// Underwriting output for a single application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub dscr_estimate: f64,
    pub subscores: Subscores,
    pub score_pct: f64,
    pub risk_tier: RiskTier,
    pub decision: UnderwritingDecision,
    pub apr_estimate: f64,
    pub tranche_guidance: Option<String>,
    pub apr_breakdown: AprBreakdown,
}

impl DecisionRecord {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} (tier {}, score {:.1}%, APR {:.1}%, DSCR {:.2})",
            self.decision, self.risk_tier, self.score_pct, self.apr_estimate, self.dscr_estimate
        );
        if self.tranche_guidance.is_some() {
            summary.push_str(", staged funding advised");
        }
        summary
    }
}
