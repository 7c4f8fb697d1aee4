use serde::{Deserialize, Serialize};

use super::rates::LoanType;

/// Credit application as submitted by the applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub annual_income: f64,
    pub principal: f64,
    pub duration_years: u32,
    pub age: u32,
    #[serde(default)]
    pub employment_tenure_years: f64,
    #[serde(default)]
    pub children: u32,
    /// Recurring monthly charges already carried by the household.
    #[serde(default)]
    pub existing_charges: f64,
    #[serde(default)]
    pub down_payment: f64,
    /// Inferred from the amount and duration when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_type: Option<LoanType>,
}

impl LoanRequest {
    pub fn monthly_income(&self) -> f64 {
        self.annual_income / 12.0
    }

    /// Applicant plus dependent children.
    pub fn household_size(&self) -> u32 {
        self.children + 1
    }
}

/// Figures derived from a request, computed once per evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub loan_type: LoanType,
    pub annual_rate: f64,
    pub max_duration_years: u32,
    pub monthly_income: f64,
    pub monthly_payment: f64,
    pub total_cost: f64,
    pub total_interest: f64,
    pub debt_ratio: f64,
    pub residual_income: f64,
    pub max_capacity: f64,
    pub age_at_maturity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Blocking,
    Warning,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::Warning => "warning",
        }
    }
}

/// HCSF criteria, in the order they are evaluated and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    DebtRatio,
    ResidualIncome,
    AgeAtMaturity,
    Duration,
    EmploymentTenure,
    DownPayment,
}

impl RuleKind {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::DebtRatio,
            Self::ResidualIncome,
            Self::AgeAtMaturity,
            Self::Duration,
            Self::EmploymentTenure,
            Self::DownPayment,
        ]
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::DebtRatio | Self::ResidualIncome | Self::AgeAtMaturity | Self::Duration => {
                Severity::Blocking
            }
            Self::EmploymentTenure | Self::DownPayment => Severity::Warning,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::DebtRatio => "Debt ratio",
            Self::ResidualIncome => "Residual income",
            Self::AgeAtMaturity => "Age at maturity",
            Self::Duration => "Loan duration",
            Self::EmploymentTenure => "Employment tenure",
            Self::DownPayment => "Down payment",
        }
    }
}

/// A triggered criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFinding {
    pub rule: RuleKind,
    pub severity: Severity,
    pub message: String,
}

/// Every finding raised for one profile, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub findings: Vec<RuleFinding>,
}

impl RuleOutcome {
    pub fn has_blocking(&self) -> bool {
        self.blocking().next().is_some()
    }

    pub fn blocking(&self) -> impl Iterator<Item = &RuleFinding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Blocking)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &RuleFinding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Warning)
    }

    pub fn triggered(&self, rule: RuleKind) -> bool {
        self.findings.iter().any(|finding| finding.rule == rule)
    }
}

/// Terminal state of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accepted,
    AcceptedWithConditions,
    Refused,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::AcceptedWithConditions => "ACCEPTED_WITH_CONDITIONS",
            Self::Refused => "REFUSED",
        }
    }
}

/// Component of the final score that can be blamed for a refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "rule")]
pub enum ScoreFactor {
    Rule(RuleKind),
    DefaultRisk,
}

/// Why an application was refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RefusalReason {
    /// A blocking criterion forced the refusal.
    BlockingRule { rule: RuleKind, detail: String },
    /// No blocking criterion; the factor with the largest negative weight on the score.
    WeakestFactor {
        factor: ScoreFactor,
        impact: f64,
        detail: String,
    },
}

impl RefusalReason {
    pub fn summary(&self) -> String {
        match self {
            RefusalReason::BlockingRule { detail, .. } => detail.clone(),
            RefusalReason::WeakestFactor { detail, impact, .. } => {
                format!("{detail} (score impact {impact:.1})")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub rule_score: f64,
    pub model_score: f64,
    pub default_probability: f64,
}

/// Sole value returned to callers for a completed evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision: Decision,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub profile: FinancialProfile,
    pub alerts: Vec<RuleFinding>,
    pub strengths: Vec<String>,
    pub forced_refusal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refusal_reason: Option<RefusalReason>,
}
