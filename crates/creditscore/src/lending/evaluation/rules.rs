use super::super::domain::{FinancialProfile, LoanRequest, RuleFinding, RuleKind, RuleOutcome};
use super::config::EvaluationConfig;

/// Evaluate every HCSF criterion against the profile.
///
/// All rules run; a triggered blocking rule does not hide the ones after it.
pub(crate) fn evaluate_rules(
    request: &LoanRequest,
    profile: &FinancialProfile,
    config: &EvaluationConfig,
) -> RuleOutcome {
    let findings = RuleKind::ordered()
        .into_iter()
        .filter_map(|rule| {
            check(rule, request, profile, config).map(|message| RuleFinding {
                rule,
                severity: rule.severity(),
                message,
            })
        })
        .collect();

    RuleOutcome { findings }
}

fn check(
    rule: RuleKind,
    request: &LoanRequest,
    profile: &FinancialProfile,
    config: &EvaluationConfig,
) -> Option<String> {
    match rule {
        RuleKind::DebtRatio => (profile.debt_ratio > config.max_debt_ratio).then(|| {
            format!(
                "debt ratio {:.1}% exceeds the {:.1}% ceiling",
                profile.debt_ratio * 100.0,
                config.max_debt_ratio * 100.0
            )
        }),
        RuleKind::ResidualIncome => {
            let threshold = config.residual_income_threshold(request.children);
            (profile.residual_income < threshold).then(|| {
                format!(
                    "residual income {:.0} EUR below the {:.0} EUR minimum for {} child(ren)",
                    profile.residual_income, threshold, request.children
                )
            })
        }
        RuleKind::AgeAtMaturity => (profile.age_at_maturity > config.max_age_at_maturity)
            .then(|| {
                format!(
                    "applicant would be {} at maturity, above the {} limit",
                    profile.age_at_maturity, config.max_age_at_maturity
                )
            }),
        RuleKind::Duration => (request.duration_years > profile.max_duration_years).then(|| {
            format!(
                "duration of {} years exceeds the {}-year ceiling for {} loans",
                request.duration_years,
                profile.max_duration_years,
                profile.loan_type.label()
            )
        }),
        RuleKind::EmploymentTenure => (request.employment_tenure_years
            < config.min_employment_tenure_years)
            .then(|| {
                format!(
                    "employment tenure of {:.1} years is under {:.0} years",
                    request.employment_tenure_years, config.min_employment_tenure_years
                )
            }),
        RuleKind::DownPayment => {
            let ratio = down_payment_ratio(request);
            (ratio < config.min_down_payment_ratio).then(|| {
                format!(
                    "down payment covers {:.1}% of the principal, under the recommended {:.0}%",
                    ratio * 100.0,
                    config.min_down_payment_ratio * 100.0
                )
            })
        }
    }
}

/// Advisory positives. They are reported but never scored.
pub(crate) fn collect_strengths(
    request: &LoanRequest,
    profile: &FinancialProfile,
    config: &EvaluationConfig,
) -> Vec<String> {
    let mut strengths = Vec::new();

    if profile.debt_ratio < config.comfortable_debt_ratio {
        strengths.push(format!(
            "comfortable debt ratio of {:.1}%",
            profile.debt_ratio * 100.0
        ));
    }

    let ratio = down_payment_ratio(request);
    if ratio >= config.strong_down_payment_ratio {
        strengths.push(format!(
            "substantial down payment covering {:.0}% of the principal",
            ratio * 100.0
        ));
    }

    let residual_floor = config.residual_income_threshold(request.children);
    if profile.residual_income > residual_floor * config.comfortable_residual_multiple {
        strengths.push(format!(
            "ample residual income of {:.0} EUR per month",
            profile.residual_income
        ));
    }

    if request.employment_tenure_years >= config.strong_tenure_years {
        strengths.push(format!(
            "stable employment for {:.0} years",
            request.employment_tenure_years
        ));
    }

    strengths
}

fn down_payment_ratio(request: &LoanRequest) -> f64 {
    request.down_payment / request.principal
}
