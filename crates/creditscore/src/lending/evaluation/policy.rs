use super::super::domain::{Decision, RefusalReason, RuleOutcome, ScoreBreakdown, ScoreFactor};
use super::config::EvaluationConfig;

/// Business-rule component: 100 minus a fixed penalty per finding, floored at 0.
pub(crate) fn rule_score(outcome: &RuleOutcome, config: &EvaluationConfig) -> f64 {
    let blocking = outcome.blocking().count() as f64;
    let warnings = outcome.warnings().count() as f64;
    let score = 100.0 - blocking * config.blocking_penalty - warnings * config.warning_penalty;
    score.clamp(0.0, 100.0)
}

pub(crate) fn blend(
    outcome: &RuleOutcome,
    default_probability: f64,
    config: &EvaluationConfig,
) -> (f64, ScoreBreakdown) {
    let rule_score = rule_score(outcome, config);
    let model_score = 100.0 * (1.0 - default_probability);
    let score = (config.rule_weight * rule_score + config.model_weight * model_score)
        .clamp(0.0, 100.0);

    (
        score,
        ScoreBreakdown {
            rule_score,
            model_score,
            default_probability,
        },
    )
}

/// Decision from the blended score alone.
pub(crate) fn score_decision(score: f64, config: &EvaluationConfig) -> Decision {
    if score >= config.accept_threshold {
        Decision::Accepted
    } else if score >= config.conditional_threshold {
        Decision::AcceptedWithConditions
    } else {
        Decision::Refused
    }
}

pub(crate) struct Verdict {
    pub decision: Decision,
    pub forced_refusal: bool,
    pub refusal_reason: Option<RefusalReason>,
}

/// Apply the blocking-rule override on top of the score-based decision.
pub(crate) fn decide_outcome(
    outcome: &RuleOutcome,
    score: f64,
    breakdown: &ScoreBreakdown,
    config: &EvaluationConfig,
) -> Verdict {
    let scored = score_decision(score, config);

    match outcome.blocking().next() {
        Some(first) => Verdict {
            decision: Decision::Refused,
            forced_refusal: true,
            refusal_reason: Some(RefusalReason::BlockingRule {
                rule: first.rule,
                detail: first.message.clone(),
            }),
        },
        None => Verdict {
            decision: scored,
            forced_refusal: false,
            refusal_reason: (scored == Decision::Refused)
                .then(|| weakest_factor(outcome, breakdown, config)),
        },
    }
}

/// Factor with the largest weighted negative impact on the final score.
///
/// Every warning weighs the same, so the first one stands for all of them; on a
/// tie with the default-risk component the rule wins.
fn weakest_factor(
    outcome: &RuleOutcome,
    breakdown: &ScoreBreakdown,
    config: &EvaluationConfig,
) -> RefusalReason {
    let model_impact = -config.model_weight * (100.0 - breakdown.model_score);
    let warning_impact = -config.rule_weight * config.warning_penalty;

    match outcome.warnings().next() {
        Some(finding) if warning_impact <= model_impact => RefusalReason::WeakestFactor {
            factor: ScoreFactor::Rule(finding.rule),
            impact: warning_impact,
            detail: finding.message.clone(),
        },
        _ => RefusalReason::WeakestFactor {
            factor: ScoreFactor::DefaultRisk,
            impact: model_impact,
            detail: format!(
                "estimated default probability of {:.1}% is too high",
                breakdown.default_probability * 100.0
            ),
        },
    }
}
