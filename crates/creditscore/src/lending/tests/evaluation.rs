use super::common::*;
use crate::lending::domain::{
    Decision, LoanRequest, RefusalReason, RuleKind, ScoreFactor, Severity,
};
use crate::lending::evaluation::{DecisionEngine, EvaluationConfig, PolicyError};
use crate::lending::rates::{LoanType, RateTable};
use crate::lending::risk::{EstimatorError, RiskFeatures};
use crate::lending::{evaluate, LendingError};

#[test]
fn reference_dossier_is_accepted_without_alerts() {
    let outcome = engine().evaluate(&request(), 0.1).expect("evaluation succeeds");

    assert_eq!(outcome.profile.loan_type, LoanType::Immobilier);
    assert_close(outcome.profile.monthly_payment, 1_159.92, 0.01);
    assert_close(outcome.profile.debt_ratio, 0.2784, 0.0001);
    assert!(outcome.alerts.is_empty());
    assert_close(outcome.breakdown.rule_score, 100.0, 1e-9);
    assert_close(outcome.breakdown.model_score, 90.0, 1e-9);
    assert_close(outcome.score, 96.0, 1e-9);
    assert_eq!(outcome.decision, Decision::Accepted);
    assert!(!outcome.forced_refusal);
    assert!(outcome.refusal_reason.is_none());
}

#[test]
fn existing_charges_push_reference_dossier_over_the_ceiling() {
    let outcome = engine()
        .evaluate(&request_with_charges(), 0.1)
        .expect("evaluation succeeds");

    assert_close(outcome.profile.debt_ratio, 0.3984, 0.0001);
    assert_eq!(outcome.alerts.len(), 1);
    assert_eq!(outcome.alerts[0].rule, RuleKind::DebtRatio);
    assert_eq!(outcome.alerts[0].severity, Severity::Blocking);
    assert_eq!(outcome.decision, Decision::Refused);
    assert!(outcome.forced_refusal);
}

#[test]
fn oversized_principal_is_refused_for_debt_ratio() {
    let oversized = LoanRequest {
        principal: 600_000.0,
        ..request_with_charges()
    };

    let outcome = engine().evaluate(&oversized, 0.1).expect("evaluation succeeds");

    assert_eq!(outcome.decision, Decision::Refused);
    assert!(outcome.profile.debt_ratio > 0.35);
    assert!(outcome.alerts.iter().any(|a| a.rule == RuleKind::ResidualIncome));
    match outcome.refusal_reason {
        Some(RefusalReason::BlockingRule { rule, detail }) => {
            assert_eq!(rule, RuleKind::DebtRatio);
            assert!(detail.contains("debt ratio"));
        }
        other => panic!("expected debt ratio refusal, got {other:?}"),
    }
}

#[test]
fn age_at_maturity_blocks_even_a_perfect_score() {
    let senior = LoanRequest {
        age: 70,
        principal: 100_000.0,
        duration_years: 10,
        loan_type: Some(LoanType::Immobilier),
        ..request()
    };

    let outcome = engine().evaluate(&senior, 0.0).expect("evaluation succeeds");

    assert_eq!(outcome.profile.age_at_maturity, 80);
    assert!(outcome.score >= 70.0);
    assert_eq!(outcome.decision, Decision::Refused);
    match outcome.refusal_reason {
        Some(RefusalReason::BlockingRule { rule, .. }) => {
            assert_eq!(rule, RuleKind::AgeAtMaturity)
        }
        other => panic!("expected age refusal, got {other:?}"),
    }
}

#[test]
fn debt_ratio_at_the_ceiling_is_not_blocking() {
    let engine = engine();
    let mut profile = profile();

    profile.debt_ratio = 0.35;
    assert!(!engine.rules(&request(), &profile).triggered(RuleKind::DebtRatio));

    profile.debt_ratio = 0.350001;
    let outcome = engine.rules(&request(), &profile);
    assert!(outcome.triggered(RuleKind::DebtRatio));
    assert!(outcome.has_blocking());
}

#[test]
fn every_violated_rule_surfaces_in_order() {
    let stretched = LoanRequest {
        principal: 600_000.0,
        duration_years: 30,
        age: 60,
        employment_tenure_years: 1.0,
        existing_charges: 500.0,
        down_payment: 0.0,
        ..request()
    };

    let outcome = engine().evaluate(&stretched, 0.2).expect("evaluation succeeds");

    let rules: Vec<RuleKind> = outcome.alerts.iter().map(|alert| alert.rule).collect();
    assert_eq!(rules, RuleKind::ordered().to_vec());
    assert_eq!(outcome.breakdown.rule_score, 0.0);
    match outcome.refusal_reason {
        Some(RefusalReason::BlockingRule { rule, .. }) => assert_eq!(rule, RuleKind::DebtRatio),
        other => panic!("expected first blocking rule, got {other:?}"),
    }
}

#[test]
fn consumer_loan_longer_than_ceiling_is_blocked() {
    let consumer = LoanRequest {
        principal: 30_000.0,
        duration_years: 10,
        down_payment: 3_000.0,
        loan_type: Some(LoanType::Consommation),
        ..request()
    };

    let outcome = engine().evaluate(&consumer, 0.1).expect("evaluation succeeds");

    assert_eq!(outcome.profile.annual_rate, 0.065);
    let finding = outcome
        .alerts
        .iter()
        .find(|alert| alert.rule == RuleKind::Duration)
        .expect("duration finding");
    assert!(finding.message.contains("consommation"));
    assert_eq!(outcome.decision, Decision::Refused);
}

#[test]
fn small_short_loan_is_priced_as_consumer_credit() {
    let consumer = LoanRequest {
        principal: 15_000.0,
        duration_years: 5,
        down_payment: 1_500.0,
        ..request()
    };

    let outcome = engine().evaluate(&consumer, 0.1).expect("evaluation succeeds");

    assert_eq!(outcome.profile.loan_type, LoanType::Consommation);
    assert_eq!(outcome.profile.max_duration_years, 7);
}

#[test]
fn warnings_lower_the_score_without_forcing_refusal() {
    let shaky = LoanRequest {
        employment_tenure_years: 1.0,
        down_payment: 0.0,
        ..request()
    };
    let engine = engine();

    let confident = engine.evaluate(&shaky, 0.1).expect("evaluation succeeds");
    assert_eq!(confident.alerts.len(), 2);
    assert!(confident
        .alerts
        .iter()
        .all(|alert| alert.severity == Severity::Warning));
    assert_close(confident.breakdown.rule_score, 80.0, 1e-9);
    assert_close(confident.score, 84.0, 1e-9);
    assert_eq!(confident.decision, Decision::Accepted);

    let doubtful = engine.evaluate(&shaky, 0.9).expect("evaluation succeeds");
    assert_close(doubtful.score, 52.0, 1e-9);
    assert_eq!(doubtful.decision, Decision::AcceptedWithConditions);
    assert!(doubtful.refusal_reason.is_none());
}

#[test]
fn low_score_refusal_blames_default_risk() {
    let shaky = LoanRequest {
        employment_tenure_years: 1.0,
        down_payment: 0.0,
        ..request()
    };

    let outcome = engine().evaluate(&shaky, 1.0).expect("evaluation succeeds");

    assert_close(outcome.score, 48.0, 1e-9);
    assert_eq!(outcome.decision, Decision::Refused);
    assert!(!outcome.forced_refusal);
    match outcome.refusal_reason {
        Some(RefusalReason::WeakestFactor { factor, impact, .. }) => {
            assert_eq!(factor, ScoreFactor::DefaultRisk);
            assert_close(impact, -40.0, 1e-9);
        }
        other => panic!("expected default risk refusal, got {other:?}"),
    }
}

#[test]
fn low_score_refusal_can_blame_a_warning() {
    let config = EvaluationConfig {
        warning_penalty: 40.0,
        ..config()
    };
    let engine = DecisionEngine::new(config, RateTable::default());
    let shaky = LoanRequest {
        employment_tenure_years: 1.0,
        down_payment: 0.0,
        ..request()
    };

    let outcome = engine.evaluate(&shaky, 0.1).expect("evaluation succeeds");

    assert_close(outcome.score, 48.0, 1e-9);
    assert_eq!(outcome.decision, Decision::Refused);
    match outcome.refusal_reason {
        Some(RefusalReason::WeakestFactor { factor, .. }) => {
            assert_eq!(factor, ScoreFactor::Rule(RuleKind::EmploymentTenure))
        }
        other => panic!("expected tenure refusal, got {other:?}"),
    }
}

#[test]
fn strengths_never_change_the_score() {
    let engine = engine();
    let modest = engine.evaluate(&request(), 0.2).expect("evaluation succeeds");
    let generous = engine
        .evaluate(
            &LoanRequest {
                down_payment: 50_000.0,
                ..request()
            },
            0.2,
        )
        .expect("evaluation succeeds");

    assert_eq!(modest.score, generous.score);
    assert_eq!(modest.strengths.len(), 3);
    assert_eq!(generous.strengths.len(), 4);
    assert!(generous
        .strengths
        .iter()
        .any(|strength| strength.contains("down payment")));
}

#[test]
fn evaluation_is_idempotent() {
    let engine = engine();
    let first = engine.evaluate(&request_with_charges(), 0.37).expect("first run");
    let second = engine.evaluate(&request_with_charges(), 0.37).expect("second run");
    assert_eq!(first, second);
}

#[test]
fn module_entry_point_matches_default_engine() {
    let direct = evaluate(&request(), 0.1).expect("evaluation succeeds");
    let engine = engine().evaluate(&request(), 0.1).expect("evaluation succeeds");
    assert_eq!(direct, engine);
}

#[test]
fn malformed_requests_fail_before_evaluation() {
    let cases = [
        ("principal", LoanRequest { principal: 0.0, ..request() }),
        ("duration_years", LoanRequest { duration_years: 0, ..request() }),
        ("age", LoanRequest { age: 17, ..request() }),
        ("age", LoanRequest { age: 100, ..request() }),
        ("annual_income", LoanRequest { annual_income: -1.0, ..request() }),
        ("existing_charges", LoanRequest { existing_charges: f64::NAN, ..request() }),
        ("down_payment", LoanRequest { down_payment: -5.0, ..request() }),
    ];

    for (expected, bad) in cases {
        match engine().evaluate(&bad, 0.1) {
            Err(LendingError::InvalidInput { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }
}

#[test]
fn zero_income_is_reported_not_clamped() {
    let unemployed = LoanRequest {
        annual_income: 0.0,
        ..request()
    };

    match engine().evaluate(&unemployed, 0.1) {
        Err(LendingError::DivisionByZero { operation }) => assert_eq!(operation, "debt ratio"),
        other => panic!("expected division by zero, got {other:?}"),
    }
}

#[test]
fn out_of_range_probability_is_an_estimator_failure() {
    for probability in [-0.1, 1.2, f64::NAN] {
        match engine().evaluate(&request(), probability) {
            Err(LendingError::EstimatorUnavailable(_)) => {}
            other => panic!("expected estimator failure for {probability}, got {other:?}"),
        }
    }
}

#[test]
fn failing_estimator_is_reported_to_the_caller() {
    match engine().evaluate_with(&request(), &failing_estimator) {
        Err(LendingError::EstimatorUnavailable(detail)) => {
            assert!(detail.contains("offline"))
        }
        other => panic!("expected estimator failure, got {other:?}"),
    }
}

#[test]
fn injected_estimator_matches_explicit_probability() {
    let stub = |_features: &RiskFeatures| -> Result<f64, EstimatorError> { Ok(0.1) };

    let injected = engine().evaluate_with(&request(), &stub).expect("evaluation succeeds");
    let explicit = engine().evaluate(&request(), 0.1).expect("evaluation succeeds");

    assert_eq!(injected, explicit);
}

#[test]
fn decisions_serialize_with_screaming_labels() {
    let json = serde_json::to_string(&Decision::AcceptedWithConditions).expect("serializes");
    assert_eq!(json, "\"ACCEPTED_WITH_CONDITIONS\"");
    assert_eq!(Decision::Refused.label(), "REFUSED");
}

#[test]
fn regulatory_policy_passes_validation() {
    assert!(EvaluationConfig::default().validate().is_ok());
}

#[test]
fn policy_validation_names_the_offending_dial() {
    let inverted_thresholds = EvaluationConfig {
        accept_threshold: 40.0,
        conditional_threshold: 60.0,
        ..EvaluationConfig::default()
    };
    match inverted_thresholds.validate() {
        Err(PolicyError::Invalid { field, .. }) => assert_eq!(field, "conditional_threshold"),
        other => panic!("expected invalid threshold, got {other:?}"),
    }

    let no_weight = EvaluationConfig {
        rule_weight: 0.0,
        model_weight: 0.0,
        ..EvaluationConfig::default()
    };
    assert!(no_weight.validate().is_err());
}

#[test]
fn schedule_length_is_bounded_by_policy() {
    let config = EvaluationConfig::default();
    assert!(config.check_schedule_years(config.max_schedule_years).is_ok());
    match config.check_schedule_years(config.max_schedule_years + 1) {
        Err(LendingError::InvalidInput { field, .. }) => assert_eq!(field, "duration_years"),
        other => panic!("expected invalid duration, got {other:?}"),
    }
}
