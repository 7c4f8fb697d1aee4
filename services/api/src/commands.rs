use crate::infra::{load_estimator, load_evaluation_config, parse_loan_type, parse_probability};
use chrono::Utc;
use clap::Args;
use creditscore::config::AppConfig;
use creditscore::error::AppError;
use creditscore::lending::calculator::{amortization_schedule, compute_max_capacity, quote_payment};
use creditscore::lending::export::write_amortization_csv;
use creditscore::lending::{
    CreditAssessmentService, DecisionEngine, DecisionResult, EvaluationConfig, LoanRequest,
    LoanType, RateTable, Severity,
};
use serde::Serialize;
use serde_json::json;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Gross annual income in EUR
    #[arg(long)]
    pub(crate) annual_income: f64,
    /// Requested principal in EUR
    #[arg(long)]
    pub(crate) principal: f64,
    /// Loan duration in years
    #[arg(long)]
    pub(crate) duration_years: u32,
    /// Applicant age in years
    #[arg(long)]
    pub(crate) age: u32,
    /// Years in the current employment
    #[arg(long, default_value_t = 0.0)]
    pub(crate) employment_tenure_years: f64,
    /// Dependent children in the household
    #[arg(long, default_value_t = 0)]
    pub(crate) children: u32,
    /// Existing monthly credit charges in EUR
    #[arg(long, default_value_t = 0.0)]
    pub(crate) existing_charges: f64,
    /// Personal contribution in EUR
    #[arg(long, default_value_t = 0.0)]
    pub(crate) down_payment: f64,
    /// immobilier or consommation (inferred from amount and duration when omitted)
    #[arg(long, value_parser = parse_loan_type)]
    pub(crate) loan_type: Option<LoanType>,
    /// Known default probability; the configured estimator is used when omitted
    #[arg(long, value_parser = parse_probability)]
    pub(crate) risk_probability: Option<f64>,
    /// JSON scoring policy overriding CREDIT_POLICY_FILE
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
    /// Print the decision as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl EvaluateArgs {
    fn request(&self) -> LoanRequest {
        LoanRequest {
            annual_income: self.annual_income,
            principal: self.principal,
            duration_years: self.duration_years,
            age: self.age,
            employment_tenure_years: self.employment_tenure_years,
            children: self.children,
            existing_charges: self.existing_charges,
            down_payment: self.down_payment,
            loan_type: self.loan_type,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct LoanTermsArgs {
    /// Principal in EUR
    #[arg(long)]
    pub(crate) principal: f64,
    /// Nominal annual rate as a fraction (0.035 for 3.5%)
    #[arg(long)]
    pub(crate) annual_rate: f64,
    /// Loan duration in years
    #[arg(long)]
    pub(crate) duration_years: u32,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CapacityArgs {
    /// Net monthly income in EUR
    #[arg(long)]
    pub(crate) monthly_income: f64,
    /// Nominal annual rate as a fraction
    #[arg(long)]
    pub(crate) annual_rate: f64,
    /// Loan duration in years
    #[arg(long)]
    pub(crate) duration_years: u32,
    /// Existing monthly credit charges in EUR
    #[arg(long, default_value_t = 0.0)]
    pub(crate) existing_charges: f64,
    /// Debt ratio ceiling, defaults to the regulatory 35%
    #[arg(long)]
    pub(crate) debt_ratio_ceiling: Option<f64>,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AmortizationArgs {
    #[command(flatten)]
    pub(crate) terms: LoanTermsArgs,
    /// Emit the schedule as CSV instead of a table
    #[arg(long)]
    pub(crate) csv: bool,
    /// Write the CSV schedule to this file instead of stdout
    #[arg(long, requires = "csv")]
    pub(crate) output: Option<PathBuf>,
    /// JSON scoring policy overriding CREDIT_POLICY_FILE
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Default probability applied to every demo dossier
    #[arg(long, default_value_t = 0.1, value_parser = parse_probability)]
    pub(crate) risk_probability: f64,
    /// JSON scoring policy overriding CREDIT_POLICY_FILE
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
}

/// An explicit `--policy` wins over the configured policy file.
fn load_policy(
    explicit: Option<&Path>,
    configured: Option<&Path>,
) -> Result<EvaluationConfig, AppError> {
    load_evaluation_config(explicit.or(configured))
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let evaluation_config = load_policy(args.policy.as_deref(), config.policy_file.as_deref())?;
    let request = args.request();

    let result = match args.risk_probability {
        Some(probability) => DecisionEngine::new(evaluation_config, RateTable::default())
            .evaluate(&request, probability)?,
        None => {
            let estimator = load_estimator(&config.risk)?;
            CreditAssessmentService::new(estimator, evaluation_config).evaluate(&request)?
        }
    };

    if args.json {
        print_json(&json!({
            "evaluated_at": Utc::now().to_rfc3339(),
            "request": request,
            "result": result,
        }))
    } else {
        render_decision(&result);
        Ok(())
    }
}

pub(crate) fn run_payment(args: LoanTermsArgs) -> Result<(), AppError> {
    let quote = quote_payment(args.principal, args.annual_rate, args.duration_years)?;

    if args.json {
        return print_json(&json!({
            "principal": args.principal,
            "annual_rate": args.annual_rate,
            "duration_years": args.duration_years,
            "monthly_payment": cents(quote.monthly_payment),
            "total_cost": cents(quote.total_cost),
            "total_interest": cents(quote.total_interest),
        }));
    }

    println!(
        "Loan of {:.2} EUR at {:.2}% over {} years",
        args.principal,
        args.annual_rate * 100.0,
        args.duration_years
    );
    println!("- monthly payment: {:.2} EUR", quote.monthly_payment);
    println!("- total cost:      {:.2} EUR", quote.total_cost);
    println!("- total interest:  {:.2} EUR", quote.total_interest);
    Ok(())
}

pub(crate) fn run_capacity(args: CapacityArgs) -> Result<(), AppError> {
    let ceiling = args
        .debt_ratio_ceiling
        .unwrap_or_else(|| EvaluationConfig::default().max_debt_ratio);
    let capacity = compute_max_capacity(
        args.monthly_income,
        args.existing_charges,
        args.annual_rate,
        args.duration_years,
        ceiling,
    )?;

    if args.json {
        return print_json(&json!({
            "max_capacity": cents(capacity),
            "monthly_income": args.monthly_income,
            "annual_rate": args.annual_rate,
            "duration_years": args.duration_years,
            "existing_charges": args.existing_charges,
            "debt_ratio_ceiling": ceiling,
        }));
    }

    println!(
        "Borrowing capacity at {:.1}% debt ratio over {} years: {:.2} EUR",
        ceiling * 100.0,
        args.duration_years,
        capacity
    );
    Ok(())
}

pub(crate) fn run_amortization(args: AmortizationArgs) -> Result<(), AppError> {
    let AmortizationArgs {
        terms,
        csv,
        output,
        policy,
    } = args;
    let config = AppConfig::load()?;
    load_policy(policy.as_deref(), config.policy_file.as_deref())?
        .check_schedule_years(terms.duration_years)?;
    let schedule = amortization_schedule(terms.principal, terms.annual_rate, terms.duration_years)?;

    if csv {
        match output {
            Some(path) => write_amortization_csv(&schedule, BufWriter::new(File::create(path)?))?,
            None => write_amortization_csv(&schedule, io::stdout().lock())?,
        }
        return Ok(());
    }

    if terms.json {
        return print_json(&schedule);
    }

    println!("year | principal repaid | interest | remaining balance");
    for row in &schedule {
        println!(
            "{:>4} | {:>16.2} | {:>8.2} | {:>17.2}",
            row.year, row.principal_repaid, row.interest, row.remaining_balance
        );
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let policy = load_policy(args.policy.as_deref(), config.policy_file.as_deref())?;
    let engine = DecisionEngine::new(policy, RateTable::default());

    println!(
        "Credit decision demo (default probability {:.0}%)",
        args.risk_probability * 100.0
    );
    for (title, request) in demo_dossiers() {
        println!("\n== {title}");
        match engine.evaluate(&request, args.risk_probability) {
            Ok(result) => render_decision(&result),
            Err(err) => println!("  Evaluation rejected: {err}"),
        }
    }

    Ok(())
}

pub(crate) fn demo_dossiers() -> Vec<(&'static str, LoanRequest)> {
    let household = LoanRequest {
        annual_income: 50_000.0,
        principal: 200_000.0,
        duration_years: 20,
        age: 35,
        employment_tenure_years: 5.0,
        children: 2,
        existing_charges: 0.0,
        down_payment: 20_000.0,
        loan_type: None,
    };

    vec![
        ("Household mortgage, no existing credit", household.clone()),
        (
            "Same household carrying 500 EUR of monthly charges",
            LoanRequest {
                existing_charges: 500.0,
                ..household.clone()
            },
        ),
        (
            "Oversized mortgage",
            LoanRequest {
                principal: 600_000.0,
                existing_charges: 500.0,
                ..household.clone()
            },
        ),
        (
            "Late-career borrower",
            LoanRequest {
                age: 70,
                principal: 100_000.0,
                duration_years: 10,
                loan_type: Some(LoanType::Immobilier),
                ..household
            },
        ),
    ]
}

fn render_decision(result: &DecisionResult) {
    let profile = &result.profile;
    println!(
        "Decision: {} (score {:.1}/100)",
        result.decision.label(),
        result.score
    );
    println!(
        "  rule score {:.1} | model score {:.1} | default probability {:.1}%",
        result.breakdown.rule_score,
        result.breakdown.model_score,
        result.breakdown.default_probability * 100.0
    );
    println!(
        "  {} loan at {:.2}% (max {} years)",
        profile.loan_type.label(),
        profile.annual_rate * 100.0,
        profile.max_duration_years
    );
    println!(
        "  monthly payment {:.2} EUR | total cost {:.2} EUR | interest {:.2} EUR",
        profile.monthly_payment, profile.total_cost, profile.total_interest
    );
    println!(
        "  debt ratio {:.1}% | residual income {:.2} EUR | capacity {:.2} EUR | age at maturity {}",
        profile.debt_ratio * 100.0,
        profile.residual_income,
        profile.max_capacity,
        profile.age_at_maturity
    );

    if result.alerts.is_empty() {
        println!("  Alerts: none");
    } else {
        println!("  Alerts:");
        for alert in &result.alerts {
            let marker = match alert.severity {
                Severity::Blocking => "BLOCKING",
                Severity::Warning => "warning",
            };
            println!("    - [{marker}] {}: {}", alert.rule.label(), alert.message);
        }
    }

    if !result.strengths.is_empty() {
        println!("  Strengths:");
        for strength in &result.strengths {
            println!("    - {strength}");
        }
    }

    if let Some(reason) = &result.refusal_reason {
        println!("  Refusal reason: {}", reason.summary());
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn cents(amount: f64) -> f64 {
    creditscore::lending::router::round_cents(amount)
}
