//! Fixed-rate loan arithmetic.
//!
//! Every routine here is a pure function over its arguments. Amounts are plain
//! `f64` euros and rates are decimal fractions (`0.035` for 3.5%); rounding and
//! currency formatting belong to the adapters.

use serde::{Deserialize, Serialize};

use super::error::LendingError;

const MONTHS_PER_YEAR: u32 = 12;

/// Monthly payment of a fixed-rate amortizing loan.
///
/// payment = P × r / (1 − (1 + r)^−n)
///
/// Where:
/// - P = principal
/// - r = monthly rate (`annual_rate / 12`)
/// - n = number of monthly installments (`duration_years × 12`)
///
/// A zero rate falls back to straight division `P / n`.
pub fn compute_monthly_payment(
    principal: f64,
    annual_rate: f64,
    duration_years: u32,
) -> Result<f64, LendingError> {
    ensure_non_negative("principal", principal)?;
    ensure_non_negative("annual_rate", annual_rate)?;

    let months = installment_count(duration_years, "monthly payment")?;

    if annual_rate == 0.0 {
        return Ok(principal / months as f64);
    }

    let monthly_rate = annual_rate / MONTHS_PER_YEAR as f64;
    let discount = (1.0 + monthly_rate).powi(-(months as i32));

    Ok(principal * monthly_rate / (1.0 - discount))
}

/// Total amount repaid over the life of the loan.
pub fn compute_total_cost(monthly_payment: f64, duration_years: u32) -> f64 {
    monthly_payment * f64::from(duration_years) * f64::from(MONTHS_PER_YEAR)
}

/// Interest portion of the total cost.
pub fn compute_interest(total_cost: f64, principal: f64) -> f64 {
    total_cost - principal
}

/// Share of monthly income absorbed by the new payment plus existing charges.
pub fn compute_debt_ratio(
    monthly_payment: f64,
    existing_charges: f64,
    monthly_income: f64,
) -> Result<f64, LendingError> {
    if monthly_income == 0.0 {
        return Err(LendingError::DivisionByZero {
            operation: "debt ratio",
        });
    }

    Ok((monthly_payment + existing_charges) / monthly_income)
}

/// Income left each month once the payment and existing charges are served.
///
/// `household_size` does not alter the amount; the engine uses it to pick the
/// minimum acceptable threshold.
pub fn compute_residual_income(
    monthly_income: f64,
    monthly_payment: f64,
    existing_charges: f64,
    _household_size: u32,
) -> f64 {
    monthly_income - monthly_payment - existing_charges
}

/// Largest principal serviceable without pushing the debt ratio past
/// `debt_ratio_ceiling`.
///
/// Closed-form inverse of [`compute_monthly_payment`]:
/// max_payment = income × ceiling − charges, then
/// P = max_payment × (1 − (1 + r)^−n) / r (or `max_payment × n` at 0%).
pub fn compute_max_capacity(
    monthly_income: f64,
    existing_charges: f64,
    annual_rate: f64,
    duration_years: u32,
    debt_ratio_ceiling: f64,
) -> Result<f64, LendingError> {
    ensure_non_negative("monthly_income", monthly_income)?;
    ensure_non_negative("existing_charges", existing_charges)?;
    ensure_non_negative("annual_rate", annual_rate)?;
    if !(debt_ratio_ceiling > 0.0 && debt_ratio_ceiling <= 1.0) {
        return Err(LendingError::invalid(
            "debt_ratio_ceiling",
            format!("must lie in (0, 1], got {debt_ratio_ceiling}"),
        ));
    }

    let max_payment = monthly_income * debt_ratio_ceiling - existing_charges;
    if max_payment <= 0.0 {
        return Ok(0.0);
    }

    let months = installment_count(duration_years, "borrowing capacity")?;

    if annual_rate == 0.0 {
        return Ok(max_payment * months as f64);
    }

    let monthly_rate = annual_rate / MONTHS_PER_YEAR as f64;
    let discount = (1.0 + monthly_rate).powi(-(months as i32));

    Ok(max_payment * (1.0 - discount) / monthly_rate)
}

/// Applicant age on the date of the last installment.
pub fn compute_age_at_maturity(age: u32, duration_years: u32) -> u32 {
    age + duration_years
}

/// Payment, total cost and interest for a loan, bundled for quick quotes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentQuote {
    pub monthly_payment: f64,
    pub total_cost: f64,
    pub total_interest: f64,
}

pub fn quote_payment(
    principal: f64,
    annual_rate: f64,
    duration_years: u32,
) -> Result<PaymentQuote, LendingError> {
    let monthly_payment = compute_monthly_payment(principal, annual_rate, duration_years)?;
    let total_cost = compute_total_cost(monthly_payment, duration_years);

    Ok(PaymentQuote {
        monthly_payment,
        total_cost,
        total_interest: compute_interest(total_cost, principal),
    })
}

/// One year of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub principal_repaid: f64,
    pub interest: f64,
    pub remaining_balance: f64,
}

/// Yearly breakdown of how each installment splits between interest and principal.
pub fn amortization_schedule(
    principal: f64,
    annual_rate: f64,
    duration_years: u32,
) -> Result<Vec<AmortizationYear>, LendingError> {
    let payment = compute_monthly_payment(principal, annual_rate, duration_years)?;
    let monthly_rate = annual_rate / MONTHS_PER_YEAR as f64;

    let mut balance = principal;
    let mut schedule = Vec::with_capacity(duration_years as usize);

    for year in 1..=duration_years {
        let mut interest = 0.0;
        let mut principal_repaid = 0.0;

        for _ in 0..MONTHS_PER_YEAR {
            if balance <= 0.0 {
                break;
            }

            let month_interest = balance * monthly_rate;
            let month_principal = payment - month_interest;
            balance -= month_principal;
            interest += month_interest;
            principal_repaid += month_principal;
        }

        schedule.push(AmortizationYear {
            year,
            principal_repaid,
            interest,
            remaining_balance: balance.max(0.0),
        });
    }

    Ok(schedule)
}

fn installment_count(duration_years: u32, operation: &'static str) -> Result<u32, LendingError> {
    match duration_years.checked_mul(MONTHS_PER_YEAR) {
        Some(0) => Err(LendingError::DivisionByZero { operation }),
        Some(months) if months <= i32::MAX as u32 => Ok(months),
        _ => Err(LendingError::invalid(
            "duration_years",
            format!("{duration_years} years is out of range"),
        )),
    }
}

fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), LendingError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LendingError::invalid(
            field,
            format!("must be a finite, non-negative amount, got {value}"),
        ))
    }
}
