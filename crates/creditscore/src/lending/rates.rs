use serde::{Deserialize, Serialize};

/// Product family of the requested loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Immobilier,
    Consommation,
}

impl LoanType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Immobilier => "immobilier",
            Self::Consommation => "consommation",
        }
    }
}

/// Nominal rate and longest allowed duration for one loan type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub annual_rate: f64,
    pub max_duration_years: u32,
}

/// Static pricing grid keyed by loan type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub immobilier: LoanTerms,
    pub consommation: LoanTerms,
    /// Principal from which a request without an explicit type is treated as a mortgage.
    pub mortgage_threshold: f64,
}

impl RateTable {
    pub const HCSF_2022: RateTable = RateTable {
        immobilier: LoanTerms {
            annual_rate: 0.035,
            max_duration_years: 25,
        },
        consommation: LoanTerms {
            annual_rate: 0.065,
            max_duration_years: 7,
        },
        mortgage_threshold: 75_000.0,
    };

    pub fn terms(&self, loan_type: LoanType) -> LoanTerms {
        match loan_type {
            LoanType::Immobilier => self.immobilier,
            LoanType::Consommation => self.consommation,
        }
    }

    /// Guess the loan type from the amount, then from the duration.
    ///
    /// A duration no consumer loan may reach can only be a mortgage.
    pub fn infer(&self, principal: f64, duration_years: u32) -> LoanType {
        if principal >= self.mortgage_threshold
            || duration_years > self.consommation.max_duration_years
        {
            LoanType::Immobilier
        } else {
            LoanType::Consommation
        }
    }

    pub fn resolve(
        &self,
        requested: Option<LoanType>,
        principal: f64,
        duration_years: u32,
    ) -> LoanType {
        requested.unwrap_or_else(|| self.infer(principal, duration_years))
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::HCSF_2022
    }
}
