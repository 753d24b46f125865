use chrono::{Months, NaiveDate};
use log::{debug, trace};
use std::{fmt, str::FromStr};

use crate::error::{LoanError, ParamFault};

pub type LoanOutcome<T> = Result<T, LoanError>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CalcType {
    Annuity,
    Diff,
}

impl FromStr for CalcType {
    type Err = ParamFault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "annuity" => Ok(CalcType::Annuity),
            "diff" => Ok(CalcType::Diff),
            other => Err(ParamFault::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for CalcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcType::Annuity => write!(f, "annuity"),
            CalcType::Diff => write!(f, "diff"),
        }
    }
}

/// Which unknown a request solves for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    AnnuityPayment,
    AnnuityPrincipal,
    AnnuityPeriods,
    Differentiated,
}

/// A single month of a differentiated schedule.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Installment {
    pub month: u32,
    pub date: Option<NaiveDate>,
    pub amount: i64,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoanResult {
    AnnuityPayment {
        payment: i64,
        overpayment: i64,
    },
    Principal {
        principal: i64,
        overpayment: i64,
    },
    Term {
        years: u32,
        months: u32,
        overpayment: i64,
    },
    Differentiated {
        installments: Vec<Installment>,
        overpayment: i64,
    },
}

impl LoanResult {
    pub fn overpayment(&self) -> i64 {
        match self {
            LoanResult::AnnuityPayment { overpayment, .. }
            | LoanResult::Principal { overpayment, .. }
            | LoanResult::Term { overpayment, .. }
            | LoanResult::Differentiated { overpayment, .. } => *overpayment,
        }
    }
}

/// Validated loan parameters. Exactly one of payment, principal and periods
/// is expected to be missing; that is the value `calculate` solves for.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanRequest {
    calc_type: CalcType,
    payment: Option<f64>,
    principal: Option<f64>,
    periods: Option<u32>,
    annual_interest: f64,
    first_payment: Option<NaiveDate>,
}

// the known values for each mode, pulled out of the request once
enum Terms {
    AnnuityPayment { principal: f64, periods: u32 },
    AnnuityPrincipal { payment: f64, periods: u32 },
    AnnuityPeriods { payment: f64, principal: f64 },
    Differentiated { principal: f64, periods: u32 },
}

impl Terms {
    fn mode(&self) -> Mode {
        match self {
            Terms::AnnuityPayment { .. } => Mode::AnnuityPayment,
            Terms::AnnuityPrincipal { .. } => Mode::AnnuityPrincipal,
            Terms::AnnuityPeriods { .. } => Mode::AnnuityPeriods,
            Terms::Differentiated { .. } => Mode::Differentiated,
        }
    }
}

impl LoanRequest {
    /// Checks raw values as they come from the command line. Negative or
    /// non-finite numbers, a missing interest rate and a missing or unknown
    /// calculation type are rejected here, before anything is computed.
    pub fn new(
        calc_type: Option<&str>,
        payment: Option<f64>,
        principal: Option<f64>,
        periods: Option<i64>,
        annual_interest: Option<f64>,
    ) -> LoanOutcome<Self> {
        let payment = check_amount("payment", payment)?;
        let principal = check_amount("principal", principal)?;
        let periods = check_periods(periods)?;
        let annual_interest =
            check_amount("interest", annual_interest)?.ok_or(ParamFault::MissingInterest)?;

        let calc_type: CalcType = calc_type.ok_or(ParamFault::MissingType)?.parse()?;

        Ok(Self {
            calc_type,
            payment,
            principal,
            periods,
            annual_interest,
            first_payment: None,
        })
    }

    /// Dates the differentiated schedule, one calendar month apart.
    pub fn with_first_payment(mut self, date: NaiveDate) -> Self {
        self.first_payment = Some(date);
        self
    }

    pub fn calc_type(&self) -> CalcType {
        self.calc_type
    }

    pub fn payment(&self) -> Option<f64> {
        self.payment
    }

    pub fn principal(&self) -> Option<f64> {
        self.principal
    }

    pub fn periods(&self) -> Option<u32> {
        self.periods
    }

    pub fn annual_interest(&self) -> f64 {
        self.annual_interest
    }

    pub fn first_payment(&self) -> Option<NaiveDate> {
        self.first_payment
    }

    pub fn monthly_rate(&self) -> f64 {
        monthly_rate(self.annual_interest)
    }

    pub fn mode(&self) -> LoanOutcome<Mode> {
        self.terms().map(|terms| terms.mode())
    }

    /// Solves for the missing value and the total overpayment.
    pub fn calculate(&self) -> LoanOutcome<LoanResult> {
        let terms = self.terms()?;
        let rate = self.monthly_rate();
        debug!(
            "{} calculation as {:?}, monthly rate {}",
            self.calc_type,
            terms.mode(),
            rate
        );

        match terms {
            Terms::AnnuityPayment { principal, periods } => {
                annuity_payment(principal, periods, rate)
            }
            Terms::AnnuityPrincipal { payment, periods } => {
                loan_principal(payment, periods, rate)
            }
            Terms::AnnuityPeriods { payment, principal } => {
                repayment_term(payment, principal, rate)
            }
            Terms::Differentiated { principal, periods } => {
                differentiated_schedule(principal, periods, rate, self.first_payment)
            }
        }
    }

    fn terms(&self) -> LoanOutcome<Terms> {
        let terms = match (self.calc_type, self.payment, self.principal, self.periods) {
            (CalcType::Annuity, None, Some(principal), Some(periods)) => {
                Terms::AnnuityPayment { principal, periods }
            }
            (CalcType::Annuity, Some(payment), None, Some(periods)) => {
                Terms::AnnuityPrincipal { payment, periods }
            }
            (CalcType::Annuity, Some(payment), Some(principal), None) => {
                Terms::AnnuityPeriods { payment, principal }
            }
            (CalcType::Diff, None, Some(principal), Some(periods)) => {
                Terms::Differentiated { principal, periods }
            }
            _ => return Err(ParamFault::UnsupportedCombination.into()),
        };
        Ok(terms)
    }
}

fn check_amount(field: &'static str, value: Option<f64>) -> Result<Option<f64>, ParamFault> {
    match value {
        Some(v) if !v.is_finite() => Err(ParamFault::NotFinite { field }),
        Some(v) if v < 0. => Err(ParamFault::Negative { field }),
        _ => Ok(value),
    }
}

fn check_periods(value: Option<i64>) -> Result<Option<u32>, ParamFault> {
    match value {
        None => Ok(None),
        Some(n) if n < 0 => Err(ParamFault::Negative { field: "periods" }),
        Some(0) => Err(ParamFault::ZeroPeriods),
        Some(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| ParamFault::TooLarge { field: "periods" }),
    }
}

/// Nominal monthly rate as a fraction, from an annual percentage.
pub fn monthly_rate(annual_interest: f64) -> f64 {
    annual_interest / (12. * 100.)
}

// i * (1 + i)^n / ((1 + i)^n - 1), written as i / (1 - (1 + i)^-n) so that
// long terms tend to i instead of inf / inf, and tiny rates tend to 1/n
fn annuity_factor(rate: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate == 0. {
        return 1. / n;
    }

    let discounted = -(-n * rate.ln_1p()).exp_m1();
    trace!("annuity factor {} / {}", rate, discounted);
    rate / discounted
}

// rounded amounts have to fit the integer report fields
fn whole(field: &'static str, amount: f64) -> Result<i64, ParamFault> {
    if !amount.is_finite() {
        return Err(ParamFault::NotFinite { field });
    }
    if amount.abs() >= i64::MAX as f64 {
        return Err(ParamFault::TooLarge { field });
    }
    Ok(amount as i64)
}

pub fn annuity_payment(principal: f64, periods: u32, rate: f64) -> LoanOutcome<LoanResult> {
    let payment = (principal * annuity_factor(rate, periods)).ceil();
    let overpayment = (payment * periods as f64 - principal).ceil();

    Ok(LoanResult::AnnuityPayment {
        payment: whole("payment", payment)?,
        overpayment: whole("overpayment", overpayment)?,
    })
}

// the principal rounds down so a borrower is never told they can afford more
pub fn loan_principal(payment: f64, periods: u32, rate: f64) -> LoanOutcome<LoanResult> {
    let principal = (payment / annuity_factor(rate, periods)).floor();
    let overpayment = (payment * periods as f64 - principal).ceil();

    Ok(LoanResult::Principal {
        principal: whole("principal", principal)?,
        overpayment: whole("overpayment", overpayment)?,
    })
}

/// Fractional number of months a payment needs to repay a principal.
pub fn months_to_repay(payment: f64, principal: f64, rate: f64) -> LoanOutcome<f64> {
    let non_amortizing = ParamFault::NonAmortizing { payment, principal };
    if payment <= rate * principal {
        return Err(non_amortizing.into());
    }

    // log base (1 + i) of A / (A - iP), kept in ln_1p form for rates near zero
    let months = if rate == 0. {
        principal / payment
    } else {
        -(-rate * principal / payment).ln_1p() / rate.ln_1p()
    };
    trace!("{} months to repay before rounding", months);

    if !months.is_finite() || months < 0. {
        return Err(non_amortizing.into());
    }
    Ok(months)
}

pub fn repayment_term(payment: f64, principal: f64, rate: f64) -> LoanOutcome<LoanResult> {
    let months = months_to_repay(payment, principal, rate)?.ceil();
    if months > u32::MAX as f64 {
        return Err(ParamFault::TooLarge { field: "periods" }.into());
    }

    let total = months as u32;
    let overpayment = (payment * months - principal).ceil();

    Ok(LoanResult::Term {
        years: total / 12,
        months: total % 12,
        overpayment: whole("overpayment", overpayment)?,
    })
}

pub fn differentiated_schedule(
    principal: f64,
    periods: u32,
    rate: f64,
    first_payment: Option<NaiveDate>,
) -> LoanOutcome<LoanResult> {
    let n = periods as f64;
    let mut installments = Vec::with_capacity(periods as usize);

    for month in 1..=periods {
        let repaid = principal * (month - 1) as f64 / n;
        let amount = (principal / n + rate * (principal - repaid)).ceil();
        let date = match first_payment {
            Some(first) => Some(
                first
                    .checked_add_months(Months::new(month - 1))
                    .ok_or(ParamFault::DateOutOfRange)?,
            ),
            None => None,
        };
        trace!("month {}, date {:?}, payment {}", month, date, amount);

        installments.push(Installment {
            month,
            date,
            amount: whole("payment", amount)?,
        });
    }

    let total = installments
        .iter()
        .try_fold(0i64, |sum, i| sum.checked_add(i.amount))
        .ok_or(ParamFault::TooLarge { field: "overpayment" })?;
    let overpayment = (total as f64 - principal).ceil();

    Ok(LoanResult::Differentiated {
        installments,
        overpayment: whole("overpayment", overpayment)?,
    })
}
