use std::fmt;

use crate::loan::{Installment, LoanResult};

/// Shown for every rejected loan request, whatever the reason.
pub const INCORRECT_PARAMETERS: &str = "Incorrect parameters";

/// "1 month", "2 months", "0 years".
pub fn count_of(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

fn term(years: u32, months: u32) -> String {
    if years == 0 && months > 0 {
        count_of(months, "month")
    } else if years > 0 && months == 0 {
        count_of(years, "year")
    } else {
        format!("{} and {}", count_of(years, "year"), count_of(months, "month"))
    }
}

impl fmt::Display for Installment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(
                f,
                "Month {} ({}): payment is {}",
                self.month, date, self.amount
            ),
            None => write!(f, "Month {}: payment is {}", self.month, self.amount),
        }
    }
}

impl fmt::Display for LoanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanResult::AnnuityPayment { payment, .. } => {
                writeln!(f, "Your annuity payment = {}!", payment)?
            }
            LoanResult::Principal { principal, .. } => {
                writeln!(f, "Your loan principal = {}!", principal)?
            }
            LoanResult::Term { years, months, .. } => writeln!(
                f,
                "It will take {} to repay this loan!",
                term(*years, *months)
            )?,
            LoanResult::Differentiated { installments, .. } => {
                for installment in installments {
                    writeln!(f, "{}", installment)?;
                }
            }
        }
        write!(f, "Overpayment = {}", self.overpayment())
    }
}
