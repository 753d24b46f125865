//! Small command-line exercises built around a loan calculator.
//!
//! [`loan`] solves for whichever of payment, principal or term was left out
//! of a request, and [`report`] renders the result. The [`markdown`], [`rps`]
//! and [`quiz`] modules are interactive sessions driven through a
//! [`console::Console`], so they can run against any reader and writer.

pub mod console;
pub mod error;
pub mod loan;
pub mod markdown;
pub mod quiz;
pub mod report;
pub mod rps;
