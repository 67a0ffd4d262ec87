//! Numeric building blocks.
//!
//! - `finance`: amortisation, discounting and NPV
//! - `statistics`: mean, standard deviation, percentiles, distribution summaries
//! - `solvers`: bracketing root finder used for IRR

pub mod finance;
pub mod solvers;
pub mod statistics;
