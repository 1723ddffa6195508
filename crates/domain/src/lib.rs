#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod age;
mod body_composition;
mod energy;
mod error;
mod measurement;
mod report;
mod service;
mod sponsor;
mod user;

pub use age::*;
pub use body_composition::*;
pub use energy::*;
pub use error::*;
pub use measurement::*;
pub use report::*;
pub use service::*;
pub use sponsor::*;
pub use user::*;

/// Parse a decimal number, accepting a comma as decimal separator.
#[must_use]
pub fn parse_decimal(value: &str) -> Option<f64> {
    value
        .replace(',', ".")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("80", Some(80.))]
    #[case(" 80.5 ", Some(80.5))]
    #[case("80,5", Some(80.5))]
    #[case("-3", Some(-3.))]
    #[case("inf", None)]
    #[case("NaN", None)]
    #[case("", None)]
    #[case("1,000.5", None)]
    fn test_parse_decimal(#[case] value: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_decimal(value), expected);
    }
}
