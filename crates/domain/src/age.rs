use chrono::{Datelike, Local, NaiveDate};

/// Number of completed years between `birth_date` and `today`.
#[must_use]
pub fn age(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years - 1
    } else {
        years
    }
}

/// Age for a birth date given as `YYYY-MM-DD`.
///
/// Returns `None` if the date cannot be parsed.
#[must_use]
pub fn age_from_iso(birth_date: &str, today: NaiveDate) -> Option<i32> {
    NaiveDate::parse_from_str(birth_date.trim(), "%Y-%m-%d")
        .ok()
        .map(|birth_date| age(birth_date, today))
}

#[must_use]
pub fn calculate_age(birth_date: &str) -> Option<i32> {
    age_from_iso(birth_date, Local::now().date_naive())
}
