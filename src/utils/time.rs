use chrono::{Datelike, Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Same day `years` later. Feb 29 rolls over to Mar 1 when the target year is not a leap year.
pub fn plus_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year() + years;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// Only the first three days get their own suffix; 21, 22, 23 and 31 fall through to "th".
/// Certificates already issued carry this spelling.
pub fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// `January 26th, 2001`
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{} {}{}, {}",
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

/// `26/01/2001`
pub fn format_day_month_year(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
