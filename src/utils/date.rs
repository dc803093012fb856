use chrono::{Datelike, NaiveDate};

/// ISO week key of a date: `(iso_year, iso_week)`.
pub fn iso_week_key(d: NaiveDate) -> (i32, u32) {
    let w = d.iso_week();
    (w.year(), w.week())
}

/// Chart label for an ISO week, e.g. `2024-W01`.
pub fn iso_week_label(year: i32, week: u32) -> String {
    format!("{}-W{:02}", year, week)
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
