//! Current-week page title

use chrono::{Local, NaiveDate};

use crate::config::CalendarConfig;

/// `1 + floor(days since base / 7)`; dates before the base count backwards
pub fn week_number(base: NaiveDate, today: NaiveDate) -> i64 {
    1 + (today - base).num_days().div_euclid(7)
}

pub fn title_for(calendar: &CalendarConfig, today: NaiveDate) -> String {
    format!(
        "{}{}",
        calendar.title_prefix,
        week_number(calendar.base_date, today)
    )
}

/// Title of this week's seminar page, local time
pub fn current_title(calendar: &CalendarConfig) -> String {
    title_for(calendar, Local::now().date_naive())
}
