//! Year grid computation, independent of any drawing backend.
//!
//! `render` is a pure function of the year, the marked set, the edit flag and
//! the current local date. Painters consume the returned [`MonthBlock`]s.

use crate::model::{DateKey, MarkedDates};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Labels {
    #[default]
    Vi,
    En,
}

const VI_MONTHS: [&str; 12] = [
    "Tháng 1", "Tháng 2", "Tháng 3", "Tháng 4", "Tháng 5", "Tháng 6", "Tháng 7", "Tháng 8",
    "Tháng 9", "Tháng 10", "Tháng 11", "Tháng 12",
];
const VI_WEEKDAYS: [&str; 7] = ["CN", "T2", "T3", "T4", "T5", "T6", "T7"];

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const EN_WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

impl Labels {
    pub fn month_name(&self, month: u32) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Labels::Vi => VI_MONTHS[idx],
            Labels::En => EN_MONTHS[idx],
        }
    }

    /// Weekday headers, Sunday first.
    pub fn weekdays(&self) -> [&'static str; 7] {
        match self {
            Labels::Vi => VI_WEEKDAYS,
            Labels::En => EN_WEEKDAYS,
        }
    }

    pub fn save(&self) -> &'static str {
        match self {
            Labels::Vi => "Lưu",
            Labels::En => "Save",
        }
    }

    pub fn saved(&self) -> &'static str {
        match self {
            Labels::Vi => "Đã lưu!",
            Labels::En => "Saved!",
        }
    }

    pub fn edit(&self) -> &'static str {
        match self {
            Labels::Vi => "Sửa",
            Labels::En => "Edit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub key: DateKey,
    pub marked: bool,
    pub today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBlock {
    pub month: u32,
    pub name: &'static str,
    pub weekdays: [&'static str; 7],
    /// Filler cells before day 1 (0 when the month starts on Sunday).
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
    pub editable: bool,
}

impl MonthBlock {
    pub fn cell_mut(&mut self, key: &DateKey) -> Option<&mut DayCell> {
        self.days.iter_mut().find(|c| c.key == *key)
    }
}

pub fn render(
    year: i32,
    marked: &MarkedDates,
    edit_mode: bool,
    today: NaiveDate,
    labels: Labels,
) -> Vec<MonthBlock> {
    (1..=12)
        .filter_map(|month| {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let days = (1..=days_in_month(year, month))
                .filter_map(|day| first.with_day(day))
                .map(|date| {
                    let key = DateKey::new(date);
                    DayCell {
                        day: date.day(),
                        key,
                        marked: marked.contains(&key),
                        today: date == today,
                    }
                })
                .collect();
            Some(MonthBlock {
                month,
                name: labels.month_name(month),
                weekdays: labels.weekdays(),
                leading_blanks: first.weekday().num_days_from_sunday(),
                days,
                editable: edit_mode,
            })
        })
        .collect()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}
