//! Class schedule expansion
//!
//! Exported class schedules describe each class by a start date, a weekday
//! and a week pattern: a string with one position per teaching week, where
//! a digit marks a week in which the class meets (`"12--5"` meets in weeks
//! 1, 2 and 5). Weekdays use the Vietnamese numbering, Monday = 2 through
//! Saturday = 7, with Sunday = 8.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use tabload_core::{CellValue, Row, Table};
use thiserror::Error;

/// Column added with the active week numbers of each row
pub const ACTIVE_WEEKS_COLUMN: &str = "active_weeks";
/// Column added with the class dates of each row
pub const CLASS_DATES_COLUMN: &str = "class_dates";

/// Names of the source columns read by [`expand_schedule`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleColumns {
    pub week_pattern: String,
    pub start_date: String,
    pub day_of_week: String,
}

impl Default for ScheduleColumns {
    fn default() -> Self {
        Self {
            week_pattern: "Week Pattern".to_string(),
            start_date: "Ngày bắt đầu".to_string(),
            day_of_week: "Thứ".to_string(),
        }
    }
}

/// Errors from schedule expansion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("Invalid start date {0:?}: expected m/d/yyyy, m/d/yy or yyyy-mm-dd")]
    InvalidDate(String),

    #[error("Invalid day of week {0:?}: expected 2 (Monday) through 8 (Sunday)")]
    InvalidDay(String),

    #[error("Schedule column not found: {0}")]
    MissingColumn(String),

    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<ScheduleError>,
    },

    #[error("Table error: {0}")]
    Table(#[from] tabload_core::Error),
}

/// 1-based positions of the digits in a week pattern
///
/// Any numeric character marks an active week, so patterns typed with
/// fullwidth or Arabic-Indic digits read the same as ASCII ones.
pub fn parse_week_pattern(pattern: &str) -> Vec<u32> {
    pattern
        .chars()
        .zip(1u32..)
        .filter(|(c, _)| c.is_numeric())
        .map(|(_, week)| week)
        .collect()
}

/// Parse a schedule start date
///
/// Accepts `m/d/yyyy`, `m/d/yy` and ISO `yyyy-mm-dd` (optionally followed
/// by a `hh:mm:ss` time, as workbook date cells are rendered).
pub fn parse_start_date(text: &str) -> Result<NaiveDate, ScheduleError> {
    let text = text.trim();
    let invalid = || ScheduleError::InvalidDate(text.to_string());

    if let Some((_, year)) = text.rsplit_once('/') {
        // chrono's %Y would read "24" as the year 24
        let format = match year.len() {
            4 => "%m/%d/%Y",
            2 => "%m/%d/%y",
            _ => return Err(invalid()),
        };
        return NaiveDate::parse_from_str(text, format).map_err(|_| invalid());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| invalid())
}

/// Calendar dates on which a class meets
///
/// The start date moves forward (0 to 6 days) to the first `day_of_week`,
/// which is the date of the first active week; every later active week adds
/// seven days per week of distance from the first.
pub fn dates_for_pattern(
    start: &str,
    day_of_week: u32,
    weeks: &[u32],
) -> Result<Vec<NaiveDate>, ScheduleError> {
    let start = parse_start_date(start)?;
    if !(2..=8).contains(&day_of_week) {
        return Err(ScheduleError::InvalidDay(day_of_week.to_string()));
    }

    let Some(&first) = weeks.first() else {
        return Ok(Vec::new());
    };

    let start_day = start.weekday().number_from_monday() + 1;
    let shift = (day_of_week + 7 - start_day) % 7;
    let out_of_range = || ScheduleError::InvalidDate(start.to_string());
    let anchor = start
        .checked_add_days(Days::new(shift as u64))
        .ok_or_else(out_of_range)?;

    weeks
        .iter()
        .map(|&week| {
            let offset = week.saturating_sub(first) as u64 * 7;
            anchor
                .checked_add_days(Days::new(offset))
                .ok_or_else(out_of_range)
        })
        .collect()
}

/// Append [`ACTIVE_WEEKS_COLUMN`] and [`CLASS_DATES_COLUMN`] to a schedule
/// table
///
/// Rows whose pattern has no active week get empty lists without their
/// date or weekday being read. Existing result columns are overwritten.
pub fn expand_schedule(table: &mut Table, columns: &ScheduleColumns) -> Result<(), ScheduleError> {
    for name in [&columns.week_pattern, &columns.start_date, &columns.day_of_week] {
        if table.column_index(name).is_none() {
            return Err(ScheduleError::MissingColumn(name.clone()));
        }
    }

    let mut active_weeks = Vec::with_capacity(table.row_count());
    let mut class_dates = Vec::with_capacity(table.row_count());

    for (idx, row) in table.rows().enumerate() {
        let weeks = parse_week_pattern(&cell(&row, &columns.week_pattern).to_string());

        let dates = if weeks.is_empty() {
            Vec::new()
        } else {
            let start = cell(&row, &columns.start_date).to_string();
            day_number(cell(&row, &columns.day_of_week))
                .and_then(|day| dates_for_pattern(&start, day, &weeks))
                .map_err(|source| ScheduleError::Row {
                    row: idx,
                    source: Box::new(source),
                })?
        };

        active_weeks.push(CellValue::string(render_list(&weeks)));
        class_dates.push(CellValue::string(render_list(&dates)));
    }

    put_column(table, ACTIVE_WEEKS_COLUMN, active_weeks)?;
    put_column(table, CLASS_DATES_COLUMN, class_dates)?;
    Ok(())
}

fn cell<'a>(row: &Row<'a>, column: &str) -> &'a CellValue {
    static EMPTY: CellValue = CellValue::Empty;
    row.get(column).unwrap_or(&EMPTY)
}

fn day_number(value: &CellValue) -> Result<u32, ScheduleError> {
    let invalid = || ScheduleError::InvalidDay(value.to_string());
    let n = match value {
        CellValue::Number(n) => *n,
        CellValue::String(s) => s.as_str().trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    if n.fract() != 0.0 || !(2.0..=8.0).contains(&n) {
        return Err(invalid());
    }
    Ok(n as u32)
}

fn render_list<T: ToString>(items: &[T]) -> String {
    let items: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

fn put_column(table: &mut Table, name: &str, values: Vec<CellValue>) -> tabload_core::Result<()> {
    if table.column_index(name).is_none() {
        return table.add_column_with(name, values);
    }
    for (row, value) in values.into_iter().enumerate() {
        table.set(row, name, value)?;
    }
    Ok(())
}
