use crate::calendar::{self, MonthBlock};
use crate::config::Config;
use crate::storage::{init_project_store, locate_store, JsonStore, MarkStore, StoreLocation};
use crate::ui;
use crate::widget::Widget;
use anyhow::Result;
use std::env;
use std::fmt::Write as _;
use std::path::Path;

pub struct Session {
    pub config: Config,
    pub location: StoreLocation,
}

pub fn open_session(config_path: Option<&Path>, store_path: Option<&Path>) -> Result<Session> {
    let config = Config::load(config_path)?;
    let cwd = env::current_dir()?;
    let explicit = store_path.or(config.store.as_deref());
    let location = locate_store(&cwd, explicit)?;
    log::info!(
        "using {} store at {}",
        location.scope.label(),
        location.path.display()
    );
    Ok(Session { config, location })
}

pub fn init() -> Result<()> {
    let location = init_project_store()?;
    println!("Initialized store at {}", location.path.display());
    Ok(())
}

pub fn list(session: Session, year: Option<i32>) -> Result<()> {
    let marked = JsonStore::new(session.location).load_marked();
    let keys = match year {
        Some(year) => marked.in_year(year).collect::<Vec<_>>(),
        None => marked.iter().collect(),
    };
    if keys.is_empty() {
        println!("(none)");
    }
    for key in keys {
        println!("{}", key);
    }
    Ok(())
}

pub fn show(session: Session, year: Option<i32>) -> Result<()> {
    let marked = JsonStore::new(session.location).load_marked();
    let year = year.unwrap_or_else(|| session.config.start_year());
    let months = calendar::render(
        year,
        &marked,
        false,
        calendar::local_today(),
        session.config.labels,
    );
    print!("{}", format_year(year, &months));
    Ok(())
}

pub fn tui(session: Session) -> Result<()> {
    let store = JsonStore::new(session.location);
    let location = store.location().clone();
    let widget = Widget::new(store, &session.config, calendar::local_today());
    ui::run(widget, location, &session.config)
}

/// Plain-text year view: marked days in brackets, today between asterisks.
pub fn format_year(year: i32, months: &[MonthBlock]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", year);
    for month in months {
        out.push('\n');
        out.push_str(&format_month(month));
    }
    out
}

fn format_month(month: &MonthBlock) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", month.name);
    let header = month
        .weekdays
        .iter()
        .map(|w| format!("{:^4}", w))
        .collect::<String>();
    let _ = writeln!(out, "{}", header.trim_end());

    let mut row = "    ".repeat(month.leading_blanks as usize);
    let mut column = month.leading_blanks;
    for cell in &month.days {
        let text = if cell.marked {
            format!("[{:>2}]", cell.day)
        } else if cell.today {
            format!("*{:>2}*", cell.day)
        } else {
            format!(" {:>2} ", cell.day)
        };
        row.push_str(&text);
        column += 1;
        if column == 7 {
            let _ = writeln!(out, "{}", row.trim_end());
            row.clear();
            column = 0;
        }
    }
    if !row.is_empty() {
        let _ = writeln!(out, "{}", row.trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Labels;
    use crate::model::{DateKey, MarkedDates};
    use chrono::NaiveDate;

    #[test]
    fn month_text_layout() {
        let marked = ["2025-06-15"]
            .iter()
            .map(|s| s.parse::<DateKey>().unwrap())
            .collect::<MarkedDates>();
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let months = calendar::render(2025, &marked, false, today, Labels::En);
        let june = format_month(&months[5]);
        let lines = june.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "June");
        assert_eq!(lines[1], " Su  Mo  Tu  We  Th  Fr  Sa");
        assert_eq!(lines[2], "  1 * 2*  3   4   5   6   7");
        assert_eq!(lines[4], "[15] 16  17  18  19  20  21");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn leading_blanks_shift_first_row() {
        let today = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let months = calendar::render(2025, &MarkedDates::new(), false, today, Labels::Vi);
        let january = format_month(&months[0]);
        let first_row = january.lines().nth(2).unwrap();
        assert_eq!(first_row, "              1   2   3   4");
    }

    #[test]
    fn year_text_has_all_months() {
        let today = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let months = calendar::render(2025, &MarkedDates::new(), false, today, Labels::Vi);
        let text = format_year(2025, &months);
        assert!(text.starts_with("2025\n"));
        assert!(text.contains("Tháng 12"));
        assert_eq!(text.matches("Tháng").count(), 12);
    }
}
