//! Headless calendar widget: year cursor, marked dates and the edit gate.
//!
//! The terminal front end owns one `Widget` and forwards user actions to it.
//! Time is passed in by the caller so the relock timer can be driven from the
//! event loop tick and from tests alike.

use crate::calendar::{self, Labels, MonthBlock};
use crate::config::Config;
use crate::gesture::Swipe;
use crate::model::{DateKey, MarkedDates, YearCursor};
use crate::storage::MarkStore;
use anyhow::Result;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Unlocked,
    Rejected,
    /// Prompt dismissed without input. No notice is shown.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Edit mode is off; nothing was written.
    Locked,
}

pub struct Widget<S: MarkStore> {
    store: S,
    cursor: YearCursor,
    marked: MarkedDates,
    edit_mode: bool,
    secret: String,
    labels: Labels,
    confirm_interval: Duration,
    relock_at: Option<Instant>,
    months: Vec<MonthBlock>,
    rendered_on: NaiveDate,
}

impl<S: MarkStore> Widget<S> {
    pub fn new(store: S, config: &Config, today: NaiveDate) -> Self {
        let marked = store.load_marked();
        info!("loaded {} marked date(s)", marked.len());
        let cursor = YearCursor::new(config.start_year(), config.min_year);
        let mut widget = Widget {
            store,
            cursor,
            marked,
            edit_mode: false,
            secret: config.secret.clone(),
            labels: config.labels,
            confirm_interval: config.confirm_interval(),
            relock_at: None,
            months: Vec::new(),
            rendered_on: today,
        };
        widget.rerender(today);
        widget
    }

    pub fn year(&self) -> i32 {
        self.cursor.year()
    }

    pub fn can_go_prev(&self) -> bool {
        self.cursor.can_go_prev()
    }

    pub fn marked(&self) -> &MarkedDates {
        &self.marked
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn months(&self) -> &[MonthBlock] {
        &self.months
    }

    pub fn labels(&self) -> Labels {
        self.labels
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// True while the save confirmation is showing.
    pub fn save_pending(&self) -> bool {
        self.relock_at.is_some()
    }

    pub fn save_label(&self) -> &'static str {
        if self.save_pending() {
            self.labels.saved()
        } else {
            self.labels.save()
        }
    }

    /// Flips `key` and patches its cell. `None` when edit mode is off.
    pub fn toggle(&mut self, key: DateKey) -> Option<bool> {
        if !self.edit_mode {
            return None;
        }
        let now_marked = self.marked.toggle(key);
        if let Some(cell) = self.months.iter_mut().find_map(|m| m.cell_mut(&key)) {
            cell.marked = now_marked;
        }
        debug!("toggled {} -> {}", key, now_marked);
        Some(now_marked)
    }

    /// Checks the prompt result against the secret. `None` means cancelled.
    pub fn submit_secret(&mut self, input: Option<&str>) -> GateOutcome {
        let entered = match input {
            Some(s) if !s.is_empty() => s,
            _ => return GateOutcome::Cancelled,
        };
        if entered == self.secret {
            self.set_edit_mode(true);
            info!("edit mode unlocked");
            GateOutcome::Unlocked
        } else {
            warn!("rejected edit-mode secret");
            GateOutcome::Rejected
        }
    }

    /// Writes the marked set and schedules the relock, replacing any
    /// relock still pending from an earlier save.
    pub fn save(&mut self, now: Instant) -> Result<SaveOutcome> {
        if !self.edit_mode {
            return Ok(SaveOutcome::Locked);
        }
        self.store.save_marked(&self.marked)?;
        self.relock_at = Some(now + self.confirm_interval);
        info!("saved {} marked date(s)", self.marked.len());
        Ok(SaveOutcome::Saved)
    }

    /// Services the relock timer and re-renders after a date rollover.
    /// Returns whether visible state changed.
    pub fn tick(&mut self, now: Instant, today: NaiveDate) -> bool {
        let mut changed = false;
        if matches!(self.relock_at, Some(due) if now >= due) {
            self.relock_at = None;
            self.set_edit_mode(false);
            info!("edit mode relocked after save");
            changed = true;
        }
        if today != self.rendered_on {
            self.rerender(today);
            changed = true;
        }
        changed
    }

    pub fn navigate(&mut self, swipe: Swipe) -> bool {
        match swipe {
            Swipe::Next => self.next_year(),
            Swipe::Prev => self.prev_year(),
            Swipe::Tap => false,
        }
    }

    pub fn next_year(&mut self) -> bool {
        if !self.cursor.next() {
            return false;
        }
        debug!("year -> {}", self.cursor.year());
        self.rerender(self.rendered_on);
        true
    }

    pub fn prev_year(&mut self) -> bool {
        if !self.cursor.prev() {
            return false;
        }
        debug!("year -> {}", self.cursor.year());
        self.rerender(self.rendered_on);
        true
    }

    fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = on;
        for month in &mut self.months {
            month.editable = on;
        }
    }

    fn rerender(&mut self, today: NaiveDate) {
        self.rendered_on = today;
        self.months = calendar::render(
            self.cursor.year(),
            &self.marked,
            self.edit_mode,
            today,
            self.labels,
        );
    }
}
