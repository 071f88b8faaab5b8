use crate::calendar::{local_today, DayCell, MonthBlock};
use crate::config::Config;
use crate::gesture::{GestureTracker, PointerButton, PointerEvent, Swipe};
use crate::model::DateKey;
use crate::storage::{MarkStore, StoreLocation};
use crate::widget::{GateOutcome, SaveOutcome, Widget};
use anyhow::Result;
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

pub fn run<S: MarkStore>(
    widget: Widget<S>,
    location: StoreLocation,
    config: &Config,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(widget, location, config, local_today());
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App<S: MarkStore> {
    widget: Widget<S>,
    location: StoreLocation,
    tracker: GestureTracker,
    cell_width: f64,
    cursor: NaiveDate,
    last_pointer_column: u16,
    mode: Mode,
    status: String,
    hits: HitMap,
}

enum Mode {
    Normal,
    Unlocking(SecretField),
    Notice(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Control {
    PrevYear,
    NextYear,
    Save,
    Edit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Target {
    Control(Control),
    Day(DateKey),
}

/// Screen regions from the last frame, used to resolve clicks.
#[derive(Default)]
struct HitMap {
    controls: Vec<(Rect, Control)>,
    days: Vec<(Rect, DateKey)>,
}

impl HitMap {
    fn at(&self, column: u16, row: u16) -> Option<Target> {
        if let Some((_, control)) = self
            .controls
            .iter()
            .find(|(rect, _)| rect_contains(*rect, column, row))
        {
            return Some(Target::Control(*control));
        }
        self.days
            .iter()
            .find(|(rect, _)| rect_contains(*rect, column, row))
            .map(|(_, key)| Target::Day(*key))
    }
}

#[derive(Default)]
struct SecretField {
    value: String,
    cursor: usize,
}

impl SecretField {
    fn move_left(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
        }
    }

    fn move_right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            let prev = self.cursor - ch.len_utf8();
            self.value.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn masked_with_caret(&self) -> String {
        let before = self.value[..self.cursor].chars().count();
        let after = self.value[self.cursor..].chars().count();
        format!("{}▌{}", "•".repeat(before), "•".repeat(after))
    }
}

impl<S: MarkStore> App<S> {
    fn new(widget: Widget<S>, location: StoreLocation, config: &Config, today: NaiveDate) -> Self {
        let status = format!(
            "Loaded {} marked date(s) from {}",
            widget.marked().len(),
            location.path.display()
        );
        let cursor = if today.year() == widget.year() {
            today
        } else {
            NaiveDate::from_ymd_opt(widget.year(), 1, 1).unwrap_or(today)
        };
        App {
            widget,
            location,
            tracker: GestureTracker::new(config.swipe_threshold),
            cell_width: config.cell_width,
            cursor,
            last_pointer_column: 0,
            mode: Mode::Normal,
            status,
            hits: HitMap::default(),
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                match event::read()? {
                    Event::Key(key) => {
                        if key.kind == KeyEventKind::Press && self.handle_key(key) {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::FocusLost => self.handle_pointer_leave(),
                    _ => {}
                }
            }
            self.on_tick(Instant::now(), local_today());
        }
        Ok(())
    }

    fn on_tick(&mut self, now: Instant, today: NaiveDate) {
        let was_editing = self.widget.edit_mode();
        if self.widget.tick(now, today) && was_editing && !self.widget.edit_mode() {
            self.status = "Edit mode locked".into();
        }
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode {
            Mode::Normal => return self.handle_normal_key(key),
            Mode::Unlocking(_) => self.handle_prompt_key(key),
            Mode::Notice(_) => self.mode = Mode::Normal,
        }
        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('[') | KeyCode::PageUp => self.navigate(Swipe::Prev),
            KeyCode::Char(']') | KeyCode::PageDown => self.navigate(Swipe::Next),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-7),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(7),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle(DateKey::new(self.cursor)),
            KeyCode::Char('e') => self.open_prompt(),
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('t') => self.jump_to(local_today()),
            _ => {}
        }
        false
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let mut field = match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Unlocking(field) => field,
            other => {
                self.mode = other;
                return;
            }
        };
        match key.code {
            KeyCode::Esc => {
                self.finish_prompt(None);
                return;
            }
            KeyCode::Enter => {
                self.finish_prompt(Some(field.value.as_str()));
                return;
            }
            KeyCode::Left => field.move_left(),
            KeyCode::Right => field.move_right(),
            KeyCode::Backspace => field.backspace(),
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    field.insert_char(c);
                }
            }
            _ => {}
        }
        self.mode = Mode::Unlocking(field);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match self.mode {
            Mode::Normal => {}
            Mode::Notice(_) => {
                if matches!(mouse.kind, MouseEventKind::Down(_)) {
                    self.mode = Mode::Normal;
                }
                return;
            }
            Mode::Unlocking(_) => return,
        }
        let x = self.pointer_x(mouse.column);
        match mouse.kind {
            MouseEventKind::Down(button) => {
                self.last_pointer_column = mouse.column;
                self.tracker.handle(PointerEvent::Down {
                    x,
                    button: pointer_button(button),
                });
            }
            MouseEventKind::Drag(MouseButton::Left) => self.last_pointer_column = mouse.column,
            MouseEventKind::Up(button) => {
                let swipe = self.tracker.handle(PointerEvent::Up {
                    x,
                    button: pointer_button(button),
                });
                match swipe {
                    Some(Swipe::Tap) => self.click(mouse.column, mouse.row),
                    Some(swipe) => self.navigate(swipe),
                    None => {}
                }
            }
            _ => {}
        }
    }

    /// Focus loss is the terminal's nearest equivalent of the pointer
    /// leaving the surface.
    fn handle_pointer_leave(&mut self) {
        let x = self.pointer_x(self.last_pointer_column);
        match self.tracker.handle(PointerEvent::Leave { x }) {
            Some(Swipe::Tap) | None => {}
            Some(swipe) => self.navigate(swipe),
        }
    }

    fn pointer_x(&self, column: u16) -> f64 {
        column as f64 * self.cell_width
    }

    fn click(&mut self, column: u16, row: u16) {
        match self.hits.at(column, row) {
            Some(Target::Control(control)) => self.activate(control),
            Some(Target::Day(key)) => {
                self.cursor = key.date();
                self.toggle(key);
            }
            None => {}
        }
    }

    fn activate(&mut self, control: Control) {
        match control {
            Control::PrevYear => self.navigate(Swipe::Prev),
            Control::NextYear => self.navigate(Swipe::Next),
            Control::Save => self.save(),
            Control::Edit => self.open_prompt(),
        }
    }

    fn navigate(&mut self, swipe: Swipe) {
        if self.widget.navigate(swipe) {
            self.sync_cursor();
            self.status = format!("Showing {}", self.widget.year());
        } else if swipe == Swipe::Prev {
            self.status = format!("{} is the earliest year", self.widget.year());
        }
    }

    fn toggle(&mut self, key: DateKey) {
        self.status = match self.widget.toggle(key) {
            Some(true) => format!("Marked {}", key),
            Some(false) => format!("Unmarked {}", key),
            None => "Locked: press e to enable editing".into(),
        };
    }

    fn open_prompt(&mut self) {
        if self.widget.edit_mode() {
            self.status = "Already in edit mode".into();
            return;
        }
        self.mode = Mode::Unlocking(SecretField::default());
        self.status = "Enter password (Enter to submit, Esc to cancel)".into();
    }

    fn finish_prompt(&mut self, input: Option<&str>) {
        match self.widget.submit_secret(input) {
            GateOutcome::Unlocked => {
                self.mode = Mode::Normal;
                self.status = "Edit mode on: click days or press Space to mark, s to save".into();
            }
            GateOutcome::Rejected => {
                self.mode = Mode::Notice("Wrong password".into());
                self.status = "Edit mode unchanged".into();
            }
            GateOutcome::Cancelled => {
                self.mode = Mode::Normal;
                self.status = "Edit canceled".into();
            }
        }
    }

    fn save(&mut self) {
        self.status = match self.widget.save(Instant::now()) {
            Ok(SaveOutcome::Saved) => format!(
                "Saved {} marked date(s) to {}",
                self.widget.marked().len(),
                self.location.path.display()
            ),
            Ok(SaveOutcome::Locked) => "Locked: press e to enable editing before saving".into(),
            Err(err) => format!("Save failed: {:#}", err),
        };
    }

    fn move_cursor(&mut self, days: i64) {
        if let Some(target) = self
            .cursor
            .checked_add_signed(ChronoDuration::days(days))
        {
            self.jump_to(target);
        }
    }

    /// Moves the day cursor, changing the displayed year when needed.
    fn jump_to(&mut self, target: NaiveDate) {
        while self.widget.year() < target.year() && self.widget.next_year() {}
        while self.widget.year() > target.year() && self.widget.prev_year() {}
        if self.widget.year() == target.year() {
            self.cursor = target;
            self.status = format!("{}", DateKey::new(target));
        } else {
            self.sync_cursor();
            self.status = format!("{} is the earliest year", self.widget.year());
        }
    }

    fn sync_cursor(&mut self) {
        let year = self.widget.year();
        self.cursor = NaiveDate::from_ymd_opt(year, self.cursor.month(), self.cursor.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, self.cursor.month(), 28))
            .unwrap_or(self.cursor);
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(2),
                Constraint::Length(1),
            ])
            .split(f.size());

        let mut hits = HitMap::default();
        self.draw_header(f, layout[0], &mut hits);
        self.draw_calendar(f, layout[1], &mut hits);
        self.draw_footer(f, layout[2], layout[3]);

        match &self.mode {
            Mode::Unlocking(field) => self.draw_prompt(f, field),
            Mode::Notice(message) => self.draw_notice(f, message),
            Mode::Normal => {}
        }
        self.hits = hits;
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect, hits: &mut HitMap) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(12),
                Constraint::Min(12),
                Constraint::Length(12),
                Constraint::Length(14),
                Constraint::Length(10),
            ])
            .split(area);
        let year = self.widget.year();
        let labels = self.widget.labels();

        let prev_style = if self.widget.can_go_prev() {
            Style::default().fg(Color::LightCyan)
        } else {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM)
        };
        let prev_label = if self.widget.can_go_prev() {
            format!("◀ {}", year - 1)
        } else {
            "◀".to_string()
        };
        draw_button(f, chunks[0], prev_label, prev_style);
        hits.controls.push((chunks[0], Control::PrevYear));

        let mut title = vec![Span::styled(
            year.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        if self.widget.edit_mode() {
            title.push(Span::raw("  "));
            title.push(Span::styled(
                "editing",
                Style::default()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        let year_label = Paragraph::new(Line::from(title))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(year_label, chunks[1]);

        draw_button(
            f,
            chunks[2],
            format!("{} ▶", year + 1),
            Style::default().fg(Color::LightCyan),
        );
        hits.controls.push((chunks[2], Control::NextYear));

        let save_style = if self.widget.save_pending() {
            Style::default()
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else if self.widget.edit_mode() {
            Style::default().fg(Color::LightGreen)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        draw_button(f, chunks[3], self.widget.save_label().to_string(), save_style);
        hits.controls.push((chunks[3], Control::Save));

        let edit_style = if self.widget.edit_mode() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightYellow)
        } else {
            Style::default().fg(Color::LightYellow)
        };
        draw_button(f, chunks[4], labels.edit().to_string(), edit_style);
        hits.controls.push((chunks[4], Control::Edit));
    }

    fn draw_calendar(&self, f: &mut ratatui::Frame<'_>, area: Rect, hits: &mut HitMap) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, 3); 3])
            .split(area);
        for (row_idx, row_area) in rows.iter().enumerate() {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, 4); 4])
                .split(*row_area);
            for (col_idx, month_area) in columns.iter().enumerate() {
                if let Some(month) = self.widget.months().get(row_idx * 4 + col_idx) {
                    self.draw_month(f, *month_area, month, hits);
                }
            }
        }
    }

    fn draw_month(
        &self,
        f: &mut ratatui::Frame<'_>,
        area: Rect,
        month: &MonthBlock,
        hits: &mut HitMap,
    ) {
        let accent = if month.editable {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .title(Span::styled(
                month.name,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent));
        let inner = block.inner(area);
        f.render_widget(block, area);
        if inner.width < 7 || inner.height < 2 {
            return;
        }

        let cell_width = inner.width / 7;
        let width = cell_width as usize;
        let mut lines = vec![Line::from(
            month
                .weekdays
                .iter()
                .map(|w| Span::styled(format!("{:^width$}", w), Style::default().fg(Color::Gray)))
                .collect::<Vec<_>>(),
        )];

        let mut spans = vec![Span::raw(" ".repeat(width * month.leading_blanks as usize))];
        let mut column = month.leading_blanks as u16;
        let mut week = 0u16;
        for cell in &month.days {
            let y = inner.y + 1 + week;
            if y < inner.y + inner.height {
                let x = inner.x + column * cell_width;
                hits.days.push((Rect::new(x, y, cell_width, 1), cell.key));
            }
            spans.push(Span::styled(
                format!("{:^width$}", cell.day),
                self.day_style(cell),
            ));
            column += 1;
            if column == 7 {
                lines.push(Line::from(std::mem::take(&mut spans)));
                column = 0;
                week += 1;
            }
        }
        if !spans.is_empty() {
            lines.push(Line::from(spans));
        }
        f.render_widget(Paragraph::new(lines), inner);
    }

    fn day_style(&self, cell: &DayCell) -> Style {
        let mut style = if cell.marked {
            Style::default()
                .bg(Color::Rgb(214, 69, 80))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        if cell.today {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
            if !cell.marked {
                style = style.fg(Color::LightYellow);
            }
        }
        if cell.key.date() == self.cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, help_area: Rect, status_area: Rect) {
        let help = Line::from(vec![
            Span::styled("drag ←/→ [ ]", Style::default().fg(Color::LightCyan)),
            Span::raw(" year  "),
            Span::styled("←↑↓→ / h j k l", Style::default().fg(Color::LightCyan)),
            Span::raw(" day  "),
            Span::styled("click/Space", Style::default().fg(Color::LightGreen)),
            Span::raw(" mark  "),
            Span::styled("e", Style::default().fg(Color::LightYellow)),
            Span::raw(" edit  "),
            Span::styled("s", Style::default().fg(Color::LightGreen)),
            Span::raw(" save  "),
            Span::styled("t", Style::default().fg(Color::LightMagenta)),
            Span::raw(" today  "),
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::raw(" quit"),
        ]);
        let help_bar = Paragraph::new(help).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(help_bar, help_area);

        let (badge, badge_style) = if self.widget.edit_mode() {
            ("EDIT", Style::default().fg(Color::Black).bg(Color::LightYellow))
        } else {
            ("LOCKED", Style::default().fg(Color::Black).bg(Color::Gray))
        };
        let status = Paragraph::new(Line::from(vec![
            Span::styled(format!(" {} ", badge), badge_style),
            Span::raw(" "),
            Span::raw(if self.tracker.is_dragging() {
                "Release to change year".to_string()
            } else {
                self.status.clone()
            }),
            Span::raw("  •  "),
            Span::styled(
                format!("{} store", self.location.scope.label()),
                Style::default().fg(Color::DarkGray),
            ),
        ]))
        .wrap(Wrap { trim: true });
        f.render_widget(status, status_area);
    }

    fn draw_prompt(&self, f: &mut ratatui::Frame<'_>, field: &SecretField) {
        let area = centered_rect(40, 25, f.size());
        let body = vec![
            Line::from(vec![
                Span::styled(
                    "Password: ",
                    Style::default()
                        .fg(Color::Gray)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(field.masked_with_caret(), Style::default().fg(Color::Cyan)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to submit • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let dialog = Paragraph::new(body).block(
            Block::default()
                .title(Span::styled(
                    "Unlock editing",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_notice(&self, f: &mut ratatui::Frame<'_>, message: &str) {
        let area = centered_rect(40, 25, f.size());
        let body = vec![
            Line::from(Span::styled(
                message.to_string(),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press any key to continue"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Notice",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn draw_button(f: &mut ratatui::Frame<'_>, area: Rect, label: String, style: Style) {
    let button = Paragraph::new(Span::styled(label, style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(button, area);
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StoreScope};
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn app() -> App<MemoryStore> {
        let config = Config::default();
        let widget = Widget::new(MemoryStore::default(), &config, today());
        let location = StoreLocation {
            path: PathBuf::from("store.json"),
            scope: StoreScope::Explicit,
        };
        App::new(widget, location, &config, today())
    }

    fn redraw(app: &mut App<MemoryStore>) {
        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn click(app: &mut App<MemoryStore>, column: u16, row: u16) {
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), column, row));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), column, row));
    }

    fn drag(app: &mut App<MemoryStore>, from: u16, to: u16) {
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), from, 20));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), to, 20));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), to, 20));
    }

    fn press(app: &mut App<MemoryStore>, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_secret(app: &mut App<MemoryStore>, secret: &str) {
        press(app, KeyCode::Char('e'));
        for ch in secret.chars() {
            press(app, KeyCode::Char(ch));
        }
        press(app, KeyCode::Enter);
    }

    fn day_rect(app: &App<MemoryStore>, key: &str) -> Rect {
        let key = key.parse::<DateKey>().unwrap();
        app.hits
            .days
            .iter()
            .find(|(_, k)| *k == key)
            .map(|(rect, _)| *rect)
            .expect("day should be on screen")
    }

    fn control_rect(app: &App<MemoryStore>, control: Control) -> Rect {
        app.hits
            .controls
            .iter()
            .find(|(_, c)| *c == control)
            .map(|(rect, _)| *rect)
            .unwrap()
    }

    #[test]
    fn every_day_of_the_year_is_clickable() {
        let mut app = app();
        redraw(&mut app);
        assert_eq!(app.hits.days.len(), 365);
        assert_eq!(app.hits.controls.len(), 4);
    }

    #[test]
    fn clicking_a_day_while_locked_does_nothing() {
        let mut app = app();
        redraw(&mut app);
        let rect = day_rect(&app, "2025-03-15");
        click(&mut app, rect.x, rect.y);
        assert!(app.widget.marked().is_empty());
        assert!(app.status.starts_with("Locked"));
    }

    #[test]
    fn unlock_mark_and_save_by_mouse() {
        let mut app = app();
        type_secret(&mut app, "1234");
        assert!(app.widget.edit_mode());
        assert!(matches!(app.mode, Mode::Normal));

        redraw(&mut app);
        let rect = day_rect(&app, "2025-03-15");
        click(&mut app, rect.x + 1, rect.y);
        assert!(app.widget.marked().contains(&"2025-03-15".parse().unwrap()));

        let save = control_rect(&app, Control::Save);
        click(&mut app, save.x + 2, save.y + 1);
        let saved = app.widget.store().saved.clone().unwrap();
        assert_eq!(saved.len(), 1);
        assert!(app.widget.save_pending());
    }

    #[test]
    fn relock_is_reported_after_confirmation() {
        let mut app = app();
        type_secret(&mut app, "1234");
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('s'));
        app.on_tick(Instant::now() + Duration::from_secs(2), today());
        assert!(!app.widget.edit_mode());
        assert_eq!(app.status, "Edit mode locked");
    }

    #[test]
    fn wrong_secret_raises_notice_and_cancel_does_not() {
        let mut app = app();
        type_secret(&mut app, "nope");
        assert!(matches!(app.mode, Mode::Notice(_)));
        assert!(!app.widget.edit_mode());
        press(&mut app, KeyCode::Char('x'));
        assert!(matches!(app.mode, Mode::Normal));

        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.status, "Edit canceled");

        type_secret(&mut app, "");
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn secret_field_edits_and_masks() {
        let mut field = SecretField::default();
        for ch in "abc".chars() {
            field.insert_char(ch);
        }
        field.move_left();
        field.backspace();
        assert_eq!(field.value, "ac");
        assert_eq!(field.masked_with_caret(), "•▌•");
        field.move_right();
        field.move_right();
        assert_eq!(field.masked_with_caret(), "••▌");
    }

    #[test]
    fn leftward_drag_shows_next_year() {
        let mut app = app();
        redraw(&mut app);
        drag(&mut app, 100, 90);
        assert_eq!(app.widget.year(), 2026);
        assert_eq!(app.cursor.year(), 2026);
        redraw(&mut app);
        assert!(app.hits.days.iter().all(|(_, k)| k.year() == 2026));
    }

    #[test]
    fn rightward_drag_at_minimum_stays() {
        let mut app = app();
        redraw(&mut app);
        drag(&mut app, 90, 100);
        assert_eq!(app.widget.year(), 2025);
        assert!(!app.widget.can_go_prev());
    }

    #[test]
    fn short_drag_is_a_click() {
        let mut app = app();
        type_secret(&mut app, "1234");
        redraw(&mut app);
        let rect = day_rect(&app, "2025-07-04");
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), rect.x, rect.y));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), rect.x + 1, rect.y));
        assert_eq!(app.widget.year(), 2025);
        assert!(app.widget.marked().contains(&"2025-07-04".parse().unwrap()));
    }

    #[test]
    fn focus_loss_during_drag_navigates() {
        let mut app = app();
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 120, 20));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 20, 20));
        app.handle_pointer_leave();
        assert_eq!(app.widget.year(), 2026);
    }

    #[test]
    fn header_controls_navigate() {
        let mut app = app();
        redraw(&mut app);
        let prev = control_rect(&app, Control::PrevYear);
        click(&mut app, prev.x + 1, prev.y + 1);
        assert_eq!(app.widget.year(), 2025);
        assert_eq!(app.status, "2025 is the earliest year");

        let next = control_rect(&app, Control::NextYear);
        click(&mut app, next.x + 1, next.y + 1);
        assert_eq!(app.widget.year(), 2026);
    }

    #[test]
    fn cursor_crosses_year_boundaries() {
        let mut app = app();
        app.jump_to(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        press(&mut app, KeyCode::Right);
        assert_eq!(app.widget.year(), 2026);
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.widget.year(), 2025);
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        press(&mut app, KeyCode::Left);
        assert_eq!(app.widget.year(), 2025);
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn q_quits() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
    }
}
