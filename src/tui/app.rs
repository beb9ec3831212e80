//! Interactive Gantt board.
//!
//! One screen: a task tree on the left, a day-scaled timeline on the right.
//! Keyboard gestures and mouse drags on the bars translate into day deltas
//! and are applied through the task store's move/resize operations; rejected
//! gestures are dropped silently, except reparent rejections which surface
//! on the status line.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::calendar;
use crate::error::Error;
use crate::fields::{ResizeEdge, SortKey};
use crate::hierarchy;
use crate::projection::{self, VisibleRow};
use crate::store::TaskStore;
use crate::task::TaskPatch;
use crate::tui::colors::{BAR_CONTAINER, BAR_DONE, BAR_LEAF, HOLIDAY, TODAY, WEEKEND};

enum DragKind {
    Move,
    ResizeStart,
    ResizeEnd,
}

/// An in-flight mouse drag on a task bar. `applied_days` tracks how far the
/// task has already moved so each pointer event applies only the increment.
struct DragState {
    id: String,
    kind: DragKind,
    origin_col: u16,
    applied_days: i64,
}

enum Mode {
    Normal,
    QuickAdd { input: String },
    /// Picking a new parent for the selected task. `None` means "make root".
    Reparent {
        task_id: String,
        options: Vec<Option<String>>,
        index: usize,
    },
}

/// Gantt board state: the store plus view-only concerns (selection,
/// collapse set, sort key, timeline anchor and zoom).
pub struct App {
    store: TaskStore,
    path: PathBuf,
    selected: usize,
    collapsed: HashSet<String>,
    sort: SortKey,
    anchor: NaiveDate,
    day_width: u16,
    status: String,
    mode: Mode,
    drag: Option<DragState>,
    timeline_area: Rect,
    dirty: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(path: &Path) -> Self {
        let mut store = TaskStore::load(path);
        let mut status = String::from("h/l move  [ ] { } resize  +/- duration  p reparent  a add  d delete  q quit");
        // Self-heal envelopes from whatever was on disk.
        if let Err(e) = store.rollup() {
            status = format!("Plan file is damaged: {e}");
        }
        let anchor = store
            .tasks
            .iter()
            .map(|t| t.start)
            .min()
            .map(|d| d - Duration::days(2))
            .unwrap_or_else(|| Local::now().date_naive() - Duration::days(7));
        App {
            store,
            path: path.to_path_buf(),
            selected: 0,
            collapsed: HashSet::new(),
            sort: SortKey::Id,
            anchor,
            day_width: 2,
            status,
            mode: Mode::Normal,
            drag: None,
            timeline_area: Rect::default(),
            dirty: false,
            should_quit: false,
        }
    }

    fn rows(&self) -> Vec<VisibleRow> {
        projection::visible_rows(&self.store, &self.collapsed, self.sort)
    }

    fn selected_id(&self) -> Option<String> {
        self.rows().get(self.selected).map(|r| r.id.clone())
    }

    fn save(&mut self) {
        match self.store.save(&self.path) {
            Ok(_) => self.dirty = false,
            Err(e) => self.status = format!("Save failed: {e}"),
        }
    }

    /// Run a store edit against the selected task. `InvalidOperation` from a
    /// gesture is dropped without comment; anything else hits the status line.
    fn gesture<F>(&mut self, f: F)
    where
        F: FnOnce(&mut TaskStore, &str) -> crate::error::Result<()>,
    {
        let Some(id) = self.selected_id() else { return };
        match f(&mut self.store, &id) {
            Ok(_) => self.dirty = true,
            Err(Error::InvalidOperation(_)) => {}
            Err(e) => self.status = format!("{e}"),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match &mut self.mode {
            Mode::Normal => self.handle_normal(key),
            Mode::QuickAdd { .. } => self.handle_quick_add(key),
            Mode::Reparent { .. } => self.handle_reparent(key),
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.begin_drag(mouse.column, mouse.row),
            MouseEventKind::Drag(MouseButton::Left) => self.continue_drag(mouse.column),
            MouseEventKind::Up(MouseButton::Left) => self.drag = None,
            _ => {}
        }
    }

    /// Hit-test a press against the timeline. Grabbing either end cell of a
    /// bar starts a resize; anywhere else on the bar starts a move.
    fn begin_drag(&mut self, column: u16, row: u16) {
        let area = self.timeline_area;
        // Two ruler lines sit above the first bar row.
        if row < area.y + 2 || column < area.x {
            return;
        }
        let rows = self.rows();
        let row_idx = (row - area.y - 2) as usize;
        if row_idx >= rows.len() {
            return;
        }
        self.selected = row_idx;
        let id = rows[row_idx].id.clone();
        let Some(task) = self.store.get(&id) else { return };
        let placement = projection::bar_placement(task, self.anchor);
        let (bar_col, bar_cells) = projection::to_cells(placement, self.day_width);
        let cell = (column - area.x) as i64;
        if cell < bar_col || cell >= bar_col + bar_cells {
            return;
        }
        let day = self.day_width as i64;
        let kind = if cell < bar_col + day {
            DragKind::ResizeStart
        } else if cell >= bar_col + bar_cells - day {
            DragKind::ResizeEnd
        } else {
            DragKind::Move
        };
        self.drag = Some(DragState {
            id,
            kind,
            origin_col: column,
            applied_days: 0,
        });
    }

    fn continue_drag(&mut self, column: u16) {
        let Some(mut drag) = self.drag.take() else { return };
        let cell_delta = column as i64 - drag.origin_col as i64;
        let want = projection::delta_days(cell_delta, self.day_width);
        let step = want - drag.applied_days;
        if step != 0 {
            let result = match drag.kind {
                DragKind::Move => self.store.apply_date_shift(&drag.id, step),
                DragKind::ResizeStart => {
                    self.store.apply_range_resize(&drag.id, ResizeEdge::Start, step)
                }
                DragKind::ResizeEnd => {
                    self.store.apply_range_resize(&drag.id, ResizeEdge::End, step)
                }
            };
            match result {
                Ok(_) => {
                    self.dirty = true;
                    drag.applied_days = want;
                }
                Err(Error::InvalidOperation(_)) => {}
                Err(e) => self.status = format!("{e}"),
            }
        }
        self.drag = Some(drag);
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        let row_count = self.rows().len();
        match key.code {
            KeyCode::Char('q') => {
                if self.dirty {
                    self.save();
                }
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < row_count {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.selected_id() {
                    if self.store.is_container(&id) && !self.collapsed.remove(&id) {
                        self.collapsed.insert(id);
                    }
                }
            }
            KeyCode::Char('h') => self.gesture(|s, id| s.apply_date_shift(id, -1)),
            KeyCode::Char('l') => self.gesture(|s, id| s.apply_date_shift(id, 1)),
            KeyCode::Char('H') => self.gesture(|s, id| s.apply_date_shift(id, -7)),
            KeyCode::Char('L') => self.gesture(|s, id| s.apply_date_shift(id, 7)),
            KeyCode::Char('[') => {
                self.gesture(|s, id| s.apply_range_resize(id, ResizeEdge::Start, -1))
            }
            KeyCode::Char(']') => {
                self.gesture(|s, id| s.apply_range_resize(id, ResizeEdge::Start, 1))
            }
            KeyCode::Char('{') => {
                self.gesture(|s, id| s.apply_range_resize(id, ResizeEdge::End, -1))
            }
            KeyCode::Char('}') => {
                self.gesture(|s, id| s.apply_range_resize(id, ResizeEdge::End, 1))
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.gesture(|s, id| s.apply_duration_change(id, 1))
            }
            KeyCode::Char('-') => self.gesture(|s, id| s.apply_duration_change(id, -1)),
            KeyCode::Char('p') => self.open_reparent(),
            KeyCode::Char('a') => {
                self.mode = Mode::QuickAdd { input: String::new() };
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    match self.store.delete_task(&id) {
                        Ok(_) => {
                            self.dirty = true;
                            self.status = format!("Deleted {id}");
                            let rows = self.rows().len();
                            if self.selected >= rows && rows > 0 {
                                self.selected = rows - 1;
                            }
                        }
                        Err(e) => self.status = format!("{e}"),
                    }
                }
            }
            KeyCode::Char('s') => {
                self.sort = match self.sort {
                    SortKey::Id => SortKey::Due,
                    SortKey::Due => SortKey::Assignee,
                    SortKey::Assignee => SortKey::Id,
                };
                self.status = format!("Sorting by {:?}", self.sort);
            }
            KeyCode::Char(',') => self.anchor = self.anchor - Duration::days(7),
            KeyCode::Char('.') => self.anchor = self.anchor + Duration::days(7),
            KeyCode::Char('z') => {
                self.day_width = match self.day_width {
                    1 => 2,
                    2 => 3,
                    _ => 1,
                };
            }
            _ => {}
        }
    }

    fn open_reparent(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let mut options: Vec<Option<String>> = vec![None];
        options.extend(
            hierarchy::eligible_parents(&self.store.tasks, &id)
                .into_iter()
                .map(|t| Some(t.id.clone())),
        );
        self.mode = Mode::Reparent {
            task_id: id,
            options,
            index: 0,
        };
    }

    fn handle_reparent(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.mode = Mode::Normal;
            return;
        }
        let Mode::Reparent { task_id, options, index } = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Up => *index = index.saturating_sub(1),
            KeyCode::Down => {
                if *index + 1 < options.len() {
                    *index += 1;
                }
            }
            KeyCode::Enter => {
                let id = task_id.clone();
                let parent = options[*index].clone();
                self.mode = Mode::Normal;
                let patch = TaskPatch {
                    parent: Some(parent),
                    ..TaskPatch::default()
                };
                match self.store.update_task(&id, patch) {
                    Ok(_) => {
                        self.dirty = true;
                        self.status = format!("Reparented {id}");
                    }
                    // Explicit drop gesture: the rejection is user-visible.
                    Err(e) => self.status = format!("Reparent rejected: {e}"),
                }
            }
            _ => {}
        }
    }

    fn handle_quick_add(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.mode = Mode::Normal;
            return;
        }
        let Mode::QuickAdd { input } = &mut self.mode else { return };
        match key.code {
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Enter => {
                let subject = input.trim().to_string();
                if !subject.is_empty() {
                    let task =
                        self.store
                            .new_task(&subject, Local::now().date_naive(), 1.0);
                    let id = task.id.clone();
                    match self.store.create_task(task) {
                        Ok(_) => {
                            self.dirty = true;
                            self.status = format!("Added {id}: {subject}");
                        }
                        Err(e) => self.status = format!("{e}"),
                    }
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(f.area());
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(42), Constraint::Min(10)])
            .split(outer[0]);

        let rows = self.rows();
        if self.selected >= rows.len() && !rows.is_empty() {
            self.selected = rows.len() - 1;
        }
        self.timeline_area = panes[1];
        self.draw_task_list(f, panes[0], &rows);
        self.draw_timeline(f, panes[1], &rows);
        self.draw_status(f, outer[1]);
        if matches!(self.mode, Mode::Reparent { .. }) {
            self.draw_reparent_popup(f);
        }
    }

    fn draw_task_list(&self, f: &mut Frame, area: Rect, rows: &[VisibleRow]) {
        let mut lines = vec![Line::from(""), Line::from(Span::styled(
            format!("{:<5} {:<11} {:<11} Subject", "ID", "Start", "Due"),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for (i, row) in rows.iter().enumerate() {
            let Some(t) = self.store.get(&row.id) else { continue };
            let marker = if self.store.is_container(&t.id) {
                if self.collapsed.contains(&t.id) { "+" } else { "-" }
            } else {
                " "
            };
            let text = format!(
                "{:<5} {:<11} {:<11} {}{}{}",
                t.id,
                t.start.to_string(),
                t.due.to_string(),
                "  ".repeat(row.depth),
                marker,
                t.subject
            );
            let style = if i == self.selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(text, style)));
        }
        let list = Paragraph::new(lines).block(Block::default().borders(Borders::RIGHT));
        f.render_widget(list, area);
    }

    fn draw_timeline(&self, f: &mut Frame, area: Rect, rows: &[VisibleRow]) {
        let day_width = self.day_width as usize;
        let days_visible = (area.width as usize / day_width.max(1)).max(1);
        let last = self.anchor + Duration::days(days_visible as i64 - 1);
        let dates = calendar::enumerate_days(self.anchor, last);
        let holidays = self.store.holiday_dates();
        let today = Local::now().date_naive();

        // Ruler: month labels on the first line, day numbers on the second.
        let mut month_line = String::new();
        let mut day_line = String::new();
        for (i, date) in dates.iter().enumerate() {
            if date.day() == 1 || i == 0 {
                let label = format!("{}", date.format("%b"));
                month_line.push_str(&label[..label.len().min(day_width)]);
                for _ in label.len()..day_width {
                    month_line.push(' ');
                }
            } else {
                for _ in 0..day_width {
                    month_line.push(' ');
                }
            }
            if day_width == 1 {
                day_line.push_str(&format!("{}", date.day() % 10));
            } else {
                day_line.push_str(&format!("{:<width$}", date.day(), width = day_width));
            }
        }
        month_line.truncate(area.width as usize);
        day_line.truncate(area.width as usize);

        let mut lines = vec![
            Line::from(Span::styled(month_line, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(day_line),
        ];

        for (row_idx, row) in rows.iter().enumerate() {
            let Some(t) = self.store.get(&row.id) else { continue };
            let placement = projection::bar_placement(t, self.anchor);
            let container = self.store.is_container(&t.id);
            let done_days = placement.width * t.progress as i64 / 100;
            let mut spans = Vec::with_capacity(dates.len());
            for (i, date) in dates.iter().enumerate() {
                let day = i as i64;
                let in_bar = day >= placement.offset && day < placement.offset + placement.width;
                let (symbol, style) = if in_bar {
                    let done = day - placement.offset < done_days;
                    let color = if done {
                        BAR_DONE
                    } else if container {
                        BAR_CONTAINER
                    } else {
                        BAR_LEAF
                    };
                    let glyph = if container { "▀" } else { "█" };
                    (glyph, Style::default().fg(color))
                } else if *date == today {
                    ("│", Style::default().fg(TODAY))
                } else if !calendar::is_working_day(*date, &holidays) {
                    let shade = if holidays.contains(date) { HOLIDAY } else { WEEKEND };
                    ("░", Style::default().fg(shade))
                } else {
                    (" ", Style::default())
                };
                let style = if row_idx == self.selected {
                    style.bg(Color::Rgb(30, 30, 50))
                } else {
                    style
                };
                spans.push(Span::styled(symbol.repeat(day_width), style));
            }
            lines.push(Line::from(spans));
        }

        f.render_widget(Paragraph::new(lines), area);
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let text = match &self.mode {
            Mode::QuickAdd { input } => format!("New task: {input}▏(Enter to add, Esc to cancel)"),
            Mode::Reparent { .. } => "Pick a new parent (Enter to apply, Esc to cancel)".to_string(),
            Mode::Normal => self.status.clone(),
        };
        f.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::Gray)),
            area,
        );
    }

    fn draw_reparent_popup(&self, f: &mut Frame) {
        let Mode::Reparent { task_id, options, index } = &self.mode else {
            return;
        };
        let area = centered_rect(40, 60, f.area());
        let items: Vec<ListItem> = options
            .iter()
            .map(|opt| {
                let label = match opt {
                    None => "(make root task)".to_string(),
                    Some(id) => {
                        let subject = self
                            .store
                            .get(id)
                            .map(|t| t.subject.as_str())
                            .unwrap_or("");
                        format!("{id}  {subject}")
                    }
                };
                ListItem::new(label)
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Reparent {task_id} ")),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default();
        state.select(Some(*index));
        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut state);
    }
}

/// Centered popup rectangle as a percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}
