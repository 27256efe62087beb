use crate::agenda::{AgendaView, CalendarDay, Clock, Selection};
use crate::config::Config;
use crate::model::{StatusFilter, Task, TaskList, TaskStatus};
use crate::storage::TaskLocation;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::Duration;

const ACCENT: Color = Color::Rgb(124, 58, 237);
const MUTED: Color = Color::Rgb(107, 114, 128);
const CARD_BG: Color = Color::Rgb(22, 24, 30);
const DAY_CELL_WIDTH: u16 = 7;
const CARD_HEIGHT: usize = 4;

pub fn run<C: Clock>(
    tasks: TaskList,
    location: TaskLocation,
    config: &Config,
    clock: C,
) -> Result<()> {
    let mut app = App::new(tasks, location, config, clock);
    // Reject a bad radius before taking over the terminal.
    AgendaView::compute(&app.selection, &app.tasks, app.radius, &app.clock)?;
    let mut terminal = setup_terminal()?;
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App<C: Clock> {
    tasks: TaskList,
    location: TaskLocation,
    selection: Selection,
    radius: i64,
    clock: C,
    cursor: usize,
    list_offset: usize,
    status: String,
}

impl<C: Clock> App<C> {
    fn new(tasks: TaskList, location: TaskLocation, config: &Config, clock: C) -> Self {
        let selection = Selection::new(clock.today()).select_filter(config.default_filter);
        let status = format!("Loaded {} tasks from {}", tasks.len(), location.describe());
        App {
            tasks,
            location,
            selection,
            radius: config.window_radius,
            clock,
            cursor: 0,
            list_offset: 0,
            status,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns true when the session should end.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left | KeyCode::Char('h') => self.apply(self.selection.shift_date(-1)),
            KeyCode::Right | KeyCode::Char('l') => self.apply(self.selection.shift_date(1)),
            KeyCode::Char('t') => self.apply(self.selection.select_date(self.clock.today())),
            KeyCode::Tab => self.apply(self.selection.next_filter()),
            KeyCode::BackTab => self.apply(self.selection.prev_filter()),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.apply(self.selection.select_filter(StatusFilter::ALL[idx]));
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.visible_count() {
                    self.cursor += 1;
                }
            }
            _ => {}
        }
        false
    }

    fn apply(&mut self, next: Selection) {
        if next == self.selection {
            return;
        }
        log::debug!(
            "selection {} / {} -> {} / {}",
            self.selection.selected_date,
            self.selection.active_filter,
            next.selected_date,
            next.active_filter
        );
        self.selection = next;
        self.cursor = 0;
        self.list_offset = 0;
        let count = self.visible_count();
        self.status = format!(
            "{} • {} • {} task{}",
            next.selected_date.format("%A %d %B %Y"),
            next.active_filter.label(),
            count,
            if count == 1 { "" } else { "s" }
        );
    }

    fn visible_count(&self) -> usize {
        crate::agenda::filter_for_display(
            &self.tasks,
            self.selection.selected_date,
            self.selection.active_filter,
        )
        .len()
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Length(2),
                Constraint::Min(4),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        let computed = AgendaView::compute(&self.selection, &self.tasks, self.radius, &self.clock);
        let offset = match computed {
            Ok(view) => {
                draw_day_strip(f, layout[1], &view);
                self.draw_tabs(f, layout[2]);
                self.draw_tasks(f, layout[3], &view.visible)
            }
            Err(err) => {
                let msg = Paragraph::new(err.to_string())
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::LightRed));
                f.render_widget(msg, layout[1]);
                self.draw_tabs(f, layout[2]);
                0
            }
        };
        self.list_offset = offset;
        self.draw_status(f, layout[4]);
        self.draw_help(f, layout[5]);
        draw_bottom_nav(f, layout[6]);
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let title = Line::from(vec![
            Span::styled(icon_glyph("chevron.left"), Style::default().fg(Color::White)),
            Span::raw("   "),
            Span::styled(
                "Today's Tasks",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(icon_glyph("bell"), Style::default().fg(Color::White)),
        ]);
        let subtitle = Line::from(vec![
            Span::styled(
                self.selection
                    .selected_date
                    .format("%A, %d %B %Y")
                    .to_string(),
                Style::default().fg(ACCENT),
            ),
            Span::raw("  •  "),
            Span::styled(self.location.describe(), Style::default().fg(Color::DarkGray)),
        ]);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(vec![title, subtitle])
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_tabs(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let titles = StatusFilter::ALL
            .iter()
            .map(|filter| format!(" {} ", filter.label()))
            .collect::<Vec<_>>();
        let tabs = Tabs::new(titles)
            .select(self.selection.active_filter.index())
            .style(Style::default().fg(MUTED))
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .bg(ACCENT)
                    .add_modifier(Modifier::BOLD),
            )
            .divider(" ")
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(tabs, area);
    }

    /// Renders the cards and returns the list offset to keep for the next frame.
    fn draw_tasks(&self, f: &mut ratatui::Frame<'_>, area: Rect, tasks: &[&Task]) -> usize {
        if tasks.is_empty() {
            let msg = Paragraph::new(vec![
                Line::raw(""),
                Line::styled("No tasks", Style::default().fg(MUTED)),
            ])
            .alignment(Alignment::Center);
            f.render_widget(msg, area);
            return 0;
        }
        let selected = self.cursor.min(tasks.len() - 1);
        let viewport = area.height as usize / CARD_HEIGHT;
        let offset = scroll_offset(selected, self.list_offset, viewport, tasks.len());
        let items = tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| task_card(task, area.width, idx == selected))
            .collect::<Vec<_>>();
        let mut state = ListState::default();
        state.select(Some(selected));
        *state.offset_mut() = offset;
        f.render_stateful_widget(List::new(items), area, &mut state);
        offset
    }

    fn draw_status(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let status = Paragraph::new(self.status.clone()).style(Style::default().fg(Color::Gray));
        f.render_widget(status, area);
    }

    fn draw_help(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let help = Line::from(vec![
            Span::styled("←→ / h l", Style::default().fg(Color::LightCyan)),
            Span::raw(" day  "),
            Span::styled("Tab / 1-4", Style::default().fg(Color::LightCyan)),
            Span::raw(" filter  "),
            Span::styled("↑↓ / j k", Style::default().fg(Color::LightCyan)),
            Span::raw(" browse  "),
            Span::styled("t", Style::default().fg(Color::LightYellow)),
            Span::raw(" today  "),
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::raw(" quit"),
        ]);
        f.render_widget(Paragraph::new(help).alignment(Alignment::Center), area);
    }
}

fn draw_day_strip(f: &mut ratatui::Frame<'_>, area: Rect, view: &AgendaView<'_>) {
    let days = &view.days;
    let capacity = (area.width / DAY_CELL_WIDTH) as usize;
    if capacity == 0 || days.is_empty() {
        return;
    }
    let shown = capacity.min(days.len());
    let selected = view.selected_index().unwrap_or(days.len() / 2);
    let start = selected
        .saturating_sub(shown / 2)
        .min(days.len() - shown);
    let used = shown as u16 * DAY_CELL_WIDTH;
    let left = area.x + (area.width - used) / 2;
    for (slot, day) in days[start..start + shown].iter().enumerate() {
        let cell = Rect::new(
            left + slot as u16 * DAY_CELL_WIDTH,
            area.y,
            DAY_CELL_WIDTH,
            area.height,
        );
        f.render_widget(day_cell(day), cell);
    }
}

fn day_cell(day: &CalendarDay) -> Paragraph<'static> {
    let (text_style, border_style) = if day.is_today {
        (
            Style::default()
                .fg(Color::White)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(ACCENT),
        )
    } else if day.is_selected {
        (
            Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Style::default().fg(Color::Gray),
            Style::default().fg(Color::DarkGray),
        )
    };
    let badge = if day.unfinished_count > 0 {
        Line::styled(
            format!("{}", day.unfinished_count),
            Style::default()
                .fg(Color::White)
                .bg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Line::raw("")
    };
    let lines = vec![
        badge,
        Line::styled(day.date.format("%-d").to_string(), text_style),
        Line::styled(day.date.format("%a").to_string(), text_style),
    ];
    Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    )
}

fn draw_bottom_nav(f: &mut ratatui::Frame<'_>, area: Rect) {
    let icon = |name: &str| Span::styled(icon_glyph(name), Style::default().fg(MUTED));
    let nav = Line::from(vec![
        icon("home"),
        Span::raw("      "),
        icon("calendar"),
        Span::raw("      "),
        Span::styled(
            format!(" {} ", icon_glyph("plus")),
            Style::default()
                .fg(Color::White)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("      "),
        icon("list"),
        Span::raw("      "),
        icon("person"),
    ]);
    let paragraph = Paragraph::new(nav).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

/// Terminal glyph for a symbolic icon name; unknown names render as `?`.
fn icon_glyph(name: &str) -> &'static str {
    match name {
        "house.fill" | "home" => "⌂",
        "paperplane.fill" => "➤",
        "chevron.left.forwardslash.chevron.right" => "</>",
        "chevron.right" => "›",
        "chevron.left" => "‹",
        "checkmark" => "✓",
        "search" => "⌕",
        "plus" => "+",
        "trash" => "✗",
        "clock" => "◷",
        "bell" => "♪",
        "calendar" => "▦",
        "person" => "☺",
        "list" => "☰",
        "settings" => "⚙",
        "stats" => "▮",
        _ => "?",
    }
}

fn status_style(status: TaskStatus) -> Style {
    let bg = match status {
        TaskStatus::Done => Color::Rgb(22, 163, 74),
        TaskStatus::InProgress => Color::Rgb(217, 119, 6),
        TaskStatus::ToDo => Color::Rgb(37, 99, 235),
    };
    Style::default()
        .fg(Color::White)
        .bg(bg)
        .add_modifier(Modifier::BOLD)
}

fn task_card(task: &Task, width: u16, selected: bool) -> ListItem<'static> {
    let inner = width.saturating_sub(4).max(20) as usize;
    let title_width = inner.saturating_sub(4);
    let edge = if selected { "▌ " } else { "  " };
    let edge_style = Style::default().fg(if selected { ACCENT } else { CARD_BG });

    let time = format!("{} {}", icon_glyph("clock"), task.time);
    let pill = format!(" {} ", task.status.label());
    let gap = inner.saturating_sub(time.chars().count() + pill.chars().count());

    let lines = vec![
        Line::from(vec![
            Span::styled(edge, edge_style),
            Span::styled(
                truncate_text(&task.subtitle, inner),
                Style::default().fg(MUTED),
            ),
        ]),
        Line::from(vec![
            Span::styled(edge, edge_style),
            Span::styled(
                format!(
                    "{:width$}",
                    truncate_text(&task.title, title_width),
                    width = title_width
                ),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(task.icon.clone()),
        ]),
        Line::from(vec![
            Span::styled(edge, edge_style),
            Span::styled(time, Style::default().fg(MUTED)),
            Span::raw(" ".repeat(gap)),
            Span::styled(pill, status_style(task.status)),
        ]),
        Line::raw(""),
    ];
    let mut item = ListItem::new(lines).style(Style::default().bg(CARD_BG).fg(Color::Gray));
    if selected {
        item = item.style(Style::default().bg(Color::Rgb(40, 44, 60)).fg(Color::White));
    }
    item
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// First visible card index that keeps `selected` inside a viewport of `viewport` cards.
fn scroll_offset(selected: usize, current: usize, viewport: usize, len: usize) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let offset = current.min(max_offset);
    if selected < offset {
        selected
    } else if selected >= offset + viewport {
        (selected + 1 - viewport).min(max_offset)
    } else {
        offset
    }
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::FixedClock;
    use crate::storage::TaskScope;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn app() -> App<FixedClock> {
        let location = TaskLocation {
            path: None,
            scope: TaskScope::Sample,
        };
        App::new(
            TaskList::sample(today()),
            location,
            &Config::default(),
            FixedClock(today()),
        )
    }

    fn press(app: &mut App<FixedClock>, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn render(app: &mut App<FixedClock>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn screen_shows_header_tabs_and_cards() {
        let mut app = app();
        let screen = render(&mut app);
        assert!(screen.contains("Today's Tasks"));
        assert!(screen.contains("In Progress"));
        assert!(screen.contains("Market Research"));
        assert!(screen.contains("How to pitch a Design Sprint"));
    }

    #[test]
    fn moving_to_an_empty_day_shows_placeholder() {
        let mut app = app();
        assert!(!press(&mut app, KeyCode::Right));
        assert_eq!(app.selection.selected_date, today().succ_opt().unwrap());
        let screen = render(&mut app);
        assert!(screen.contains("No tasks"));
        assert!(!screen.contains("Market Research"));

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.selection.selected_date, today());
    }

    #[test]
    fn filter_keys_restrict_cards() {
        let mut app = app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.selection.active_filter, StatusFilter::Completed);
        let screen = render(&mut app);
        assert!(screen.contains("Market Research"));
        assert!(!screen.contains("Competitive Analysis"));

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.selection.active_filter, StatusFilter::All);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.selection.active_filter, StatusFilter::Completed);
    }

    #[test]
    fn cursor_stays_within_visible_cards() {
        let mut app = app();
        for _ in 0..10 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.cursor, 3);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.cursor, 0);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.cursor, 1);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn quit_keys_end_session() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn offset_follows_selection() {
        assert_eq!(scroll_offset(0, 0, 3, 10), 0);
        assert_eq!(scroll_offset(5, 0, 3, 10), 3);
        assert_eq!(scroll_offset(2, 5, 3, 10), 2);
        assert_eq!(scroll_offset(9, 0, 3, 10), 7);
        assert_eq!(scroll_offset(4, 3, 3, 10), 3);
        assert_eq!(scroll_offset(1, 0, 0, 10), 0);
        assert_eq!(scroll_offset(0, 8, 3, 2), 0);
    }

    #[test]
    fn long_titles_are_truncated() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a very long title", 8), "a ver...");
        assert_eq!(truncate_text("abcdef", 2), "ab");
    }
}
