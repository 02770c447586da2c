use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use inventory_core::{product::format_price, Field, FilterOp, Inventory, ProductRow};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::forms::{AddForm, TextInput};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Yellow,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
    Add,
    Delete,
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal frontend over an [`Inventory`].
pub struct InventoryApp {
    inventory: Inventory,
    state: UiState,
    theme: Theme,
}

impl InventoryApp {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory,
            state: UiState::default(),
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.state.set_status(format!(
            "Loaded {} products from {}",
            self.inventory.store().len(),
            self.inventory.store().path().display()
        ));

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let outcome = loop {
            if let Err(err) = terminal.draw(|frame| self.draw(frame)) {
                break Err(err.into());
            }
            if self.state.should_quit {
                break Ok(());
            }
            match event_rx.recv().await {
                Some(event) => {
                    if let Err(err) = self.process_app_event(event) {
                        break Err(err);
                    }
                }
                None => break Ok(()),
            }
        };

        restore_terminal(&mut terminal)?;
        outcome
    }

    /// Handle one event to completion. Persistence failures are returned as fatal.
    fn process_app_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key)
            }
            AppEvent::Input(_) => Ok(()),
            AppEvent::Tick => {
                if self.state.mode == Mode::Search {
                    self.show_search_summary();
                }
                Ok(())
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return Ok(());
        }
        match self.state.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Search => {
                self.handle_search_key(key);
                Ok(())
            }
            Mode::Add => self.handle_add_key(key),
            Mode::Delete => self.handle_delete_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        let total = self.visible_rows().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1, total),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1, total),
            KeyCode::Char('g') | KeyCode::Home => self.state.move_cursor(isize::MIN, total),
            KeyCode::Char('G') | KeyCode::End => self.state.move_cursor(isize::MAX, total),
            KeyCode::Char('/') => {
                self.state.mode = Mode::Search;
                self.show_search_summary();
            }
            KeyCode::Char('f') => {
                self.state.filter_op = self.state.filter_op.next();
                self.show_search_summary();
            }
            KeyCode::Char('a') => {
                self.state.mode = Mode::Add;
                self.state.set_status("Add a new product".to_string());
            }
            KeyCode::Char('d') | KeyCode::Enter => {
                let selected = self
                    .visible_rows()
                    .get(self.state.cursor)
                    .map(|row| row.name.clone());
                self.state.delete_input = match (key.code, selected) {
                    (KeyCode::Enter, Some(name)) => TextInput::with_value(&name),
                    _ => TextInput::default(),
                };
                self.state.mode = Mode::Delete;
                self.state.set_status("Delete a product by name".to_string());
            }
            KeyCode::Char('e') => {
                let rows = self.inventory.export()?;
                info!(rows, "Export requested from UI");
                self.state.set_status(format!(
                    "Exported {rows} products to {}",
                    self.inventory.exporter().path().display()
                ));
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.search.clear();
                self.state.mode = Mode::Browse;
                self.state.set_status("Search cleared".to_string());
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Browse;
                self.show_search_summary();
            }
            code => {
                if edit_input(&mut self.state.search, code, key.modifiers) {
                    self.show_search_summary();
                }
            }
        }
    }

    fn handle_add_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state.add_form.clear();
                self.state.mode = Mode::Browse;
                self.state.set_status("Add cancelled".to_string());
            }
            KeyCode::Tab | KeyCode::Down => self.state.add_form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.state.add_form.focus_prev(),
            KeyCode::Enter => {
                let submission = self.state.add_form.submission();
                let flags = self.inventory.add(&submission)?;
                if flags.is_valid() {
                    let name = submission
                        .resolve(Field::Name)
                        .unwrap_or_default()
                        .to_string();
                    self.state.add_form.clear();
                    self.state.mode = Mode::Browse;
                    self.state.set_status(format!("Added {name}"));
                } else {
                    let invalid = flags
                        .invalid_fields()
                        .iter()
                        .map(|field| field.label())
                        .collect::<Vec<_>>()
                        .join(", ");
                    self.state.set_status(format!("Check {invalid}"));
                    self.state.add_form.set_flags(flags);
                }
            }
            code => {
                edit_input(self.state.add_form.focused(), code, key.modifiers);
            }
        }
        Ok(())
    }

    fn handle_delete_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state.delete_input.clear();
                self.state.mode = Mode::Browse;
                self.state.set_status("Delete cancelled".to_string());
            }
            KeyCode::Enter => {
                let name = self.state.delete_input.value().to_string();
                let before = self.inventory.store().len();
                self.inventory.remove(&name)?;
                self.state.delete_input.clear();
                self.state.mode = Mode::Browse;
                self.clamp_cursor();
                let message = if self.inventory.store().len() < before {
                    format!("Deleted {name}")
                } else {
                    format!("Nothing named {name}")
                };
                self.state.set_status(message);
            }
            code => {
                edit_input(&mut self.state.delete_input, code, key.modifiers);
            }
        }
        Ok(())
    }

    fn visible_rows(&self) -> Vec<ProductRow> {
        self.inventory
            .query_with(self.state.search.value(), self.state.filter_op)
            .rows()
    }

    fn clamp_cursor(&mut self) {
        let total = self.visible_rows().len();
        self.state.move_cursor(0, total);
    }

    fn show_search_summary(&mut self) {
        self.clamp_cursor();
        let summary = self.search_summary();
        self.state.set_status(summary);
    }

    fn search_summary(&self) -> String {
        let view = self
            .inventory
            .query_with(self.state.search.value(), self.state.filter_op);
        format!(
            "Search {} {:?}: {} of {} products",
            self.state.filter_op,
            self.state.search.value(),
            view.count(),
            self.inventory.store().len()
        )
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(4),
            ])
            .split(size);

        self.render_search(frame, chunks[0]);
        self.render_table(frame, chunks[1]);
        self.render_status(frame, chunks[2]);

        match self.state.mode {
            Mode::Add => self.render_add_form(frame),
            Mode::Delete => self.render_delete_form(frame),
            Mode::Browse | Mode::Search => {}
        }
    }

    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let active = self.state.mode == Mode::Search;
        let border = if active {
            self.theme.accent
        } else {
            self.theme.muted
        };
        let line = Line::from(vec![
            Span::styled(
                format!("Name {} ", self.state.filter_op),
                Style::default().fg(self.theme.muted),
            ),
            Span::raw(self.state.search.value().to_string()),
        ]);
        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title("Search (/)"),
        );
        frame.render_widget(paragraph, area);

        if active {
            let prefix = format!("Name {} ", self.state.filter_op).chars().count() as u16;
            set_input_cursor(frame, area, prefix, &self.state.search);
        }
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let rows = self.visible_rows();
        self.state.move_cursor(0, rows.len());

        let header = Row::new(["Name", "Quantity", "Price", "Created date"]).style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        );
        let body = rows.iter().map(|row| Row::new(row.cells()));
        let widths = [
            Constraint::Percentage(40),
            Constraint::Percentage(15),
            Constraint::Percentage(20),
            Constraint::Percentage(25),
        ];
        let table = Table::new(body, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Products ({})", rows.len())),
            )
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.primary_fg),
            )
            .highlight_symbol("▶ ");

        let mut table_state = TableState::default();
        if !rows.is_empty() {
            table_state.select(Some(self.state.cursor));
        }
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let store = self.inventory.store();
        let secondary = Line::from(vec![
            Span::styled(
                format!(
                    "{} products · stock value {}",
                    store.len(),
                    format_price(store.total_value())
                ),
                Style::default().fg(self.theme.success),
            ),
            Span::styled(
                "   a add  d delete  / search  f filter  e export  q quit",
                Style::default().fg(self.theme.muted),
            ),
        ]);
        let paragraph = Paragraph::new(vec![Line::from(self.state.status.clone()), secondary])
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_add_form(&self, frame: &mut Frame) {
        let area = centered_rect(56, 9, frame.size());
        frame.render_widget(Clear, area);

        let form = &self.state.add_form;
        let mut lines = Vec::new();
        for (field, input) in form.fields() {
            let invalid = form.flags().is_invalid(field);
            let focused = form.focused_field() == field;
            let label_style = if invalid {
                Style::default().fg(self.theme.danger)
            } else if focused {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:>11}: ", field.label()), label_style),
                Span::raw(input.value().to_string()),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(helper_line("add"));

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Add a New Product"),
        );
        frame.render_widget(paragraph, area);

        let row = Field::ALL
            .iter()
            .position(|field| *field == form.focused_field())
            .unwrap_or(0) as u16;
        let field_area = Rect::new(area.x, area.y + row, area.width, area.height);
        if let Some((_, input)) = form.fields().nth(row as usize) {
            set_input_cursor(frame, field_area, 13, input);
        }
    }

    fn render_delete_form(&self, frame: &mut Frame) {
        let area = centered_rect(56, 5, frame.size());
        frame.render_widget(Clear, area);

        let lines = vec![
            Line::from(vec![
                Span::styled(
                    "Name: ",
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(self.state.delete_input.value().to_string()),
            ]),
            Line::from(""),
            helper_line("delete"),
        ];
        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Delete a Product"),
        );
        frame.render_widget(paragraph, area);
        set_input_cursor(frame, area, 6, &self.state.delete_input);
    }
}

fn helper_line(action: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {action}  ")),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" cancel"),
    ])
}

/// Apply an editing key to `input`. Returns whether the text changed.
fn edit_input(input: &mut TextInput, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Backspace => {
            input.backspace();
            true
        }
        KeyCode::Delete => {
            input.delete();
            true
        }
        KeyCode::Left => {
            input.move_cursor(-1);
            false
        }
        KeyCode::Right => {
            input.move_cursor(1);
            false
        }
        KeyCode::Home => {
            input.move_home();
            false
        }
        KeyCode::End => {
            input.move_end();
            false
        }
        KeyCode::Char(ch) if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT => {
            input.insert(ch);
            true
        }
        _ => false,
    }
}

fn set_input_cursor(frame: &mut Frame, area: Rect, prefix: u16, input: &TextInput) {
    let x = (area.x + 1 + prefix + input.cursor() as u16).min(area.x + area.width.saturating_sub(2));
    frame.set_cursor(x, area.y + 1);
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    error!(?err, "Failed to read terminal event");
                    break;
                }
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(err) => {
                error!(?err, "Failed to poll terminal events");
                break;
            }
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

struct UiState {
    search: TextInput,
    filter_op: FilterOp,
    add_form: AddForm,
    delete_input: TextInput,
    cursor: usize,
    status: String,
    mode: Mode,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            search: TextInput::default(),
            filter_op: FilterOp::default(),
            add_form: AddForm::default(),
            delete_input: TextInput::default(),
            cursor: 0,
            status: "Ready".to_string(),
            mode: Mode::Browse,
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn move_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize).saturating_add(delta);
        self.cursor = next.clamp(0, total as isize - 1) as usize;
    }
}
