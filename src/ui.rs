use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use location_tracker::view::{category_style, BadgeTone, LocationRow, COLUMN_HEADERS};
use location_tracker::{
    CrudWorkflowController, DeleteOutcome, LocationForm, LocationStore, LocationsView,
    PerformanceCache, RowAction, Sale, Screen, TableBody,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

/// Dashboard opened through the "view" action
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub route: String,
    pub location_id: String,
}

pub struct App<S: LocationStore> {
    store: S,
    cache: PerformanceCache,
    view: LocationsView,
    sales: Vec<Sale>,
    pub workflow: CrudWorkflowController,
    /// Draft being typed; only meaningful while the workflow's form is open
    pub form: Option<LocationForm>,
    pub dashboard: Option<Dashboard>,
    pub state: TableState,
    pub status: Option<String>,
}

impl<S: LocationStore> App<S> {
    pub fn new(store: S) -> Result<Self> {
        let mut app = Self {
            store,
            cache: PerformanceCache::new(),
            view: LocationsView::default(),
            sales: Vec::new(),
            workflow: CrudWorkflowController::new(),
            form: None,
            dashboard: None,
            state: TableState::default(),
            status: None,
        };
        app.refresh()?;
        Ok(app)
    }

    /// Re-read the store if it changed since the last ranking
    pub fn refresh(&mut self) -> Result<()> {
        if self.cache.revision() == Some(self.store.revision()) {
            return Ok(());
        }

        let snapshot = self.store.snapshot()?;
        if self.cache.refresh(&snapshot) {
            self.view = LocationsView::from_ranked(self.cache.ranked().to_vec());
            self.sales = snapshot.sales;
            self.clamp_selection();
        }
        Ok(())
    }

    pub fn view(&self) -> &LocationsView {
        &self.view
    }

    pub fn screen(&self) -> Screen {
        self.view.screen(&self.workflow)
    }

    fn clamp_selection(&mut self) {
        let len = self.view.len();
        if len == 0 {
            self.state.select(None);
        } else {
            let i = self.state.selected().unwrap_or(0).min(len - 1);
            self.state.select(Some(i));
        }
    }

    pub fn next(&mut self) {
        let len = self.view.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.view.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn dispatch_selected(&mut self, action: RowAction) {
        let Some(index) = self.state.selected() else {
            return;
        };

        let route = self.view.dispatch(index, action, &mut self.workflow);
        match action {
            RowAction::ViewDashboard => {
                if let (Some(route), Some(row)) = (route, self.view.row(index)) {
                    self.dashboard = Some(Dashboard {
                        route,
                        location_id: row.location.id.clone(),
                    });
                }
            }
            RowAction::Edit => self.form = Some(LocationForm::new(self.workflow.form_target())),
            RowAction::Delete => {}
        }
    }

    /// Draft for the open form, seeded from the workflow target if missing
    fn draft(&mut self) -> &mut LocationForm {
        let workflow = &self.workflow;
        self.form
            .get_or_insert_with(|| LocationForm::new(workflow.form_target()))
    }

    /// Drop a draft left over after the workflow closed its form
    fn sync_form(&mut self) {
        if !self.workflow.is_form_open() {
            self.form = None;
        }
    }

    fn submit_form(&mut self) {
        let form = self.draft().clone();

        match form.submit(&self.store) {
            Ok(saved) => {
                let verb = if form.is_edit() { "Updated" } else { "Created" };
                self.status = Some(format!("{} \"{}\"", verb, saved.name));
                self.form = None;
                self.workflow.on_save_completed();
            }
            // The form stays open so the user can fix the input
            Err(err) => self.status = Some(format!("Could not save: {}", err)),
        }
    }

    fn close_form(&mut self) {
        self.form = None;
        self.workflow.close_form();
    }

    fn confirm_delete(&mut self) {
        match self.workflow.confirm_delete(&self.store) {
            DeleteOutcome::Deleted(id) => {
                if self.dashboard.as_ref().map(|d| d.location_id == id).unwrap_or(false) {
                    self.dashboard = None;
                }
                self.status = Some("Location deleted".to_string());
            }
            DeleteOutcome::Failed { error, .. } if error.is_not_found() => {
                self.status = Some("Location deleted".to_string());
            }
            DeleteOutcome::Failed { error, .. } => {
                self.status = Some(format!("Delete failed: {}", error));
            }
            DeleteOutcome::NothingPending => {}
        }
    }

    /// Handle one key press. Returns false when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.sync_form();

        // Confirm dialog is drawn on top, so it takes keys first
        if self.workflow.is_confirm_open() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.workflow.cancel_delete()
                }
                _ => {}
            }
            return true;
        }

        if self.workflow.is_form_open() {
            match key.code {
                KeyCode::Esc => self.close_form(),
                KeyCode::Enter => self.submit_form(),
                KeyCode::Tab => self.draft().cycle_category(),
                KeyCode::Backspace => self.draft().pop_char(),
                KeyCode::Char(c) => self.draft().push_char(c),
                _ => {}
            }
            return true;
        }

        match key.code {
            KeyCode::Char('q') => return false,
            KeyCode::Esc => {
                if self.dashboard.take().is_none() {
                    return false;
                }
            }
            KeyCode::Char('a') => {
                self.view.add(&mut self.workflow);
                self.form = Some(LocationForm::new(None));
            }
            KeyCode::Char('e') => self.dispatch_selected(RowAction::Edit),
            KeyCode::Char('d') | KeyCode::Delete => self.dispatch_selected(RowAction::Delete),
            KeyCode::Enter | KeyCode::Char('v') => {
                if self.dashboard.is_some() {
                    self.dashboard = None;
                } else {
                    self.dispatch_selected(RowAction::ViewDashboard);
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => {
                if !self.view.is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.view.is_empty() {
                    self.state.select(Some(self.view.len() - 1));
                }
            }
            _ => {}
        }

        true
    }

    fn dashboard_sales(&self, name: &str) -> Vec<&Sale> {
        self.sales.iter().filter(|s| s.location == name).collect()
    }
}

pub fn run_ui<S: LocationStore>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = %err, "ui loop failed");
    }

    res
}

fn run_app<B: Backend, S: LocationStore>(terminal: &mut Terminal<B>, app: &mut App<S>) -> Result<()> {
    loop {
        app.refresh()?;
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

pub fn ui<S: LocationStore>(f: &mut Frame, app: &mut App<S>) {
    let screen = app.screen();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app, &screen);

    if app.dashboard.is_some() {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app, &screen);
        render_dashboard(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[1], app, &screen);
    }

    render_status_bar(f, chunks[2], app);

    if screen.form_modal.is_open {
        render_form_modal(f, app, screen.form_modal.title);
    }
    if screen.confirm_modal.is_open {
        render_confirm_modal(f, screen.confirm_modal.title, screen.confirm_modal.message);
    }
}

fn tone_color(tone: BadgeTone) -> Color {
    match tone {
        BadgeTone::Blue => Color::Blue,
        BadgeTone::Purple => Color::Magenta,
    }
}

fn render_header<S: LocationStore>(f: &mut Frame, area: Rect, app: &App<S>, screen: &Screen) {
    let total_transactions: usize = app.view.ranked().iter().map(|r| r.transactions).sum();

    let spans = vec![
        Span::styled(
            screen.title,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Locations: {}", app.view.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Transactions: {}", total_transactions),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  |  "),
        Span::styled("a", Style::default().fg(Color::Yellow)),
        Span::raw(" Add Location"),
    ];

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table<S: LocationStore>(f: &mut Frame, area: Rect, app: &mut App<S>, screen: &Screen) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Locations ");

    let rows = match &screen.body {
        TableBody::Rows(rows) => rows,
        TableBody::Placeholder(message) => {
            let placeholder = Paragraph::new(vec![Line::from(""), Line::from(*message)])
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(placeholder, area);
            return;
        }
    };

    let header_cells = COLUMN_HEADERS.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let table_rows = rows.iter().map(|row: &LocationRow| {
        let badge = Style::default()
            .fg(tone_color(category_style(row.category)))
            .add_modifier(Modifier::BOLD);

        Row::new(vec![
            Cell::from(row.name.clone()),
            Cell::from(row.category_label).style(badge),
            Cell::from(Line::from(vec![
                Span::styled(row.score_bar.clone(), Style::default().fg(Color::Cyan)),
                Span::raw(" "),
                Span::raw(row.transactions_label.clone()),
            ])),
            Cell::from("[v] [e] [d]").style(Style::default().fg(Color::DarkGray)),
        ])
        .height(1)
    });

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(28),
            Constraint::Length(16),
            Constraint::Length(40),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(block)
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_dashboard<S: LocationStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let Some(dashboard) = &app.dashboard else {
        return;
    };

    let title = format!(" Dashboard {} ", dashboard.route);
    let ranked = app
        .view
        .ranked()
        .iter()
        .find(|r| r.location.id == dashboard.location_id);

    let Some(ranked) = ranked else {
        let gone = Paragraph::new("Location no longer exists").block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(title),
        );
        f.render_widget(gone, area);
        return;
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled("  Name: ", label), Span::raw(ranked.location.name.clone())]),
        Line::from(vec![
            Span::styled("  Category: ", label),
            Span::raw(ranked.location.category.label()),
        ]),
        Line::from(vec![
            Span::styled("  Activity: ", label),
            Span::raw(format!("{:.0}% ({} transactions)", ranked.score, ranked.transactions)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  RECENT SALES",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )]),
        Line::from(""),
    ];

    let sales = app.dashboard_sales(&ranked.location.name);
    if sales.is_empty() {
        content.push(Line::from(Span::styled(
            "  No sales recorded",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    for sale in sales.iter().rev().take(15) {
        content.push(Line::from(vec![
            Span::raw(format!("  {}  ", sale.date)),
            Span::styled(format!("{:>10.2}", sale.amount), Style::default().fg(Color::Green)),
        ]));
    }

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );

    f.render_widget(panel, area);
}

fn render_status_bar<S: LocationStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.view.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(status) = &app.status {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
    }

    for (key, hint, color) in [
        ("a", " Add", Color::Yellow),
        ("e", " Edit", Color::Yellow),
        ("d", " Delete", Color::Yellow),
        ("Enter", " Dashboard", Color::Yellow),
        ("↑/↓", " Nav", Color::Yellow),
        ("q", " Quit", Color::Red),
    ] {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(key, Style::default().fg(color)));
        spans.push(Span::raw(hint));
    }

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_form_modal<S: LocationStore>(f: &mut Frame, app: &App<S>, title: &str) {
    let form = app
        .form
        .clone()
        .unwrap_or_else(|| LocationForm::new(app.workflow.form_target()));

    let area = centered_rect(50, 9, f.size());
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Name: ", label),
            Span::raw(form.name.clone()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Category: ", label),
            Span::styled(
                format!("< {} >", form.category.label()),
                Style::default().fg(tone_color(category_style(form.category))),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Enter save | Tab category | Esc cancel",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} ", title)),
    );

    f.render_widget(Clear, area);
    f.render_widget(modal, area);
}

fn render_confirm_modal(f: &mut Frame, title: &str, message: &str) {
    let area = centered_rect(50, 8, f.size());

    let content = vec![
        Line::from(""),
        Line::from(format!("  {}", message)),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Delete   "),
            Span::styled("n", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ]),
    ];

    let modal = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(format!(" {} ", title)),
    );

    f.render_widget(Clear, area);
    f.render_widget(modal, area);
}

/// Rect of `percent_x` width and `height` rows centered in `r`
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
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
