use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use factory_link::{
    default_export_filename, export_to_file, seed_inbox, truncate, AppConfig, AuthStore,
    DirectoryAction, DirectoryState, DirectoryView, Inbox, ManufacturerCatalog, ManufacturerRecord,
    SelectionCoverage, SortConfiguration, SortDirection, SortField,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

pub struct App {
    pub catalog: ManufacturerCatalog,
    pub config: AppConfig,
    pub state: DirectoryState,
    pub auth: AuthStore,
    pub inbox: Inbox,
    pub table_state: TableState,
    pub input_mode: InputMode,
    pub search_buffer: String,
    pub show_detail: bool,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(catalog: ManufacturerCatalog, config: AppConfig) -> Self {
        let mut table_state = TableState::default();
        if !catalog.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            state: DirectoryState::new(config.items_per_page),
            auth: config.auth_store(),
            catalog,
            config,
            inbox: seed_inbox(),
            table_state,
            input_mode: InputMode::Normal,
            search_buffer: String::new(),
            show_detail: false,
            status_message: None,
        }
    }

    /// Apply an action, then keep the row cursor inside the new page
    pub fn dispatch(&mut self, action: DirectoryAction) {
        self.state.dispatch(action);
        let rows = self.state.view(&self.catalog).rows().len();
        match (self.table_state.selected(), rows) {
            (_, 0) => self.table_state.select(None),
            (Some(i), n) if i >= n => self.table_state.select(Some(n - 1)),
            (None, _) => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    fn visible_ids(&mut self) -> Vec<String> {
        self.state.view(&self.catalog).visible_ids()
    }

    fn filtered_count(&mut self) -> usize {
        self.state.view(&self.catalog).filtered_count
    }

    pub fn selected_record(&mut self) -> Option<ManufacturerRecord> {
        let i = self.table_state.selected()?;
        self.state.view(&self.catalog).rows().get(i).map(|r| (*r).clone())
    }

    pub fn next(&mut self) {
        let len = self.visible_ids().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible_ids().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn next_page(&mut self) {
        let total_items = self.filtered_count();
        self.dispatch(DirectoryAction::NextPage { total_items });
        self.table_state.select(Some(0));
    }

    pub fn previous_page(&mut self) {
        self.dispatch(DirectoryAction::PreviousPage);
        self.table_state.select(Some(0));
    }

    pub fn toggle_row(&mut self) {
        if let Some(record) = self.selected_record() {
            self.dispatch(DirectoryAction::ToggleSelect(record.id));
        }
    }

    pub fn toggle_page(&mut self) {
        let ids = self.visible_ids();
        self.dispatch(DirectoryAction::ToggleSelectVisible(ids));
    }

    /// `s`: move to the next sort field, ascending
    pub fn cycle_sort_field(&mut self) {
        let next = self.state.sort.field.map_or(SortField::Name, |f| f.next());
        self.dispatch(DirectoryAction::ReplaceSort(SortConfiguration::by(next, SortDirection::Ascending)));
    }

    /// `r`: flip direction of the current sort
    pub fn flip_sort(&mut self) {
        if let Some(field) = self.state.sort.field {
            self.dispatch(DirectoryAction::SortBy(field));
        }
    }

    /// `d`: any → diverse → not diverse → any
    pub fn cycle_diversity(&mut self) {
        let next = match self.state.filters.diversity {
            None => Some(true),
            Some(true) => Some(false),
            Some(false) => None,
        };
        self.dispatch(DirectoryAction::SetDiversity(next));
    }

    pub fn cycle_page_size(&mut self) {
        let next = self.config.next_page_size(self.state.pagination.items_per_page);
        self.dispatch(DirectoryAction::SetItemsPerPage(next));
    }

    /// Enter: open or close the detail panel; opening reads the manufacturer's thread
    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
        if !self.show_detail {
            return;
        }
        if let Some(record) = self.selected_record() {
            let read = self.inbox.mark_thread_read(&record.id);
            if read > 0 {
                tracing::debug!(manufacturer = %record.id, read, "thread marked read");
            }
        }
    }

    pub fn begin_search(&mut self) {
        self.search_buffer = self.state.filters.search.clone();
        self.input_mode = InputMode::Search;
    }

    pub fn commit_search(&mut self) {
        self.input_mode = InputMode::Normal;
        let search = self.search_buffer.clone();
        self.dispatch(DirectoryAction::SetSearch(search));
    }

    pub fn export_selection(&mut self) {
        let path = self
            .config
            .export_dir
            .join(default_export_filename(Utc::now().date_naive()));
        let selected = self.state.selection.selected_records(self.catalog.records());

        self.status_message = Some(match export_to_file(&path, &selected, &self.config.export_options()) {
            Ok(()) => format!("✓ Exported {} manufacturers to {}", selected.len(), path.display()),
            Err(e) => format!("❌ {}", e),
        });
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
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

    if let Err(err) = res {
        tracing::error!(error = %err, "browser exited with an error");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if app.input_mode == InputMode::Search {
            match key.code {
                KeyCode::Enter => app.commit_search(),
                KeyCode::Esc => app.input_mode = InputMode::Normal,
                KeyCode::Backspace => {
                    app.search_buffer.pop();
                }
                KeyCode::Char(c) => app.search_buffer.push(c),
                _ => {}
            }
            continue;
        }

        app.status_message = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Enter => app.toggle_detail(),
            KeyCode::Char('/') => app.begin_search(),
            KeyCode::Char('c') => app.dispatch(DirectoryAction::ClearFilters),
            KeyCode::Char('x') => app.dispatch(DirectoryAction::ClearSelection),
            KeyCode::Char('s') => app.cycle_sort_field(),
            KeyCode::Char('r') => app.flip_sort(),
            KeyCode::Char('d') => app.cycle_diversity(),
            KeyCode::Char('+') => app.cycle_page_size(),
            KeyCode::Char(' ') => app.toggle_row(),
            KeyCode::Char('a') => app.toggle_page(),
            KeyCode::Char('e') => app.export_selection(),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Right | KeyCode::Char('n') | KeyCode::PageDown => app.next_page(),
            KeyCode::Left | KeyCode::Char('p') | KeyCode::PageUp => app.previous_page(),
            KeyCode::Home => app.dispatch(DirectoryAction::GoToPage(1)),
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with counts
            Constraint::Min(0),    // Table
            Constraint::Length(4), // Status bar
        ])
        .split(f.size());

    let view = app.state.view(&app.catalog);

    render_header(f, chunks[0], app, &view);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], &app.state, &mut app.table_state, &view);
        render_detail_panel(f, content_chunks[1], app, &view);
    } else {
        render_table(f, chunks[1], &app.state, &mut app.table_state, &view);
    }

    render_status_bar(f, chunks[2], app, &view);
}

fn render_header(f: &mut Frame, area: Rect, app: &App, view: &DirectoryView) {
    let counters = app.inbox.counters();

    let user = app
        .auth
        .current_user()
        .map_or_else(|| "Guest".to_string(), |u| format!("{} ({})", u.name, u.company));

    let mut spans = vec![
        Span::styled(
            "FactoryLink",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(user, Style::default().fg(Color::Magenta)),
        Span::raw("  |  "),
        Span::styled(
            format!("Matches: {}/{}", view.filtered_count, view.total_count),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Selected: {}", view.selected_count),
            Style::default().fg(Color::Green),
        ),
    ];

    if counters.total() > 0 {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("🔔 {}", counters.total()),
            Style::default().fg(Color::Red),
        ));
    }

    if app.input_mode == InputMode::Search {
        spans.push(Span::raw("  |  Search: "));
        spans.push(Span::styled(
            format!("{}▏", app.search_buffer),
            Style::default().fg(Color::Cyan),
        ));
    }

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn checkbox(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

fn render_table(
    f: &mut Frame,
    area: Rect,
    state: &DirectoryState,
    table_state: &mut TableState,
    view: &DirectoryView,
) {
    let page_box = match view.page_coverage {
        SelectionCoverage::All => "[x]",
        SelectionCoverage::Partial => "[-]",
        SelectionCoverage::None => "[ ]",
    };

    let sort_mark = |field: SortField| match state.sort.field {
        Some(current) if current == field => format!(" {}", state.sort.direction.arrow()),
        _ => String::new(),
    };

    let headers = vec![
        page_box.to_string(),
        format!("Name{}", sort_mark(SortField::Name)),
        format!("City{}", sort_mark(SortField::City)),
        format!("ST{}", sort_mark(SortField::State)),
        format!("Empl.{}", sort_mark(SortField::Employees)),
        format!("Rating{}", sort_mark(SortField::Rating)),
        format!("Cap%{}", sort_mark(SortField::Capacity)),
        format!("Sust{}", sort_mark(SortField::Sustainability)),
        format!("Lead{}", sort_mark(SortField::LeadTime)),
    ];
    let header_cells = headers.into_iter().map(|h| {
        Cell::from(h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = view.rows().iter().map(|record| {
        let selected = state.selection.contains(&record.id);
        let rating_color = match record.rating {
            Some(r) if r >= 4.5 => Color::Green,
            Some(r) if r < 3.5 => Color::Red,
            _ => Color::White,
        };
        let number = |v: Option<String>| v.unwrap_or_else(|| "—".to_string());

        let cells = vec![
            Cell::from(checkbox(selected)).style(Style::default().fg(Color::Green)),
            Cell::from(truncate(&record.name, 30)),
            Cell::from(truncate(record.city(), 16)),
            Cell::from(record.state().to_string()),
            Cell::from(number(record.employee_count.map(|n| n.to_string()))),
            Cell::from(number(record.rating.map(|r| format!("{:.1}", r)))).style(Style::default().fg(rating_color)),
            Cell::from(number(record.current_capacity.map(|c| format!("{:.0}", c)))),
            Cell::from(number(record.sustainability_score.map(|s| s.to_string()))),
            Cell::from(number(record.lead_time_days.map(|d| format!("{}d", d)))),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(32),
            Constraint::Length(18),
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Manufacturers "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, table_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App, view: &DirectoryView) {
    let mut first = vec![Span::styled(
        format!(" {} ", view.page.summary()),
        Style::default().fg(Color::Cyan),
    )];

    let active = app.state.filters.describe();
    if !active.is_empty() {
        first.push(Span::raw(" | "));
        first.push(Span::styled(
            format!("Filters: {}", active.join(" · ")),
            Style::default().fg(Color::Green),
        ));
    }
    if let Some(field) = app.state.sort.field {
        first.push(Span::raw(" | "));
        first.push(Span::styled(
            format!("Sort: {} {}", field, app.state.sort.direction.arrow()),
            Style::default().fg(Color::Magenta),
        ));
    }
    if let Some(message) = &app.status_message {
        first.push(Span::raw(" | "));
        first.push(Span::styled(message.clone(), Style::default().fg(Color::Yellow)));
    }

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let second = vec![
        key(" /"),
        Span::raw(" Search | "),
        key("s/r"),
        Span::raw(" Sort | "),
        key("d"),
        Span::raw(" Diversity | "),
        key("n/p"),
        Span::raw(" Page | "),
        key("+"),
        Span::raw(" Size | "),
        key("Space/a"),
        Span::raw(" Select | "),
        key("e"),
        Span::raw(" Export | "),
        key("c/x"),
        Span::raw(" Clear | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(first), Line::from(second)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App, view: &DirectoryView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Details ");

    let Some(record) = app.table_state.selected().and_then(|i| view.rows().get(i)) else {
        f.render_widget(Paragraph::new("No manufacturer selected").block(block), area);
        return;
    };

    let label = |name: &'static str| Span::styled(format!("{:<16}", name), Style::default().fg(Color::Yellow));
    let field = |name: &'static str, value: String| Line::from(vec![label(name), Span::raw(value)]);
    let opt = |v: Option<String>| v.unwrap_or_else(|| "—".to_string());

    let mut lines = vec![
        Line::from(Span::styled(
            record.name.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        field("ID", record.id.clone()),
        field("Location", format!("{}, {}", record.city(), record.state())),
        field("Classification", record.classification.join(", ")),
        field("Employees", opt(record.employee_count.map(|n| n.to_string()))),
        field("Revenue", opt(record.annual_revenue.map(|r| format!("${:.1}M", r / 1_000_000.0)))),
        field("Rating", opt(record.rating.map(|r| format!("{:.1} / 5", r)))),
        field(
            "Capacity",
            match (record.current_capacity, record.max_capacity) {
                (Some(c), Some(m)) => format!("{:.0}% of {:.0}% max", c, m),
                (Some(c), None) => format!("{:.0}%", c),
                _ => "—".to_string(),
            },
        ),
        field("Sustainability", opt(record.sustainability_score.map(|s| format!("{}/100", s)))),
        field("MOQ", opt(record.moq.map(|m| m.to_string()))),
        field("Lead time", opt(record.lead_time_days.map(|d| format!("{} days", d)))),
        field("Established", opt(record.year_established.map(|y| y.to_string()))),
        field(
            "Diversity",
            match record.diversity_certified {
                Some(true) => "Certified".to_string(),
                Some(false) => "Not certified".to_string(),
                None => "—".to_string(),
            },
        ),
        Line::from(""),
    ];

    for (name, values) in [
        ("Capabilities", &record.capabilities),
        ("Materials", &record.materials),
        ("Certifications", &record.certifications),
    ] {
        lines.push(field(name, values.join(", ")));
    }

    let quotes: Vec<String> = app
        .inbox
        .quotes()
        .iter()
        .filter(|q| q.manufacturer_id == record.id)
        .map(|q| format!("{} x{} ({})", q.product, q.quantity, q.status.as_str()))
        .collect();
    if !quotes.is_empty() {
        lines.push(Line::from(""));
        for quote in quotes {
            lines.push(field("Quote", quote));
        }
    }
    let thread = app.inbox.thread(&record.id);
    if let Some(last) = thread.last() {
        let who = if last.from_user { "You" } else { "Them" };
        lines.push(field("Messages", format!("{} ({}: {})", thread.len(), who, last.body)));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
