//! Sales CRM — interactive role management TUI
//!
//! Layout:
//!   ┌─── header ──────────────────────────────────────────────────────────┐
//!   │  Role Management     operator: superadmin     storage: .crm         │
//!   ├─── left panel ──────────┬─── right panel ───────────────────────────┤
//!   │  Roles                  │  Permissions (subject x action matrix)    │
//!   ├─────────────────────────┴───────────────────────────────────────────┤
//!   │  footer (key bindings / prompt / status)                            │
//!   └─────────────────────────────────────────────────────────────────────┘
//!
//! Only a superadmin, or a user holding `manage` on both Role and User, may
//! open the screen.

use std::{io, path::PathBuf, time::Duration};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};

use crm_ability::{require_role_management, Ability, AbilityCheck, RolePresets};
use crm_catalog::{open_storage, CatalogStore, PermissionMatrix};
use crm_contracts::{CatalogEntry, CrmResult, Role};
use crm_core::{
    config::{AppConfig, StorageBackend},
    traits::{RoleRepository, SubjectRepository},
};
use crm_ref::mock_data::load_user;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "crm-tui", about = "Sales CRM role management screen")]
struct Args {
    /// Path to a TOML config file (default: ./crm.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Acting user: JSON file path or `sample:<name>`.
    #[arg(long = "as", default_value = "sample:superadmin")]
    operator: String,
}

// ── App state ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Roles,
    Matrix,
}

/// Modal input state for the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Typing the name of a new role.
    NewRole(String),
    /// Typing `key` or `key=Label` for a custom subject.
    NewSubject(String),
    /// Waiting for `y` to delete the selected role.
    ConfirmDelete,
}

struct App {
    store: CatalogStore,
    operator: String,
    storage_label: String,

    roles: Vec<Role>,
    catalog: Vec<CatalogEntry>,
    selected_role: usize,

    // Working copy of the selected role; saved with `s`.
    matrix: Option<PermissionMatrix>,
    dirty: bool,
    row: usize,
    col: usize,

    focus: Focus,
    mode: Mode,
    status: String,
}

impl App {
    fn new(store: CatalogStore, operator: String, storage_label: String) -> Self {
        let mut app = Self {
            store,
            operator,
            storage_label,
            roles: Vec::new(),
            catalog: Vec::new(),
            selected_role: 0,
            matrix: None,
            dirty: false,
            row: 0,
            col: 0,
            focus: Focus::Roles,
            mode: Mode::Normal,
            status: String::from("Ready."),
        };
        app.reload();
        app
    }

    /// Re-read roles and catalog from storage and rebuild the working copy.
    fn reload(&mut self) {
        self.roles = self.store.list_roles();
        self.catalog = self.store.subject_catalog();
        if self.selected_role >= self.roles.len() {
            self.selected_role = self.roles.len().saturating_sub(1);
        }
        self.open_selected();
    }

    fn open_selected(&mut self) {
        self.matrix = self
            .roles
            .get(self.selected_role)
            .cloned()
            .map(|role| PermissionMatrix::new(role, &self.catalog));
        self.dirty = false;
        let rows = self.matrix.as_ref().map_or(0, |m| m.rows().len());
        if self.row >= rows {
            self.row = rows.saturating_sub(1);
        }
    }

    fn select_role(&mut self, index: usize) {
        if index == self.selected_role || index >= self.roles.len() {
            return;
        }
        if self.dirty {
            self.status = String::from("Unsaved changes discarded.");
        }
        self.selected_role = index;
        self.open_selected();
    }

    fn move_row(&mut self, down: bool) {
        match self.focus {
            Focus::Roles => {
                let next = if down {
                    self.selected_role + 1
                } else {
                    self.selected_role.saturating_sub(1)
                };
                self.select_role(next);
            }
            Focus::Matrix => {
                let rows = self.matrix.as_ref().map_or(0, |m| m.rows().len());
                if down && self.row + 1 < rows {
                    self.row += 1;
                } else if !down {
                    self.row = self.row.saturating_sub(1);
                }
            }
        }
    }

    fn move_col(&mut self, right: bool) {
        let cols = PermissionMatrix::columns().len();
        if right && self.col + 1 < cols {
            self.col += 1;
        } else if !right {
            self.col = self.col.saturating_sub(1);
        }
    }

    fn toggle(&mut self) {
        let action = PermissionMatrix::columns()[self.col].clone();
        if let Some(matrix) = self.matrix.as_mut() {
            matrix.toggle(self.row, &action);
            self.dirty = true;
        }
    }

    fn save(&mut self) {
        let Some(matrix) = self.matrix.as_ref() else {
            self.status = String::from("No role selected.");
            return;
        };
        let role = matrix.role().clone();
        let name = role.name.clone();
        match self.store.upsert_role(role) {
            Ok(_) => {
                self.status = format!("Saved role '{}'.", name);
                self.reload();
            }
            Err(e) => self.status = format!("Save failed: {}", e),
        }
    }

    fn create_role(&mut self, name: &str) {
        if self.roles.iter().any(|r| r.has_name(name)) {
            self.status = format!("A role named '{}' already exists.", name.trim());
            return;
        }
        let role = Role::new(name.trim());
        let id = role.id.clone();
        match self.store.upsert_role(role) {
            Ok(roles) => {
                self.status = format!("Created role '{}'.", name.trim());
                self.selected_role = roles.iter().position(|r| r.id == id).unwrap_or(0);
                self.reload();
                self.focus = Focus::Matrix;
            }
            Err(e) => self.status = format!("Create failed: {}", e),
        }
    }

    fn delete_role(&mut self) {
        let Some(role) = self.roles.get(self.selected_role) else {
            return;
        };
        let name = role.name.clone();
        match self.store.delete_role(&role.id.clone()) {
            Ok(_) => {
                self.status = format!("Deleted role '{}'.", name);
                self.reload();
            }
            Err(e) => self.status = format!("Delete failed: {}", e),
        }
    }

    /// `key` or `key=Label`.
    fn add_subject(&mut self, input: &str) {
        let (key, label) = match input.split_once('=') {
            Some((key, label)) => (key, Some(label)),
            None => (input, None),
        };
        if key.trim().is_empty() {
            self.status = String::from("Subject key must not be blank.");
            return;
        }
        match self.store.add_custom_subject(key, label) {
            Ok(_) => {
                self.status = format!("Custom subject '{}' saved.", key.trim());
                self.refresh_catalog();
            }
            Err(e) => self.status = format!("Saving subject failed: {}", e),
        }
    }

    /// Remove the custom subject on the current matrix row.
    fn remove_subject(&mut self) {
        let Some(entry) = self.matrix.as_ref().and_then(|m| m.rows().get(self.row)).cloned() else {
            return;
        };
        let stored = self
            .store
            .list_custom_subjects()
            .iter()
            .any(|s| s.key_matches(entry.subject.key()));
        if !stored {
            self.status = format!("'{}' is not a custom subject.", entry.label);
            return;
        }
        match self.store.delete_custom_subject(entry.subject.key()) {
            Ok(_) => {
                self.status = format!("Custom subject '{}' removed.", entry.subject);
                self.refresh_catalog();
            }
            Err(e) => self.status = format!("Removing subject failed: {}", e),
        }
    }

    /// Rebuild matrix rows without losing unsaved grants.
    fn refresh_catalog(&mut self) {
        self.catalog = self.store.subject_catalog();
        if let Some(matrix) = self.matrix.take() {
            self.matrix = Some(PermissionMatrix::new(matrix.into_role(), &self.catalog));
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn ui(f: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(10),   // roles + matrix
            Constraint::Length(4), // footer
        ])
        .split(f.area());

    render_header(f, outer[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(outer[1]);

    render_roles(f, body[0], app);
    render_matrix(f, body[1], app);
    render_footer(f, outer[2], app);
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled("Sales CRM · Role Management    ", title_style),
        Span::raw("operator: "),
        Span::styled(app.operator.clone(), Style::default().fg(Color::Yellow)),
        Span::raw("    storage: "),
        Span::styled(app.storage_label.clone(), Style::default().fg(Color::Gray)),
    ]);
    let header = Paragraph::new(line).block(panel("", false));
    f.render_widget(header, area);
}

fn render_roles(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = if app.roles.is_empty() {
        vec![ListItem::new(Span::styled(
            "No roles. Press [n] to create one.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.roles
            .iter()
            .enumerate()
            .map(|(i, role)| {
                let selected = i == app.selected_role;
                let marker = if selected { "▸ " } else { "  " };
                let style = if selected {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default().fg(Color::White)
                };
                let dirty = if selected && app.dirty { " *" } else { "" };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{}{}{}", marker, role.name, dirty), style),
                    Span::styled(
                        format!("  ({})", role.permissions.len()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect()
    };

    let list = List::new(items).block(panel(" Roles ", app.focus == Focus::Roles));
    f.render_widget(list, area);
}

fn render_matrix(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Matrix;
    let Some(matrix) = app.matrix.as_ref() else {
        let empty = Paragraph::new("Select or create a role.").block(panel(" Permissions ", focused));
        f.render_widget(empty, area);
        return;
    };

    let columns = PermissionMatrix::columns();
    let mut items: Vec<ListItem> = Vec::new();

    let mut head = vec![Span::styled(
        format!("{:<22}", "SUBJECT"),
        Style::default().fg(Color::DarkGray),
    )];
    for (c, action) in columns.iter().enumerate() {
        let style = if focused && c == app.col {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        head.push(Span::styled(format!("{:^9}", action.as_str()), style));
    }
    items.push(ListItem::new(Line::from(head)));

    for (r, entry) in matrix.rows().iter().enumerate() {
        let label = if entry.custom {
            format!("{} ✎", entry.label)
        } else {
            entry.label.clone()
        };
        let mut spans = vec![Span::styled(
            format!("{:<22}", truncate(&label, 21)),
            Style::default().fg(if r == app.row && focused { Color::Cyan } else { Color::White }),
        )];
        for (c, action) in columns.iter().enumerate() {
            let checked = matrix.is_checked(r, action);
            let mark = if checked { "[x]" } else { "[ ]" };
            let mut style = Style::default().fg(if checked { Color::Green } else { Color::Gray });
            if focused && r == app.row && c == app.col {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(format!("{:^9}", mark), style));
        }
        items.push(ListItem::new(Line::from(spans)));
    }

    let role = matrix.role();
    let title = match &role.description {
        Some(d) => format!(" Permissions · {} · {} ", role.name, truncate(d, 40)),
        None => format!(" Permissions · {} ", role.name),
    };
    let list = List::new(items).block(panel(&title, focused));
    f.render_widget(list, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &str| Span::styled(k.to_string(), Style::default().fg(Color::Cyan));

    let first = match &app.mode {
        Mode::Normal => Line::from(vec![
            key(" [Tab] "),
            Span::raw("Panel  "),
            key("[↑↓←→] "),
            Span::raw("Move  "),
            key("[Space] "),
            Span::raw("Toggle  "),
            key("[s] "),
            Span::raw("Save  "),
            key("[n] "),
            Span::raw("New role  "),
            key("[d] "),
            Span::raw("Delete role  "),
            key("[a] "),
            Span::raw("Add subject  "),
            key("[x] "),
            Span::raw("Remove subject  "),
            key("[q] "),
            Span::raw("Quit"),
        ]),
        Mode::NewRole(buffer) => Line::from(vec![
            key(" New role name: "),
            Span::raw(format!("{}_", buffer)),
            Span::styled("   [Enter] create  [Esc] cancel", Style::default().fg(Color::DarkGray)),
        ]),
        Mode::NewSubject(buffer) => Line::from(vec![
            key(" Subject (key or key=Label): "),
            Span::raw(format!("{}_", buffer)),
            Span::styled("   [Enter] save  [Esc] cancel", Style::default().fg(Color::DarkGray)),
        ]),
        Mode::ConfirmDelete => Line::from(vec![Span::styled(
            " Delete the selected role? [y] yes  [any other key] no",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )]),
    };
    let second = Line::from(Span::styled(
        format!(" {}", app.status),
        Style::default().fg(Color::Gray),
    ));

    let footer = Paragraph::new(vec![first, second]).block(panel("", false));
    f.render_widget(footer, area);
}

// ── Utility helpers ───────────────────────────────────────────────────────────

/// Truncate a string to at most `max` chars, appending "…" if truncated.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

// ── Input handling ────────────────────────────────────────────────────────────

/// Apply one key press. Returns `false` when the app should exit.
fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    match std::mem::replace(&mut app.mode, Mode::Normal) {
        Mode::NewRole(mut buffer) => {
            match code {
                KeyCode::Enter => app.create_role(&buffer),
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    buffer.pop();
                    app.mode = Mode::NewRole(buffer);
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    app.mode = Mode::NewRole(buffer);
                }
                _ => app.mode = Mode::NewRole(buffer),
            }
            return true;
        }
        Mode::NewSubject(mut buffer) => {
            match code {
                KeyCode::Enter => app.add_subject(&buffer),
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    buffer.pop();
                    app.mode = Mode::NewSubject(buffer);
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    app.mode = Mode::NewSubject(buffer);
                }
                _ => app.mode = Mode::NewSubject(buffer),
            }
            return true;
        }
        Mode::ConfirmDelete => {
            if matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                app.delete_role();
            } else {
                app.status = String::from("Delete cancelled.");
            }
            return true;
        }
        Mode::Normal => {}
    }

    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return false,
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::Roles => Focus::Matrix,
                Focus::Matrix => Focus::Roles,
            };
        }
        KeyCode::Up => app.move_row(false),
        KeyCode::Down => app.move_row(true),
        KeyCode::Left if app.focus == Focus::Matrix => app.move_col(false),
        KeyCode::Right if app.focus == Focus::Matrix => app.move_col(true),
        KeyCode::Char(' ') if app.focus == Focus::Matrix => app.toggle(),
        KeyCode::Char('s') => app.save(),
        KeyCode::Char('n') => app.mode = Mode::NewRole(String::new()),
        KeyCode::Char('a') => app.mode = Mode::NewSubject(String::new()),
        KeyCode::Char('x') if app.focus == Focus::Matrix => app.remove_subject(),
        KeyCode::Char('d') if !app.roles.is_empty() => app.mode = Mode::ConfirmDelete,
        KeyCode::Char('r') => {
            app.reload();
            app.status = String::from("Reloaded from storage.");
        }
        _ => {}
    }
    true
}

// ── Startup ───────────────────────────────────────────────────────────────────

fn load_operator(source: &str) -> CrmResult<Ability> {
    let ability = Ability::for_user(&load_user(source)?);
    require_role_management(&ability)?;
    Ok(ability)
}

fn open_app(args: &Args) -> CrmResult<App> {
    let config = AppConfig::load(args.config.as_deref())?;
    let operator = load_operator(&args.operator)?;

    let store = CatalogStore::new(open_storage(&config.storage));
    if config.presets.seed {
        let presets = RolePresets::load(config.presets.path.as_deref())?;
        store.seed_roles(presets.to_roles())?;
    }

    let storage_label = match config.storage.backend {
        StorageBackend::File => config.storage.dir.display().to_string(),
        StorageBackend::Memory => String::from("memory (not persisted)"),
    };
    Ok(App::new(store, operator.role_name().to_string(), storage_label))
}

// ── Terminal setup / teardown ─────────────────────────────────────────────────

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

// ── Main event loop ───────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    let args = Args::parse();

    // Refuse before touching the terminal so the message stays visible.
    let mut app = match open_app(&args) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("crm-tui: {}", e);
            std::process::exit(1);
        }
    };

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut terminal = setup_terminal()?;

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if !handle_key(&mut app, key.code, key.modifiers) {
                    break;
                }
            }
        }
    }

    restore_terminal(&mut terminal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crm_catalog::MemoryStore;
    use crm_contracts::{Action, CrmError};

    use super::*;

    fn app() -> App {
        let store = CatalogStore::new(Arc::new(MemoryStore::new()));
        App::new(store, "superadmin".to_string(), "memory".to_string())
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn create_toggle_and_save_role() {
        let mut app = app();
        handle_key(&mut app, KeyCode::Char('n'), KeyModifiers::NONE);
        type_text(&mut app, "billing");
        handle_key(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.roles.len(), 1);
        assert_eq!(app.focus, Focus::Matrix);

        // First row, first column (view).
        handle_key(&mut app, KeyCode::Char(' '), KeyModifiers::NONE);
        assert!(app.dirty);
        handle_key(&mut app, KeyCode::Char('s'), KeyModifiers::NONE);

        let stored = app.store.list_roles();
        assert_eq!(stored[0].permissions.len(), 1);
        assert!(stored[0].permissions[0].lists(&Action::View));
        assert!(!app.dirty);
    }

    #[test]
    fn add_and_remove_custom_subject() {
        let mut app = app();
        app.create_role("billing");
        handle_key(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        type_text(&mut app, "Invoice=Invoices");
        handle_key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.catalog.len(), 9);

        let row = app
            .matrix
            .as_ref()
            .and_then(|m| m.rows().iter().position(|e| e.label == "Invoices"))
            .unwrap();
        app.row = row;
        app.remove_subject();
        assert_eq!(app.catalog.len(), 8);
        assert!(app.store.list_custom_subjects().is_empty());
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app();
        app.create_role("temp");
        handle_key(&mut app, KeyCode::Char('d'), KeyModifiers::NONE);
        handle_key(&mut app, KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.roles.len(), 1);

        handle_key(&mut app, KeyCode::Char('d'), KeyModifiers::NONE);
        handle_key(&mut app, KeyCode::Char('y'), KeyModifiers::NONE);
        assert!(app.roles.is_empty());
        assert!(app.matrix.is_none());
    }

    #[test]
    fn operator_without_rights_is_refused() {
        assert!(matches!(load_operator("sample:sales"), Err(CrmError::Forbidden { .. })));
        assert!(load_operator("sample:admin").is_ok());
    }
}
