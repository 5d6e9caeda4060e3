//! Dashboard application state and event handling

use crate::charts::ChartSync;
use crate::filter::{FilterState, History};
use crate::fragment::{self, TableRow};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use logboard_common::{ApiError, EntryDetail, FilteredResults};

/// Which region receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Form,
}

/// Transient state drawn over the table region. The underlying rows
/// are kept as-is so a failed filter leaves prior state untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum TableOverlay {
    None,
    Loading,
    Error(String),
}

/// Detail modal state machine: terminal on close, restarted at
/// `Loading` on every open.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    Closed,
    Loading {
        entry_id: String,
    },
    Populated {
        entry_id: String,
        record: EntryDetail,
    },
    Errored {
        entry_id: String,
        message: String,
    },
}

/// Events delivered to the application loop
#[derive(Debug)]
pub enum AppEvent {
    /// A filter request finished. `state` is the filter the request
    /// was issued for, so the payload is applied and recorded under
    /// its own state even when responses overlap or arrive out of
    /// order.
    FilterCompleted {
        state: FilterState,
        result: Result<FilteredResults, ApiError>,
    },
    /// A detail fetch finished. `entry_id` is the identifier the fetch
    /// was issued for, which may no longer be the one the modal shows.
    DetailCompleted {
        entry_id: String,
        result: Result<EntryDetail, ApiError>,
    },
    /// Key event from terminal
    Key(KeyEvent),
}

/// Work the runner must perform on behalf of the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Issue a filter request for this state
    SubmitFilter(FilterState),
    /// Resolve the detail record for this entry
    OpenEntry(String),
    /// Persist the filter panel collapsed flag
    PanelToggled(bool),
    Quit,
}

/// Editable filter form fields, in the server's form order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    IpAddress,
    Method,
    StatusCode,
    Path,
    StartDate,
    EndDate,
    QueryParam,
    QueryValue,
}

pub const FORM_FIELDS: [FormField; 8] = [
    FormField::IpAddress,
    FormField::Method,
    FormField::StatusCode,
    FormField::Path,
    FormField::StartDate,
    FormField::EndDate,
    FormField::QueryParam,
    FormField::QueryValue,
];

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::IpAddress => "IP address",
            FormField::Method => "Method",
            FormField::StatusCode => "Status code",
            FormField::Path => "Path",
            FormField::StartDate => "Start date",
            FormField::EndDate => "End date",
            FormField::QueryParam => "Query param",
            FormField::QueryValue => "Query value",
        }
    }
}

/// Text buffers backing the filter form
#[derive(Debug, Clone)]
pub struct FilterForm {
    values: Vec<String>,
    pub focus: usize,
}

impl FilterForm {
    pub fn new() -> Self {
        Self {
            values: vec![String::new(); FORM_FIELDS.len()],
            focus: 0,
        }
    }

    pub fn from_state(state: &FilterState) -> Self {
        let mut form = Self::new();
        form.set_state(state);
        form
    }

    pub fn value(&self, field: FormField) -> &str {
        let idx = FORM_FIELDS.iter().position(|f| *f == field).unwrap_or(0);
        &self.values[idx]
    }

    pub fn focused(&self) -> FormField {
        FORM_FIELDS[self.focus]
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % FORM_FIELDS.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.values[self.focus].push(c);
    }

    pub fn backspace(&mut self) {
        self.values[self.focus].pop();
    }

    pub fn set_state(&mut self, state: &FilterState) {
        let set = |opt: &Option<String>| opt.clone().unwrap_or_default();
        self.values = vec![
            set(&state.ip_address),
            set(&state.method),
            state.status_code.map(|c| c.to_string()).unwrap_or_default(),
            set(&state.path),
            state
                .start_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            state
                .end_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            set(&state.query_param),
            set(&state.query_value),
        ];
    }

    /// Build a FilterState from the buffers. Blank fields are unset;
    /// an unparseable status code or date is treated as unset too,
    /// with a warning, rather than blocking the submission.
    pub fn to_state(&self) -> FilterState {
        let text = |idx: usize| {
            let v = self.values[idx].trim();
            if v.is_empty() {
                None
            } else {
                Some(v.to_string())
            }
        };
        let status_code = self.values[2].trim().parse::<u16>().ok().or_else(|| {
            if !self.values[2].trim().is_empty() {
                tracing::warn!(value = %self.values[2], "ignoring unparseable status code");
            }
            None
        });
        let date = |idx: usize| {
            let v = self.values[idx].trim();
            if v.is_empty() {
                return None;
            }
            match NaiveDate::parse_from_str(v, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    tracing::warn!(value = %v, "ignoring unparseable date");
                    None
                }
            }
        };

        FilterState {
            ip_address: text(0),
            method: text(1),
            status_code,
            path: text(3),
            start_date: date(4),
            end_date: date(5),
            query_param: text(6),
            query_value: text(7),
        }
    }
}

/// Dashboard application state
pub struct App {
    pub file_id: u64,
    pub form: FilterForm,
    pub filter_collapsed: bool,
    pub focus: Focus,
    pub rows: Vec<TableRow>,
    pub overlay: TableOverlay,
    pub selected: usize,
    pub total_entries: u64,
    pub charts: ChartSync,
    pub history: History,
    pub modal: ModalState,
    pub should_quit: bool,
    /// Charts are seeded once, from the first successful payload
    bootstrapped: bool,
}

impl App {
    pub fn new(file_id: u64, initial: FilterState, filter_collapsed: bool) -> Self {
        Self {
            file_id,
            form: FilterForm::from_state(&initial),
            filter_collapsed,
            focus: Focus::Table,
            rows: Vec::new(),
            overlay: TableOverlay::Loading,
            selected: 0,
            total_entries: 0,
            charts: ChartSync::new(),
            history: History::new(),
            modal: ModalState::Closed,
            should_quit: false,
            bootstrapped: false,
        }
    }

    /// Text for the count badge above the table
    pub fn count_badge(&self) -> String {
        format!("{} entries found", self.total_entries)
    }

    /// Handle an event, possibly returning work for the runner
    pub fn handle_event(&mut self, event: AppEvent) -> Option<Action> {
        match event {
            AppEvent::FilterCompleted { state, result } => {
                self.on_filter_completed(state, result);
                None
            }
            AppEvent::DetailCompleted { entry_id, result } => {
                self.on_detail_completed(&entry_id, result);
                None
            }
            AppEvent::Key(key) => self.handle_key(key),
        }
    }

    /// Begin a filter application: show the loading indicator and hand
    /// the request to the runner.
    fn submit_filter(&mut self, state: FilterState) -> Option<Action> {
        self.overlay = TableOverlay::Loading;
        Some(Action::SubmitFilter(state))
    }

    /// Apply a successful filter payload. Order matters and is part of
    /// the contract: table swap first (which also rebuilds the
    /// row-to-entry bindings), then both charts, then count and
    /// address.
    ///
    /// `state` is the filter this payload answers, carried with the
    /// response itself: when two requests overlap, each arrival is
    /// recorded under its own state, so the address always matches the
    /// view shown. History navigation re-applies the entry already at
    /// the current position and `History::push` drops the duplicate.
    fn on_filter_completed(&mut self, state: FilterState, result: Result<FilteredResults, ApiError>) {
        match result {
            Ok(results) => {
                self.rows = fragment::parse_rows(&results.html);
                if self.selected >= self.rows.len() {
                    self.selected = self.rows.len().saturating_sub(1);
                }
                self.overlay = TableOverlay::None;

                if self.bootstrapped {
                    self.charts.update_status(&results.status_chart_data);
                    self.charts.update_method(&results.method_chart_data);
                } else {
                    self.charts.init_status(Some(&results.status_chart_data));
                    self.charts.init_method(Some(&results.method_chart_data));
                    self.bootstrapped = true;
                }

                self.total_entries = results.total_entries;
                self.history.push(state);
            }
            Err(err) => {
                // Prior rows, charts and count stay untouched
                self.overlay = TableOverlay::Error(format!("Failed to filter logs: {}", err));
            }
        }
    }

    /// Apply a detail resolution, but only if the modal is still
    /// waiting for this identifier. A late response for a superseded
    /// entry is discarded; its record is already in the cache, so the
    /// next open of that entry is instant anyway.
    fn on_detail_completed(&mut self, entry_id: &str, result: Result<EntryDetail, ApiError>) {
        let active = match &self.modal {
            ModalState::Loading { entry_id } => entry_id.clone(),
            _ => {
                tracing::debug!(entry_id, "discarding detail result, modal moved on");
                return;
            }
        };
        if active != entry_id {
            tracing::debug!(entry_id, %active, "discarding stale detail result");
            return;
        }

        self.modal = match result {
            Ok(record) => ModalState::Populated {
                entry_id: entry_id.to_string(),
                record,
            },
            Err(err) => ModalState::Errored {
                entry_id: entry_id.to_string(),
                message: format!("Failed to load log entry details: {}", err),
            },
        };
    }

    /// Open the modal for the selected row, always restarting at the
    /// loading state.
    fn open_selected(&mut self) -> Option<Action> {
        let row = self.rows.get(self.selected)?;
        let entry_id = row.entry_id.clone();
        self.modal = ModalState::Loading {
            entry_id: entry_id.clone(),
        };
        Some(Action::OpenEntry(entry_id))
    }

    fn toggle_panel(&mut self) -> Option<Action> {
        self.filter_collapsed = !self.filter_collapsed;
        if self.filter_collapsed && self.focus == Focus::Form {
            self.focus = Focus::Table;
        }
        Some(Action::PanelToggled(self.filter_collapsed))
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        // Quit works everywhere
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Some(Action::Quit);
        }

        // Modal swallows input while open
        if self.modal != ModalState::Closed {
            return self.handle_modal_key(key);
        }

        match self.focus {
            Focus::Form => self.handle_form_key(key),
            Focus::Table => self.handle_table_key(key),
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.modal = ModalState::Closed;
                None
            }
            // Reopen is the only retry path after a failed fetch
            KeyCode::Char('r') => {
                if let ModalState::Errored { entry_id, .. } = &self.modal {
                    let entry_id = entry_id.clone();
                    self.modal = ModalState::Loading {
                        entry_id: entry_id.clone(),
                    };
                    Some(Action::OpenEntry(entry_id))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => {
                self.focus = Focus::Table;
                None
            }
            KeyCode::Up => {
                self.form.prev_field();
                None
            }
            KeyCode::Down => {
                self.form.next_field();
                None
            }
            KeyCode::Backspace => {
                self.form.backspace();
                None
            }
            KeyCode::Enter => {
                let state = self.form.to_state();
                self.submit_filter(state)
            }
            KeyCode::Char(c) => {
                self.form.insert_char(c);
                None
            }
            _ => None,
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Some(Action::Quit)
            }
            KeyCode::Char('f') => self.toggle_panel(),
            KeyCode::Tab => {
                if self.filter_collapsed {
                    self.filter_collapsed = false;
                    self.focus = Focus::Form;
                    Some(Action::PanelToggled(false))
                } else {
                    self.focus = Focus::Form;
                    None
                }
            }
            KeyCode::Enter => self.open_selected(),
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.rows.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::PageUp => {
                self.selected = self.selected.saturating_sub(10);
                None
            }
            KeyCode::PageDown => {
                self.selected = (self.selected + 10).min(self.rows.len().saturating_sub(1));
                None
            }
            KeyCode::Home => {
                self.selected = 0;
                None
            }
            KeyCode::End => {
                self.selected = self.rows.len().saturating_sub(1);
                None
            }
            // Back/forward through the filter history. The stored
            // state is re-applied; its completion pushes the same
            // state back at the current position, which History drops
            // as a duplicate.
            KeyCode::Char('[') => {
                let state = self.history.back()?;
                self.form.set_state(&state);
                self.submit_filter(state)
            }
            KeyCode::Char(']') => {
                let state = self.history.forward()?;
                self.form.set_state(&state);
                self.submit_filter(state)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logboard_common::ChartData;
    use ratatui::style::Color;

    fn payload(total: u64, status: (&[&str], &[u64]), method: (&[&str], &[u64])) -> FilteredResults {
        FilteredResults {
            html: r#"<tr class="log-entry" data-entry-id="17"><td>10.0.0.1</td></tr>
                     <tr class="log-entry" data-entry-id="42"><td>10.0.0.2</td></tr>"#
                .to_string(),
            status_chart_data: ChartData::new(
                status.0.iter().map(|s| s.to_string()).collect(),
                status.1.to_vec(),
            ),
            method_chart_data: ChartData::new(
                method.0.iter().map(|s| s.to_string()).collect(),
                method.1.to_vec(),
            ),
            total_entries: total,
        }
    }

    fn detail(path: &str) -> EntryDetail {
        EntryDetail {
            ip_address: "10.0.0.1".to_string(),
            timestamp: "2025-03-01 12:00:00".to_string(),
            method: "GET".to_string(),
            path: path.to_string(),
            protocol: None,
            status_code: 200,
            response_size: 100,
            user_agent: "test".to_string(),
            referrer: None,
            parameters: vec![],
        }
    }

    fn status_filter(code: u16) -> FilterState {
        FilterState {
            status_code: Some(code),
            ..Default::default()
        }
    }

    fn completed(state: FilterState, results: FilteredResults) -> AppEvent {
        AppEvent::FilterCompleted {
            state,
            result: Ok(results),
        }
    }

    fn bootstrapped_app() -> App {
        let mut app = App::new(1, FilterState::default(), true);
        app.handle_event(completed(
            FilterState::default(),
            payload(2, (&["200"], &[2]), (&["GET"], &[2])),
        ));
        app
    }

    #[test]
    fn test_successful_filter_updates_everything() {
        let mut app = App::new(1, FilterState::default(), true);
        assert_eq!(app.overlay, TableOverlay::Loading);

        app.handle_event(completed(
            status_filter(404),
            payload(3, (&["404"], &[3]), (&["GET", "POST"], &[2, 1])),
        ));

        assert_eq!(app.overlay, TableOverlay::None);
        assert_eq!(app.rows.len(), 2);
        assert_eq!(app.rows[0].entry_id, "17");
        assert_eq!(app.count_badge(), "3 entries found");
        assert_eq!(app.history.len(), 1);

        // One status bar, labeled 404, in the client-error band
        let status = app.charts.status_widget().unwrap();
        assert_eq!(status.labels, vec!["404"]);
        assert_eq!(status.values, vec![3]);
        assert_eq!(status.colors, vec![Color::Yellow]);
    }

    #[test]
    fn test_failed_filter_leaves_prior_state_untouched() {
        let mut app = bootstrapped_app();
        let rows_before = app.rows.clone();
        let status_before = app.charts.status_widget().unwrap().clone();
        let count_before = app.total_entries;

        app.submit_filter(status_filter(500));
        app.handle_event(AppEvent::FilterCompleted {
            state: status_filter(500),
            result: Err(ApiError::Network("connection refused".to_string())),
        });

        assert_eq!(app.rows, rows_before);
        assert_eq!(app.charts.status_widget().unwrap(), &status_before);
        assert_eq!(app.total_entries, count_before);
        assert!(matches!(app.overlay, TableOverlay::Error(_)));
        // The failed filter is not part of the history
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn test_modal_opens_in_loading_state() {
        let mut app = bootstrapped_app();
        let action = app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Enter)));

        assert_eq!(action, Some(Action::OpenEntry("17".to_string())));
        assert_eq!(
            app.modal,
            ModalState::Loading {
                entry_id: "17".to_string()
            }
        );
    }

    #[test]
    fn test_modal_populates_on_matching_resolution() {
        let mut app = bootstrapped_app();
        app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Enter)));

        app.handle_event(AppEvent::DetailCompleted {
            entry_id: "17".to_string(),
            result: Ok(detail("/index.html")),
        });

        match &app.modal {
            ModalState::Populated { entry_id, record } => {
                assert_eq!(entry_id, "17");
                assert_eq!(record.path, "/index.html");
            }
            other => panic!("expected Populated, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_detail_resolution_is_discarded() {
        let mut app = bootstrapped_app();

        // Open entry 17, then move on to entry 42 before it resolves
        app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Enter)));
        app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Esc)));
        app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Down)));
        app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Enter)));

        // The late response for 17 must not clobber the newer modal
        app.handle_event(AppEvent::DetailCompleted {
            entry_id: "17".to_string(),
            result: Ok(detail("/stale")),
        });
        assert_eq!(
            app.modal,
            ModalState::Loading {
                entry_id: "42".to_string()
            }
        );

        app.handle_event(AppEvent::DetailCompleted {
            entry_id: "42".to_string(),
            result: Ok(detail("/fresh")),
        });
        match &app.modal {
            ModalState::Populated { record, .. } => assert_eq!(record.path, "/fresh"),
            other => panic!("expected Populated, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_detail_fetch_shows_single_error() {
        let mut app = bootstrapped_app();
        app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Enter)));

        app.handle_event(AppEvent::DetailCompleted {
            entry_id: "17".to_string(),
            result: Err(ApiError::FetchFailure {
                entry_id: "17".to_string(),
                reason: "request failed: timeout".to_string(),
            }),
        });

        match &app.modal {
            ModalState::Errored { entry_id, message } => {
                assert_eq!(entry_id, "17");
                assert!(message.contains("Failed to load log entry details"));
            }
            other => panic!("expected Errored, got {:?}", other),
        }
    }

    #[test]
    fn test_retry_from_errored_modal_restarts_loading() {
        let mut app = bootstrapped_app();
        app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Enter)));
        app.handle_event(AppEvent::DetailCompleted {
            entry_id: "17".to_string(),
            result: Err(ApiError::Network("boom".to_string())),
        });

        let action = app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Char('r'))));
        assert_eq!(action, Some(Action::OpenEntry("17".to_string())));
        assert_eq!(
            app.modal,
            ModalState::Loading {
                entry_id: "17".to_string()
            }
        );
    }

    #[test]
    fn test_history_navigation_does_not_repush() {
        let mut app = bootstrapped_app();

        // Apply a second filter so there is somewhere to go back to
        app.submit_filter(status_filter(404));
        app.handle_event(completed(
            status_filter(404),
            payload(1, (&["404"], &[1]), (&["GET"], &[1])),
        ));
        assert_eq!(app.history.len(), 2);

        let action = app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Char('['))));
        assert_eq!(action, Some(Action::SubmitFilter(FilterState::default())));
        app.handle_event(completed(
            FilterState::default(),
            payload(2, (&["200"], &[2]), (&["GET"], &[2])),
        ));

        assert_eq!(app.history.len(), 2);
        assert_eq!(app.history.current(), Some(&FilterState::default()));
    }

    #[test]
    fn test_overlapping_filters_keep_view_and_address_paired() {
        let mut app = bootstrapped_app();

        // Two submissions overlap; their responses arrive out of order
        app.submit_filter(status_filter(404));
        app.submit_filter(status_filter(500));

        app.handle_event(completed(
            status_filter(500),
            payload(5, (&["500"], &[5]), (&["GET"], &[5])),
        ));
        app.handle_event(completed(
            status_filter(404),
            payload(3, (&["404"], &[3]), (&["GET"], &[3])),
        ));

        // The late arrival wins the view, and the address follows it:
        // whatever is shown, the history entry is the state that
        // produced it
        assert_eq!(app.total_entries, 3);
        assert_eq!(
            app.charts.status_widget().unwrap().labels,
            vec!["404".to_string()]
        );
        assert_eq!(app.history.current(), Some(&status_filter(404)));
        assert_eq!(
            app.history.current_address(),
            Some("status_code=404")
        );
    }

    #[test]
    fn test_panel_toggle_reports_new_state() {
        let mut app = bootstrapped_app();
        assert!(app.filter_collapsed);

        let action = app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Char('f'))));
        assert_eq!(action, Some(Action::PanelToggled(false)));
        assert!(!app.filter_collapsed);
    }

    #[test]
    fn test_form_submit_uses_typed_fields() {
        let mut app = bootstrapped_app();
        app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Tab)));
        assert_eq!(app.focus, Focus::Form);

        // Move to the status code field and type a code
        app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Down)));
        app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Down)));
        for c in "404".chars() {
            app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Char(c))));
        }

        let action = app.handle_event(AppEvent::Key(KeyEvent::from(KeyCode::Enter)));
        assert_eq!(
            action,
            Some(Action::SubmitFilter(FilterState {
                status_code: Some(404),
                ..Default::default()
            }))
        );
        assert_eq!(app.overlay, TableOverlay::Loading);
    }
}
