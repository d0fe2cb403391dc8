//! App state - pure data structure with no I/O logic

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::executor::{BusyFlag, BusyGuard, ExchangeObserver, PreparedRequest};
use crate::messages::ui_events::{Field, HeaderEdit, InputMode};
use crate::messages::RenderState;
use crate::models::{RequestDraft, Session};
use crate::navigation::NavigationHistory;
use crate::result::ResultState;
use crate::storage::SettingsStore;

/// The request currently on the wire
pub struct PendingRequest {
    pub id: u64,
    pub request: PreparedRequest,
    /// Keeps the busy flag raised until the response is handled
    pub(crate) _busy: BusyGuard,
}

/// Last successfully issued request, shown on the dashboard
#[derive(Clone, Debug)]
pub struct IssuedRequest {
    pub request: PreparedRequest,
    pub at: DateTime<Utc>,
}

/// Observer the console registers with the executor
#[derive(Debug, Default)]
pub struct ExchangeTracker {
    pub last_issued: Option<IssuedRequest>,
}

impl ExchangeObserver for ExchangeTracker {
    fn request_issued(&mut self, request: &PreparedRequest) {
        tracing::info!(method = %request.method, url = %request.url, "Request issued");
        self.last_issued = Some(IssuedRequest {
            request: request.clone(),
            at: Utc::now(),
        });
    }

    fn response_received(&mut self, payload: Option<&Value>, error: Option<&str>) {
        match (payload, error) {
            (Some(_), _) => tracing::info!("Response received"),
            (None, Some(error)) => tracing::info!(error, "Error response received"),
            (None, None) => {}
        }
    }
}

/// Header name being edited; applied to the draft only when editing ends
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderRename {
    pub original: String,
    pub text: String,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    // Navigation
    pub history: NavigationHistory,

    // Request data
    pub session: Session,
    pub draft: RequestDraft,
    pub catalog: Vec<String>,

    // UI state
    pub active_field: Field,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub selected_header: usize,
    pub header_edit: HeaderEdit,
    pub header_prompt: Option<String>,
    pub header_rename: Option<HeaderRename>,
    pub response_scroll: u16,
    pub show_help: bool,
    pub status_message: Option<String>,

    // Execution
    pub results: ResultState,
    pub time_ms: u64,
    pub busy: BusyFlag,
    pub next_request_id: u64,
    pub pending: Option<PendingRequest>,
    pub tracker: ExchangeTracker,

    // Settings (only the base URL is ever written back)
    pub settings: Box<dyn SettingsStore>,
}

impl AppState {
    /// Fresh session; the remembered base URL and the catalog are read once
    /// from `settings`
    pub fn new(settings: Box<dyn SettingsStore>) -> Self {
        let loaded = settings.load();
        let session = Session {
            base_url: loaded.base_url.clone().unwrap_or_default(),
            ..Session::default()
        };

        AppState {
            history: NavigationHistory::new(),
            session,
            draft: RequestDraft::default(),
            catalog: loaded.resource_catalog(),
            active_field: Field::default(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            selected_header: 0,
            header_edit: HeaderEdit::Value,
            header_prompt: None,
            header_rename: None,
            response_scroll: 0,
            show_help: false,
            status_message: None,
            results: ResultState::new(),
            time_ms: 0,
            busy: BusyFlag::new(),
            next_request_id: 1,
            pending: None,
            tracker: ExchangeTracker::default(),
            settings,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn is_loading(&self) -> bool {
        self.busy.is_busy()
    }

    /// Key of the highlighted header
    pub fn selected_header_key(&self) -> Option<String> {
        self.draft.headers.keys().nth(self.selected_header).cloned()
    }

    /// Get the current input field content
    pub fn current_input(&self) -> String {
        match self.active_field {
            Field::BaseUrl => self.session.base_url.clone(),
            Field::ApiKey => self.session.api_key.clone(),
            Field::ApiSecret => self.session.api_secret.clone(),
            Field::CustomType => self.draft.resource_type.custom().to_string(),
            Field::Url => self.draft.url.clone(),
            Field::Body => self.draft.body.clone(),
            Field::QueryParams => self.draft.query_params.clone(),
            Field::Headers => match (self.selected_header_key(), self.header_edit) {
                (_, HeaderEdit::Key) => self
                    .header_rename
                    .as_ref()
                    .map(|rename| rename.text.clone())
                    .unwrap_or_default(),
                (Some(key), HeaderEdit::Value) => {
                    self.draft.headers.get(&key).cloned().unwrap_or_default()
                }
                (None, HeaderEdit::Value) => String::new(),
            },
            Field::Method | Field::ResourceType => String::new(),
        }
    }

    /// Write edited text back through the matching draft or session mutator
    pub fn set_current_input(&mut self, text: String) {
        match self.active_field {
            Field::BaseUrl => self.session.base_url = text,
            Field::ApiKey => self.session.api_key = text,
            Field::ApiSecret => self.session.api_secret = text,
            Field::CustomType => self.draft.set_custom_resource_type(&text),
            Field::Url => self.draft.set_url(text),
            Field::Body => self.draft.set_body(text),
            Field::QueryParams => self.draft.set_query_params(text),
            Field::Headers => match self.header_edit {
                HeaderEdit::Key => {
                    if let Some(rename) = self.header_rename.as_mut() {
                        rename.text = text;
                    }
                }
                HeaderEdit::Value => {
                    if let Some(key) = self.selected_header_key() {
                        self.draft.set_header_value(&key, text);
                    }
                }
            },
            Field::Method | Field::ResourceType => {}
        }
    }

    /// Cursor position in characters, for placing the terminal cursor
    pub fn cursor_column(&self) -> usize {
        let input = self.current_input();
        let end = self.cursor_position.min(input.len());
        input
            .get(..end)
            .map(|before| before.chars().count())
            .unwrap_or_else(|| input.chars().count())
    }

    /// Point the header selection at `key` (headers are kept sorted)
    pub fn select_header_key(&mut self, key: &str) {
        if let Some(i) = self.draft.headers.keys().position(|k| k == key) {
            self.selected_header = i;
        }
    }

    /// Summary line for the dashboard
    fn last_request_summary(&self) -> Option<String> {
        self.tracker.last_issued.as_ref().map(|issued| {
            format!(
                "{} {} ({})",
                issued.request.method,
                issued.request.url,
                issued.at.format("%H:%M:%S UTC")
            )
        })
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            page: self.history.current_page(),
            can_go_back: self.history.can_go_back(),
            base_url: self.session.base_url.clone(),
            api_key: self.session.api_key.clone(),
            api_secret_len: self.session.api_secret.chars().count(),
            draft: self.draft.clone(),
            catalog_len: self.catalog.len(),
            active_field: self.active_field,
            input_mode: self.input_mode,
            cursor_position: self.cursor_position,
            cursor_column: self.cursor_column(),
            selected_header: self.selected_header,
            header_edit: self.header_edit,
            header_prompt: self.header_prompt.clone(),
            header_rename: self.header_rename.as_ref().map(|r| r.text.clone()),
            result: self.results.latest().cloned(),
            time_ms: self.time_ms,
            response_scroll: self.response_scroll,
            is_loading: self.is_loading(),
            last_request: self.last_request_summary(),
            status_message: self.status_message.clone(),
            show_help: self.show_help,
        }
    }
}
