//! Render state - data structure sent from App layer to UI for rendering

use crate::messages::ui_events::{Field, HeaderEdit, InputMode};
use crate::models::RequestDraft;
use crate::navigation::Page;
use crate::result::ExecutionResult;

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    // Navigation
    pub page: Page,
    pub can_go_back: bool,

    // Session
    pub base_url: String,
    pub api_key: String,
    /// Secret length only; the secret itself never leaves the app layer
    pub api_secret_len: usize,

    // Draft
    pub draft: RequestDraft,
    pub catalog_len: usize,

    // UI state
    pub active_field: Field,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    /// Same position counted in characters
    pub cursor_column: usize,
    pub selected_header: usize,
    pub header_edit: HeaderEdit,
    pub header_prompt: Option<String>,
    /// Pending name for the selected header while it is being renamed
    pub header_rename: Option<String>,

    // Result
    pub result: Option<ExecutionResult>,
    pub time_ms: u64,
    pub response_scroll: u16,
    pub is_loading: bool,

    // Dashboard
    pub last_request: Option<String>,

    // Status line and popups
    pub status_message: Option<String>,
    pub show_help: bool,
}
