//! Command handlers - business logic for processing UI events

use crate::app::state::{HeaderRename, PendingRequest};
use crate::app::AppState;
use crate::constants::DEFAULT_BODY;
use crate::executor::{prepare, settle, PreparedRequest};
use crate::messages::ui_events::{Field, HeaderEdit, InputMode};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{RequestDraft, ResourceType};
use crate::navigation::Page;

impl AppState {
    // ========================
    // Page navigation
    // ========================

    /// Open the composer, seeded with the last issued request if any
    pub fn open_composer(&mut self) {
        let snapshot = self
            .tracker
            .last_issued
            .as_ref()
            .map(|issued| self.draft_from_issued(&issued.request));

        self.draft = snapshot.clone().unwrap_or_default();
        self.history.goto(Page::Composer, snapshot);
        self.active_field = Field::default();
        self.input_mode = InputMode::Normal;
        self.header_edit = HeaderEdit::Value;
        self.header_rename = None;
        self.selected_header = 0;
        self.status_message = None;
    }

    pub fn open_response_viewer(&mut self) {
        self.stop_editing();
        self.history.stash(self.draft.clone());
        self.history.goto(Page::ResponseViewer, None);
        self.response_scroll = 0;
    }

    /// Leave the composer for the dashboard; going back restores the edits
    pub fn cancel_composer(&mut self) {
        self.stop_editing();
        self.history.stash(self.draft.clone());
        self.history.goto(Page::Dashboard, None);
    }

    pub fn go_back(&mut self) {
        self.stop_editing();
        self.header_prompt = None;
        if self.history.current_page() == Page::Composer {
            self.history.stash(self.draft.clone());
        }

        if let Some(entry) = self.history.go_back() {
            if entry.page == Page::Composer {
                if let Some(snapshot) = &entry.snapshot {
                    self.draft.restore(snapshot);
                }
            }
        }
        self.clamp_header_selection();
    }

    /// Rebuild an editable draft from a request that went out
    fn draft_from_issued(&self, request: &PreparedRequest) -> RequestDraft {
        let resource_type = if self.catalog.contains(&request.resource_type) {
            ResourceType::Selected(request.resource_type.clone())
        } else {
            ResourceType::Custom(request.resource_type.clone())
        };

        let headers = request
            .headers
            .iter()
            .filter(|(key, _)| key.as_str() != "Authorization" && key.as_str() != "Content-Type")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        RequestDraft {
            method: request.method,
            resource_type,
            url: request.url.clone(),
            headers,
            body: if request.body.is_empty() {
                String::from(DEFAULT_BODY)
            } else {
                request.body.clone()
            },
            query_params: request.query_params.clone(),
        }
    }

    // ========================
    // Field navigation
    // ========================

    pub fn next_field(&mut self) {
        self.stop_editing();
        self.active_field = self.active_field.next();
    }

    pub fn prev_field(&mut self) {
        self.stop_editing();
        self.active_field = self.active_field.prev();
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self) {
        if self.is_loading() {
            return;
        }
        match self.active_field {
            Field::Method | Field::ResourceType => return,
            Field::Body if !self.draft.method.has_body() => {
                self.status_message = Some(String::from("Body is not sent with GET"));
                return;
            }
            Field::Headers if self.draft.headers.is_empty() => {
                self.status_message = Some(String::from("No headers yet - press 'a' to add one"));
                return;
            }
            Field::Headers => self.header_edit = HeaderEdit::Value,
            _ => {}
        }
        self.input_mode = InputMode::Editing;
        self.cursor_position = self.current_input().len();
    }

    pub fn stop_editing(&mut self) {
        self.commit_header_rename();
        self.input_mode = InputMode::Normal;
        self.header_edit = HeaderEdit::Value;
    }

    pub fn move_cursor_left(&mut self) {
        let input = self.current_input();
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let input = self.current_input();
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let mut input = self.current_input();
        let cursor_pos = self.cursor_position.min(input.len());
        input.insert(cursor_pos, c);
        self.cursor_position = cursor_pos + c.len_utf8();
        self.set_current_input(input);
    }

    pub fn delete_char(&mut self) {
        let mut input = self.current_input();
        let cursor_pos = self.cursor_position.min(input.len());
        if cursor_pos > 0 {
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev_pos);
            self.cursor_position = prev_pos;
            self.set_current_input(input);
        }
    }

    // ========================
    // Method and resource type
    // ========================

    pub fn cycle_method(&mut self) {
        if !self.is_loading() {
            self.draft.set_method(self.draft.method.next());
        }
    }

    pub fn next_resource_type(&mut self) {
        if self.catalog.is_empty() {
            return;
        }
        let next = match self.catalog_position() {
            Some(i) => (i + 1) % self.catalog.len(),
            None => 0,
        };
        let name = self.catalog[next].clone();
        self.draft.set_resource_type(&name);
    }

    pub fn prev_resource_type(&mut self) {
        if self.catalog.is_empty() {
            return;
        }
        let prev = match self.catalog_position() {
            Some(0) | None => self.catalog.len() - 1,
            Some(i) => i - 1,
        };
        let name = self.catalog[prev].clone();
        self.draft.set_resource_type(&name);
    }

    pub fn clear_resource_type(&mut self) {
        self.draft.set_resource_type("");
    }

    fn catalog_position(&self) -> Option<usize> {
        let selected = self.draft.resource_type.selected();
        self.catalog.iter().position(|name| name == selected)
    }

    // ========================
    // Settings
    // ========================

    pub fn save_base_url(&mut self) {
        match self.settings.save_base_url(&self.session.base_url) {
            Ok(()) => {
                tracing::info!(base_url = %self.session.base_url, "Saved base URL");
                self.status_message = Some(String::from("Base URL saved"));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not save base URL");
                self.status_message = Some(format!("Could not save base URL: {}", e));
            }
        }
    }

    // ========================
    // Headers
    // ========================

    pub fn next_header(&mut self) {
        if !self.draft.headers.is_empty() {
            self.selected_header = (self.selected_header + 1) % self.draft.headers.len();
        }
    }

    pub fn prev_header(&mut self) {
        if !self.draft.headers.is_empty() {
            self.selected_header = self
                .selected_header
                .checked_sub(1)
                .unwrap_or(self.draft.headers.len() - 1);
        }
    }

    pub fn open_header_prompt(&mut self) {
        self.header_prompt = Some(String::new());
    }

    pub fn header_prompt_char(&mut self, c: char) {
        if let Some(prompt) = self.header_prompt.as_mut() {
            prompt.push(c);
        }
    }

    pub fn header_prompt_backspace(&mut self) {
        if let Some(prompt) = self.header_prompt.as_mut() {
            prompt.pop();
        }
    }

    pub fn confirm_header_prompt(&mut self) {
        if let Some(key) = self.header_prompt.take() {
            let key = key.trim();
            self.draft.add_header(key);
            self.select_header_key(key);
        }
    }

    pub fn cancel_header_prompt(&mut self) {
        self.header_prompt = None;
    }

    /// Start editing the selected header's name
    pub fn rename_header(&mut self) {
        if self.is_loading() {
            return;
        }
        let Some(key) = self.selected_header_key() else {
            return;
        };
        self.header_rename = Some(HeaderRename {
            original: key.clone(),
            text: key,
        });
        self.header_edit = HeaderEdit::Key;
        self.input_mode = InputMode::Editing;
        self.cursor_position = self.current_input().len();
    }

    /// Apply a finished rename. A blank name leaves the header as it was.
    fn commit_header_rename(&mut self) {
        let Some(HeaderRename { original, text }) = self.header_rename.take() else {
            return;
        };
        let new_key = text.trim();
        if new_key.is_empty() || new_key == original {
            return;
        }
        self.draft.rename_header(&original, new_key);
        self.select_header_key(new_key);
    }

    pub fn delete_header(&mut self) {
        if let Some(key) = self.selected_header_key() {
            self.draft.remove_header(&key);
            self.clamp_header_selection();
        }
    }

    fn clamp_header_selection(&mut self) {
        let len = self.draft.headers.len();
        if self.selected_header >= len {
            self.selected_header = len.saturating_sub(1);
        }
    }

    // ========================
    // Response scrolling
    // ========================

    pub fn scroll_up(&mut self) {
        self.response_scroll = self.response_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.response_scroll = self.response_scroll.saturating_add(1);
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Request sending
    // ========================

    /// Validate the draft and, if it passes, hand it to the network layer.
    ///
    /// Returns `None` while a request is in flight or when validation fails;
    /// a validation failure is published to the result state right away.
    pub fn prepare_request(&mut self) -> Option<NetworkCommand> {
        if self.is_loading() {
            return None;
        }

        let busy = self.busy.raise();
        self.status_message = None;
        self.response_scroll = 0;

        match prepare(&self.draft, &self.session) {
            Ok(request) => {
                let id = self.next_id();
                tracing::info!(
                    id,
                    method = %request.method,
                    url = %request.url,
                    "Dispatching request"
                );
                self.pending = Some(PendingRequest {
                    id,
                    request: request.clone(),
                    _busy: busy,
                });
                Some(NetworkCommand::ExecuteRequest { id, request })
            }
            Err(err) => {
                self.time_ms = 0;
                settle(&mut self.results, &mut self.tracker, Err(err.into()));
                drop(busy);
                None
            }
        }
    }

    // ========================
    // Response handling
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) {
        // Only the pending request may publish
        if self.pending.as_ref().map(|p| p.id) != Some(response.id()) {
            tracing::debug!(id = response.id(), "Ignoring response for stale request");
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        self.time_ms = response.time_ms();
        match response.into_outcome() {
            Ok(payload) => settle(
                &mut self.results,
                &mut self.tracker,
                Ok((&pending.request, payload)),
            ),
            Err(err) => settle(&mut self.results, &mut self.tracker, Err(err)),
        }
        // Dropping `pending` lowers the busy flag.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Settings, SettingsStore};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// In-memory settings so tests never touch the home directory
    #[derive(Clone, Default)]
    struct MemorySettings(Arc<Mutex<Settings>>);

    impl SettingsStore for MemorySettings {
        fn load(&self) -> Settings {
            self.0.lock().unwrap().clone()
        }

        fn save(&self, settings: &Settings) -> anyhow::Result<()> {
            *self.0.lock().unwrap() = settings.clone();
            Ok(())
        }
    }

    fn state() -> AppState {
        AppState::new(Box::new(MemorySettings::default()))
    }

    fn ready_state() -> AppState {
        let mut state = state();
        state.open_composer();
        state.session.base_url = String::from("https://erp.example.com");
        state.session.api_key = String::from("key");
        state.session.api_secret = String::from("secret");
        state.draft.set_resource_type("Customer");
        state
    }

    #[test]
    fn test_remembered_base_url_seeds_session() {
        let store = MemorySettings::default();
        store.save_base_url("https://erp.example.com").unwrap();
        let state = AppState::new(Box::new(store));
        assert_eq!(state.session.base_url, "https://erp.example.com");
        assert!(state.session.api_key.is_empty());
    }

    #[test]
    fn test_save_base_url_writes_store() {
        let store = MemorySettings::default();
        let mut state = AppState::new(Box::new(store.clone()));
        state.session.base_url = String::from("https://erp.example.com");
        state.save_base_url();
        assert_eq!(store.load_base_url().as_deref(), Some("https://erp.example.com"));
        assert_eq!(state.status_message.as_deref(), Some("Base URL saved"));
    }

    #[test]
    fn test_validation_failure_never_dispatches() {
        let mut state = ready_state();
        state.session.api_key.clear();
        assert!(state.prepare_request().is_none());
        assert_eq!(state.results.error(), Some("Please provide API Key and API Secret"));
        assert!(!state.is_loading());
        assert!(state.pending.is_none());
    }

    #[test]
    fn test_busy_until_response_handled() {
        let mut state = ready_state();
        let cmd = state.prepare_request();
        let Some(NetworkCommand::ExecuteRequest { id, request }) = cmd else {
            panic!("expected a dispatch");
        };
        assert_eq!(request.url, "/api/resource/Customer");
        assert!(state.is_loading());
        assert!(state.prepare_request().is_none());

        state.handle_response(NetworkResponse::Success {
            id,
            payload: json!({"data": []}),
            time_ms: 12,
        });
        assert!(!state.is_loading());
        assert_eq!(state.results.payload(), Some(&json!({"data": []})));
        assert_eq!(state.time_ms, 12);
        assert!(state.tracker.last_issued.is_some());
    }

    #[test]
    fn test_error_response_clears_busy() {
        let mut state = ready_state();
        let id = match state.prepare_request() {
            Some(NetworkCommand::ExecuteRequest { id, .. }) => id,
            _ => panic!("expected a dispatch"),
        };
        state.handle_response(NetworkResponse::Error {
            id,
            message: String::from("Connection failed: refused"),
            time_ms: 3,
        });
        assert!(!state.is_loading());
        assert_eq!(state.results.error(), Some("Connection failed: refused"));
        assert!(state.tracker.last_issued.is_none());
    }

    #[test]
    fn test_stale_response_ignored() {
        let mut state = ready_state();
        let _ = state.prepare_request();
        state.handle_response(NetworkResponse::Success {
            id: 999,
            payload: json!(1),
            time_ms: 0,
        });
        assert!(state.is_loading());
        assert!(state.results.latest().is_none());
    }

    #[test]
    fn test_failure_then_success_leaves_only_success() {
        let mut state = ready_state();
        state.session.base_url.clear();
        assert!(state.prepare_request().is_none());
        assert!(state.results.error().is_some());

        state.session.base_url = String::from("https://erp.example.com");
        let Some(NetworkCommand::ExecuteRequest { id, .. }) = state.prepare_request() else {
            panic!("expected a dispatch");
        };
        state.handle_response(NetworkResponse::Success {
            id,
            payload: json!({"name": "Acme"}),
            time_ms: 1,
        });
        assert_eq!(state.results.error(), None);
        assert!(state.results.payload().is_some());
    }

    #[test]
    fn test_back_from_viewer_restores_edits() {
        let mut state = ready_state();
        state.draft.set_url("/api/resource/Customer/CUST-0001");
        state.open_response_viewer();
        assert_eq!(state.history.current_page(), Page::ResponseViewer);

        state.draft = RequestDraft::default();
        state.go_back();
        assert_eq!(state.history.current_page(), Page::Composer);
        assert_eq!(state.draft.url, "/api/resource/Customer/CUST-0001");
    }

    #[test]
    fn test_cancel_then_back_returns_to_composer() {
        let mut state = ready_state();
        state.cancel_composer();
        assert_eq!(state.history.current_page(), Page::Dashboard);
        state.go_back();
        assert_eq!(state.history.current_page(), Page::Composer);
        assert_eq!(state.draft.url, "/api/resource/Customer");
        state.go_back();
        assert_eq!(state.history.current_page(), Page::Dashboard);
        assert!(!state.history.can_go_back());
    }

    #[test]
    fn test_open_composer_seeds_last_issued_request() {
        let mut state = ready_state();
        state.draft.set_header_value("Accept", "application/json");
        let Some(NetworkCommand::ExecuteRequest { id, .. }) = state.prepare_request() else {
            panic!("expected a dispatch");
        };
        state.handle_response(NetworkResponse::Success {
            id,
            payload: json!({}),
            time_ms: 1,
        });

        state.cancel_composer();
        state.open_composer();
        assert_eq!(state.draft.resource_type, ResourceType::Selected("Customer".into()));
        assert_eq!(state.draft.url, "/api/resource/Customer");
        assert_eq!(state.draft.headers.len(), 1);
        assert_eq!(state.draft.body, DEFAULT_BODY);
    }

    #[test]
    fn test_typing_custom_type_rederives_url() {
        let mut state = ready_state();
        state.active_field = Field::CustomType;
        state.start_editing();
        for c in "Bin".chars() {
            state.enter_char(c);
        }
        assert_eq!(state.draft.resource_type, ResourceType::Custom("Bin".into()));
        assert_eq!(state.draft.url, "/api/resource/Bin");
    }

    #[test]
    fn test_header_prompt_and_rename() {
        let mut state = ready_state();
        state.active_field = Field::Headers;
        state.open_header_prompt();
        for c in "X-A".chars() {
            state.header_prompt_char(c);
        }
        state.confirm_header_prompt();
        assert_eq!(state.draft.headers.get("X-A").map(String::as_str), Some(""));

        state.rename_header();
        state.delete_char();
        state.enter_char('B');
        state.stop_editing();
        assert!(state.draft.headers.contains_key("X-B"));
        assert!(!state.draft.headers.contains_key("X-A"));
        assert_eq!(state.selected_header_key().as_deref(), Some("X-B"));
    }

    #[test]
    fn test_rename_through_existing_key_keeps_that_header() {
        let mut state = ready_state();
        state.draft.set_header_value("X-A", "keep-me");
        state.draft.set_header_value("X-AB", "2");
        state.active_field = Field::Headers;
        state.select_header_key("X-AB");

        state.rename_header();
        state.delete_char();
        // Mid-edit the name reads "X-A"; the draft must not change yet
        assert_eq!(state.current_input(), "X-A");
        assert_eq!(state.draft.headers.get("X-AB").map(String::as_str), Some("2"));
        state.enter_char('C');
        state.stop_editing();

        assert_eq!(state.draft.headers.get("X-A").map(String::as_str), Some("keep-me"));
        assert_eq!(state.draft.headers.get("X-AC").map(String::as_str), Some("2"));
        assert!(!state.draft.headers.contains_key("X-AB"));
        assert_eq!(state.selected_header_key().as_deref(), Some("X-AC"));
        assert!(state.header_rename.is_none());
    }

    #[test]
    fn test_rename_applied_when_leaving_field() {
        let mut state = ready_state();
        state.draft.set_header_value("X-Old", "v");
        state.active_field = Field::Headers;
        state.select_header_key("X-Old");

        state.rename_header();
        for _ in 0..3 {
            state.delete_char();
        }
        for c in "New".chars() {
            state.enter_char(c);
        }
        state.next_field();

        assert_eq!(state.draft.headers.get("X-New").map(String::as_str), Some("v"));
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_blank_rename_keeps_header() {
        let mut state = ready_state();
        state.draft.set_header_value("X-A", "v");
        state.active_field = Field::Headers;
        state.select_header_key("X-A");

        state.rename_header();
        for _ in 0..3 {
            state.delete_char();
        }
        state.stop_editing();

        assert_eq!(state.draft.headers.get("X-A").map(String::as_str), Some("v"));
        assert_eq!(state.draft.headers.len(), 1);
    }

    #[test]
    fn test_cursor_column_counts_characters() {
        let mut state = ready_state();
        state.active_field = Field::Url;
        state.draft.set_url("/api/résumé");
        state.start_editing();
        assert_eq!(state.cursor_position, "/api/résumé".len());
        assert_eq!(state.cursor_column(), 11);

        state.move_cursor_left();
        assert_eq!(state.cursor_column(), 10);
        assert_eq!(state.to_render_state().cursor_column, 10);
    }

    #[test]
    fn test_resource_type_cycles_catalog() {
        let mut state = ready_state();
        state.clear_resource_type();
        state.next_resource_type();
        assert_eq!(state.draft.resource_type.name(), Some(state.catalog[0].as_str()));
        state.prev_resource_type();
        let last = state.catalog.last().cloned().unwrap();
        assert_eq!(state.draft.resource_type.name(), Some(last.as_str()));
        assert_eq!(state.draft.url, format!("/api/resource/{}", last));
    }

    #[test]
    fn test_body_editing_blocked_for_get() {
        let mut state = ready_state();
        state.active_field = Field::Body;
        state.start_editing();
        assert_eq!(state.input_mode, InputMode::Normal);
        state.cycle_method();
        state.start_editing();
        assert_eq!(state.input_mode, InputMode::Editing);
    }
}
