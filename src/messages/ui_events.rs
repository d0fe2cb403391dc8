//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::navigation::Page;

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Page navigation
    OpenComposer,
    OpenResponseViewer,
    CancelComposer,
    GoBack,

    // Field navigation
    NextField,
    PrevField,
    ScrollUp,
    ScrollDown,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,

    // Request actions
    SendRequest,
    CycleMethod,
    NextResourceType,
    PrevResourceType,
    ClearResourceType,
    SaveBaseUrl,

    // Headers
    NextHeader,
    PrevHeader,
    OpenHeaderPrompt,
    HeaderPromptChar(char),
    HeaderPromptBackspace,
    ConfirmHeaderPrompt,
    CancelHeaderPrompt,
    RenameHeader,
    DeleteHeader,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Composer form fields, in tab order
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Field {
    #[default]
    BaseUrl,
    ApiKey,
    ApiSecret,
    Method,
    ResourceType,
    CustomType,
    Url,
    Headers,
    Body,
    QueryParams,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::BaseUrl,
        Field::ApiKey,
        Field::ApiSecret,
        Field::Method,
        Field::ResourceType,
        Field::CustomType,
        Field::Url,
        Field::Headers,
        Field::Body,
        Field::QueryParams,
    ];

    pub fn next(&self) -> Field {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Field {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::BaseUrl => "Base URL",
            Field::ApiKey => "API Key",
            Field::ApiSecret => "API Secret",
            Field::Method => "Method",
            Field::ResourceType => "Resource type",
            Field::CustomType => "Custom type",
            Field::Url => "URL",
            Field::Headers => "Headers",
            Field::Body => "Body (JSON)",
            Field::QueryParams => "Query params",
        }
    }

    /// Whether `e` opens a text editor on this field
    pub fn is_text(&self) -> bool {
        !matches!(self, Field::Method | Field::ResourceType)
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Which half of the selected header is being edited
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum HeaderEdit {
    Key,
    #[default]
    Value,
}

/// UI context needed to map a key press
#[derive(Clone, Copy, Debug)]
pub struct KeyContext {
    pub page: Page,
    pub field: Field,
    pub input_mode: InputMode,
    pub show_help: bool,
    pub header_prompt_open: bool,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(key: KeyEvent, ctx: KeyContext) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('s') if ctx.page == Page::Composer => return Some(UiEvent::SaveBaseUrl),
            _ => {}
        }
    }
    if key.modifiers.contains(KeyModifiers::ALT) && key.code == KeyCode::Left {
        return Some(UiEvent::GoBack);
    }

    if ctx.show_help {
        return Some(UiEvent::CloseHelp);
    }

    if ctx.header_prompt_open {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::CancelHeaderPrompt),
            KeyCode::Enter => Some(UiEvent::ConfirmHeaderPrompt),
            KeyCode::Backspace => Some(UiEvent::HeaderPromptBackspace),
            KeyCode::Char(c) => Some(UiEvent::HeaderPromptChar(c)),
            _ => None,
        };
    }

    match ctx.page {
        Page::Dashboard => handle_dashboard_keys(key),
        Page::Composer => handle_composer_keys(key, ctx.field, ctx.input_mode),
        Page::ResponseViewer => handle_viewer_keys(key),
    }
}

fn handle_dashboard_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Char('n') | KeyCode::Enter => Some(UiEvent::OpenComposer),
        KeyCode::Char('b') | KeyCode::Backspace => Some(UiEvent::GoBack),
        _ => None,
    }
}

fn handle_composer_keys(key: KeyEvent, field: Field, input_mode: InputMode) -> Option<UiEvent> {
    match input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => Some(UiEvent::Quit),
            KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
            KeyCode::Tab | KeyCode::Down if field != Field::Headers => Some(UiEvent::NextField),
            KeyCode::BackTab | KeyCode::Up if field != Field::Headers => Some(UiEvent::PrevField),
            KeyCode::Tab => Some(UiEvent::NextField),
            KeyCode::BackTab => Some(UiEvent::PrevField),
            KeyCode::Esc => Some(UiEvent::CancelComposer),
            KeyCode::Char('b') => Some(UiEvent::GoBack),
            KeyCode::Char('s') => Some(UiEvent::SendRequest),
            KeyCode::Char('v') => Some(UiEvent::OpenResponseViewer),
            KeyCode::Char('m') => Some(UiEvent::CycleMethod),
            KeyCode::PageUp => Some(UiEvent::ScrollUp),
            KeyCode::PageDown => Some(UiEvent::ScrollDown),
            KeyCode::Char('e') | KeyCode::Enter if field.is_text() => Some(UiEvent::StartEditing),
            KeyCode::Right | KeyCode::Enter if field == Field::Method => Some(UiEvent::CycleMethod),
            KeyCode::Right if field == Field::ResourceType => Some(UiEvent::NextResourceType),
            KeyCode::Left if field == Field::ResourceType => Some(UiEvent::PrevResourceType),
            KeyCode::Char('x') | KeyCode::Delete if field == Field::ResourceType => {
                Some(UiEvent::ClearResourceType)
            }
            KeyCode::Up if field == Field::Headers => Some(UiEvent::PrevHeader),
            KeyCode::Down if field == Field::Headers => Some(UiEvent::NextHeader),
            KeyCode::Char('a') if field == Field::Headers => Some(UiEvent::OpenHeaderPrompt),
            KeyCode::Char('r') if field == Field::Headers => Some(UiEvent::RenameHeader),
            KeyCode::Char('d') if field == Field::Headers => Some(UiEvent::DeleteHeader),
            _ => None,
        },
        InputMode::Editing => match key.code {
            KeyCode::Esc => Some(UiEvent::StopEditing),
            KeyCode::Left => Some(UiEvent::CursorLeft),
            KeyCode::Right => Some(UiEvent::CursorRight),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            KeyCode::Enter if field == Field::Body => Some(UiEvent::CharInput('\n')),
            KeyCode::Enter => Some(UiEvent::StopEditing),
            KeyCode::Tab => Some(UiEvent::NextField),
            _ => None,
        },
    }
}

fn handle_viewer_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => Some(UiEvent::GoBack),
        KeyCode::Up => Some(UiEvent::ScrollUp),
        KeyCode::Down => Some(UiEvent::ScrollDown),
        _ => None,
    }
}
