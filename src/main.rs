//! Resource Console - actor-based request composer for resource APIs
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async HTTP execution

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;

use resource_console::app::AppActor;
use resource_console::constants::{APP_NAME, APP_VERSION, LOG_FILE};
use resource_console::messages::ui_events::{
    key_to_ui_event, Field, HeaderEdit, InputMode, KeyContext,
};
use resource_console::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use resource_console::navigation::Page;
use resource_console::network::{NetworkActor, ReqwestTransport};
use resource_console::result::ExecutionResult;
use resource_console::storage::FileSettingsStore;
use resource_console::ui::{
    centered_rect, field_line, highlight_json, mask_secret, method_color, panel_block,
};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    tracing::info!(version = APP_VERSION, "Starting {}", APP_NAME);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(ReqwestTransport::new(), net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(Box::new(FileSettingsStore::new()), net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        terminal.draw(|f| draw_ui(f, &current_state))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                let ctx = KeyContext {
                    page: current_state.page,
                    field: current_state.active_field,
                    input_mode: current_state.input_mode,
                    show_help: current_state.show_help,
                    header_prompt_open: current_state.header_prompt.is_some(),
                };
                if let Some(event) = key_to_ui_event(key, ctx) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Page
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title_bar(f, state, main_chunks[0]);

    match state.page {
        Page::Dashboard => draw_dashboard(f, state, main_chunks[1]),
        Page::Composer => draw_composer(f, state, main_chunks[1]),
        Page::ResponseViewer => draw_response(f, state, main_chunks[1], true),
    }

    draw_status_bar(f, state, main_chunks[2]);

    if let Some(prompt) = &state.header_prompt {
        draw_header_prompt(f, prompt, area);
    }

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_title_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let back = if state.can_go_back {
        Span::styled(" [Alt+← back] ", Style::default().fg(Color::Gray))
    } else {
        Span::styled(" [Alt+← back] ", Style::default().fg(Color::DarkGray))
    };
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", APP_NAME),
            Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!(" {} ", state.page.title()),
            Style::default().fg(Color::Cyan).bold(),
        ),
        back,
    ]);
    f.render_widget(Paragraph::new(title), area);
}

fn draw_dashboard(f: &mut Frame, state: &RenderState, area: Rect) {
    let endpoint = if state.base_url.is_empty() {
        String::from("<not set>")
    } else {
        state.base_url.clone()
    };
    let credentials = if state.api_key.is_empty() || state.api_secret_len == 0 {
        "not entered"
    } else {
        "entered for this session"
    };

    let mut lines = vec![
        Line::from(""),
        field_line("Base URL", endpoint, false, false),
        field_line("Credentials", credentials.to_string(), false, false),
        field_line(
            "Catalog",
            format!("{} resource types available", state.catalog_len),
            false,
            false,
        ),
        field_line(
            "Last request",
            state
                .last_request
                .clone()
                .unwrap_or_else(|| String::from("none yet")),
            false,
            false,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "  Press 'n' to build a request.",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::styled(
            "  Credentials reset when the console restarts.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if state.result.is_some() {
        lines.push(Line::from(Span::styled(
            "  The latest result is kept in the response viewer.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = panel_block(String::from(" Dashboard "), true);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_composer(f: &mut Frame, state: &RenderState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let form = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Fields
            Constraint::Length(6), // Headers
            Constraint::Min(4),    // Body
            Constraint::Length(3), // Query params
        ])
        .split(columns[0]);

    draw_fields(f, state, form[0]);
    draw_headers(f, state, form[1]);
    draw_body(f, state, form[2]);
    draw_query_params(f, state, form[3]);
    draw_response(f, state, columns[1], false);
}

fn draw_fields(f: &mut Frame, state: &RenderState, area: Rect) {
    let editing = state.input_mode == InputMode::Editing;
    let draft = &state.draft;

    let selected = if draft.resource_type.selected().is_empty() {
        String::from("< Select a resource type... >")
    } else {
        format!("< {} >", draft.resource_type.selected())
    };

    let rows: [(Field, String); 7] = [
        (Field::BaseUrl, state.base_url.clone()),
        (Field::ApiKey, state.api_key.clone()),
        (Field::ApiSecret, mask_secret(state.api_secret_len)),
        (Field::Method, format!("< {} >", draft.method)),
        (Field::ResourceType, selected),
        (Field::CustomType, draft.resource_type.custom().to_string()),
        (Field::Url, draft.url.clone()),
    ];

    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(field, value)| {
            let focused = state.active_field == field;
            let mut line = field_line(field.label(), value, focused, focused && editing);
            if field == Field::Method {
                line = line.style(Style::default().fg(method_color(draft.method)));
            }
            line
        })
        .collect();

    let focused = matches!(
        state.active_field,
        Field::BaseUrl
            | Field::ApiKey
            | Field::ApiSecret
            | Field::Method
            | Field::ResourceType
            | Field::CustomType
            | Field::Url
    );
    let block = panel_block(String::from(" Request "), focused);
    f.render_widget(Paragraph::new(lines).block(block), area);

    // Cursor: the value column starts after the 16-char label and a space
    if editing && focused {
        if let Some(row) = rows_position(state.active_field) {
            let max_x = area.x + area.width.saturating_sub(2);
            let cursor_x = (area.x + 1 + 17 + state.cursor_column as u16).min(max_x);
            f.set_cursor_position(Position::new(cursor_x, area.y + 1 + row));
        }
    }
}

fn rows_position(field: Field) -> Option<u16> {
    Field::ALL.iter().take(7).position(|f| *f == field).map(|i| i as u16)
}

fn draw_headers(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_field == Field::Headers;
    let editing = is_focused && state.input_mode == InputMode::Editing;

    let items: Vec<ListItem> = state
        .draft
        .headers
        .iter()
        .enumerate()
        .map(|(i, (key, value))| {
            let style = if is_focused && i == state.selected_header {
                if editing {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::Cyan).bold()
                }
            } else {
                Style::default()
            };
            let shown_key = match (&state.header_rename, is_focused && i == state.selected_header) {
                (Some(pending), true) => pending.as_str(),
                _ => key.as_str(),
            };
            ListItem::new(format!("{}: {}", shown_key, value)).style(style)
        })
        .collect();

    let hint = match (editing, state.header_edit) {
        (true, HeaderEdit::Key) => " Headers (renaming, Esc done) ",
        (true, HeaderEdit::Value) => " Headers (editing value, Esc done) ",
        (false, _) => " Headers (a:add r:rename e:value d:del) ",
    };
    let list = List::new(items).block(panel_block(String::from(hint), is_focused));
    f.render_widget(list, area);
}

fn draw_body(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_field == Field::Body;
    let has_body = state.draft.method.has_body();
    let title = if has_body {
        " Body (JSON) "
    } else {
        " Body (not sent with GET) "
    };

    let mut block = panel_block(String::from(title), is_focused);
    if is_focused && state.input_mode == InputMode::Editing {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }

    let content = if has_body { state.draft.body.as_str() } else { "" };
    let body = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn draw_query_params(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_field == Field::QueryParams;
    let mut block = panel_block(String::from(" Query params (e.g. name=value&limit=20) "), is_focused);
    if is_focused && state.input_mode == InputMode::Editing {
        block = block.border_style(Style::default().fg(Color::Yellow));
        let max_x = area.x + area.width.saturating_sub(2);
        let cursor_x = (area.x + state.cursor_column as u16 + 1).min(max_x);
        f.set_cursor_position(Position::new(cursor_x, area.y + 1));
    }
    f.render_widget(Paragraph::new(state.draft.query_params.as_str()).block(block), area);
}

fn draw_response(f: &mut Frame, state: &RenderState, area: Rect, full_page: bool) {
    let time_text = if state.time_ms > 0 {
        format!(" {}ms ", state.time_ms)
    } else {
        String::new()
    };

    let (title, lines) = if state.is_loading {
        (
            Span::styled(" Sending... ", Style::default().fg(Color::Yellow).bold()),
            vec![Line::from("Waiting for the server...")],
        )
    } else {
        match &state.result {
            None => (
                Span::raw(" Response "),
                vec![Line::from(Span::styled(
                    "Press 's' to send the request.",
                    Style::default().fg(Color::DarkGray),
                ))],
            ),
            Some(result @ ExecutionResult::Failure { .. }) => (
                Span::styled(" Error Response ", Style::default().fg(Color::Red).bold()),
                result
                    .display_text()
                    .lines()
                    .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Red))))
                    .collect(),
            ),
            Some(result @ ExecutionResult::Success { .. }) => (
                Span::styled(" Success Response ", Style::default().fg(Color::Green).bold()),
                highlight_json(&result.display_text()),
            ),
        }
    };

    let scroll_hint = if full_page { " ↑/↓ scroll " } else { " PgUp/PgDn scroll, v: full view " };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom(Line::from(format!("{}{}", scroll_hint, time_text)).right_aligned());

    let response = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.response_scroll, 0));
    f.render_widget(response, area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let status = if let Some(message) = &state.status_message {
        format!(" {} ", message)
    } else if state.is_loading {
        String::from(" Sending... ")
    } else if state.input_mode == InputMode::Editing {
        String::from(" Esc:stop editing | ←/→:move | Tab:next field ")
    } else {
        match state.page {
            Page::Dashboard => String::from(" n:new request | ?:help | q:quit "),
            Page::Composer => String::from(
                " Tab:field | e:edit | m:method | s:send | Ctrl+S:save URL | Esc:cancel | ?:help ",
            ),
            Page::ResponseViewer => String::from(" ↑/↓:scroll | b:back | q:quit "),
        }
    };

    let bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_header_prompt(f: &mut Frame, prompt: &str, area: Rect) {
    let popup_area = centered_rect(50, 20, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Header key (Enter to add, Esc to cancel) ")
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(prompt).block(block), popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 RESOURCE CONSOLE - Keyboard Shortcuts

 NAVIGATION
   n                  New request (dashboard)
   v                  Full-screen response viewer
   Alt+← / b          Back to the previous page
   Esc                Cancel composing, return to dashboard

 REQUEST
   Tab / Shift+Tab    Next / previous field
   e / Enter          Edit current field
   m                  Cycle HTTP method
   ← / →              Pick resource type from the catalog
   x                  Clear resource type selection
   s                  Send request
   Ctrl+S             Remember base URL

 HEADERS
   a                  Add header
   r                  Rename selected header
   d                  Delete selected header

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}
