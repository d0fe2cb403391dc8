use ratatui::{prelude::*, widgets::*};

use crate::models::HttpMethod;

/// One labelled form row, e.g. `Base URL : https://...`
pub fn field_line<'a>(label: &'a str, value: String, focused: bool, editing: bool) -> Line<'a> {
    let label_style = if editing {
        Style::default().fg(Color::Yellow).bold()
    } else if focused {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::Gray)
    };
    let marker = if focused { "> " } else { "  " };

    Line::from(vec![
        Span::styled(format!("{}{:<14}", marker, label), label_style),
        Span::raw(" "),
        Span::raw(value),
    ])
}

/// Bordered block, highlighted when focused
pub fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

/// Stand-in for a secret of `len` characters
pub fn mask_secret(len: usize) -> String {
    if len == 0 {
        String::from("<empty>")
    } else {
        "*".repeat(len)
    }
}

/// Simple JSON syntax highlighting for pretty-printed text
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    text.lines().map(highlight_json_line).collect()
}

fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut chars = line.char_indices();

    let flush = |plain: &mut String, spans: &mut Vec<Span<'static>>| {
        if !plain.is_empty() {
            spans.push(styled_scalar(std::mem::take(plain)));
        }
    };

    while let Some((start, c)) = chars.next() {
        match c {
            '"' => {
                flush(&mut plain, &mut spans);
                let mut end = line.len();
                let mut escaped = false;
                for (i, ch) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == '"' {
                        end = i + 1;
                        break;
                    }
                }
                let is_key = line[end..].trim_start().starts_with(':');
                let color = if is_key { Color::Cyan } else { Color::Green };
                spans.push(Span::styled(
                    line[start..end].to_string(),
                    Style::default().fg(color),
                ));
            }
            '{' | '}' | '[' | ']' => {
                flush(&mut plain, &mut spans);
                spans.push(Span::styled(c.to_string(), Style::default().fg(Color::Yellow)));
            }
            ':' | ',' => {
                flush(&mut plain, &mut spans);
                spans.push(Span::raw(c.to_string()));
            }
            _ => plain.push(c),
        }
    }
    flush(&mut plain, &mut spans);

    Line::from(spans)
}

/// Color numbers and literals; anything else stays plain
fn styled_scalar(text: String) -> Span<'static> {
    let trimmed = text.trim();
    let style = if matches!(trimmed, "true" | "false" | "null") {
        Style::default().fg(Color::Magenta)
    } else if !trimmed.is_empty() && trimmed.parse::<f64>().is_ok() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Span::styled(text, style)
}

/// Method color
pub fn method_color(method: HttpMethod) -> Color {
    match method {
        HttpMethod::GET => Color::Green,
        HttpMethod::POST => Color::Yellow,
        HttpMethod::PUT => Color::Blue,
        HttpMethod::DELETE => Color::Red,
    }
}

/// Centered popup area
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
