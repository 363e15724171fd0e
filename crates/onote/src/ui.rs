use onote_core::{HighlightKind, HighlightSpan};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Mode};
use crate::config::Theme;
use crate::status::MessageType;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Document
            Constraint::Length(1), // Status line
        ])
        .split(f.size());

    draw_title_bar(f, app, chunks[0]);
    draw_editor(f, app, chunks[1]);
    draw_status_line(f, app, chunks[2]);
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let title_bar = Paragraph::new(format!(" {}", app.title()))
        .style(Style::default().bg(Color::Blue).fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(title_bar, area);
}

fn draw_editor(f: &mut Frame, app: &mut App, area: Rect) {
    app.scroll_to_cursor(area.height as usize);

    let text = app.coordinator.current_text();
    let lines: Vec<&str> = text.split('\n').collect();
    let theme = &app.config.theme;
    let tab_size = app.config.editor.tab_size;
    let styles = char_styles(&text, &app.coordinator.highlights(), app.search_spans(), theme);

    let digits = lines.len().to_string().len();
    let gutter = if app.config.editor.line_numbers { digits as u16 + 1 } else { 0 };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(gutter), Constraint::Min(0)])
        .split(area);
    let content_area = columns[1];

    let mut line_starts = Vec::with_capacity(lines.len());
    let mut start = 0;
    for line in &lines {
        line_starts.push(start);
        start += line.chars().count() + 1;
    }

    let visible = lines
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(area.height as usize);

    let mut numbers = Vec::new();
    let mut rows = Vec::new();
    for (number, line) in visible {
        numbers.push(Line::from(format!("{:>width$} ", number + 1, width = digits)));
        rows.push(styled_line(line, line_starts[number], &styles, tab_size));
    }

    // Shift the text left far enough that the cursor column stays on screen.
    let cursor = app.coordinator.cursor_position();
    let prefix: String = lines
        .get(cursor.line - 1)
        .map(|line| line.chars().take(cursor.column).collect())
        .unwrap_or_default();
    let cursor_column = display_width(&prefix, tab_size);
    let hscroll = (cursor_column + 1).saturating_sub(content_area.width.max(1) as usize);

    if gutter > 0 {
        let gutter_widget = Paragraph::new(numbers).style(Style::default().fg(Color::DarkGray));
        f.render_widget(gutter_widget, columns[0]);
    }
    let offset = u16::try_from(hscroll).unwrap_or(u16::MAX);
    f.render_widget(Paragraph::new(rows).scroll((0, offset)), content_area);

    let screen_line = match (cursor.line - 1).checked_sub(app.scroll) {
        Some(row) if row < content_area.height as usize => row as u16,
        _ => return,
    };
    let screen_column = u16::try_from(cursor_column - hscroll).unwrap_or(u16::MAX);
    let x = content_area.x.saturating_add(screen_column);
    let y = content_area.y + screen_line;

    if app.mode() == Mode::Edit && x < content_area.x + content_area.width {
        f.set_cursor(x, y);
    }

    draw_suggestions(f, app, content_area, x, y);
}

/// The completion popup, just under the cursor when there is room.
fn draw_suggestions(f: &mut Frame, app: &App, area: Rect, cursor_x: u16, cursor_y: u16) {
    let suggestions = app.coordinator.query_suggestions();
    if suggestions.is_empty() || app.mode() != Mode::Edit {
        return;
    }

    let widest = suggestions.iter().map(|s| s.width()).max().unwrap_or(0) as u16;
    let width = (widest + 2).min(area.width);
    let height = (suggestions.len() as u16 + 2).min(area.height);
    if width < 3 || height < 3 {
        return;
    }

    let below = cursor_y + 1;
    let y = if below + height <= area.y + area.height {
        below
    } else {
        cursor_y.saturating_sub(height).max(area.y)
    };
    let x = cursor_x.min(area.x + area.width - width);
    let popup = Rect::new(x, y, width, height);

    let selection = parse_color(app.config.theme.suggestion_background.as_deref())
        .unwrap_or(Color::Blue);
    let items: Vec<ListItem> = suggestions
        .iter()
        .map(|s| ListItem::new(s.as_str()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bg(selection).fg(Color::White));

    let mut state = ListState::default();
    state.select(app.coordinator.selected_index());

    f.render_widget(Clear, popup);
    f.render_stateful_widget(list, popup, &mut state);
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(18)])
        .split(area);

    match app.mode() {
        Mode::Prompt(kind) => {
            let input = format!("{}{}", kind.label(), app.prompt_input());
            let x = columns[0].x + input.width() as u16;
            f.render_widget(
                Paragraph::new(input).style(Style::default().fg(Color::Yellow)),
                columns[0],
            );
            if x < columns[0].x + columns[0].width {
                f.set_cursor(x, columns[0].y);
            }
        }
        Mode::Edit | Mode::SavePrompt(_) => {
            if let Some(message) = app.status.current() {
                let color = match message.message_type {
                    MessageType::Info => Color::Gray,
                    MessageType::Success => Color::Green,
                    MessageType::Warning => Color::Yellow,
                    MessageType::Error => Color::Red,
                };
                f.render_widget(
                    Paragraph::new(message.content.as_str()).style(Style::default().fg(color)),
                    columns[0],
                );
            }
        }
    }

    let cursor = app.coordinator.cursor_position();
    let position = Paragraph::new(format!("Ln {}, Col {}", cursor.line, cursor.column + 1))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right);
    f.render_widget(position, columns[1]);
}

/// One style per character of `text`. Search matches are layered over the
/// syntax colours.
fn char_styles(
    text: &str,
    highlights: &[HighlightSpan],
    matches: &[HighlightSpan],
    theme: &Theme,
) -> Vec<Style> {
    let mut styles = vec![Style::default(); text.chars().count()];
    for span in highlights.iter().chain(matches) {
        let style = style_for(span.kind, theme);
        let end = span.end.min(styles.len());
        for slot in styles.iter_mut().take(end).skip(span.start) {
            *slot = slot.patch(style);
        }
    }
    styles
}

fn style_for(kind: HighlightKind, theme: &Theme) -> Style {
    let fg = |color: &Option<String>| match parse_color(color.as_deref()) {
        Some(color) => Style::default().fg(color),
        None => Style::default(),
    };

    match kind {
        HighlightKind::Keyword => fg(&theme.keyword_color).add_modifier(Modifier::BOLD),
        HighlightKind::String => fg(&theme.string_color),
        HighlightKind::Comment => fg(&theme.comment_color).add_modifier(Modifier::ITALIC),
        HighlightKind::SearchMatch => match parse_color(theme.search_background.as_deref()) {
            Some(color) => Style::default().bg(color).fg(Color::Black),
            None => Style::default().add_modifier(Modifier::REVERSED),
        },
    }
}

fn styled_line(line: &str, first: usize, styles: &[Style], tab_size: usize) -> Line<'static> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_style = None;

    for (offset, ch) in line.chars().enumerate() {
        let style = styles.get(first + offset).copied().unwrap_or_default();
        if run_style.is_some_and(|current| current != style) {
            spans.push(Span::styled(std::mem::take(&mut run), run_style.unwrap_or_default()));
        }
        run_style = Some(style);
        if ch == '\t' {
            run.extend(std::iter::repeat(' ').take(tab_size));
        } else {
            run.push(ch);
        }
    }
    if let Some(style) = run_style {
        spans.push(Span::styled(run, style));
    }

    Line::from(spans)
}

fn display_width(prefix: &str, tab_size: usize) -> usize {
    prefix
        .chars()
        .map(|ch| if ch == '\t' { tab_size } else { ch.width().unwrap_or(0) })
        .sum()
}

/// Parses `#RRGGBB`.
pub fn parse_color(hex: Option<&str>) -> Option<Color> {
    let digits = hex?.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
