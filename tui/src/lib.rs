//! TUI rendering for Adder using ratatui.

mod input;
mod theme;

pub use input::{InputPump, apply_event, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use adder_engine::{App, BridgeState, FieldId, Focus};

/// Outer width of a field box: the longest accepted text plus prompt and borders.
pub const FIELD_BOX_WIDTH: u16 = 24;
const BUTTON_MIN_WIDTH: u16 = 10;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(1), // First tooltip
            Constraint::Length(3), // First field
            Constraint::Length(1), // Second tooltip
            Constraint::Length(3), // Second field
            Constraint::Length(1),
            Constraint::Length(3), // Sum button
            Constraint::Length(1),
            Constraint::Length(1), // Result
            Constraint::Min(0),
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let title = Paragraph::new(Line::from(Span::styled(
        app.labels().title,
        styles::title(&palette),
    )));
    frame.render_widget(title, chunks[0]);

    draw_field(frame, app, FieldId::First, chunks[1], chunks[2], &palette, &glyphs);
    draw_field(frame, app, FieldId::Second, chunks[3], chunks[4], &palette, &glyphs);
    draw_button(frame, app, chunks[6], &palette);

    let result = Paragraph::new(Line::from(Span::styled(
        app.result_line(),
        Style::default().fg(palette.text_primary),
    )));
    frame.render_widget(result, chunks[8]);

    draw_status_bar(frame, app, chunks[10], &palette, &glyphs);
}

fn draw_field(
    frame: &mut Frame,
    app: &App,
    id: FieldId,
    tooltip_area: Rect,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let field = app.field(id);
    let placeholder = match id {
        FieldId::First => app.labels().first_placeholder,
        FieldId::Second => app.labels().second_placeholder,
    };

    // Tooltip is only visible while the field holds focus.
    if let Some((focused, preview)) = app.preview()
        && focused == id
    {
        let text = format!(" {} {preview} ", glyphs.tooltip);
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .min(tooltip_area.width);
        let rect = Rect {
            width,
            ..tooltip_area
        };
        let tooltip = Paragraph::new(Line::from(Span::styled(text, styles::tooltip(palette))));
        frame.render_widget(tooltip, rect);
    }

    let rect = Rect {
        width: FIELD_BOX_WIDTH.min(area.width),
        ..area
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::field_border(palette, field.is_focused()));

    let content = if field.text().is_empty() {
        Span::styled(placeholder, styles::placeholder(palette))
    } else {
        Span::styled(field.text(), Style::default().fg(palette.text_primary))
    };
    let paragraph = Paragraph::new(Line::from(vec![Span::raw(" "), content])).block(block);
    frame.render_widget(paragraph, rect);

    if field.is_focused() {
        let cursor = u16::try_from(field.cursor()).unwrap_or(0);
        let x = (rect.x + 2 + cursor).min(rect.right().saturating_sub(2));
        frame.set_cursor_position((x, rect.y + 1));
    }
}

fn draw_button(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let focused = app.focus() == Focus::SumButton;
    let label = app.labels().sum_button;
    let width = u16::try_from(label.width() + 4)
        .unwrap_or(u16::MAX)
        .max(BUTTON_MIN_WIDTH)
        .min(area.width);
    let rect = Rect { width, ..area };

    let style = styles::button(palette, focused);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::field_border(palette, focused))
        .style(style);
    let button = Paragraph::new(Line::from(Span::styled(label, style)))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(button, rect);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let labels = app.labels();
    let mut spans = match app.bridge().state() {
        BridgeState::Uninitialized => Vec::new(),
        BridgeState::Loading => vec![
            Span::styled(
                spinner_frame(app.tick_count(), app.ui_options()),
                Style::default().fg(palette.warning),
            ),
            Span::styled(
                format!(" {}  ", labels.loading),
                Style::default().fg(palette.text_secondary),
            ),
        ],
        BridgeState::Ready => vec![
            Span::styled(glyphs.status_ready, Style::default().fg(palette.success)),
            Span::styled(
                format!(" {}  ", labels.ready),
                Style::default().fg(palette.text_secondary),
            ),
        ],
        BridgeState::Failed(err) => vec![
            Span::styled(glyphs.status_failed, Style::default().fg(palette.error)),
            Span::styled(
                format!(" {}: {err}  ", labels.failed),
                Style::default().fg(palette.error),
            ),
        ],
    };

    let hints: &[(&str, &str)] = if app.focus() == Focus::SumButton {
        &[("Tab", " next  "), ("Enter", " sum  "), ("q/Esc", " quit ")]
    } else {
        &[("Tab", " next  "), ("Enter", " confirm  "), ("Esc", " quit ")]
    };
    for (key, hint) in hints {
        spans.push(Span::styled(*key, styles::key_highlight(palette)));
        spans.push(Span::styled(*hint, styles::key_hint(palette)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
