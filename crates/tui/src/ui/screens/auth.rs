use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, AuthField},
    ui::{
        components::{centered_box, input::render_input},
        theme::Theme,
    },
};

/// Login and register share one form; register shows all four fields.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, register: bool) {
    let theme = Theme::default();
    let fields = AuthField::all(register);

    // one row per field plus a spacer between them, margins and borders
    let box_height = (fields.len() * 2 + 3) as u16;
    let card_area = centered_box(44, box_height, area);
    frame.render_widget(Clear, card_area);

    let title = if register { " register " } else { " login " };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let constraints = (0..fields.len() * 2 - 1).map(|_| Constraint::Length(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    let form = &state.auth;
    for (slot, field) in fields.iter().enumerate() {
        render_input(
            frame,
            rows[slot * 2],
            field.label(),
            form.value(*field),
            field.is_secret(),
            form.focus() == *field,
            &theme,
        );
    }

    let below = |offset: u16| Rect {
        x: card_area.x,
        y: card_area.y + card_area.height + offset,
        width: card_area.width,
        height: 1,
    };
    let status = match (state.busy, &form.message) {
        (Some(busy), _) => Some((busy, theme.warning)),
        (None, Some(message)) => Some((message.as_str(), theme.error)),
        (None, None) => None,
    };
    if let Some((text, color)) = status {
        let rect = below(1);
        if rect.y < area.y + area.height {
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(color)))
                    .alignment(Alignment::Center),
                rect,
            );
        }
    }
    let rect = below(2);
    if rect.y < area.y + area.height {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Tab next · Enter submit · Esc back",
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Center),
            rect,
        );
    }
}
