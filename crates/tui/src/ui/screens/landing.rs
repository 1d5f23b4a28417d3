use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::AppState,
    ui::{components::centered_box, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let card_area = centered_box(46, 10, area);
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let key = |k: &'static str| Span::styled(k, Style::default().fg(theme.accent));
    let lines = vec![
        Line::from(Span::styled(
            "Finance Tracker",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Keep every account and balance in one place.",
            Style::default().fg(theme.text_muted),
        )),
        Line::default(),
        Line::from(vec![
            key("l"),
            Span::raw(" login   "),
            key("r"),
            Span::raw(" register   "),
            key("q"),
            Span::raw(" quit"),
        ]),
        Line::default(),
        Line::from(Span::styled(
            state.base_url.clone(),
            Style::default().fg(theme.dim),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        card_area,
    );
}
