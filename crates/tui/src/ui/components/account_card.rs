use api_types::account::Account;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::ui::{components::card::Card, theme::Theme};

/// Rows taken by one card, borders included.
pub const CARD_HEIGHT: u16 = 5;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// First letter of the name, uppercased, for the avatar badge.
pub fn initial(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map(|ch| ch.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

/// Renders a server timestamp as a calendar date in `tz`.
///
/// RFC 3339 values are converted, bare `YYYY-MM-DD` dates pass through and
/// anything else is shown raw.
pub fn format_created(raw: Option<&str>, tz: Tz) -> String {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return "unknown".to_string();
    };
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return at.with_timezone(&tz).format(DATE_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return date.format(DATE_FORMAT).to_string();
    }
    raw.to_string()
}

pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    account: &Account,
    note: Option<&str>,
    selected: bool,
    tz: Tz,
    theme: &Theme,
) {
    let card = Card::new("", theme).focused(selected);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let balance = account.balance.or_zero();
    let balance_style = if balance.is_negative() {
        Style::default().fg(theme.negative)
    } else {
        Style::default().fg(theme.positive)
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", initial(&account.name)),
                Style::default()
                    .fg(theme.surface_bright)
                    .bg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                account.name.clone(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(balance.to_string(), balance_style),
        ]),
        Line::from(Span::styled(
            format!("Created: {}", format_created(account.created_at.as_deref(), tz)),
            Style::default().fg(theme.dim),
        )),
    ];
    if let Some(note) = note {
        lines.push(Line::from(Span::styled(
            note.to_string(),
            Style::default().fg(theme.text_muted),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
