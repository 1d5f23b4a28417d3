use api_types::account::Account;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    accounts::{EditorMode, FormDraft, FormField},
    ui::{
        components::{centered_box, input::render_input},
        theme::Theme,
    },
};

fn popup<'a>(title: &'a str, border: Style) -> Block<'a> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
}

fn hint(keys: &[(&'static str, &'static str)], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    for (key, label) in keys {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {label}")));
    }
    Line::from(spans)
}

pub fn render_editor(
    frame: &mut Frame<'_>,
    area: Rect,
    mode: &EditorMode,
    draft: &FormDraft,
    saving: bool,
    theme: &Theme,
) {
    let rect = centered_box(52, 11, area);
    frame.render_widget(Clear, rect);

    let title = match mode {
        EditorMode::Create => "Add Account",
        EditorMode::Edit(_) => "Edit Account",
    };
    let block = popup(title, Style::default().fg(theme.border_focused));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // name
            Constraint::Length(1),
            Constraint::Length(1), // balance
            Constraint::Length(1),
            Constraint::Length(1), // notes
            Constraint::Min(0),
            Constraint::Length(1), // footer
        ])
        .margin(1)
        .split(inner);

    let fields = [
        (rows[0], "Name", draft.name.as_str(), FormField::Name),
        (rows[2], "Balance", draft.balance.as_str(), FormField::Balance),
        (rows[4], "Notes", draft.notes.as_str(), FormField::Notes),
    ];
    for (row, label, value, field) in fields {
        render_input(frame, row, label, value, false, draft.focus == field, theme);
    }

    let footer = if saving {
        Line::from(Span::styled("Saving...", Style::default().fg(theme.warning)))
    } else {
        hint(&[("Tab", "next"), ("Enter", "save"), ("Esc", "cancel")], theme)
    };
    frame.render_widget(Paragraph::new(footer), rows[6]);
}

pub fn render_confirm(frame: &mut Frame<'_>, area: Rect, account: &Account, theme: &Theme) {
    let rect = centered_box(46, 7, area);
    frame.render_widget(Clear, rect);

    let block = popup("Delete Account", Style::default().fg(theme.negative));
    let lines = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(
                account.name.clone(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::raw("?"),
        ]),
        Line::from(Span::styled(
            "This cannot be undone.",
            Style::default().fg(theme.dim),
        )),
        Line::default(),
        hint(&[("y", "delete"), ("n", "cancel")], theme),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        rect,
    );
}

/// Blocking message popup; drawn above every other layer.
pub fn render_alert(frame: &mut Frame<'_>, area: Rect, message: &str, theme: &Theme) {
    let width = (message.chars().count() as u16).saturating_add(6).clamp(30, 70);
    let rect = centered_box(width, 6, area);
    frame.render_widget(Clear, rect);

    let block = popup("Alert", Style::default().fg(theme.error));
    let lines = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(theme.text))),
        Line::default(),
        hint(&[("Enter", "ok")], theme),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        rect,
    );
}
