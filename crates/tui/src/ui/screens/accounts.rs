use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    accounts::{LoadState, Modal, gesture::{GestureState, MAX_PULL}},
    app::AppState,
    ui::{
        components::{
            account_card::{self, CARD_HEIGHT},
            card::StatCard,
            modal,
        },
        theme::Theme,
    },
};

const SUMMARY_HEIGHT: u16 = 3;
const INDICATOR_WIDTH: usize = 20;

/// Where each part of the accounts screen lands for a given viewport.
///
/// The event loop uses the same layout for mouse hit-testing, so the list
/// rect and scroll offset here always match what was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountsLayout {
    pub header: Rect,
    pub banner: Option<Rect>,
    pub summary: Rect,
    pub indicator: Option<Rect>,
    pub list: Rect,
    pub footer: Rect,
    /// Index of the first card drawn.
    pub offset: usize,
}

impl AccountsLayout {
    pub fn new(area: Rect, has_banner: bool, show_indicator: bool, selected: usize) -> Self {
        let constraints = [
            Constraint::Length(1),
            Constraint::Length(u16::from(has_banner)),
            Constraint::Length(SUMMARY_HEIGHT),
            Constraint::Length(u16::from(show_indicator)),
            Constraint::Min(0),
            Constraint::Length(1),
        ];
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        Self {
            header: rows[0],
            banner: has_banner.then_some(rows[1]),
            summary: rows[2],
            indicator: show_indicator.then_some(rows[3]),
            list: rows[4],
            footer: rows[5],
            offset: scroll_offset(rows[4], selected),
        }
    }

    /// Number of whole cards that fit in the list area, at least one.
    pub fn visible(&self) -> usize {
        usize::from((self.list.height / CARD_HEIGHT).max(1))
    }

    /// Index of the card drawn at terminal row `row`, if any.
    pub fn card_at(&self, row: u16) -> Option<usize> {
        if row < self.list.y || row >= self.list.y + self.list.height {
            return None;
        }
        let slot = usize::from((row - self.list.y) / CARD_HEIGHT);
        (slot < self.visible()).then_some(self.offset + slot)
    }
}

/// Keeps the selected card on screen: scrolls just enough for it to be the
/// last visible card.
pub fn scroll_offset(list: Rect, selected: usize) -> usize {
    let visible = usize::from((list.height / CARD_HEIGHT).max(1));
    selected.saturating_sub(visible - 1)
}

pub fn layout_for(area: Rect, state: &AppState) -> AccountsLayout {
    AccountsLayout::new(
        area,
        state.accounts.error_banner().is_some(),
        state.gesture.state() != GestureState::Idle,
        state.accounts.selected(),
    )
}

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = layout_for(area, state);

    render_header(frame, layout.header, state, &theme);
    if let (Some(rect), Some(message)) = (layout.banner, state.accounts.error_banner()) {
        frame.render_widget(
            Paragraph::new(Span::styled(
                message,
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            )),
            rect,
        );
    }
    render_summary(frame, layout.summary, state, &theme);
    if let Some(rect) = layout.indicator {
        render_indicator(frame, rect, state, &theme);
    }
    render_list(frame, &layout, state, &theme);
    render_footer(frame, layout.footer, &theme);

    match state.accounts.modal() {
        Modal::Closed => {}
        Modal::Editor { mode, draft } => {
            let saving = state.accounts.is_saving() || state.busy.is_some();
            modal::render_editor(frame, area, mode, draft, saving, &theme);
        }
        Modal::ConfirmDelete(account) => modal::render_confirm(frame, area, account, &theme),
    }
    if let Some(message) = state.accounts.alert() {
        modal::render_alert(frame, area, message, &theme);
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let status = state.busy.or_else(|| {
        state
            .accounts
            .is_loading()
            .then_some("Refreshing...")
    });
    let user = state.username.as_deref().unwrap_or("-");

    let mut spans = vec![
        Span::styled(
            "Accounts",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Server", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.base_url)),
    ];
    if let Some(status) = status {
        spans.push(Span::styled(status, Style::default().fg(theme.warning)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_summary(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let summary = state.accounts.summary();
    StatCard::new("Total Accounts", summary.count.to_string(), theme).render(frame, columns[0]);

    let total_style = if summary.total.is_negative() {
        Style::default().fg(theme.negative)
    } else {
        Style::default().fg(theme.positive)
    };
    StatCard::new("Total Balance", summary.total.to_string(), theme)
        .value_style(total_style)
        .render(frame, columns[1]);
}

fn render_indicator(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let gesture = &state.gesture;
    let (label, style) = match gesture.state() {
        GestureState::Armed { .. } => ("Release to refresh", Style::default().fg(theme.accent)),
        GestureState::Refreshing { .. } => ("Refreshing...", Style::default().fg(theme.warning)),
        GestureState::Tracking { .. } | GestureState::Idle => {
            ("Pull to refresh", Style::default().fg(theme.dim))
        }
    };
    let filled = ((gesture.pull() / MAX_PULL) * INDICATOR_WIDTH as f32).round() as usize;
    let bar = format!(
        "{}{}",
        "█".repeat(filled.min(INDICATOR_WIDTH)),
        "░".repeat(INDICATOR_WIDTH - filled.min(INDICATOR_WIDTH))
    );
    let line = Line::from(vec![
        Span::styled(bar, style),
        Span::raw("  "),
        Span::styled(label, style.add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_list(frame: &mut Frame<'_>, layout: &AccountsLayout, state: &AppState, theme: &Theme) {
    let page = &state.accounts;
    let accounts = page.accounts();
    let area = layout.list;

    if accounts.is_empty() {
        let lines = match page.load_state() {
            LoadState::Loading => vec![Line::from(Span::styled(
                "Loading accounts...",
                Style::default().fg(theme.dim),
            ))],
            // the banner already explains an empty list after a failure
            LoadState::Error(_) => Vec::new(),
            LoadState::Idle | LoadState::Loaded => vec![
                Line::from(Span::styled(
                    "No accounts yet",
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Press a to add your first account",
                    Style::default().fg(theme.dim),
                )),
            ],
        };
        let top = area.height.saturating_sub(2) / 2;
        let rect = Rect {
            y: area.y + top,
            height: area.height.saturating_sub(top),
            ..area
        };
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
        return;
    }

    let shown = accounts
        .iter()
        .enumerate()
        .skip(layout.offset)
        .take(layout.visible());
    for (slot, (index, account)) in shown.enumerate() {
        let y = area.y + slot as u16 * CARD_HEIGHT;
        let height = CARD_HEIGHT.min(area.y + area.height - y);
        if height < 3 {
            break;
        }
        let rect = Rect {
            y,
            height,
            ..area
        };
        account_card::render(
            frame,
            rect,
            account,
            page.notes().get(account.id),
            index == page.selected(),
            state.timezone,
            theme,
        );
    }
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let keys = [
        ("a", "add"),
        ("e", "edit"),
        ("d", "delete"),
        ("r", "refresh"),
        ("x", "logout"),
        ("q", "quit"),
    ];
    let mut spans = Vec::new();
    for (key, label) in keys {
        if !spans.is_empty() {
            spans.push(Span::styled("  │  ", Style::default().fg(theme.border)));
        }
        spans.push(Span::styled(key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {label}")));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
