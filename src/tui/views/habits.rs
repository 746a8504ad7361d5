//! Habit list - one row per habit with today's mark and its numbers

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::tui::app::App;
use crate::tui::state::{streak_label, truncate_str};
use crate::tui::ui::Palette;

/// Draw the habit list
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let palette = Palette::for_theme(app.is_dark());
    let block = Block::default()
        .title(format!(" Habits ({}) ", app.habits().len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if app.habits().is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("No habits yet"),
            Line::from("Press 'a' to plant one").fg(palette.muted),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(empty, inner_area);
        return;
    }

    let today = app.today();
    let days = app.tracker.settings().days_to_show;
    let name_width = (inner_area.width as usize).saturating_sub(22).max(4);

    let items: Vec<ListItem> = app
        .habits()
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(inner_area.height as usize)
        .map(|(idx, habit)| {
            let is_selected = idx == app.selected_index;
            let done = habit.is_completed_on(today) == Some(true);

            let check = if done {
                Span::styled(" ✔ ", Style::default().fg(palette.done).bold())
            } else {
                Span::styled(" ○ ", Style::default().fg(palette.muted))
            };

            let name_style = if is_selected {
                Style::default().fg(palette.text).bold()
            } else {
                Style::default().fg(palette.text)
            };

            let mut spans = vec![
                check,
                Span::raw(format!("{} ", habit.emoji)),
                Span::styled(truncate_str(&habit.name, name_width), name_style),
            ];

            if let Some(streak) = streak_label(habit.current_streak(today)) {
                spans.push(Span::styled(
                    format!("  {}", streak),
                    Style::default().fg(palette.streak),
                ));
            }
            spans.push(Span::styled(
                format!("  {}%", habit.consistency_percentage(days, today)),
                Style::default().fg(palette.muted),
            ));

            let style = if is_selected {
                Style::default().bg(palette.selection)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.selected_index.saturating_sub(app.scroll_offset)));

    frame.render_stateful_widget(List::new(items), inner_area, &mut state);
}
