//! UI rendering for the TUI

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::app::{App, Mode, PromptField};
use super::state::{leaves_label, long_date, streak_label};
use super::views::{habits, tree};
use crate::stats::{self, DayStatus};

/// Colors for the light and dark themes
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub selection: Color,
    pub done: Color,
    pub streak: Color,
    pub bar: Color,
}

impl Palette {
    pub fn for_theme(dark: bool) -> Self {
        if dark {
            Self {
                background: Color::Rgb(0x12, 0x1A, 0x14),
                text: Color::Rgb(0xE8, 0xF5, 0xE9),
                muted: Color::DarkGray,
                accent: Color::Rgb(0x66, 0xBB, 0x6A),
                selection: Color::Rgb(0x2E, 0x3B, 0x30),
                done: Color::Rgb(0x81, 0xC7, 0x84),
                streak: Color::Rgb(0xFF, 0xB7, 0x4D),
                bar: Color::Rgb(0x1B, 0x5E, 0x20),
            }
        } else {
            Self {
                background: Color::Reset,
                text: Color::Reset,
                muted: Color::Gray,
                accent: Color::Rgb(0x2E, 0x7D, 0x32),
                selection: Color::Rgb(0xE8, 0xF5, 0xE9),
                done: Color::Rgb(0x2E, 0x7D, 0x32),
                streak: Color::Rgb(0xEF, 0x6C, 0x00),
                bar: Color::Rgb(0x38, 0x8E, 0x3C),
            }
        }
    }
}

/// Main draw function - orchestrates all rendering
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let palette = Palette::for_theme(app.is_dark());

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background)),
        area,
    );

    // Main layout: header, summary, content, footer
    let main_layout = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(1), // Summary
        Constraint::Min(10),   // Content
        Constraint::Length(1), // Footer/status
    ])
    .split(area);

    draw_header(frame, app, &palette, main_layout[0]);
    draw_summary(frame, app, &palette, main_layout[1]);

    let content_layout =
        Layout::horizontal([Constraint::Percentage(38), Constraint::Percentage(62)])
            .split(main_layout[2]);
    habits::draw(frame, app, content_layout[0]);

    let tree_layout = Layout::vertical([Constraint::Min(6), Constraint::Length(3)])
        .split(content_layout[1]);
    tree::draw(frame, app, tree_layout[0]);
    draw_week(frame, app, &palette, tree_layout[1]);

    draw_footer(frame, app, &palette, main_layout[3]);

    // Draw overlays
    match app.mode {
        Mode::Prompt => draw_prompt(frame, app, &palette, area),
        Mode::ConfirmDelete => {
            let name = app
                .selected_habit()
                .map(|h| format!("{} {}", h.emoji, h.name))
                .unwrap_or_default();
            draw_confirm(
                frame,
                &palette,
                area,
                " Delete habit ",
                &format!("Delete \"{}\" and all its leaves?", name),
            );
        }
        Mode::ConfirmClear => draw_confirm(
            frame,
            &palette,
            area,
            " Clear all data ",
            "Remove every habit and reset all settings?",
        ),
        Mode::Normal => {}
    }

    if app.show_help {
        draw_help_overlay(frame, &palette, area);
    }
}

fn draw_header(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let refresh_indicator = if app.refresh_shown_at.is_some() {
        " [Updated]"
    } else {
        ""
    };

    let header_text = format!(
        " 🌳 Micro Habit Tree │ {} │ last {} days{}",
        long_date(app.today()),
        app.tracker.settings().days_to_show,
        refresh_indicator
    );

    let header = Paragraph::new(header_text)
        .style(Style::default().bg(palette.bar).fg(Color::White).bold());

    frame.render_widget(header, area);
}

fn draw_summary(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let summary = app.tracker.summary(app.today());

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            leaves_label(summary.total_leaves),
            Style::default().fg(palette.done),
        ),
    ];
    if let Some(streak) = streak_label(summary.overall_streak) {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(streak, Style::default().fg(palette.streak)));
    }
    spans.push(Span::styled(
        format!(
            "  ✔ {}/{} today",
            summary.completed_today, summary.habit_count
        ),
        Style::default().fg(palette.text),
    ));
    if let Some(achievement) = summary.achievement() {
        spans.push(Span::styled(
            format!("  🏆 {}", achievement),
            Style::default().fg(palette.streak).bold(),
        ));
    }
    spans.push(Span::styled(
        format!("  {}", summary.motivation()),
        Style::default().fg(palette.muted).italic(),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// The trailing seven days, oldest first
fn draw_week(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .title(" This week ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted));

    let mut spans = vec![Span::raw(" ")];
    for day in stats::week_progress(app.habits(), app.today()) {
        let (mark, color) = match day.status() {
            DayStatus::Perfect => ("●", palette.done),
            DayStatus::Partial => ("◐", palette.streak),
            DayStatus::Empty => ("○", palette.muted),
            DayStatus::NoHabits => ("·", palette.muted),
        };
        spans.push(Span::styled(
            day.date.format("%a ").to_string(),
            Style::default().fg(palette.text),
        ));
        spans.push(Span::styled(mark, Style::default().fg(color)));
        spans.push(Span::raw("  "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_footer(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let keybinds = match app.mode {
        Mode::Prompt => "Tab:switch field  Enter:next/save  Esc:cancel",
        Mode::ConfirmDelete | Mode::ConfirmClear => "y:confirm  n/Esc:cancel",
        Mode::Normal => {
            "j/k:move  space:check off  a:add  e:edit  d:delete  w:window  t:theme  ?:help  q:quit"
        }
    };

    // Show status message if present, otherwise show keybinds
    let footer_text = if let Some((ref msg, _)) = app.status_message {
        msg.clone()
    } else {
        keybinds.to_string()
    };

    let footer = Paragraph::new(format!(" {}", footer_text))
        .style(Style::default().bg(palette.muted).fg(Color::White));

    frame.render_widget(footer, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_prompt(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let Some(ref prompt) = app.prompt else { return };

    let popup_area = centered(area, 50, 8);
    frame.render_widget(Clear, popup_area);

    let field_line = |label: &str, value: &str, active: bool| {
        let style = if active {
            Style::default().fg(palette.accent).bold()
        } else {
            Style::default().fg(palette.text)
        };
        let cursor = if active { "▏" } else { "" };
        Line::from(vec![
            Span::styled(format!("  {:<7}", label), Style::default().fg(palette.muted)),
            Span::styled(format!("{}{}", value, cursor), style),
        ])
    };

    let title = if prompt.editing.is_some() {
        " Edit habit "
    } else {
        " New habit "
    };

    let body = vec![
        Line::from(""),
        field_line("Name", &prompt.name, prompt.field == PromptField::Name),
        field_line("Emoji", &prompt.emoji, prompt.field == PromptField::Emoji),
        Line::from(""),
        Line::from(Span::styled(
            "  Enter on the emoji field saves",
            Style::default().fg(palette.muted),
        )),
    ];

    let widget = Paragraph::new(body)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent)),
        )
        .style(Style::default().bg(palette.background));

    frame.render_widget(widget, popup_area);
}

fn draw_confirm(frame: &mut Frame, palette: &Palette, area: Rect, title: &str, question: &str) {
    let popup_area = centered(area, 50, 6);
    frame.render_widget(Clear, popup_area);

    let body = vec![
        Line::from(""),
        Line::from(format!("  {}", question)),
        Line::from(""),
        Line::from(Span::styled(
            "  y: yes   n: no",
            Style::default().fg(palette.muted),
        )),
    ];

    let widget = Paragraph::new(body)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(palette.background));

    frame.render_widget(widget, popup_area);
}

fn draw_help_overlay(frame: &mut Frame, palette: &Palette, area: Rect) {
    let popup_area = centered(area, 50, 22);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let help_text = r#"
  Habits
  ─────────────────────────────────
  j/k, ↑/↓     Move up/down
  g/G          Jump to top/bottom
  Space/Enter  Check off today
  a            Add habit
  e            Edit habit
  d            Delete habit
  C            Clear all data

  View
  ─────────────────────────────────
  w            Cycle 7/14/30 days
  t            Toggle dark theme
  r            Reload from disk
  q            Quit

  Press ? or Esc to close
"#;

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent)),
        )
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(palette.text).bg(palette.background));

    frame.render_widget(help, popup_area);
}
