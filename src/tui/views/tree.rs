//! Tree view - the habit tree drawn on a braille canvas

use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine},
        Block, Borders, Paragraph,
    },
};

use crate::tree::{Branch, BranchTone, TreeScene};
use crate::tui::app::App;
use crate::tui::ui::Palette;

const LEAF_GREEN: Color = Color::Rgb(0x2E, 0x7D, 0x32);
const FALLEN_BROWN: Color = Color::Rgb(0x8D, 0x6E, 0x63);

/// Layout units between parallel strokes of a thick branch
const STRAND_SPACING: f32 = 2.5;
const MAX_STRANDS: usize = 5;

fn bark_color(tone: BranchTone) -> Color {
    match tone {
        BranchTone::Trunk => Color::Rgb(0x5D, 0x40, 0x37),
        BranchTone::Bough => Color::Rgb(0x6D, 0x4C, 0x41),
        BranchTone::Limb => Color::Rgb(0x79, 0x55, 0x48),
        BranchTone::Twig => Color::Rgb(0x8D, 0x6E, 0x63),
    }
}

/// Draw the tree view
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let palette = Palette::for_theme(app.is_dark());
    let scene = &app.scene;
    let days = app.tracker.settings().days_to_show;

    let mut title = format!(
        " Your Habit Tree │ last {} days │ {} leaves ",
        days,
        scene.leaves.len()
    );
    if scene.is_bare() {
        title.push_str("(bare) ");
    } else if scene.dropped_leaves() > 0 {
        title.push_str(&format!("(+{} more) ", scene.dropped_leaves()));
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    if app.habits().is_empty() {
        let inner_area = block.inner(area);
        frame.render_widget(block, area);
        let empty = Paragraph::new(vec![
            Line::from("🌱"),
            Line::from(""),
            Line::from("Your tree awaits").bold(),
            Line::from("Complete habits to watch it grow!").fg(palette.muted),
        ])
        .alignment(Alignment::Center);
        let top = inner_area.height.saturating_sub(4) / 2;
        let centered = Rect {
            y: inner_area.y + top,
            height: inner_area.height.saturating_sub(top),
            ..inner_area
        };
        frame.render_widget(empty, centered);
        return;
    }

    let width = f64::from(app.layout.width);
    let height = f64::from(app.layout.height);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .background_color(palette.background)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| paint(ctx, scene, height));

    frame.render_widget(canvas, area);
}

fn paint(ctx: &mut Context, scene: &TreeScene, height: f64) {
    // Layout y grows downward, the canvas y grows upward
    let flip = |y: f32| height - f64::from(y);

    for branch in &scene.branches {
        draw_branch(ctx, branch, &flip);
    }
    ctx.layer();

    for leaf in &scene.fallen_leaves {
        ctx.print(
            f64::from(leaf.position.x),
            flip(leaf.position.y),
            Span::styled("❦", Style::default().fg(FALLEN_BROWN)),
        );
    }
    for leaf in &scene.leaves {
        ctx.print(
            f64::from(leaf.position.x),
            flip(leaf.position.y),
            Span::styled("●", Style::default().fg(LEAF_GREEN)),
        );
    }
}

/// Thick branches are drawn as several parallel strokes
fn draw_branch(ctx: &mut Context, branch: &Branch, flip: &impl Fn(f32) -> f64) {
    let strands = ((branch.thickness / 6.0).ceil() as usize).clamp(1, MAX_STRANDS);
    let color = bark_color(branch.tone());

    let dx = branch.end.x - branch.start.x;
    let dy = branch.end.y - branch.start.y;
    let len = (dx * dx + dy * dy).sqrt().max(f32::EPSILON);
    let (nx, ny) = (-dy / len, dx / len);

    for i in 0..strands {
        let offset = (i as f32 - (strands - 1) as f32 / 2.0) * STRAND_SPACING;
        ctx.draw(&CanvasLine {
            x1: f64::from(branch.start.x + nx * offset),
            y1: flip(branch.start.y + ny * offset),
            x2: f64::from(branch.end.x + nx * offset),
            y2: flip(branch.end.y + ny * offset),
            color,
        });
    }
}
