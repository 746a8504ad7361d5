//! Pure state transformations for the TUI (Functional Core)
//!
//! This module contains ONLY pure functions with no I/O.
//! The imperative shell (app.rs, events.rs) handles I/O and calls these.

use chrono::NaiveDate;

use crate::model::Habit;

// =============================================================================
// Navigation - Pure index calculations
// =============================================================================

/// Calculate new selected index after moving up
pub fn move_selection_up(current: usize) -> usize {
    current.saturating_sub(1)
}

/// Calculate new selected index after moving down
pub fn move_selection_down(current: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        (current + 1).min(max - 1)
    }
}

/// Calculate scroll offset to keep selection visible
pub fn calculate_scroll_offset(selected: usize, current_offset: usize, visible_items: usize) -> usize {
    if visible_items == 0 {
        return 0;
    }
    if selected < current_offset {
        selected
    } else if selected >= current_offset + visible_items {
        selected.saturating_sub(visible_items - 1)
    } else {
        current_offset
    }
}

/// Clamp selection index to valid range
pub fn clamp_selection(selected: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        selected.min(max - 1)
    }
}

/// Index of the habit with `id`, if present
pub fn position_of(habits: &[Habit], id: &str) -> Option<usize> {
    habits.iter().position(|h| h.id == id)
}

// =============================================================================
// Labels - Pure formatting helpers
// =============================================================================

/// "🔥 3 days", or nothing when there is no streak
pub fn streak_label(streak: u32) -> Option<String> {
    match streak {
        0 => None,
        1 => Some("🔥 1 day".to_string()),
        n => Some(format!("🔥 {} days", n)),
    }
}

/// "🍃 1 leaf" / "🍃 4 leaves"
pub fn leaves_label(count: usize) -> String {
    if count == 1 {
        "🍃 1 leaf".to_string()
    } else {
        format!("🍃 {} leaves", count)
    }
}

/// "Oct 16, 2026"
pub fn long_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Truncate to `max_chars` characters, adding an ellipsis when cut
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars == 0 {
        String::new()
    } else {
        let mut out: String = s.chars().take(max_chars - 1).collect();
        out.push('…');
        out
    }
}
