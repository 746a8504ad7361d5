//! Habit data model
//!
//! A [`Habit`] keeps one record per calendar date: `true` when the habit was
//! done, `false` when it was explicitly marked as missed, and no entry at all
//! when the day was never touched. The distinction matters: consistency only
//! counts explicit records, while streaks treat "missed" and "never touched"
//! the same way.
//!
//! All operations here are pure. Updates return a new value and leave the
//! input untouched.

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emoji used when a habit is created without one
pub const DEFAULT_EMOJI: &str = "🌱";

/// Trailing window lengths the display supports
pub const DAYS_TO_SHOW_OPTIONS: [u32; 3] = [7, 14, 30];

/// Default trailing window length
pub const DEFAULT_DAYS_TO_SHOW: u32 = 14;

/// First day of the trailing `window_days` window ending `today`.
///
/// A window of 0 counts as 1 day; windows reaching past the calendar start
/// are cut at [`NaiveDate::MIN`].
pub fn window_start(window_days: u32, today: NaiveDate) -> NaiveDate {
    let span = i64::from(window_days.max(1)) - 1;
    today
        .checked_sub_signed(Duration::days(span))
        .unwrap_or(NaiveDate::MIN)
}

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn default_emoji() -> String {
    DEFAULT_EMOJI.to_string()
}

/// A tracked habit and its completion history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default = "default_emoji")]
    pub emoji: String,
    /// Date -> completed. Absent dates were never recorded.
    #[serde(default)]
    pub completions: BTreeMap<NaiveDate, bool>,
    #[serde(default = "today")]
    pub created_date: NaiveDate,
}

impl Habit {
    /// Create a habit with a fresh id and no history
    pub fn new(name: impl Into<String>, emoji: impl Into<String>, created: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            emoji: emoji.into(),
            completions: BTreeMap::new(),
            created_date: created,
        }
    }

    /// Record for `date`: `Some(true)` done, `Some(false)` missed, `None` no record
    pub fn is_completed_on(&self, date: NaiveDate) -> Option<bool> {
        self.completions.get(&date).copied()
    }

    /// Toggle the record for `date`.
    ///
    /// Transitions: no record -> done, done -> no record, missed -> done.
    /// Toggling never produces a "missed" record.
    pub fn with_toggled(&self, date: NaiveDate) -> Habit {
        let mut next = self.clone();
        match self.is_completed_on(date) {
            Some(true) => {
                next.completions.remove(&date);
            }
            Some(false) | None => {
                next.completions.insert(date, true);
            }
        }
        next
    }

    /// Percentage (0..=100, floored) of recorded days in the trailing window
    /// that were completed.
    ///
    /// The window is `[max(created, today - window_days + 1), today]`. Days
    /// without a record are left out of the denominator; with no records at
    /// all the result is 0.
    pub fn consistency_percentage(&self, window_days: u32, today: NaiveDate) -> u32 {
        let start = self.created_date.max(window_start(window_days, today));
        if start > today {
            return 0;
        }

        let (completed, recorded) = self
            .completions
            .range(start..=today)
            .fold((0u32, 0u32), |(done, total), (_, &value)| {
                (done + u32::from(value), total + 1)
            });

        if recorded == 0 {
            0
        } else {
            completed * 100 / recorded
        }
    }

    /// Consecutive completed days ending today. A missed day and a day with
    /// no record both end the streak.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        let mut streak = 0;
        let mut day = today;
        while self.is_completed_on(day) == Some(true) {
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        streak
    }

    /// Number of completed days over the whole history
    pub fn leaf_count(&self) -> usize {
        self.completions.values().filter(|done| **done).count()
    }
}

/// User-facing settings persisted next to the habits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub days_to_show: u32,
    pub is_dark_theme: bool,
    /// Lifetime count of days on which at least one toggle happened
    pub total_check_ins: u32,
    /// Last day counted in `total_check_ins`
    pub last_check_in_date: Option<NaiveDate>,
}

impl Settings {
    /// Whether `days_to_show` is one of [`DAYS_TO_SHOW_OPTIONS`]
    pub fn has_supported_window(&self) -> bool {
        DAYS_TO_SHOW_OPTIONS.contains(&self.days_to_show)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            days_to_show: DEFAULT_DAYS_TO_SHOW,
            is_dark_theme: false,
            total_check_ins: 0,
            last_check_in_date: None,
        }
    }
}

/// The whole persisted state: ordered habits plus settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppData {
    pub habits: Vec<Habit>,
    pub settings: Settings,
}

impl AppData {
    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }
}

/// Next entry in the 7 -> 14 -> 30 -> 7 cycle
pub fn next_days_to_show(current: u32) -> u32 {
    match DAYS_TO_SHOW_OPTIONS.iter().position(|&d| d == current) {
        Some(i) => DAYS_TO_SHOW_OPTIONS[(i + 1) % DAYS_TO_SHOW_OPTIONS.len()],
        None => DEFAULT_DAYS_TO_SHOW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(n)
    }

    fn habit_with(created: i64, records: &[(i64, bool)]) -> Habit {
        let mut habit = Habit::new("Read", "📚", day(created));
        for &(d, v) in records {
            habit.completions.insert(day(d), v);
        }
        habit
    }

    #[test]
    fn test_is_completed_on_is_three_valued() {
        let habit = habit_with(0, &[(0, true), (1, false)]);
        assert_eq!(habit.is_completed_on(day(0)), Some(true));
        assert_eq!(habit.is_completed_on(day(1)), Some(false));
        assert_eq!(habit.is_completed_on(day(2)), None);
    }

    #[test]
    fn test_toggle_transition_table() {
        let empty = habit_with(0, &[]);
        let done = empty.with_toggled(day(0));
        assert_eq!(done.is_completed_on(day(0)), Some(true));

        let cleared = done.with_toggled(day(0));
        assert_eq!(cleared.is_completed_on(day(0)), None);
        assert!(!cleared.completions.contains_key(&day(0)));

        let missed = habit_with(0, &[(0, false)]);
        let revived = missed.with_toggled(day(0));
        assert_eq!(revived.is_completed_on(day(0)), Some(true));
        // Never goes back to an explicit miss
        assert_eq!(revived.with_toggled(day(0)).is_completed_on(day(0)), None);
    }

    #[test]
    fn test_toggle_leaves_original_untouched() {
        let habit = habit_with(0, &[(0, true)]);
        let _ = habit.with_toggled(day(0));
        assert_eq!(habit.is_completed_on(day(0)), Some(true));
    }

    #[test]
    fn test_consistency_ignores_unrecorded_days() {
        let habit = habit_with(0, &[(0, true), (1, true), (2, true)]);
        assert_eq!(habit.consistency_percentage(7, day(6)), 100);

        let single = habit_with(0, &[(5, true)]);
        assert_eq!(single.consistency_percentage(7, day(6)), 100);
    }

    #[test]
    fn test_consistency_counts_explicit_misses() {
        let habit = habit_with(0, &[(0, true), (1, false), (2, false)]);
        assert_eq!(habit.consistency_percentage(7, day(6)), 33);
    }

    #[test]
    fn test_consistency_window_excludes_older_records() {
        // day 0 falls outside a 7-day window ending on day 10
        let habit = habit_with(0, &[(0, false), (8, true)]);
        assert_eq!(habit.consistency_percentage(7, day(10)), 100);
        assert_eq!(habit.consistency_percentage(30, day(10)), 50);
    }

    #[test]
    fn test_consistency_starts_at_creation_date() {
        // Imported history older than the creation date is not counted
        let habit = habit_with(5, &[(3, false), (5, true)]);
        assert_eq!(habit.consistency_percentage(14, day(6)), 100);
    }

    #[test]
    fn test_consistency_empty_is_zero() {
        let habit = habit_with(6, &[]);
        assert_eq!(habit.consistency_percentage(7, day(6)), 0);
        assert_eq!(habit.consistency_percentage(0, day(6)), 0);
    }

    #[test]
    fn test_consistency_future_creation_is_zero() {
        let habit = habit_with(10, &[(10, true)]);
        assert_eq!(habit.consistency_percentage(7, day(6)), 0);
    }

    #[test]
    fn test_consistency_huge_window_does_not_overflow() {
        let habit = habit_with(0, &[(0, true), (1, false), (2, true), (3, true)]);
        assert_eq!(habit.consistency_percentage(u32::MAX, day(3)), 75);
    }

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(7, day(10)), day(4));
        assert_eq!(window_start(0, day(10)), day(10));
        assert_eq!(window_start(u32::MAX, day(10)), NaiveDate::MIN);
    }

    #[test]
    fn test_current_streak() {
        let habit = habit_with(0, &[(3, true), (4, true), (5, true), (6, true)]);
        assert_eq!(habit.current_streak(day(6)), 4);
        assert_eq!(habit.current_streak(day(7)), 0);
    }

    #[test]
    fn test_current_streak_stops_at_explicit_miss() {
        let habit = habit_with(0, &[(4, true), (5, false), (6, true)]);
        assert_eq!(habit.current_streak(day(6)), 1);
        assert_eq!(habit.current_streak(day(5)), 0);
    }

    #[test]
    fn test_leaf_count() {
        let habit = habit_with(0, &[(0, true), (1, false), (2, true)]);
        assert_eq!(habit.leaf_count(), 2);
    }

    #[test]
    fn test_next_days_to_show_cycles() {
        assert_eq!(next_days_to_show(7), 14);
        assert_eq!(next_days_to_show(14), 30);
        assert_eq!(next_days_to_show(30), 7);
        assert_eq!(next_days_to_show(9), DEFAULT_DAYS_TO_SHOW);
    }

    #[test]
    fn test_deserialize_applies_defaults_and_ignores_unknown_keys() {
        let json = r#"{
            "habits": [{"id": "a", "name": "Walk", "completions": {"2024-03-01": true}, "color": "red"}],
            "theme": "ignored"
        }"#;
        let data: AppData = serde_json::from_str(json).unwrap();
        assert_eq!(data.habits.len(), 1);
        assert_eq!(data.habits[0].emoji, DEFAULT_EMOJI);
        assert_eq!(data.habits[0].is_completed_on(day(0)), Some(true));
        assert_eq!(data.settings, Settings::default());
    }

    #[test]
    fn test_serialized_layout_uses_camel_case() {
        let data = AppData {
            habits: vec![habit_with(0, &[(1, false)])],
            settings: Settings {
                last_check_in_date: Some(day(1)),
                ..Settings::default()
            },
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["habits"][0]["createdDate"], "2024-03-01");
        assert_eq!(json["habits"][0]["completions"]["2024-03-02"], false);
        assert_eq!(json["settings"]["daysToShow"], 14);
        assert_eq!(json["settings"]["lastCheckInDate"], "2024-03-02");
    }

    #[test]
    fn test_malformed_date_key_is_rejected() {
        let json = r#"{"habits": [{"id": "a", "name": "Walk", "completions": {"yesterday": true}}]}"#;
        assert!(serde_json::from_str::<AppData>(json).is_err());
    }

    proptest! {
        #[test]
        fn prop_double_toggle_visits_absent(offset in 0i64..60, start in prop::option::of(any::<bool>())) {
            let mut habit = habit_with(0, &[]);
            if let Some(v) = start {
                habit.completions.insert(day(offset), v);
            }
            let once = habit.with_toggled(day(offset));
            let twice = once.with_toggled(day(offset));
            match start {
                Some(true) => {
                    prop_assert_eq!(once.is_completed_on(day(offset)), None);
                    prop_assert_eq!(twice.is_completed_on(day(offset)), Some(true));
                }
                _ => {
                    prop_assert_eq!(once.is_completed_on(day(offset)), Some(true));
                    prop_assert_eq!(twice.is_completed_on(day(offset)), None);
                }
            }
        }

        #[test]
        fn prop_consistency_is_a_percentage(
            records in prop::collection::vec((0i64..40, any::<bool>()), 0..40),
            window in 0u32..45,
        ) {
            let habit = habit_with(0, &records);
            let pct = habit.consistency_percentage(window, day(39));
            prop_assert!(pct <= 100);
        }
    }
}
