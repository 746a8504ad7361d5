//! Cross-habit statistics
//!
//! Aggregates over the habit list: total leaves, the "perfect day" streak,
//! the trailing week strip and the encouragement shown next to the tree.

use crate::model::{Habit, Settings};
use chrono::{Duration, NaiveDate};
use std::fmt;

/// Completed days summed over every habit
pub fn total_leaves(habits: &[Habit]) -> usize {
    habits.iter().map(Habit::leaf_count).sum()
}

/// Consecutive days ending today on which every habit was completed.
///
/// An empty habit list has no perfect days.
pub fn overall_streak(habits: &[Habit], today: NaiveDate) -> u32 {
    if habits.is_empty() {
        return 0;
    }

    let mut streak = 0;
    let mut day = today;
    while habits.iter().all(|h| h.is_completed_on(day) == Some(true)) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Number of habits completed on `date`
pub fn completed_on(habits: &[Habit], date: NaiveDate) -> usize {
    habits
        .iter()
        .filter(|h| h.is_completed_on(date) == Some(true))
        .count()
}

/// How a single day looks across all habits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    NoHabits,
    Perfect,
    Partial,
    Empty,
}

/// Completion count for one day of the week strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayProgress {
    pub date: NaiveDate,
    pub completed: usize,
    pub total: usize,
}

impl DayProgress {
    pub fn status(&self) -> DayStatus {
        if self.total == 0 {
            DayStatus::NoHabits
        } else if self.completed == self.total {
            DayStatus::Perfect
        } else if self.completed > 0 {
            DayStatus::Partial
        } else {
            DayStatus::Empty
        }
    }
}

/// The seven days ending today, oldest first
pub fn week_progress(habits: &[Habit], today: NaiveDate) -> Vec<DayProgress> {
    (0..7)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            DayProgress {
                date,
                completed: completed_on(habits, date),
                total: habits.len(),
            }
        })
        .collect()
}

/// Encouragement line for the current tree size
pub fn motivation(total_leaves: usize, overall_streak: u32) -> String {
    match total_leaves {
        0 => "🌱 Plant your first leaf today!".to_string(),
        1..=4 => "💪 Great start! Keep the momentum!".to_string(),
        5..=9 => "🌿 Your tree is growing! Stay consistent!".to_string(),
        10..=24 => "🌳 Impressive! Your habits are taking root!".to_string(),
        25..=49 => "✨ Amazing progress! You're unstoppable!".to_string(),
        _ if overall_streak >= 7 => "🏆 LEGENDARY! 7+ perfect days in a row!".to_string(),
        n => format!("🎉 WOW! {} leaves! You're a habit master!", n),
    }
}

/// Badge earned from the lifetime check-in counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Achievement {
    WeekWarrior,
    MonthlyMaster,
    HalfCentury,
    CenturyClub,
}

impl Achievement {
    pub fn for_check_ins(check_ins: u32) -> Option<Self> {
        match check_ins {
            100.. => Some(Achievement::CenturyClub),
            50..=99 => Some(Achievement::HalfCentury),
            30..=49 => Some(Achievement::MonthlyMaster),
            7..=29 => Some(Achievement::WeekWarrior),
            _ => None,
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Achievement::CenturyClub => "🏅 Century Club",
            Achievement::HalfCentury => "⭐ Half Century",
            Achievement::MonthlyMaster => "💎 Monthly Master",
            Achievement::WeekWarrior => "🔰 Week Warrior",
        };
        f.write_str(label)
    }
}

/// Headline numbers for the summary panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_leaves: usize,
    pub overall_streak: u32,
    pub total_check_ins: u32,
    pub completed_today: usize,
    pub habit_count: usize,
}

impl Summary {
    pub fn compute(habits: &[Habit], settings: &Settings, today: NaiveDate) -> Self {
        Self {
            total_leaves: total_leaves(habits),
            overall_streak: overall_streak(habits, today),
            total_check_ins: settings.total_check_ins,
            completed_today: completed_on(habits, today),
            habit_count: habits.len(),
        }
    }

    pub fn motivation(&self) -> String {
        motivation(self.total_leaves, self.overall_streak)
    }

    pub fn achievement(&self) -> Option<Achievement> {
        Achievement::for_check_ins(self.total_check_ins)
    }

    pub fn all_done_today(&self) -> bool {
        self.habit_count > 0 && self.completed_today == self.habit_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(n)
    }

    fn habit(records: &[(i64, bool)]) -> Habit {
        let mut habit = Habit::new("h", "🌱", day(0));
        for &(d, v) in records {
            habit.completions.insert(day(d), v);
        }
        habit
    }

    #[test]
    fn test_total_leaves_counts_only_completions() {
        let habits = vec![
            habit(&[(0, true), (1, false)]),
            habit(&[(0, true), (1, true), (2, true)]),
        ];
        assert_eq!(total_leaves(&habits), 4);
        assert_eq!(total_leaves(&[]), 0);
    }

    #[test]
    fn test_overall_streak_empty_list_is_zero() {
        assert_eq!(overall_streak(&[], day(5)), 0);
    }

    #[test]
    fn test_overall_streak_counts_perfect_days() {
        // Both habits done on days 3..=5, the second one missed day 2
        let habits = vec![
            habit(&[(2, true), (3, true), (4, true), (5, true)]),
            habit(&[(2, false), (3, true), (4, true), (5, true)]),
        ];
        assert_eq!(overall_streak(&habits, day(5)), 3);
    }

    #[test]
    fn test_overall_streak_requires_today() {
        let habits = vec![habit(&[(3, true), (4, true)])];
        assert_eq!(overall_streak(&habits, day(5)), 0);
    }

    #[test]
    fn test_week_progress() {
        let habits = vec![habit(&[(6, true), (5, true)]), habit(&[(6, true)])];
        let week = week_progress(&habits, day(6));
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, day(0));
        assert_eq!(week[6].date, day(6));
        assert_eq!(week[6].status(), DayStatus::Perfect);
        assert_eq!(week[5].status(), DayStatus::Partial);
        assert_eq!(week[4].status(), DayStatus::Empty);
        assert_eq!(week_progress(&[], day(6))[0].status(), DayStatus::NoHabits);
    }

    #[test]
    fn test_motivation_thresholds() {
        assert!(motivation(0, 0).contains("first leaf"));
        assert!(motivation(4, 0).contains("Great start"));
        assert!(motivation(9, 0).contains("growing"));
        assert!(motivation(24, 0).contains("taking root"));
        assert!(motivation(49, 0).contains("unstoppable"));
        assert!(motivation(50, 7).contains("LEGENDARY"));
        assert!(motivation(80, 2).contains("80 leaves"));
    }

    #[test]
    fn test_achievement_tiers() {
        assert_eq!(Achievement::for_check_ins(6), None);
        assert_eq!(Achievement::for_check_ins(7), Some(Achievement::WeekWarrior));
        assert_eq!(Achievement::for_check_ins(30), Some(Achievement::MonthlyMaster));
        assert_eq!(Achievement::for_check_ins(50), Some(Achievement::HalfCentury));
        assert_eq!(Achievement::for_check_ins(250), Some(Achievement::CenturyClub));
        assert_eq!(Achievement::CenturyClub.to_string(), "🏅 Century Club");
    }

    #[test]
    fn test_summary() {
        let habits = vec![habit(&[(6, true)]), habit(&[])];
        let settings = Settings {
            total_check_ins: 8,
            ..Settings::default()
        };
        let summary = Summary::compute(&habits, &settings, day(6));
        assert_eq!(summary.total_leaves, 1);
        assert_eq!(summary.overall_streak, 0);
        assert_eq!(summary.completed_today, 1);
        assert!(!summary.all_done_today());
        assert_eq!(summary.achievement(), Some(Achievement::WeekWarrior));
    }
}
