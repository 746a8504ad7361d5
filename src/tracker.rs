//! Application state holder
//!
//! [`Tracker`] owns the current [`AppData`] snapshot. Readers borrow it;
//! every mutation builds a complete new snapshot, swaps it in, writes it to
//! storage exactly once and then notifies subscribers. There is no partial
//! update path, so a reader never sees half of a change.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::model::{AppData, Habit, Settings, DAYS_TO_SHOW_OPTIONS, DEFAULT_EMOJI};
use crate::stats::{self, Summary};
use crate::store::{self, Storage};

/// Callback run after every committed change
pub type Observer = Box<dyn FnMut(&AppData)>;

pub struct Tracker<S: Storage> {
    store: S,
    data: AppData,
    selected: Option<String>,
    observers: Vec<Observer>,
}

fn clean_emoji(emoji: &str) -> String {
    let emoji = emoji.trim();
    if emoji.is_empty() {
        DEFAULT_EMOJI.to_string()
    } else {
        emoji.to_string()
    }
}

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        Err(Error::InvalidName)
    } else {
        Ok(name.to_string())
    }
}

impl<S: Storage> Tracker<S> {
    /// Load the stored snapshot and select the first habit
    pub fn open(store: S) -> Self {
        let data = store.load();
        let selected = data.habits.first().map(|h| h.id.clone());
        Self {
            store,
            data,
            selected,
            observers: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn snapshot(&self) -> &AppData {
        &self.data
    }

    pub fn habits(&self) -> &[Habit] {
        &self.data.habits
    }

    pub fn settings(&self) -> &Settings {
        &self.data.settings
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.data.habit(id)
    }

    /// Resolve a user-supplied habit reference.
    ///
    /// Tried in order: exact id, 1-based position, case-insensitive name,
    /// id prefix.
    pub fn find(&self, query: &str) -> Result<&Habit> {
        let query = query.trim();
        let habits = &self.data.habits;

        if let Some(habit) = self.data.habit(query) {
            return Ok(habit);
        }

        if let Ok(position) = query.parse::<usize>() {
            if let Some(habit) = position.checked_sub(1).and_then(|i| habits.get(i)) {
                return Ok(habit);
            }
        }

        let by_name: Vec<&Habit> = habits
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(query))
            .collect();
        let by_prefix: Vec<&Habit> = habits
            .iter()
            .filter(|h| !query.is_empty() && h.id.starts_with(query))
            .collect();

        for matches in [by_name, by_prefix] {
            match matches.as_slice() {
                [] => continue,
                [habit] => return Ok(*habit),
                many => {
                    return Err(Error::AmbiguousHabit {
                        query: query.to_string(),
                        count: many.len(),
                    })
                }
            }
        }

        Err(Error::HabitNotFound(query.to_string()))
    }

    pub fn selected(&self) -> Option<&Habit> {
        self.selected.as_deref().and_then(|id| self.data.habit(id))
    }

    pub fn select(&mut self, id: &str) -> Result<()> {
        self.require(id)?;
        self.selected = Some(id.to_string());
        Ok(())
    }

    /// Register a callback run after every committed change
    pub fn subscribe(&mut self, observer: impl FnMut(&AppData) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // =========================================================================
    // Metrics
    // =========================================================================

    pub fn total_leaves(&self) -> usize {
        stats::total_leaves(&self.data.habits)
    }

    pub fn overall_streak(&self, today: NaiveDate) -> u32 {
        stats::overall_streak(&self.data.habits, today)
    }

    pub fn summary(&self, today: NaiveDate) -> Summary {
        Summary::compute(&self.data.habits, &self.data.settings, today)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a habit, select it and return its id
    pub fn add_habit(&mut self, name: &str, emoji: &str, today: NaiveDate) -> Result<String> {
        let habit = Habit::new(clean_name(name)?, clean_emoji(emoji), today);
        let id = habit.id.clone();

        let mut next = self.data.clone();
        next.habits.push(habit);
        self.selected = Some(id.clone());
        log::info!("added habit {}", id);
        self.commit(next);
        Ok(id)
    }

    /// Rename a habit and/or change its emoji
    pub fn update_habit(&mut self, id: &str, name: Option<&str>, emoji: Option<&str>) -> Result<()> {
        self.require(id)?;
        let name = name.map(clean_name).transpose()?;

        let mut next = self.data.clone();
        if let Some(habit) = next.habits.iter_mut().find(|h| h.id == id) {
            if let Some(name) = name {
                habit.name = name;
            }
            if let Some(emoji) = emoji {
                habit.emoji = clean_emoji(emoji);
            }
        }
        self.commit(next);
        Ok(())
    }

    pub fn delete_habit(&mut self, id: &str) -> Result<()> {
        self.require(id)?;

        let mut next = self.data.clone();
        next.habits.retain(|h| h.id != id);
        if self.selected.as_deref() == Some(id) {
            self.selected = next.habits.first().map(|h| h.id.clone());
        }
        log::info!("deleted habit {}", id);
        self.commit(next);
        Ok(())
    }

    /// Toggle `today` for a habit and return its new record for the day.
    ///
    /// The first toggle of a calendar day also bumps the lifetime check-in
    /// counter.
    pub fn toggle_today(&mut self, id: &str, today: NaiveDate) -> Result<Option<bool>> {
        self.require(id)?;

        let mut next = self.data.clone();
        let mut state = None;
        for habit in next.habits.iter_mut().filter(|h| h.id == id) {
            *habit = habit.with_toggled(today);
            state = habit.is_completed_on(today);
        }

        let settings = &mut next.settings;
        if settings.last_check_in_date != Some(today) {
            settings.total_check_ins += 1;
            settings.last_check_in_date = Some(today);
        }

        self.commit(next);
        Ok(state)
    }

    /// Change the display window and/or theme; `None` keeps the current value
    pub fn update_settings(&mut self, days_to_show: Option<u32>, dark_theme: Option<bool>) -> Result<()> {
        if let Some(days) = days_to_show {
            if !DAYS_TO_SHOW_OPTIONS.contains(&days) {
                return Err(Error::InvalidDaysToShow(days));
            }
        }

        let mut next = self.data.clone();
        if let Some(days) = days_to_show {
            next.settings.days_to_show = days;
        }
        if let Some(dark) = dark_theme {
            next.settings.is_dark_theme = dark;
        }
        self.commit(next);
        Ok(())
    }

    /// Drop every habit and reset settings
    pub fn clear_all(&mut self) {
        self.selected = None;
        log::info!("clearing all data");
        self.commit(AppData::default());
    }

    pub fn export_json(&self) -> Result<String> {
        store::export_json(&self.data)
    }

    /// Replace everything with an exported snapshot.
    ///
    /// Invalid input is rejected before anything changes: no write, no
    /// notification.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let next = store::parse_import(text).map_err(|e| {
            log::warn!("error importing data: {}", e);
            e
        })?;
        self.selected = next.habits.first().map(|h| h.id.clone());
        log::info!("imported {} habit(s)", next.habits.len());
        self.commit(next);
        Ok(())
    }

    /// Re-read storage after an outside change. Notifies but does not write.
    pub fn reload(&mut self) {
        self.data = self.store.load();
        if self.selected().is_none() {
            self.selected = self.data.habits.first().map(|h| h.id.clone());
        }
        self.notify();
    }

    fn require(&self, id: &str) -> Result<()> {
        match self.data.habit(id) {
            Some(_) => Ok(()),
            None => Err(Error::HabitNotFound(id.to_string())),
        }
    }

    fn commit(&mut self, next: AppData) {
        self.data = next;
        if let Err(e) = self.store.save(&self.data) {
            log::error!("error saving data: {}", e);
        }
        self.notify();
    }

    fn notify(&mut self) {
        for observer in &mut self.observers {
            observer(&self.data);
        }
    }
}
