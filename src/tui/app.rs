//! Application state for the TUI

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use crossterm::event::{MouseEvent, MouseEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::state;
use crate::config::Config;
use crate::model::{self, next_days_to_show, Habit};
use crate::store::{self, JsonStore};
use crate::tracker::Tracker;
use crate::tree::{TreeLayout, TreeParams, TreeScene};

/// File events this soon after our own save are our own echo
const OWN_WRITE_GRACE: Duration = Duration::from_millis(750);

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Prompt,
    ConfirmDelete,
    ConfirmClear,
}

/// Which field of the habit prompt has the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptField {
    Name,
    Emoji,
}

/// Add/edit habit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitPrompt {
    /// `None` creates a new habit
    pub editing: Option<String>,
    pub name: String,
    pub emoji: String,
    pub field: PromptField,
}

impl HabitPrompt {
    pub fn new_habit() -> Self {
        Self {
            editing: None,
            name: String::new(),
            emoji: model::DEFAULT_EMOJI.to_string(),
            field: PromptField::Name,
        }
    }

    pub fn edit(habit: &Habit) -> Self {
        Self {
            editing: Some(habit.id.clone()),
            name: habit.name.clone(),
            emoji: habit.emoji.clone(),
            field: PromptField::Name,
        }
    }

    fn current(&mut self) -> &mut String {
        match self.field {
            PromptField::Name => &mut self.name,
            PromptField::Emoji => &mut self.emoji,
        }
    }

    pub fn push(&mut self, c: char) {
        self.current().push(c);
    }

    pub fn pop(&mut self) {
        self.current().pop();
    }

    pub fn switch_field(&mut self) {
        self.field = match self.field {
            PromptField::Name => PromptField::Emoji,
            PromptField::Emoji => PromptField::Name,
        };
    }
}

/// Main application state
pub struct App {
    pub tracker: Tracker<JsonStore>,
    data_path: PathBuf,

    // Tree
    pub tree_params: TreeParams,
    pub layout: TreeLayout,
    pub scene: TreeScene,
    scene_dirty: Rc<Cell<bool>>,
    scene_date: NaiveDate,
    rng: StdRng,

    // List state
    pub selected_index: usize,
    pub scroll_offset: usize,

    // UI state
    pub mode: Mode,
    pub prompt: Option<HabitPrompt>,
    pub show_help: bool,

    // Viewport
    pub viewport_width: u16,
    pub viewport_height: u16,

    // Refresh indicator
    pub refresh_shown_at: Option<Instant>,
    last_own_write: Option<Instant>,

    // Status message
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let data_path = store::data_path(config);
        let mut tracker = Tracker::open(JsonStore::open(&data_path));

        // Any committed change or reload invalidates the drawn tree
        let scene_dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&scene_dirty);
        tracker.subscribe(move |_| flag.set(true));

        let today = model::today();
        let layout = TreeLayout::default();
        let tree_params = config.tree_params();
        let mut rng = StdRng::from_entropy();
        let scene = TreeScene::build(
            tracker.habits(),
            tracker.settings().days_to_show,
            today,
            &layout,
            &tree_params,
            &mut rng,
        );

        let mut app = Self {
            tracker,
            data_path,
            tree_params,
            layout,
            scene,
            scene_dirty,
            scene_date: today,
            rng,
            selected_index: 0,
            scroll_offset: 0,
            mode: Mode::Normal,
            prompt: None,
            show_help: false,
            viewport_width: 80,
            viewport_height: 24,
            refresh_shown_at: None,
            last_own_write: None,
            status_message: None,
        };
        app.sync_selection();
        app
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn today(&self) -> NaiveDate {
        self.scene_date
    }

    pub fn habits(&self) -> &[Habit] {
        self.tracker.habits()
    }

    pub fn selected_habit(&self) -> Option<&Habit> {
        self.habits().get(self.selected_index)
    }

    pub fn is_dark(&self) -> bool {
        self.tracker.settings().is_dark_theme
    }

    /// Rebuild the tree if the data or the date changed since the last frame
    pub fn refresh_scene(&mut self) {
        let today = model::today();
        if !self.scene_dirty.get() && today == self.scene_date {
            return;
        }
        self.scene_date = today;
        self.scene = TreeScene::build(
            self.tracker.habits(),
            self.tracker.settings().days_to_show,
            today,
            &self.layout,
            &self.tree_params,
            &mut self.rng,
        );
        self.scene_dirty.set(false);
    }

    /// Reload data after the file changed on disk.
    ///
    /// Returns false when the change was our own write echoing back.
    pub fn reload_external(&mut self) -> bool {
        if self
            .last_own_write
            .is_some_and(|at| at.elapsed() < OWN_WRITE_GRACE)
        {
            return false;
        }
        self.reload();
        true
    }

    pub fn reload(&mut self) {
        self.tracker.reload();
        self.sync_selection();
        self.show_refresh_indicator();
    }

    /// Show the refresh indicator
    pub fn show_refresh_indicator(&mut self) {
        self.refresh_shown_at = Some(Instant::now());
    }

    /// Periodic tick for animations
    pub fn tick(&mut self) {
        // Clear refresh indicator after 2 seconds
        if let Some(shown_at) = self.refresh_shown_at {
            if shown_at.elapsed().as_secs() >= 2 {
                self.refresh_shown_at = None;
            }
        }

        // Clear status message after 3 seconds
        if let Some((_, shown_at)) = &self.status_message {
            if shown_at.elapsed().as_secs() >= 3 {
                self.status_message = None;
            }
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    fn wrote(&mut self) {
        self.last_own_write = Some(Instant::now());
    }

    /// Point the list cursor at the tracker's selected habit
    fn sync_selection(&mut self) {
        let index = self
            .tracker
            .selected()
            .and_then(|h| state::position_of(self.tracker.habits(), &h.id))
            .unwrap_or(self.selected_index);
        self.selected_index = state::clamp_selection(index, self.habits().len());
        self.ensure_visible();
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    fn select_index(&mut self, index: usize) {
        self.selected_index = state::clamp_selection(index, self.habits().len());
        if let Some(id) = self.selected_habit().map(|h| h.id.clone()) {
            let _ = self.tracker.select(&id);
        }
        self.ensure_visible();
    }

    pub fn move_up(&mut self) {
        self.select_index(state::move_selection_up(self.selected_index));
    }

    pub fn move_down(&mut self) {
        self.select_index(state::move_selection_down(
            self.selected_index,
            self.habits().len(),
        ));
    }

    pub fn jump_to_top(&mut self) {
        self.select_index(0);
    }

    pub fn jump_to_bottom(&mut self) {
        self.select_index(self.habits().len().saturating_sub(1));
    }

    fn ensure_visible(&mut self) {
        // Header, summary, borders and footer
        let visible_items = (self.viewport_height as usize).saturating_sub(8);
        self.scroll_offset =
            state::calculate_scroll_offset(self.selected_index, self.scroll_offset, visible_items);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.ensure_visible();
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::ScrollDown => self.move_down(),
            MouseEventKind::ScrollUp => self.move_up(),
            _ => {}
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub fn toggle_selected(&mut self) {
        let Some(habit) = self.selected_habit() else {
            self.set_status("No habit selected".to_string());
            return;
        };
        let (id, name) = (habit.id.clone(), habit.name.clone());
        let today = self.today();

        match self.tracker.toggle_today(&id, today) {
            Ok(Some(true)) => self.set_status(format!("🍃 {} done for today", name)),
            Ok(_) => self.set_status(format!("{} unchecked", name)),
            Err(e) => self.set_status(format!("Toggle failed: {}", e)),
        }
        self.wrote();
    }

    pub fn open_add_prompt(&mut self) {
        self.prompt = Some(HabitPrompt::new_habit());
        self.mode = Mode::Prompt;
    }

    pub fn open_edit_prompt(&mut self) {
        if let Some(prompt) = self.selected_habit().map(HabitPrompt::edit) {
            self.prompt = Some(prompt);
            self.mode = Mode::Prompt;
        }
    }

    pub fn cancel(&mut self) {
        self.prompt = None;
        self.mode = Mode::Normal;
    }

    /// Enter on the name field moves on; Enter on the emoji field saves
    pub fn prompt_enter(&mut self) {
        let Some(prompt) = self.prompt.as_mut() else {
            self.mode = Mode::Normal;
            return;
        };
        if prompt.field == PromptField::Name {
            prompt.switch_field();
            return;
        }

        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let today = self.today();
        let result = match &prompt.editing {
            None => self
                .tracker
                .add_habit(&prompt.name, &prompt.emoji, today)
                .map(|_| format!("Planted {} {}", prompt.emoji.trim(), prompt.name.trim())),
            Some(id) => self
                .tracker
                .update_habit(id, Some(&prompt.name), Some(&prompt.emoji))
                .map(|_| "Habit updated".to_string()),
        };

        match result {
            Ok(message) => {
                self.wrote();
                self.mode = Mode::Normal;
                self.sync_selection();
                self.set_status(message);
            }
            Err(e) => {
                // Keep the form open so the input can be fixed
                self.set_status(e.to_string());
                self.prompt = Some(prompt);
            }
        }
    }

    pub fn ask_delete(&mut self) {
        if self.selected_habit().is_some() {
            self.mode = Mode::ConfirmDelete;
        }
    }

    pub fn ask_clear(&mut self) {
        self.mode = Mode::ConfirmClear;
    }

    pub fn confirm(&mut self) {
        match self.mode {
            Mode::ConfirmDelete => {
                if let Some(id) = self.selected_habit().map(|h| h.id.clone()) {
                    match self.tracker.delete_habit(&id) {
                        Ok(()) => self.set_status("Habit deleted".to_string()),
                        Err(e) => self.set_status(format!("Delete failed: {}", e)),
                    }
                }
            }
            Mode::ConfirmClear => {
                self.tracker.clear_all();
                self.set_status("All data cleared".to_string());
            }
            Mode::Normal | Mode::Prompt => return,
        }
        self.wrote();
        self.mode = Mode::Normal;
        self.sync_selection();
    }

    pub fn toggle_theme(&mut self) {
        let dark = !self.is_dark();
        if let Err(e) = self.tracker.update_settings(None, Some(dark)) {
            self.set_status(format!("Settings failed: {}", e));
        }
        self.wrote();
    }

    pub fn cycle_window(&mut self) {
        let days = next_days_to_show(self.tracker.settings().days_to_show);
        match self.tracker.update_settings(Some(days), None) {
            Ok(()) => self.set_status(format!("Showing the last {} days", days)),
            Err(e) => self.set_status(format!("Settings failed: {}", e)),
        }
        self.wrote();
    }
}
