use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use habitree::stats::{self, DayStatus};
use habitree::tree::{TreeLayout, TreeScene};
use habitree::{logging, model, store, tui, Config, JsonStore, Tracker};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Read};
use std::path::PathBuf;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "habitree")]
#[command(author, version, about = "Micro habit tracker - every check-in grows a leaf on your tree")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the terminal UI (the default)
    Tui,

    /// List habits with today's status, streak and consistency
    List,

    /// Plant a new habit
    Add {
        /// Habit name
        name: String,

        /// Emoji shown next to the name
        #[arg(short, long)]
        emoji: Option<String>,
    },

    /// Rename a habit or change its emoji
    Edit {
        /// Habit id, id prefix, list position or name
        habit: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New emoji
        #[arg(short, long)]
        emoji: Option<String>,
    },

    /// Delete a habit and all its completions
    Remove {
        /// Habit id, id prefix, list position or name
        habit: String,
    },

    /// Check off a habit for today, or undo today's check-off
    Toggle {
        /// Habit id, id prefix, list position or name
        habit: String,
    },

    /// Show leaves, streaks, this week and achievements
    Stats,

    /// Generate the tree for the current data
    Tree {
        /// Print the whole scene as JSON
        #[arg(long)]
        json: bool,

        /// Drawing width in layout units
        #[arg(long, default_value = "600")]
        width: f32,

        /// Drawing height in layout units
        #[arg(long, default_value = "410")]
        height: f32,

        /// Seed for reproducible leaf placement
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show or change settings
    Settings {
        /// Visible window: 7, 14 or 30 days
        #[arg(long)]
        days: Option<u32>,

        /// Use the dark theme
        #[arg(long, conflicts_with = "light")]
        dark: bool,

        /// Use the light theme
        #[arg(long)]
        light: bool,
    },

    /// Delete every habit and reset settings
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },

    /// Export all data as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all data with a JSON export (use - for stdin)
    Import {
        /// File to import
        file: String,
    },

    /// Print the data file location
    Path,

    /// Generate shell completions
    ///
    /// Examples:
    ///   habitree completion zsh > ~/.zfunc/_habitree
    ///   habitree completion bash >> ~/.bashrc
    ///   habitree completion fish > ~/.config/fish/completions/habitree.fish
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Tui);
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    match command {
        Command::Tui => init_tui_logging(&config),
        Command::Completion { .. } => {}
        _ => logging::init_stderr(&config.log.level),
    }
    if let Some(e) = config_error {
        log::warn!("{}", e);
    }

    let result = match command {
        Command::Tui => tui::run(&config),
        Command::Completion { shell } => {
            let mut cmd = Args::command();
            generate(shell, &mut cmd, "habitree", &mut io::stdout());
            Ok(())
        }
        command => run(command, &config),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Raw mode owns the terminal, so the TUI only logs to a file when asked to
fn init_tui_logging(config: &Config) {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let data_path = store::data_path(config);
    let log_path = data_path.with_file_name("habitree.log");
    if let Err(e) = logging::init_file(&config.log.level, &log_path) {
        eprintln!("{} {}", "Warning:".yellow(), e);
    }
}

fn open_tracker(config: &Config) -> Tracker<JsonStore> {
    Tracker::open(JsonStore::open(store::data_path(config)))
}

fn run(command: Command, config: &Config) -> CliResult {
    let today = model::today();
    let mut tracker = open_tracker(config);

    match command {
        Command::List => list(&tracker),

        Command::Add { name, emoji } => {
            let emoji = emoji.unwrap_or_default();
            let id = tracker.add_habit(&name, &emoji, today)?;
            if let Some(habit) = tracker.habit(&id) {
                println!(
                    "{} {} {} {}",
                    "Planted".green(),
                    habit.emoji,
                    habit.name.bold(),
                    format!("({})", short_id(&habit.id)).dimmed()
                );
            }
        }

        Command::Edit { habit, name, emoji } => {
            if name.is_none() && emoji.is_none() {
                return Err("nothing to change, pass --name and/or --emoji".into());
            }
            let id = tracker.find(&habit)?.id.clone();
            tracker.update_habit(&id, name.as_deref(), emoji.as_deref())?;
            if let Some(habit) = tracker.habit(&id) {
                println!("{} {} {}", "Updated".green(), habit.emoji, habit.name.bold());
            }
        }

        Command::Remove { habit } => {
            let found = tracker.find(&habit)?;
            let (id, label) = (found.id.clone(), format!("{} {}", found.emoji, found.name));
            tracker.delete_habit(&id)?;
            println!("{} {}", "Removed".yellow(), label);
        }

        Command::Toggle { habit } => {
            let found = tracker.find(&habit)?;
            let (id, label) = (found.id.clone(), format!("{} {}", found.emoji, found.name));
            match tracker.toggle_today(&id, today)? {
                Some(true) => println!("🍃 {} {}", label.bold(), "done for today".green()),
                _ => println!("{} {}", label, "unchecked for today".dimmed()),
            }
        }

        Command::Stats => print_stats(&tracker),

        Command::Tree {
            json,
            width,
            height,
            seed,
        } => {
            if !(width > 0.0 && height > 0.0) {
                return Err("tree width and height must be positive".into());
            }
            let layout = TreeLayout::new(width, height);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let scene = TreeScene::build(
                tracker.habits(),
                tracker.settings().days_to_show,
                today,
                &layout,
                &config.tree_params(),
                &mut rng,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&scene)?);
            } else {
                print_tree(&scene, tracker.settings().days_to_show);
            }
        }

        Command::Settings { days, dark, light } => {
            let theme = match (dark, light) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            if days.is_some() || theme.is_some() {
                tracker.update_settings(days, theme)?;
            }
            let settings = tracker.settings();
            println!("{}", "Settings".cyan().bold());
            println!("  days shown     {}", settings.days_to_show);
            println!(
                "  theme          {}",
                if settings.is_dark_theme { "dark" } else { "light" }
            );
            println!("  check-ins      {}", settings.total_check_ins);
            if let Some(date) = settings.last_check_in_date {
                println!("  last check-in  {}", date);
            }
        }

        Command::Clear { yes } => {
            if !yes {
                return Err("this deletes every habit; re-run with --yes to confirm".into());
            }
            tracker.clear_all();
            println!("{}", "All data cleared".yellow());
        }

        Command::Export { output } => {
            let json = tracker.export_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json + "\n")
                        .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
                    println!("{} {}", "Exported to".green(), path.display());
                }
                None => println!("{}", json),
            }
        }

        Command::Import { file } => {
            let text = if file == "-" {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                text
            } else {
                std::fs::read_to_string(&file)
                    .map_err(|e| format!("failed to read {}: {}", file, e))?
            };
            tracker.import_json(&text)?;
            println!(
                "{} {} habit(s)",
                "Imported".green(),
                tracker.habits().len()
            );
        }

        Command::Path => println!("{}", tracker.store().path().display()),

        Command::Tui | Command::Completion { .. } => {}
    }

    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn list(tracker: &Tracker<JsonStore>) {
    let today = model::today();
    let days = tracker.settings().days_to_show;

    if tracker.habits().is_empty() {
        println!("No habits yet. Plant one with {}", "habitree add <name>".cyan());
        return;
    }

    for (i, habit) in tracker.habits().iter().enumerate() {
        let mark = if habit.is_completed_on(today) == Some(true) {
            "✔".green().bold()
        } else {
            "○".dimmed()
        };
        let streak = match habit.current_streak(today) {
            0 => String::new(),
            n => format!("🔥 {}", n),
        };
        println!(
            "{:>3}. {} {} {:<24} {:>6} {:>4}% {:>4} 🍃  {}",
            i + 1,
            mark,
            habit.emoji,
            habit.name,
            streak,
            habit.consistency_percentage(days, today),
            habit.leaf_count(),
            short_id(&habit.id).dimmed()
        );
    }
}

fn print_stats(tracker: &Tracker<JsonStore>) {
    let today = model::today();
    let summary = tracker.summary(today);

    println!("{}", "Your Habit Tree".green().bold());
    println!("  leaves          {}", summary.total_leaves);
    println!("  perfect streak  {} day(s)", summary.overall_streak);
    println!(
        "  today           {}/{}",
        summary.completed_today, summary.habit_count
    );
    println!("  check-ins       {}", summary.total_check_ins);
    if let Some(achievement) = summary.achievement() {
        println!("  achievement     🏆 {}", achievement.to_string().yellow());
    }

    let week: Vec<String> = stats::week_progress(tracker.habits(), today)
        .iter()
        .map(|day| {
            let mark = match day.status() {
                DayStatus::Perfect => "●".green().to_string(),
                DayStatus::Partial => "◐".yellow().to_string(),
                DayStatus::Empty => "○".dimmed().to_string(),
                DayStatus::NoHabits => "·".dimmed().to_string(),
            };
            format!("{} {}", day.date.format("%a"), mark)
        })
        .collect();
    println!("  this week       {}", week.join("  "));

    println!();
    println!("{}", summary.motivation().italic());
}

fn print_tree(scene: &TreeScene, days: u32) {
    let twigs = scene.branches.iter().filter(|b| b.is_twig()).count();
    println!("{}", "Habit tree".green().bold());
    println!(
        "  branches  {} ({} twigs)",
        scene.branches.len(),
        twigs
    );
    println!(
        "  leaves    {} placed of {} in the last {} days",
        scene.leaves.len(),
        scene.active.len(),
        days
    );
    if scene.dropped_leaves() > 0 {
        println!(
            "            {} more than the twigs can hold",
            scene.dropped_leaves()
        );
    }
    println!(
        "  fallen    {} shown of {} missed",
        scene.fallen_leaves.len(),
        scene.fallen.len()
    );
    if scene.is_bare() {
        println!();
        println!("{}", "Complete habits to watch your tree grow!".italic());
    }
}
