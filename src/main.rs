//! zenith CLI: personal planning engine.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use zenith_planner::academics::{ChapterDraft, ChapterId, ClassId, CounterKind, SubjectId};
use zenith_planner::config::PlannerConfig;
use zenith_planner::engine::Engine;
use zenith_planner::export;
use zenith_planner::goal::{Goal, GoalDraft, GoalId};
use zenith_planner::paths::PlannerPaths;
use zenith_planner::period::{self, Granularity};
use zenith_planner::store::JsonFileStore;

#[derive(Parser)]
#[command(name = "zenith", version, about = "Personal planning engine")]
struct Cli {
    /// Path to the planner state document.
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage goals.
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Manage classes.
    Class {
        #[command(subcommand)]
        action: ClassAction,
    },

    /// Manage subjects within a class.
    Subject {
        #[command(subcommand)]
        action: SubjectAction,
    },

    /// Manage chapters within a subject.
    Chapter {
        #[command(subcommand)]
        action: ChapterAction,
    },

    /// Export the full state as a timestamped JSON document.
    Export {
        /// Directory to write into (defaults to the XDG exports directory).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Import a planner document, replacing the current state.
    Import {
        /// Path to a JSON document with `goals` and `classes` arrays.
        file: PathBuf,
    },

    /// Show planner statistics.
    Info,
}

#[derive(Subcommand)]
enum GoalAction {
    /// Create a goal.
    Add {
        /// Goal title.
        title: String,

        /// Time bucket: daily, weekly, or monthly.
        #[arg(long, default_value = "daily")]
        granularity: Granularity,

        /// Date the period is derived from (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Explicit period id (overrides --date).
        #[arg(long)]
        period: Option<String>,

        /// Free-text description.
        #[arg(long, default_value = "")]
        description: String,

        /// Resource URL.
        #[arg(long)]
        resource: Option<String>,

        /// Academic chapter this goal tracks.
        #[arg(long)]
        chapter: Option<String>,
    },

    /// List goals, optionally filtered by granularity and period.
    List {
        #[arg(long)]
        granularity: Option<Granularity>,

        #[arg(long)]
        period: Option<String>,
    },

    /// Show one goal in full.
    Show {
        /// Goal id.
        id: String,
    },

    /// Set a leaf goal's progress (0-100).
    Progress {
        /// Goal id.
        id: String,
        /// Percentage.
        value: u8,
    },

    /// Delete a goal, unlinking it everywhere.
    Delete {
        /// Goal id.
        id: String,
    },

    /// Link a goal under a goal one granularity coarser.
    Link {
        /// Child goal id.
        child: String,
        /// Parent goal id.
        parent: String,
    },

    /// Remove the link between two goals.
    Unlink {
        /// Child goal id.
        child: String,
        /// Parent goal id.
        parent: String,
    },

    /// List goals the given goal could link under.
    Parents {
        /// Goal id.
        id: String,
    },

    /// Re-sequence goals: each id gets its position as display order.
    Reorder {
        /// Goal ids in the desired order.
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ClassAction {
    /// Create a class.
    Add {
        /// Class title.
        title: String,
    },
    /// List classes with their subjects and chapters.
    List,
    /// Delete a class.
    Delete {
        /// Class id.
        id: String,
    },
}

#[derive(Subcommand)]
enum SubjectAction {
    /// Create a subject under a class.
    Add {
        /// Class id.
        #[arg(long)]
        class: String,
        /// Subject title.
        title: String,
    },
    /// Delete a subject.
    Delete {
        /// Class id.
        #[arg(long)]
        class: String,
        /// Subject id.
        id: String,
    },
}

#[derive(Subcommand)]
enum ChapterAction {
    /// Create a chapter under a subject.
    Add {
        /// Class id.
        #[arg(long)]
        class: String,
        /// Subject id.
        #[arg(long)]
        subject: String,
        /// Chapter title.
        title: String,
        /// Initial lecture count.
        #[arg(long, default_value = "0")]
        lectures: u32,
        /// Initial daily-practice-paper count.
        #[arg(long, default_value = "0")]
        dpps: u32,
        /// Initial test count.
        #[arg(long, default_value = "0")]
        tests: u32,
    },
    /// Delete a chapter.
    Delete {
        /// Class id.
        #[arg(long)]
        class: String,
        /// Subject id.
        #[arg(long)]
        subject: String,
        /// Chapter id.
        id: String,
    },
    /// Adjust one of a chapter's activity counters.
    Bump {
        /// Class id.
        #[arg(long)]
        class: String,
        /// Subject id.
        #[arg(long)]
        subject: String,
        /// Chapter id.
        id: String,
        /// Counter: lectures, dpps, or tests.
        #[arg(long)]
        kind: CounterKind,
        /// Decrement instead of increment.
        #[arg(long)]
        down: bool,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let paths = PlannerPaths::resolve()?;
    paths.ensure_dirs()?;
    let config = PlannerConfig::load(&paths.config_file())?;
    let state_file = cli
        .state_file
        .clone()
        .unwrap_or_else(|| config.state_file(&paths));
    let mut engine = Engine::open(Box::new(JsonFileStore::new(state_file)));

    match cli.command {
        Commands::Goal { action } => run_goal(&mut engine, action)?,
        Commands::Class { action } => run_class(&mut engine, action)?,
        Commands::Subject { action } => run_subject(&mut engine, action)?,
        Commands::Chapter { action } => run_chapter(&mut engine, action)?,
        Commands::Export { out } => {
            let dir = out.unwrap_or_else(|| config.export_dir(&paths));
            std::fs::create_dir_all(&dir).into_diagnostic()?;
            let path = export::write_export(engine.state(), &dir, Local::now().naive_local())?;
            println!("exported to {}", path.display());
        }
        Commands::Import { file } => {
            let json = std::fs::read_to_string(&file).into_diagnostic()?;
            engine.import(&json)?;
            println!(
                "imported {} goal(s), {} class(es)",
                engine.state().goals.len(),
                engine.state().classes.len()
            );
        }
        Commands::Info => {
            for granularity in Granularity::ALL {
                let count = engine
                    .state()
                    .goals
                    .iter()
                    .filter(|g| g.granularity == granularity)
                    .count();
                println!("{granularity:>8} goals: {count}");
            }
            let subjects: usize = engine.state().classes.iter().map(|c| c.subjects.len()).sum();
            let chapters: usize = engine
                .state()
                .classes
                .iter()
                .flat_map(|c| &c.subjects)
                .map(|s| s.chapters.len())
                .sum();
            println!(
                " classes: {} ({subjects} subject(s), {chapters} chapter(s))",
                engine.state().classes.len()
            );
        }
    }

    Ok(())
}

fn print_goal_line(goal: &Goal) {
    println!(
        "{}  {:>3}%  [{} {}] {}",
        goal.id, goal.progress, goal.granularity, goal.period_id, goal.title
    );
}

fn run_goal(engine: &mut Engine, action: GoalAction) -> Result<()> {
    match action {
        GoalAction::Add {
            title,
            granularity,
            date,
            period,
            description,
            resource,
            chapter,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let period_id = period.unwrap_or_else(|| period::period_id(date, granularity));
            let goal = engine.add_goal(GoalDraft {
                title,
                description,
                granularity,
                period_id,
                resource_url: resource,
                class_chapter_id: chapter.map(ChapterId::new),
            })?;
            print_goal_line(&goal);
        }
        GoalAction::List {
            granularity,
            period,
        } => {
            let mut goals: Vec<&Goal> = engine
                .state()
                .goals
                .iter()
                .filter(|g| granularity.is_none_or(|wanted| g.granularity == wanted))
                .filter(|g| period.as_deref().is_none_or(|wanted| g.period_id == wanted))
                .collect();
            goals.sort_by(|a, b| {
                (a.period_id.as_str(), a.order).cmp(&(b.period_id.as_str(), b.order))
            });
            for goal in goals {
                print_goal_line(goal);
            }
        }
        GoalAction::Show { id } => {
            let goal = engine.goal(&GoalId::new(id))?;
            print_goal_line(goal);
            if !goal.description.is_empty() {
                println!("  description: {}", goal.description);
            }
            if let Some(url) = &goal.resource_url {
                println!("  resource: {url}");
            }
            if let Some(chapter) = &goal.class_chapter_id {
                println!("  chapter: {chapter}");
            }
            for parent in &goal.parent_links {
                println!("  contributes to: {parent}");
            }
            for child in &goal.child_links {
                println!("  aggregates: {child}");
            }
            println!("  created {}, updated {}", goal.created_at, goal.updated_at);
        }
        GoalAction::Progress { id, value } => {
            let id = GoalId::new(id);
            engine.set_progress(&id, value)?;
            print_goal_line(engine.goal(&id)?);
        }
        GoalAction::Delete { id } => {
            engine.delete_goal(&GoalId::new(id))?;
        }
        GoalAction::Link { child, parent } => {
            let parent = GoalId::new(parent);
            engine.link_goals(&GoalId::new(child), &parent)?;
            print_goal_line(engine.goal(&parent)?);
        }
        GoalAction::Unlink { child, parent } => {
            engine.unlink_goals(&GoalId::new(child), &GoalId::new(parent))?;
        }
        GoalAction::Parents { id } => {
            for parent in engine.linkable_parents(&GoalId::new(id))? {
                print_goal_line(parent);
            }
        }
        GoalAction::Reorder { ids } => {
            let ids: Vec<GoalId> = ids.into_iter().map(GoalId::new).collect();
            engine.reorder_goals(&ids)?;
        }
    }
    Ok(())
}

fn run_class(engine: &mut Engine, action: ClassAction) -> Result<()> {
    match action {
        ClassAction::Add { title } => {
            let class = engine.add_class(&title)?;
            println!("{}  {}", class.id, class.title);
        }
        ClassAction::List => {
            for class in &engine.state().classes {
                println!("{}  {}", class.id, class.title);
                for subject in &class.subjects {
                    println!("  {}  {}", subject.id, subject.title);
                    for chapter in &subject.chapters {
                        println!(
                            "    {}  {:>3}%  {} (lectures {}, dpps {}, tests {})",
                            chapter.id,
                            chapter.progress,
                            chapter.title,
                            chapter.lectures_count,
                            chapter.dpps_count,
                            chapter.tests_count
                        );
                    }
                }
            }
        }
        ClassAction::Delete { id } => {
            engine.delete_class(&ClassId::new(id))?;
        }
    }
    Ok(())
}

fn run_subject(engine: &mut Engine, action: SubjectAction) -> Result<()> {
    match action {
        SubjectAction::Add { class, title } => {
            let subject = engine.add_subject(&ClassId::new(class), &title)?;
            println!("{}  {}", subject.id, subject.title);
        }
        SubjectAction::Delete { class, id } => {
            engine.delete_subject(&ClassId::new(class), &SubjectId::new(id))?;
        }
    }
    Ok(())
}

fn run_chapter(engine: &mut Engine, action: ChapterAction) -> Result<()> {
    match action {
        ChapterAction::Add {
            class,
            subject,
            title,
            lectures,
            dpps,
            tests,
        } => {
            let chapter = engine.add_chapter(
                &ClassId::new(class),
                &SubjectId::new(subject),
                ChapterDraft {
                    title,
                    lectures_count: lectures,
                    dpps_count: dpps,
                    tests_count: tests,
                },
            )?;
            println!("{}  {}", chapter.id, chapter.title);
        }
        ChapterAction::Delete { class, subject, id } => {
            engine.delete_chapter(
                &ClassId::new(class),
                &SubjectId::new(subject),
                &ChapterId::new(id),
            )?;
        }
        ChapterAction::Bump {
            class,
            subject,
            id,
            kind,
            down,
        } => {
            let class = ClassId::new(class);
            let subject = SubjectId::new(subject);
            let chapter = ChapterId::new(id);
            if down {
                engine.decrement_chapter_count(&class, &subject, &chapter, kind)?;
            } else {
                engine.increment_chapter_count(&class, &subject, &chapter, kind)?;
            }
        }
    }
    Ok(())
}
