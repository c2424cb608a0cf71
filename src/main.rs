mod config;
mod db;
mod error;
mod ingest;
mod models;
mod pdf;
mod syllabus;
mod tui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::{Database, ModuleUpdate, TopicUpdate};
use models::{Completion, Importance, JsonOutput};
use syllabus::Strategy;

#[derive(Parser)]
#[command(name = "syllabus")]
#[command(about = "Extract course structure from syllabus PDFs and track topic completion")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Database file (overrides config and SYLLABUS_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Extract a course from a syllabus PDF
    Ingest {
        /// Path to the PDF
        path: PathBuf,

        /// Extraction strategy (defaults to the configured one)
        #[arg(long, short, value_enum)]
        strategy: Option<Strategy>,
    },

    /// Manage courses
    #[command(subcommand)]
    Course(CourseCommands),

    /// Manage modules
    #[command(subcommand)]
    Module(ModuleCommands),

    /// Manage topics
    #[command(subcommand)]
    Topic(TopicCommands),

    /// Show completion statistics
    Stats,

    /// Launch interactive terminal dashboard
    Tui,
}

#[derive(Subcommand)]
enum CourseCommands {
    /// List all courses with progress
    List,

    /// Show a course with its modules and topics
    Show {
        /// Course ID
        id: i64,
    },

    /// Add an empty course
    Add {
        /// Course code, e.g. CS101
        code: String,

        /// Course name
        name: String,
    },

    /// Change a course's code or name
    Update {
        /// Course ID
        id: i64,

        #[arg(long, short)]
        code: Option<String>,

        #[arg(long, short)]
        name: Option<String>,
    },

    /// Delete a course with its modules and topics
    Delete {
        /// Course ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum ModuleCommands {
    /// Add a module to a course
    Add {
        /// Course ID
        course_id: i64,

        /// Module number
        number: i32,

        /// Module name
        name: String,

        /// Allotted lecture hours
        #[arg(long, default_value_t = 0)]
        hours: i32,
    },

    /// Rename or renumber a module
    Update {
        /// Module ID
        id: i64,

        #[arg(long)]
        number: Option<i32>,

        #[arg(long, short)]
        name: Option<String>,

        #[arg(long)]
        hours: Option<i32>,
    },

    /// Delete a module with its topics
    Delete {
        /// Module ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum TopicCommands {
    /// Add a topic to a module
    Add {
        /// Module ID
        module_id: i64,

        /// Topic name
        name: String,

        /// Importance from 0 (unrated) to 5
        #[arg(long, short, default_value_t = 0)]
        importance: i32,
    },

    /// Update a topic's name, completion or importance
    Update {
        /// Topic ID
        id: i64,

        #[arg(long, short)]
        name: Option<String>,

        /// Completion percentage from 0 to 100
        #[arg(long, short)]
        completion: Option<i32>,

        /// Importance from 0 (unrated) to 5
        #[arg(long, short)]
        importance: Option<i32>,
    },

    /// Delete a topic
    Delete {
        /// Topic ID
        id: i64,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "syllabus_tracker=debug"
    } else if quiet {
        "syllabus_tracker=warn"
    } else {
        "syllabus_tracker=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, matches!(cli.command, Commands::Tui));

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_json<T: serde::Serialize>(output: &JsonOutput<T>) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(output)?);
    Ok(())
}

fn not_found(json: bool, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        print_json(&JsonOutput::<()>::err(format!("{} not found", what)))?;
    } else {
        println!("{} not found.", what);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path());
    let mut db = Database::open(&db_path)?;
    db.init()?;

    match cli.command {
        Commands::Init => {
            if cli.json {
                print_json(&JsonOutput::<()>::ok(()))?;
            } else {
                println!("Database initialized at: {}", db_path.display());
            }
        }

        Commands::Ingest { path, strategy } => {
            let strategy = strategy.unwrap_or(config.strategy);
            match ingest::ingest_file(&mut db, &path, strategy, &config) {
                Ok(report) => {
                    if cli.json {
                        print_json(&JsonOutput::ok(&report))?;
                    } else {
                        println!(
                            "Created course {} ({} {}) with {} modules and {} topics.",
                            report.course_id,
                            report.code,
                            report.name,
                            report.modules,
                            report.topics
                        );
                        println!("View it with: syllabus course show {}", report.course_id);
                    }
                }
                Err(e) if e.is_extraction_failure() => {
                    if cli.json {
                        print_json(&JsonOutput::<()>::err(e.to_string()))?;
                    } else {
                        println!("Could not extract a syllabus from this file. Try a different file.");
                    }
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Course(course_cmd) => match course_cmd {
            CourseCommands::List => {
                let courses = db.list_course_summaries()?;
                if cli.json {
                    print_json(&JsonOutput::ok(&courses))?;
                } else if courses.is_empty() {
                    println!("No courses found.");
                } else {
                    println!(
                        "{:<5} {:<12} {:<36} {:>7} {:>7} DONE",
                        "ID", "CODE", "NAME", "MODULES", "TOPICS"
                    );
                    println!("{}", "-".repeat(80));
                    for s in courses {
                        println!(
                            "{:<5} {:<12} {:<36} {:>7} {:>7} {:.0}%",
                            s.course.id,
                            truncate(&s.course.code, 12),
                            truncate(&s.course.name, 34),
                            s.module_count,
                            s.topic_count,
                            s.avg_completion
                        );
                    }
                }
            }

            CourseCommands::Show { id } => match db.get_course_outline(id)? {
                Some(outline) => {
                    if cli.json {
                        print_json(&JsonOutput::ok(&outline))?;
                    } else {
                        println!("{} {}", outline.course.code, outline.course.name);
                        println!("ID: {}", outline.course.id);
                        println!("Created: {}", outline.course.created_at);
                        println!("Completion: {:.0}%", outline.completion());
                        for m in &outline.modules {
                            println!();
                            println!(
                                "[{}] {} ({} hours, {:.0}% done)",
                                m.module.id,
                                m.module.name,
                                m.module.hours,
                                m.completion()
                            );
                            for t in &m.topics {
                                println!(
                                    "    {:<5} {:>3}% {:<12} {:<9} {}",
                                    t.id,
                                    t.completion_status,
                                    t.completion_label(),
                                    t.importance_label(),
                                    t.name
                                );
                            }
                        }
                    }
                }
                None => not_found(cli.json, "Course")?,
            },

            CourseCommands::Add { code, name } => {
                let id = db.add_course(&code, &name)?;
                if cli.json {
                    print_json(&JsonOutput::ok(serde_json::json!({
                        "id": id,
                        "code": code,
                        "name": name
                    })))?;
                } else {
                    println!("Added course '{}' with ID: {}", code, id);
                }
            }

            CourseCommands::Update { id, code, name } => {
                if db.update_course(id, code.as_deref(), name.as_deref())? {
                    if cli.json {
                        print_json(&JsonOutput::<()>::ok(()))?;
                    } else {
                        println!("Course {} updated.", id);
                    }
                } else {
                    not_found(cli.json, "Course")?;
                }
            }

            CourseCommands::Delete { id } => {
                if db.delete_course(id)? {
                    if cli.json {
                        print_json(&JsonOutput::<()>::ok(()))?;
                    } else {
                        println!("Course {} deleted.", id);
                    }
                } else {
                    not_found(cli.json, "Course")?;
                }
            }
        },

        Commands::Module(module_cmd) => match module_cmd {
            ModuleCommands::Add {
                course_id,
                number,
                name,
                hours,
            } => {
                if db.get_course(course_id)?.is_none() {
                    return not_found(cli.json, "Course");
                }
                let id = db.add_module(course_id, number, &name, hours)?;
                if cli.json {
                    print_json(&JsonOutput::ok(serde_json::json!({ "id": id })))?;
                } else {
                    println!("Added module '{}' with ID: {}", name, id);
                }
            }

            ModuleCommands::Update {
                id,
                number,
                name,
                hours,
            } => {
                let update = ModuleUpdate {
                    number,
                    name: name.as_deref(),
                    hours,
                };
                if db.update_module(id, &update)? {
                    if cli.json {
                        print_json(&JsonOutput::<()>::ok(()))?;
                    } else {
                        println!("Module {} updated.", id);
                    }
                } else {
                    not_found(cli.json, "Module")?;
                }
            }

            ModuleCommands::Delete { id } => {
                if db.delete_module(id)? {
                    if cli.json {
                        print_json(&JsonOutput::<()>::ok(()))?;
                    } else {
                        println!("Module {} deleted.", id);
                    }
                } else {
                    not_found(cli.json, "Module")?;
                }
            }
        },

        Commands::Topic(topic_cmd) => match topic_cmd {
            TopicCommands::Add {
                module_id,
                name,
                importance,
            } => {
                let importance = Importance::new(importance)?;
                if db.get_module(module_id)?.is_none() {
                    return not_found(cli.json, "Module");
                }
                let id = db.add_topic(module_id, &name, importance)?;
                if cli.json {
                    print_json(&JsonOutput::ok(serde_json::json!({ "id": id })))?;
                } else {
                    println!("Added topic '{}' with ID: {}", name, id);
                }
            }

            TopicCommands::Update {
                id,
                name,
                completion,
                importance,
            } => {
                let update = TopicUpdate {
                    name: name.as_deref(),
                    completion: completion.map(Completion::new).transpose()?,
                    importance: importance.map(Importance::new).transpose()?,
                };
                if !db.update_topic(id, &update)? {
                    return not_found(cli.json, "Topic");
                }
                match db.get_topic(id)? {
                    Some(topic) if cli.json => print_json(&JsonOutput::ok(&topic))?,
                    Some(topic) => println!(
                        "Topic {} updated: {}% ({}), importance {}.",
                        id,
                        topic.completion_status,
                        topic.completion_label(),
                        topic.importance_label()
                    ),
                    None => not_found(cli.json, "Topic")?,
                }
            }

            TopicCommands::Delete { id } => {
                if db.delete_topic(id)? {
                    if cli.json {
                        print_json(&JsonOutput::<()>::ok(()))?;
                    } else {
                        println!("Topic {} deleted.", id);
                    }
                } else {
                    not_found(cli.json, "Topic")?;
                }
            }
        },

        Commands::Stats => {
            let stats = db.get_stats()?;
            if cli.json {
                print_json(&JsonOutput::ok(serde_json::json!({
                    "total_courses": stats.total_courses,
                    "total_modules": stats.total_modules,
                    "total_topics": stats.total_topics,
                    "completed_topics": stats.completed_topics,
                    "avg_completion": stats.avg_completion
                })))?;
            } else {
                println!("=== Completion Statistics ===");
                println!("Courses: {}", stats.total_courses);
                println!("Modules: {}", stats.total_modules);
                println!("Topics: {}", stats.total_topics);
                println!("Completed topics: {}", stats.completed_topics);
                println!("Average completion: {:.1}%", stats.avg_completion);
            }
        }

        Commands::Tui => {
            tui::run(db)?;
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
