//! Command-line companion for the topic library.
//!
//! # Responsibility
//! - Drive `polymath_core` use-cases against a SQLite file for local checks.
//! - Keep output plain and line-oriented.

use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use polymath_core::db::open_db;
use polymath_core::{
    default_log_level, init_logging, local_today, status_of, DomainSelection, LibraryQuery,
    SortDirection, SortKey, SortSpec, SqliteKvRepository, StatusFilter, Topic, TopicService,
    TopicStatus,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "polymath")]
#[command(about = "Spaced revision planner for topics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite file holding the library
    #[arg(long, global = true, env = "POLYMATH_DB_PATH", default_value = "polymath.sqlite3")]
    db: PathBuf,

    /// Write rolling logs to this absolute directory
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Evaluate as if today were this day (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core linkage information
    Ping,

    /// List topics due on a day
    Due {
        /// Day to list (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Filter, search and sort the library
    Library {
        /// Domain label, matched verbatim
        #[arg(short, long, default_value = "")]
        domain: String,

        /// Sub-domain label; needs --domain
        #[arg(long, default_value = "")]
        sub_domain: String,

        #[arg(short, long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,

        /// Case-insensitive text to look for
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Reverse the sort order
        #[arg(long)]
        desc: bool,
    },

    /// Dashboard counters and the month's marked days
    Stats,

    /// Replace the library with a JSON array from a file
    Import {
        file: PathBuf,
    },

    /// Write the library as JSON to stdout or a file
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Replace the library with demo topics
    Sample,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Active,
    Completed,
}

impl From<StatusArg> for StatusFilter {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::All => Self::All,
            StatusArg::Active => Self::Active,
            StatusArg::Completed => Self::Completed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Title,
    StartDate,
    Domain,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Title => Self::Title,
            SortArg::StartDate => Self::StartDate,
            SortArg::Domain => Self::Domain,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(default_log_level(), log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Commands::Ping = cli.command {
        println!("polymath_core ping={}", polymath_core::ping());
        println!("polymath_core version={}", polymath_core::core_version());
        return Ok(());
    }

    let today = cli.today.unwrap_or_else(local_today);
    let conn = open_db(&cli.db).map_err(|err| format!("cannot open {}: {err}", cli.db.display()))?;
    let repo = SqliteKvRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let mut service = TopicService::open(repo, today).map_err(|err| err.to_string())?;

    match cli.command {
        Commands::Ping => {}
        Commands::Due { date } => {
            let day = date.unwrap_or(today);
            let due = service.due_on(day);
            println!("{day}: {} revision(s)", due.len());
            for topic in due {
                println!("{}", topic_line(topic, today));
            }
        }
        Commands::Library {
            domain,
            sub_domain,
            status,
            search,
            sort,
            desc,
        } => {
            let query = LibraryQuery {
                domain: DomainSelection::from_parts(&domain, &sub_domain),
                status: status.into(),
                search,
                sort: sort.map(|key| SortSpec {
                    key: key.into(),
                    direction: if desc {
                        SortDirection::Descending
                    } else {
                        SortDirection::Ascending
                    },
                }),
            };
            let view = service.library(&query, today);
            println!("{} of {} topic(s)", view.matched, view.total);
            for topic in &view.items {
                println!("{}", topic_line(topic, today));
            }
        }
        Commands::Stats => {
            let stats = service.dashboard(today);
            println!("topics={}", stats.total_topics);
            println!("today={}", stats.revisions_today);
            println!("next_7_days={}", stats.upcoming_week);
            let marked = service
                .marked_days(today.year(), today.month())
                .iter()
                .map(NaiveDate::to_string)
                .collect::<Vec<_>>();
            println!("marked_days={}", marked.join(","));
        }
        Commands::Import { file } => {
            let payload = std::fs::read_to_string(&file)
                .map_err(|err| format!("cannot read {}: {err}", file.display()))?;
            let count = service
                .import_json(&payload, today)
                .map_err(|err| err.to_string())?;
            println!("imported {count} topic(s)");
        }
        Commands::Export { out } => {
            let payload = service.export_json().map_err(|err| err.to_string())?;
            match out {
                Some(path) => std::fs::write(&path, payload)
                    .map_err(|err| format!("cannot write {}: {err}", path.display()))?,
                None => println!("{payload}"),
            }
        }
        Commands::Sample => {
            let count = service
                .load_sample_data(today)
                .map_err(|err| err.to_string())?;
            println!("loaded {count} sample topic(s)");
        }
    }
    Ok(())
}

fn topic_line(topic: &Topic, today: NaiveDate) -> String {
    let status = match status_of(topic, today) {
        TopicStatus::Active => "active",
        TopicStatus::Completed => "completed",
    };
    let category = topic.domain_key().unwrap_or_else(|| "-".to_string());
    format!(
        "{}\t{}\t{}\t{status}\t{}",
        topic.id, topic.start_date, category, topic.title
    )
}
