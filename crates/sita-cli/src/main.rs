//! `sita` CLI — administer the defense-scheduling database from the command
//! line.
//!
//! ## Usage
//!
//! ```sh
//! # Create a database, with demo data for a dry run
//! sita init --db sita.db --demo
//!
//! # Dry-run the scheduling rules for a proposed binding (stdin or -i)
//! sita check --db sita.db -i request.json
//!
//! # Bind a defense to a date/time/room and assign its panel
//! sita schedule --db sita.db -i request.json --actor 42
//!
//! # Book an advising appointment as a supervisor
//! sita book --db sita.db --thesis 1 --lecturer 1 --date 2026-03-02 --time 10:00
//!
//! # List a supervisor's open slots for a day
//! sita slots --db sita.db --lecturer 1 --date 2026-03-02
//! ```
//!
//! Results are printed as JSON on stdout; logs go to stderr (set
//! `RUST_LOG=info` to see them).

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use sita_engine::slots::SlotWindow;
use sita_engine::time::ClockTime;
use sita_store::models::Role;
use sita_store::{AdvisingScheduling, ExamScheduling, ScheduleRequest, ScheduleStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sita", version, about = "SITA defense-scheduling CLI")]
struct Cli {
    /// Path to the scheduling database
    #[arg(long, global = true, default_value = "sita.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema (optionally with demo data)
    Init {
        /// Seed a demo dataset: two theses with supervisors and approved
        /// registrations, six lecturers, two rooms
        #[arg(long)]
        demo: bool,
    },
    /// Dry-run the scheduling rules for a proposed binding
    Check {
        /// JSON request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Bind a defense to a date/time/room and assign its examining panel
    Schedule {
        /// JSON request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// User id recorded in the schedule history
        #[arg(long)]
        actor: Option<i64>,
    },
    /// Book an advising appointment as a supervisor of the thesis
    Book {
        #[arg(long)]
        thesis: i64,
        #[arg(long)]
        lecturer: i64,
        #[arg(long)]
        date: NaiveDate,
        /// Start of the one-hour appointment (HH:MM)
        #[arg(long)]
        time: ClockTime,
    },
    /// List a supervisor's open slots for a day
    Slots {
        #[arg(long)]
        lecturer: i64,
        #[arg(long)]
        date: NaiveDate,
        /// TOML config with a [slots] working-window section
        #[arg(long)]
        config: Option<String>,
    },
}

/// Optional TOML configuration; only the working window is configurable.
#[derive(Debug, Default, Deserialize)]
struct CliConfig {
    #[serde(default)]
    slots: SlotWindow,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = ScheduleStore::open(&cli.db)
        .with_context(|| format!("Failed to open scheduling database at {}", cli.db))?;

    match cli.command {
        Commands::Init { demo } => {
            // Opening already applied the schema.
            if demo {
                seed_demo(&store)?;
            }
            println!("initialized {}", cli.db);
        }
        Commands::Check { input } => {
            let request = read_request(input.as_deref())?;
            let report = ExamScheduling::new(&store)
                .check_conflict(&request)
                .context("Conflict check failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Schedule { input, actor } => {
            let request = read_request(input.as_deref())?;
            let session = ExamScheduling::new(&store)
                .create_schedule(&request, actor)
                .context("Scheduling failed")?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        Commands::Book {
            thesis,
            lecturer,
            date,
            time,
        } => {
            let session = AdvisingScheduling::new(&store)
                .book_session(thesis, lecturer, date, time)
                .context("Booking failed")?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        Commands::Slots {
            lecturer,
            date,
            config,
        } => {
            let window = load_window(config.as_deref())?;
            let slots = AdvisingScheduling::new(&store)
                .available_slots(lecturer, date, &window)
                .context("Slot suggestion failed")?;
            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
    }

    Ok(())
}

fn read_request(path: Option<&str>) -> Result<ScheduleRequest> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Failed to parse schedule request")
}

fn load_window(path: Option<&str>) -> Result<SlotWindow> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            let config: CliConfig =
                toml::from_str(&raw).with_context(|| format!("Invalid config file: {}", path))?;
            Ok(config.slots)
        }
        None => Ok(SlotWindow::default()),
    }
}

/// Seed a small deterministic dataset so the scheduling flow can be tried
/// end to end: lecturers 1-6, rooms 1-2, theses 1-2 with supervisors
/// assigned, and approved registrations 1001 and 1002.
fn seed_demo(store: &ScheduleStore) -> Result<()> {
    let budi = store.add_student("Budi Santoso")?;
    let siti = store.add_student("Siti Rahayu")?;

    let lecturers = [
        "Dr. Andi Wijaya",
        "Dr. Sri Mulyani",
        "Prof. Bambang Susilo",
        "Dr. Dewi Kartika",
        "Dr. Hendra Gunawan",
        "Prof. Rina Putri",
    ];
    let mut lecturer_ids = Vec::new();
    for name in lecturers {
        lecturer_ids.push(store.add_lecturer(name)?);
    }

    store.add_room("Ruang Sidang 1")?;
    store.add_room("Ruang Sidang 2")?;

    let thesis_budi = store.add_thesis(budi, "Sistem Rekomendasi Topik Tugas Akhir")?;
    let thesis_siti = store.add_thesis(siti, "Deteksi Anomali Jaringan Kampus")?;

    store.assign_role(thesis_budi, lecturer_ids[0], Role::Supervisor1)?;
    store.assign_role(thesis_budi, lecturer_ids[1], Role::Supervisor2)?;
    store.assign_role(thesis_siti, lecturer_ids[2], Role::Supervisor1)?;
    store.assign_role(thesis_siti, lecturer_ids[3], Role::Supervisor2)?;

    store.register_session(thesis_budi, 1001)?;
    store.register_session(thesis_siti, 1002)?;

    println!("seeded demo data: 2 theses, 6 lecturers, 2 rooms, registrations 1001 and 1002");
    Ok(())
}
