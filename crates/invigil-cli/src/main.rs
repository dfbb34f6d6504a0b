//! invigil CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "invigil", version, about = "Quiz session engine and gradebook")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz interactively
    Take {
        /// Path to a .toml quiz module
        #[arg(long)]
        quiz: PathBuf,

        /// Dry run: no gate, no stored record
        #[arg(long)]
        preview: bool,

        /// Fixed shuffle seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Override the configured student name
        #[arg(long)]
        name: Option<String>,

        /// Override the configured student number
        #[arg(long)]
        nis: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show aggregated grades for the roster
    Grades {
        /// Only students in this class
        #[arg(long)]
        class: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List stored quiz results
    Results {
        /// Only results for this student number
        #[arg(long)]
        student: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Record a manual grade for a student
    Record {
        /// Student number
        #[arg(long)]
        nis: String,

        /// Module the grade belongs to
        #[arg(long)]
        module: String,

        /// What was graded
        #[arg(long)]
        title: String,

        /// Score in 0..=100
        #[arg(long)]
        score: u32,

        /// Grading date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Re-score one answer of a stored result
    Regrade {
        /// Result id
        #[arg(long)]
        result: Uuid,

        /// Question id within the result
        #[arg(long)]
        question: String,

        /// Points awarded (clamped to the question maximum)
        #[arg(long)]
        points: u32,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Delete a disqualified result so the student can retake
    Clear {
        /// Result id
        #[arg(long)]
        result: Uuid,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz module TOML files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Create starter config, sample quiz, and seeded data directory
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("invigil=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            quiz,
            preview,
            seed,
            name,
            nis,
            config,
        } => commands::take::execute(quiz, preview, seed, name, nis, config).await,
        Commands::Grades {
            class,
            format,
            config,
        } => commands::grades::execute(class, format, config).await,
        Commands::Results { student, config } => commands::results::execute(student, config).await,
        Commands::Record {
            nis,
            module,
            title,
            score,
            date,
            config,
        } => commands::record::execute(nis, module, title, score, date, config).await,
        Commands::Regrade {
            result,
            question,
            points,
            config,
        } => commands::regrade::execute(result, question, points, config).await,
        Commands::Clear { result, config } => commands::clear::execute(result, config).await,
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Init => commands::init::execute().await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
