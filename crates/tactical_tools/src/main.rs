//! Hex Tactical - Development Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tactical_core::ai::Personality;
use tactical_core::config::CombatConfig;
use tactical_tools::error::ToolResult;
use tactical_tools::skirmish::{self, SkirmishSpec};
use tactical_tools::validate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tactical-tools")]
#[command(about = "Development tools for Hex Tactical")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PersonalityArg {
    Aggressive,
    Defensive,
    Balanced,
    Sniper,
}

impl From<PersonalityArg> for Personality {
    fn from(arg: PersonalityArg) -> Self {
        match arg {
            PersonalityArg::Aggressive => Self::Aggressive,
            PersonalityArg::Defensive => Self::Defensive,
            PersonalityArg::Balanced => Self::Balanced,
            PersonalityArg::Sniper => Self::Sniper,
        }
    }
}

#[derive(clap::Args)]
struct MatchupArgs {
    /// Side A ship class
    #[arg(long, default_value = "Constitution")]
    class_a: String,
    /// Side B ship class
    #[arg(long, default_value = "Miranda")]
    class_b: String,
    /// Side A controller
    #[arg(long, value_enum, default_value = "balanced")]
    ai_a: PersonalityArg,
    /// Side B controller
    #[arg(long, value_enum, default_value = "balanced")]
    ai_b: PersonalityArg,
    /// Starting separation in hexes
    #[arg(long, default_value_t = 8)]
    distance: i32,
    /// Engine seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Turn limit
    #[arg(long, default_value_t = 30)]
    max_turns: u32,
    /// Extra ship catalogue (RON list of templates)
    #[arg(long)]
    catalogue: Option<PathBuf>,
    /// Combat rules (RON); defaults apply when omitted
    #[arg(long)]
    rules: Option<PathBuf>,
}

impl MatchupArgs {
    fn spec(&self) -> SkirmishSpec {
        SkirmishSpec {
            class_a: self.class_a.clone(),
            class_b: self.class_b.clone(),
            personality_a: self.ai_a.into(),
            personality_b: self.ai_b.into(),
            distance: self.distance,
            seed: self.seed,
            max_turns: self.max_turns,
        }
    }

    fn rules(&self) -> ToolResult<CombatConfig> {
        self.rules
            .as_deref()
            .map_or_else(|| Ok(CombatConfig::default()), validate::load_config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets")]
        path: String,
    },
    /// Run one AI-vs-AI skirmish and print a JSON report
    Simulate {
        #[command(flatten)]
        matchup: MatchupArgs,
    },
    /// Run skirmishes over consecutive seeds and print win statistics
    Batch {
        #[command(flatten)]
        matchup: MatchupArgs,
        /// Number of skirmishes
        #[arg(long, default_value_t = 100)]
        runs: u32,
    },
    /// Run a skirmish and write its encounter record
    Record {
        #[command(flatten)]
        matchup: MatchupArgs,
        /// Output file
        #[arg(long, default_value = "encounter.bin")]
        out: PathBuf,
    },
    /// Replay an encounter record and check its final hash
    Verify {
        /// Record file
        path: PathBuf,
    },
}

fn run(command: Commands) -> ToolResult<()> {
    match command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {path}");
            let report = validate::validate_data_directory(Path::new(&path))?;
            tracing::info!(
                catalogue_files = report.catalogue_files,
                classes = report.classes,
                config_files = report.config_files,
                "Validation passed"
            );
        }
        Commands::Simulate { matchup } => {
            let catalogue = validate::load_catalogue(matchup.catalogue.as_deref())?;
            let (report, _) = skirmish::run_skirmish(&catalogue, &matchup.rules()?, &matchup.spec())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Batch { matchup, runs } => {
            let catalogue = validate::load_catalogue(matchup.catalogue.as_deref())?;
            let batch = skirmish::run_batch(&catalogue, &matchup.rules()?, &matchup.spec(), runs)?;
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
        Commands::Record { matchup, out } => {
            let catalogue = validate::load_catalogue(matchup.catalogue.as_deref())?;
            let (report, record) =
                skirmish::run_skirmish(&catalogue, &matchup.rules()?, &matchup.spec())?;
            skirmish::write_record(&record, &out)?;
            tracing::info!(
                path = %out.display(),
                actions = report.actions,
                final_hash = report.final_hash,
                "Record written"
            );
        }
        Commands::Verify { path } => {
            let hash = skirmish::verify_record_file(&path)?;
            tracing::info!(path = %path.display(), final_hash = hash, "Replay matches");
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
