use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{PipelineConfig, RankMethod, ZeroHeightPolicy};

#[derive(Parser, Debug)]
#[command(name = "pokedex-etl")]
#[command(version, about = "Stage, join and enrich raw Pokédex tables into SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline over a directory of raw JSONL files
    Convert {
        /// Directory containing raw_pokemon_*.jsonl
        input_dir: PathBuf,

        /// Output SQLite database path (defaults to the data directory)
        output_db: Option<PathBuf>,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Read raw tables from a SQLite database and write the output back into it
    Refresh {
        /// Database holding RAW_POKEMON_BASE, RAW_POKEMON_BATTLE and RAW_POKEMON_REPRODUCTION
        database: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },

    /// List all pipeline stages in dependency order
    ListStages,

    /// Print the CREATE TABLE statement for the target stage
    Schema {
        #[command(flatten)]
        options: RunOptions,
    },
}

impl Commands {
    pub fn uses_tui(&self) -> bool {
        match self {
            Commands::Convert { options, .. } | Commands::Refresh { options, .. } => options.tui,
            _ => false,
        }
    }
}

/// Flags shared by every command that runs the pipeline
#[derive(Args, Debug, Default, Clone)]
pub struct RunOptions {
    /// TOML file with pipeline settings; flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Generation to keep
    #[arg(short, long)]
    pub generation: Option<i64>,

    /// Stage to materialize and write (see list-stages)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Output table name
    #[arg(long)]
    pub table: Option<String>,

    /// Also write the output as JSONL to this path
    #[arg(long)]
    pub jsonl: Option<PathBuf>,

    /// BMI handling for a zero height
    #[arg(long, value_enum)]
    pub zero_height: Option<ZeroHeightPolicy>,

    /// Ranking of tied BMI values
    #[arg(long, value_enum)]
    pub rank_method: Option<RankMethod>,

    /// Show the terminal UI
    #[arg(long)]
    pub tui: bool,
}

impl RunOptions {
    /// Config file (if any) with command-line flags applied on top
    pub fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load_or_default(self.config.as_deref())?;

        if let Some(generation) = self.generation {
            config.generation = generation;
        }
        if let Some(target) = &self.target {
            config.target = target.clone();
        }
        if let Some(table) = &self.table {
            config.output_table = table.clone();
        }
        if let Some(policy) = self.zero_height {
            config.zero_height = policy;
        }
        if let Some(method) = self.rank_method {
            config.rank_method = method;
        }

        Ok(config)
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
