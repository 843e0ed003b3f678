use anyhow::{Context, Result};
use pokedex_etl::{
    cli::{Cli, Commands, RunOptions},
    paths::DataDirs,
    pipeline::{Pipeline, PipelineRun},
    schema::StageResolver,
    source::{JsonlSource, RawSource, SqliteSource},
    ui::{LogUi, Ui, UiApp},
    writer::{generate_create_table, write_jsonl, write_to_sqlite},
};
use std::fs::OpenOptions;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let log_file = if cli.command.uses_tui() {
        Some(DataDirs::new(None)?.log_file()?)
    } else {
        None
    };
    init_logging(log_file.as_deref())?;

    match cli.command {
        Commands::Convert {
            input_dir,
            output_db,
            options,
        } => {
            let output_db = match output_db {
                Some(path) => path,
                None => DataDirs::new(None)?.default_output_db(),
            };
            run(&JsonlSource::new(input_dir), &output_db, &options)?;
        }

        Commands::Refresh { database, options } => {
            let source = SqliteSource::new(&database);
            run(&source, &database, &options)?;
        }

        Commands::ListStages => {
            println!("Pipeline stages:\n");
            for stage in StageResolver::new().all_stages_ordered()? {
                if stage.inputs.is_empty() {
                    println!("  {:<28} {}", stage.name, stage.description);
                } else {
                    println!(
                        "  {:<28} {} (reads {})",
                        stage.name,
                        stage.description,
                        stage.inputs.join(", ")
                    );
                }
            }
        }

        Commands::Schema { options } => {
            let config = options.resolve_config()?;
            let pipeline = Pipeline::new(config)?;
            let schema = pipeline.output_schema()?;
            println!("{};", generate_create_table(&schema, &pipeline.config().output_table));
        }
    }

    Ok(())
}

/// Logs go to stderr, or to a file while the terminal UI owns the screen.
/// Default level is INFO, overridable with RUST_LOG.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(file).with_ansi(false))
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

/// Run the pipeline and write its output. Nothing is written unless every
/// stage succeeded.
fn run(source: &impl RawSource, output_db: &Path, options: &RunOptions) -> Result<()> {
    let pipeline = Pipeline::new(options.resolve_config()?)?;

    if options.tui {
        let mut ui = UiApp::new()?;
        match execute(&pipeline, source, output_db, options, &mut ui) {
            Ok(summary) => ui.finish(&summary)?,
            Err(e) => {
                ui.restore()?;
                return Err(e);
            }
        }
    } else {
        let summary = execute(&pipeline, source, output_db, options, &mut LogUi::new())?;
        println!("\n{}", summary);
    }

    Ok(())
}

fn execute(
    pipeline: &Pipeline,
    source: &impl RawSource,
    output_db: &Path,
    options: &RunOptions,
    ui: &mut impl Ui,
) -> Result<String> {
    let start = Instant::now();
    let PipelineRun { output, report } = pipeline.run(source, ui)?;
    let table = &pipeline.config().output_table;

    if let Some(path) = &options.jsonl {
        write_jsonl(&output, path)?;
        ui.log(format!("Wrote {:?}", path));
    }
    let count = write_to_sqlite(&output, output_db, table, ui)?;

    let mut summary = format!(
        "Created {} in {:?} ({} rows) in {:.1}s",
        table,
        output_db,
        count,
        start.elapsed().as_secs_f64()
    );
    for loss in report.join_losses.iter().filter(|l| !l.is_lossless()) {
        summary.push_str(&format!(
            "\n  join {} ⋈ {}: {} left / {} right rows without a match",
            loss.left, loss.right, loss.left_unmatched, loss.right_unmatched
        ));
    }

    Ok(summary)
}
