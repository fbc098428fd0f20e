use crate::cli::args::{Cli, Commands};
use crate::config::{AlignmentPolicy, Settings};
use crate::error::Result;
use crate::extractors::open_source;
use crate::models::{Artifact, StagingArea};
use crate::processors::{Pipeline, Stage};
use crate::utils::init_logging;
use crate::utils::progress::ProgressReporter;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.quiet);

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(staging_dir) = cli.staging_dir {
        settings.staging_dir = staging_dir;
    }
    if cli.strict_alignment {
        settings = settings.with_alignment(AlignmentPolicy::Strict);
    }
    debug!(?settings, "loaded settings");

    let single_stage = match &cli.command {
        Commands::ExtractCsv => Some(Stage::ExtractCsv),
        Commands::ExtractTsv => Some(Stage::ExtractTsv),
        Commands::ExtractFixedWidth => Some(Stage::ExtractFixedWidth),
        Commands::Consolidate => Some(Stage::Consolidate),
        Commands::Transform => Some(Stage::Transform),
        Commands::Run { .. } | Commands::Status => None,
    };

    if let Some(stage) = single_stage {
        let pipeline = Pipeline::new(StagingArea::new(settings));
        let report = pipeline.run_stage(stage)?;
        if !cli.quiet {
            println!("{}", report.summary());
        }
        return Ok(());
    }

    match cli.command {
        Commands::Run { sequential, report } => {
            if sequential {
                settings = settings.with_concurrent_extraction(false);
            }
            let pipeline = Pipeline::new(StagingArea::new(settings));

            let progress =
                ProgressReporter::new_spinner("Running toll data pipeline...", cli.quiet);
            let run_report = pipeline.run(Some(&progress)).await?;

            progress.println(&run_report.summary());

            if let Some(path) = report {
                run_report.write_json(&path)?;
                progress.println(&format!("Report written to {}", path.display()));
            }
        }

        Commands::Status => {
            let staging = StagingArea::new(settings);
            println!("Staging directory: {}", staging.root().display());

            for artifact in Artifact::ALL {
                let path = staging.path(artifact);
                if path.exists() {
                    let rows = count_rows(&path, !artifact.is_raw_source())?;
                    println!(
                        "  {:<28} {:>10} rows  {}",
                        artifact.display_name(),
                        rows,
                        path.display()
                    );
                } else {
                    println!(
                        "  {:<28} {:>10}       {}",
                        artifact.display_name(),
                        "missing",
                        path.display()
                    );
                }
            }
        }

        _ => {}
    }

    Ok(())
}

/// Data rows in an artifact: lines for raw sources, records after the header
/// for extracts.
fn count_rows(path: &Path, has_header: bool) -> Result<usize> {
    let file = open_source(path)?;

    if has_header {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);
        let mut record = csv::ByteRecord::new();
        let mut rows = 0;
        while reader.read_byte_record(&mut record)? {
            rows += 1;
        }
        Ok(rows)
    } else {
        let mut rows = 0;
        for line in BufReader::new(file).split(b'\n') {
            line?;
            rows += 1;
        }
        Ok(rows)
    }
}
