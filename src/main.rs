use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use libetesty::export;
use libetesty::migrate::{migrate, Layout};
use libetesty::{Error, Result};
use log::{error, info};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "etesty-anki")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download the question bank into per-question folders
    #[cfg(feature = "fetch")]
    Fetch {
        #[arg(long, default_value = libetesty::fetch::DEFAULT_URL)]
        url: String,
        #[arg(short, long, value_name = "DIR", default_value = "media")]
        out: PathBuf,
    },
    /// Build the Anki import file from the downloaded folders
    Export {
        #[arg(short, long, value_name = "DIR", default_value = "media")]
        input: PathBuf,
        #[arg(short, long, value_name = "FILE", default_value = "output.tsv")]
        output: PathBuf,
    },
    /// Collapse Correct1/Correct2/Correct3 columns of an old export into one choice number
    FixExport {
        input: PathBuf,
        output: PathBuf,
        /// Column receiving the choice number (1-based)
        #[arg(long, default_value = "5")]
        choice_column: usize,
        /// Fixed 1-based positions of the three flags, e.g. `10,11,12`
        #[arg(long, value_delimiter = ',', num_args = 3, requires = "field_count")]
        correct_columns: Option<Vec<usize>>,
        /// Exact field count of lines using the fixed positions
        #[arg(long)]
        field_count: Option<usize>,
    },
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    if let Err(e) = run(args.command) {
        error!("{}", format!("{}", e).red());
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        #[cfg(feature = "fetch")]
        Commands::Fetch { url, out } => {
            let report = libetesty::fetch::Fetcher::new(&url)?.run(&out)?;
            info!(
                "{}",
                format!(
                    "Saved {} questions to {:?} ({} skipped). Media: {} downloaded, {} already present, {} failed.",
                    report.questions,
                    out,
                    report.skipped_questions,
                    report.media_downloaded,
                    report.media_skipped,
                    report.media_failed
                )
                .green()
            );
        }
        Commands::Export { input, output } => {
            info!(
                "{}",
                format!("Reading questions from {:?} into {:?}", input, output).cyan()
            );
            let rows = export::convert(&input, &output)?;
            info!("{}", format!("TSV file saved to {:?} ({} rows)", output, rows).green());
        }
        Commands::FixExport {
            input,
            output,
            choice_column,
            correct_columns,
            field_count,
        } => {
            let layout = layout_from_args(choice_column, correct_columns, field_count)?;
            let document = fs::read_to_string(&input).map_err(|e| Error::Io {
                path: input.clone(),
                source: e,
            })?;
            let (fixed, report) = migrate(&document, &layout);
            fs::write(&output, fixed).map_err(|e| Error::Io {
                path: output.clone(),
                source: e,
            })?;
            info!(
                "{}",
                format!(
                    "Fixed export saved to: {:?} ({} lines fixed, {} kept as-is)",
                    output, report.migrated, report.passed_through
                )
                .green()
            );
        }
    }
    Ok(())
}

/// Converts the 1-based column arguments into a [`Layout`].
fn layout_from_args(
    choice_column: usize,
    correct_columns: Option<Vec<usize>>,
    field_count: Option<usize>,
) -> Result<Layout> {
    let zero_based = |column: usize| {
        column
            .checked_sub(1)
            .ok_or_else(|| Error::InvalidColumn(column.to_string()))
    };
    let choice_column = zero_based(choice_column)?;

    match (correct_columns, field_count) {
        (Some(columns), Some(field_count)) => {
            let [a, b, c] = columns[..] else {
                return Err(Error::InvalidColumn(format!("{:?}", columns)));
            };
            Ok(Layout::Fixed {
                choice_column,
                correct_columns: [zero_based(a)?, zero_based(b)?, zero_based(c)?],
                field_count,
            })
        }
        _ => Ok(Layout::scan(choice_column)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_layout_by_default() {
        assert_eq!(layout_from_args(5, None, None).unwrap(), Layout::scan(4));
    }

    #[test]
    fn fixed_layout_from_columns() {
        assert_eq!(
            layout_from_args(5, Some(vec![10, 11, 12]), Some(13)).unwrap(),
            Layout::Fixed {
                choice_column: 4,
                correct_columns: [9, 10, 11],
                field_count: 13,
            }
        );
    }

    #[test]
    fn columns_are_one_based() {
        assert!(matches!(
            layout_from_args(0, None, None),
            Err(Error::InvalidColumn(_))
        ));
        assert!(matches!(
            layout_from_args(5, Some(vec![0, 1, 2]), Some(3)),
            Err(Error::InvalidColumn(_))
        ));
    }
}
