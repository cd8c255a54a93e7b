use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use libetesty::anki::{self, Profile};
use libetesty::{Error, Result};
use log::{debug, error, info};
use std::io::{self, Write};
use std::path::PathBuf;
use text_io::read;

#[derive(Parser, Debug)]
#[command(name = "copy-to-anki")]
#[command(version, about = "Copy downloaded media into an Anki profile", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "info")]
    log_level: String,
    #[arg(short, long, value_name = "DIR", default_value = "media")]
    media: PathBuf,
    /// Defaults to ~/.local/share/Anki2
    #[arg(long, value_name = "DIR")]
    anki_dir: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    if let Err(e) = run(args.media, args.anki_dir) {
        error!("{}", format!("{}", e).red());
        std::process::exit(1);
    }
}

fn run(media: PathBuf, anki_dir: Option<PathBuf>) -> Result<()> {
    if !media.is_dir() {
        println!(
            "{}",
            "Please run this from the folder containing 'media', or pass --media.".yellow()
        );
        return Err(Error::MissingDirectory(media));
    }
    let base = anki_dir
        .or_else(anki::default_base_dir)
        .ok_or_else(|| Error::MissingDirectory(PathBuf::from("~/.local/share/Anki2")))?;

    let profiles = anki::list_profiles(&base)?;
    if profiles.is_empty() {
        return Err(Error::NoProfiles(base));
    }

    let profile = choose_profile(&profiles)?;
    let dest = profile.media_dir();
    println!("{}", format!("\nCopying files to: {:?}", dest).cyan());
    println!("{}", "Excluding .json files...".cyan());

    let report = anki::copy_media(&media, &dest)?;
    info!("[Copy] {:?}", report);
    println!("{}", "-".repeat(50));
    println!("{}", "Copy complete.".green());
    println!("Copied: {}", report.copied);
    println!("Skipped (already exists): {}", report.skipped);
    if report.errors > 0 {
        println!("{}", format!("Errors: {}", report.errors).bright_red());
    } else {
        println!("Errors: 0");
    }
    Ok(())
}

fn choose_profile(profiles: &[Profile]) -> Result<&Profile> {
    println!("{}", "Available Anki Profiles:".cyan());
    println!("{}", "-".repeat(50));
    for (idx, profile) in profiles.iter().enumerate() {
        println!(
            "{}. {:<20} (Last Modified: {})",
            format!("{}", idx + 1).bold(),
            profile.name,
            profile.modified_str()
        );
    }
    println!("{}", "-".repeat(50));

    print!("{} ", "Select the profile number to copy media to:".cyan());
    io::stdout().flush().map_err(|e| Error::Io {
        path: PathBuf::from("<stdout>"),
        source: e,
    })?;
    let choice_string: String = read!("{}\n");
    let idx = anki::parse_selection(&choice_string, profiles.len())?;
    debug!("choice: {}", idx);
    Ok(&profiles[idx])
}
