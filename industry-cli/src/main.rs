//! Command-line editor for simulator industry (.ind) files

mod commands;
mod config;
mod io;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use industry_core::search::SearchField;
use industry_core::TrackRecord;

use commands::{ProducerArgs, RenameArgs, TagEdit};
use config::Config;

#[derive(Parser)]
#[command(name = "ind")]
#[command(about = "Inspect and edit industry (.ind) files")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Car type names, a headerless `id,name` CSV
    #[arg(long, global = true, env = "IND_CAR_TYPES")]
    car_types: Option<PathBuf>,

    /// Write edits here instead of overwriting the input
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Keep a `.bak` copy of any file that gets overwritten
    #[arg(long, global = true)]
    backup: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One row per industry, sorted by name
    List {
        file: PathBuf,
        /// Keep the order industries have in the file
        #[arg(long)]
        file_order: bool,
    },

    /// Full detail of one industry
    Show { file: PathBuf, index: usize },

    /// Parse and re-serialize, reporting whether the bytes match
    Check { file: PathBuf },

    /// Change an industry's names or flags
    Rename {
        file: PathBuf,
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        local: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        process_in_blocks: Option<bool>,
    },

    /// Replace an industry's track list
    Tracks {
        file: PathBuf,
        index: usize,
        /// `prefix:section:direction`; none clears the list
        #[arg(value_parser = commands::parse_track, allow_hyphen_values = true)]
        tracks: Vec<TrackRecord>,
    },

    /// Edit a producer's tags
    Tag {
        file: PathBuf,
        index: usize,
        producer: usize,
        #[command(subcommand)]
        action: TagAction,
    },

    /// Change a producer's fixed fields
    Producer {
        file: PathBuf,
        index: usize,
        producer: usize,
        #[arg(long)]
        car_type: Option<u8>,
        #[arg(long)]
        empties: Option<bool>,
        #[arg(long)]
        hours: Option<i32>,
        #[arg(long)]
        capacity: Option<i32>,
    },

    /// Exact-match search (field: name, local, symbol or tag)
    Find {
        file: PathBuf,
        field: SearchField,
        text: String,
    },

    /// Replace every exact match; a blank tag replacement deletes the tags
    Replace {
        file: PathBuf,
        field: SearchField,
        find: String,
        replace: String,
    },
}

#[derive(Subcommand)]
enum TagAction {
    Add { name: String },
    /// Delete the first tag with this name
    Delete { name: String },
    /// Rename the first matching tag; an empty new name deletes it
    Replace { old: String, new: String },
    /// Rebuild all tags from a comma or space separated list
    Set { list: String },
}

impl Commands {
    fn file(&self) -> &PathBuf {
        match self {
            Commands::List { file, .. }
            | Commands::Show { file, .. }
            | Commands::Check { file }
            | Commands::Rename { file, .. }
            | Commands::Tracks { file, .. }
            | Commands::Tag { file, .. }
            | Commands::Producer { file, .. }
            | Commands::Find { file, .. }
            | Commands::Replace { file, .. } => file,
        }
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config {
        input: cli.command.file().clone(),
        output: cli.output,
        car_types: cli.car_types,
        backup: cli.backup,
        json: cli.json,
        verbose: cli.verbose,
    };
    init_logging(config.verbose)?;

    match cli.command {
        Commands::List { file_order, .. } => commands::list(&config, file_order),
        Commands::Show { index, .. } => commands::show(&config, index),
        Commands::Check { .. } => commands::check(&config),
        Commands::Rename {
            index,
            name,
            local,
            symbol,
            process_in_blocks,
            ..
        } => commands::rename(
            &config,
            index,
            RenameArgs {
                name,
                local,
                symbol,
                process_in_blocks,
            },
        ),
        Commands::Tracks { index, tracks, .. } => commands::tracks(&config, index, tracks),
        Commands::Tag {
            index,
            producer,
            action,
            ..
        } => {
            let edit = match action {
                TagAction::Add { name } => TagEdit::Add(name),
                TagAction::Delete { name } => TagEdit::Delete(name),
                TagAction::Replace { old, new } => TagEdit::Replace { old, new },
                TagAction::Set { list } => TagEdit::Set(list),
            };
            commands::tag(&config, index, producer, edit)
        }
        Commands::Producer {
            index,
            producer,
            car_type,
            empties,
            hours,
            capacity,
            ..
        } => commands::producer(
            &config,
            index,
            producer,
            ProducerArgs {
                car_type,
                empties,
                hours,
                capacity,
            },
        ),
        Commands::Find { field, text, .. } => commands::find(&config, field, &text),
        Commands::Replace {
            field,
            find,
            replace,
            ..
        } => commands::replace(&config, field, &find, &replace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tag_command() {
        let cli = Cli::try_parse_from(["ind", "--backup", "tag", "route.ind", "3", "1", "replace", "LOADS", ""]).unwrap();
        assert!(cli.backup);
        match cli.command {
            Commands::Tag {
                index: 3,
                producer: 1,
                action: TagAction::Replace { old, new },
                ..
            } => {
                assert_eq!(old, "LOADS");
                assert!(new.is_empty());
            }
            _ => panic!("expected tag replace"),
        }
    }

    #[test]
    fn test_parse_tracks_and_field() {
        let cli = Cli::try_parse_from(["ind", "-o", "out.ind", "tracks", "r.ind", "0", "-1:5:0", "100:2002:1"]).unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("out.ind")));
        match cli.command {
            Commands::Tracks { tracks, .. } => {
                assert_eq!(tracks, vec![TrackRecord::new(-1, 5, 0), TrackRecord::new(100, 2002, 1)]);
            }
            _ => panic!("expected tracks"),
        }

        let cli = Cli::try_parse_from(["ind", "find", "r.ind", "local", "Acme"]).unwrap();
        assert!(matches!(cli.command, Commands::Find { field: SearchField::LocalName, .. }));

        assert!(Cli::try_parse_from(["ind", "find", "r.ind", "milepost", "x"]).is_err());
    }
}
