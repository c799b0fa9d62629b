//! PartMix command-line client (pmx)
//!
//! Manages songs, part recordings and stereo mixes on a PartMix backend,
//! and exposes the channel balance redistributor locally.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pmx_client::Backend;
use pmx_common::config::{ConfigOverrides, ConfigResolver};
use pmx_common::playback::{DEFAULT_PITCH_SHIFT, DEFAULT_SPEED};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Command-line arguments for pmx
#[derive(Parser, Debug)]
#[command(name = "pmx")]
#[command(about = "Command-line client for the PartMix song backend")]
#[command(version)]
struct Args {
    /// Backend base URL (overrides PMX_BACKEND_URL and the config file)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Bearer token for the backend (overrides PMX_AUTH_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Config file (overrides PMX_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Give up waiting for background tasks after this many seconds
    #[arg(long, global = true)]
    task_timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage songs
    #[command(subcommand)]
    Songs(SongsCommand),

    /// Manage part recordings
    #[command(subcommand)]
    Parts(PartsCommand),

    /// Manage stereo mixes
    #[command(subcommand)]
    Mixes(MixesCommand),

    /// Zip all tracks of a song and optionally download the archive
    Zip {
        song_id: String,

        /// Where to save the archive; prints the download URL if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rebalance one channel locally after setting one part's factor
    Balance {
        /// Current factors, comma separated (e.g. 0.5,0.3,0.2)
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        factors: Vec<f64>,

        /// Index of the part being set
        #[arg(long)]
        index: usize,

        /// New factor for that part (not range-checked)
        #[arg(long, allow_negative_numbers = true)]
        value: f64,
    },
}

#[derive(Subcommand, Debug)]
enum SongsCommand {
    /// List all songs
    List,

    /// Show one song as JSON
    Show { song_id: String },

    /// Create a song
    Create {
        title: String,
        #[arg(long, default_value = "")]
        arranger: String,
        #[arg(long, default_value = "")]
        key: String,
    },

    /// Change a song's details
    Update {
        song_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        arranger: Option<String>,
        #[arg(long)]
        key: Option<String>,
    },

    /// Delete a song with all its tracks
    Delete { song_id: String },
}

#[derive(Subcommand, Debug)]
enum PartsCommand {
    /// List a song's part recordings
    List { song_id: String },

    /// Upload recordings given as PART=FILE
    Upload {
        song_id: String,
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Delete a part recording
    Delete { song_id: String, part: String },
}

#[derive(Subcommand, Debug)]
enum MixesCommand {
    /// List a song's mixes
    List { song_id: String },

    /// List the standard mixes the backend can still create for a song
    Defaults { song_id: String },

    /// Create one mix, either a standard one or a custom balance
    Create {
        song_id: String,

        /// Standard mix to create (see `mixes defaults`)
        #[arg(long, conflicts_with_all = ["name", "set"])]
        standard: Option<String>,

        /// Track name for a custom mix
        #[arg(long)]
        name: Option<String>,

        /// Custom edit CHANNEL:PART=VALUE, applied in order
        #[arg(long = "set")]
        set: Vec<String>,
    },

    /// Create a batch of standard mixes; mix types select every part's variant
    Package {
        song_id: String,

        /// Mix or mix type names, e.g. "Full Mix", "Dominant", "Bass Solo"
        #[arg(required = true)]
        mixes: Vec<String>,

        #[arg(long, default_value = "")]
        description: String,

        /// Pitch shift in semitones (-3 to +3)
        #[arg(long, default_value = DEFAULT_PITCH_SHIFT, allow_hyphen_values = true)]
        pitch: String,

        /// Playback speed (e.g. 90%)
        #[arg(long, default_value = DEFAULT_SPEED)]
        speed: String,
    },

    /// Delete a mix
    Delete { song_id: String, name: String },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "pmx=debug,pmx_client=debug,pmx_common=debug"
    } else {
        "pmx=info,pmx_client=info,pmx_common=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Local command; no backend configuration needed
    if let Command::Balance { factors, index, value } = &args.command {
        return commands::balance(factors, *index, *value);
    }

    let resolver = ConfigResolver::new(ConfigOverrides {
        backend_url: args.backend_url.clone(),
        auth_token: args.token.clone(),
        config_file: args.config.clone(),
        task_timeout_secs: args.task_timeout,
    });
    let config = resolver.resolve();
    debug!(backend_url = %config.backend_url, "Resolved configuration");

    let backend = Backend::new(config).context("Failed to create backend client")?;

    match args.command {
        Command::Songs(cmd) => match cmd {
            SongsCommand::List => commands::list_songs(&backend).await,
            SongsCommand::Show { song_id } => commands::show_song(&backend, &song_id).await,
            SongsCommand::Create { title, arranger, key } => {
                commands::create_song(&backend, title, arranger, key).await
            }
            SongsCommand::Update {
                song_id,
                title,
                arranger,
                key,
            } => commands::update_song(&backend, &song_id, title, arranger, key).await,
            SongsCommand::Delete { song_id } => commands::delete_song(&backend, &song_id).await,
        },
        Command::Parts(cmd) => match cmd {
            PartsCommand::List { song_id } => commands::list_parts(&backend, &song_id).await,
            PartsCommand::Upload { song_id, files } => {
                commands::upload_parts(&backend, &song_id, &files).await
            }
            PartsCommand::Delete { song_id, part } => {
                commands::delete_part(&backend, &song_id, &part).await
            }
        },
        Command::Mixes(cmd) => match cmd {
            MixesCommand::List { song_id } => commands::list_mixes(&backend, &song_id).await,
            MixesCommand::Defaults { song_id } => commands::default_mixes(&backend, &song_id).await,
            MixesCommand::Create {
                song_id,
                standard,
                name,
                set,
            } => commands::create_mix(&backend, &song_id, standard, name, &set).await,
            MixesCommand::Package {
                song_id,
                mixes,
                description,
                pitch,
                speed,
            } => commands::create_package(&backend, &song_id, &mixes, description, &pitch, &speed).await,
            MixesCommand::Delete { song_id, name } => {
                commands::delete_mix(&backend, &song_id, &name).await
            }
        },
        Command::Zip { song_id, output } => commands::zip(&backend, &song_id, output).await,
        // Handled before the backend was built
        Command::Balance { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_accepts_negative_numbers() {
        let args = Args::try_parse_from([
            "pmx", "balance", "--factors", "-0.1,1.1", "--index", "0", "--value", "-0.2",
        ])
        .unwrap();
        match args.command {
            Command::Balance { factors, index, value } => {
                assert_eq!(factors, vec![-0.1, 1.1]);
                assert_eq!(index, 0);
                assert_eq!(value, -0.2);
            }
            other => panic!("Expected balance command, got {:?}", other),
        }
    }

    #[test]
    fn test_pitch_accepts_negative_label() {
        let args = Args::try_parse_from(["pmx", "mixes", "package", "s1", "Solo", "--pitch", "-2"]).unwrap();
        match args.command {
            Command::Mixes(MixesCommand::Package { pitch, mixes, .. }) => {
                assert_eq!(pitch, "-2");
                assert_eq!(mixes, vec!["Solo"]);
            }
            other => panic!("Expected mixes package command, got {:?}", other),
        }
    }
}
