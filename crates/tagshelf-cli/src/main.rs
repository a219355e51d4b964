use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tagshelf_core::prelude::*;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "tagshelf")]
#[command(about = "TagShelf - tag your streaming library and search by tag", long_about = None)]
struct Args {
    /// Directory holding the data file
    #[arg(short, long, env = "TAGSHELF_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the tag list
    #[command(subcommand)]
    Tags(TagsCommand),
    /// Assign a tag to a track
    Assign {
        track: String,
        tag: String,
        /// Also add the tag to the tag list
        #[arg(long)]
        create: bool,
    },
    /// Remove a tag from a track
    Unassign { track: String, tag: String },
    /// Remove every tag from a track
    Clear { track: String },
    /// Show a cached track and its tags
    Show { track: String },
    /// List cached tracks carrying all `--with` tags and no `--without` tag
    Query {
        #[arg(long = "with", value_name = "TAG")]
        with: Vec<String>,
        #[arg(long = "without", value_name = "TAG")]
        without: Vec<String>,
        /// Print track URIs only, ready for a playlist
        #[arg(long)]
        uris: bool,
    },
    /// Tags shared by every given track
    Shared {
        #[arg(required = true)]
        tracks: Vec<String>,
    },
    /// Manage the track cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand, Debug)]
enum TagsCommand {
    List,
    Add { name: String },
    Remove { name: String },
    /// Move the tag at position FROM to position TO (0-based)
    Move { from: usize, to: usize },
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Add track records from a JSON array file
    Import { file: PathBuf },
    List,
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = StoreConfig::resolve(args.data_dir)?;
    info!("Data file: {:?}", config.data_file());

    let persistence = Arc::new(FileSnapshotStore::new(&config)?);
    let session = Session::new(persistence);

    match session.start().await? {
        LoadOutcome::Loaded { tags, tracks } => {
            info!("Loaded {} tags and {} cached tracks", tags, tracks);
        }
        LoadOutcome::Recovered { quarantined } => {
            warn!("Stored data was unreadable, starting empty (moved to {:?})", quarantined);
        }
        LoadOutcome::Unavailable(reason) => {
            warn!("Running without persistence: {}", reason);
        }
    }

    run(&session, args.command)?;

    if let PersistenceStatus::Disabled(_) = session.status() {
        warn!("Changes were not saved");
        return Ok(());
    }
    session.on_phase_change(ScenePhase::Background).await?;
    Ok(())
}

fn run<S: SnapshotStore>(session: &Session<S>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Tags(TagsCommand::List) => session.read(|store| {
            for (idx, tag) in store.tags().iter().enumerate() {
                println!("{idx}\t{tag}");
            }
        }),
        Command::Tags(TagsCommand::Add { name }) => {
            if !session.update(|store| store.add_tag(&name)) {
                println!("Tag {name:?} already exists");
            }
        }
        Command::Tags(TagsCommand::Remove { name }) => {
            if !session.update(|store| store.remove_tag(&name)) {
                println!("No tag named {name:?}");
            }
        }
        Command::Tags(TagsCommand::Move { from, to }) => {
            let len = session.read(|store| store.tags().len());
            anyhow::ensure!(from < len && to < len, "positions must be below {len}");
            session.update(|store| store.move_tag(from, to));
        }
        Command::Assign { track, tag, create } => {
            let track = TrackId::from(track);
            session.update(|store| {
                if create {
                    store.create_and_assign(&track, &tag);
                } else {
                    if !store.tags().contains(&tag) {
                        warn!("{:?} is not in the tag list; use --create to add it", tag);
                    }
                    store.assign(&track, &tag);
                }
            });
        }
        Command::Unassign { track, tag } => {
            session.update(|store| store.unassign(&TrackId::from(track), &tag));
        }
        Command::Clear { track } => {
            session.update(|store| store.clear_assignments(&TrackId::from(track)));
        }
        Command::Show { track } => session.read(|store| {
            let track = TrackId::from(track);
            match store.track_cache().get(&track) {
                Some(record) => println!("{} - {}", record.name, record.artist_names()),
                None => println!("{track} (not cached)"),
            }
            let tags = store.tags_for(&track);
            if tags.is_empty() {
                println!("No tags");
            } else {
                println!("{}", tags.join(", "));
            }
        }),
        Command::Query { with, without, uris } => session.read(|store| {
            let query = TagQuery::new(with.into_iter().collect(), without.into_iter().collect());
            let results = query.run(store);
            if uris {
                for uri in playlist_uris(&results) {
                    println!("{uri}");
                }
            } else {
                for record in results {
                    println!("{}\t{} - {}", record.id, record.name, record.artist_names());
                }
            }
        }),
        Command::Shared { tracks } => session.read(|store| {
            let tracks: Vec<TrackId> = tracks.into_iter().map(TrackId::from).collect();
            println!("{}", shared_tags(store, &tracks).join(", "));
        }),
        Command::Cache(CacheCommand::Import { file }) => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let records: Vec<TrackRecord> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing track records in {}", file.display()))?;
            let total = records.len();
            let added = session.update(|store| store.cache_tracks(records));
            info!("Cached {} new tracks ({} already known)", added, total - added);
        }
        Command::Cache(CacheCommand::List) => session.read(|store| {
            for record in store.track_cache() {
                println!("{}\t{} - {}", record.id, record.name, record.artist_names());
            }
        }),
        Command::Cache(CacheCommand::Clear) => {
            session.update(|store| store.clear_track_cache());
        }
    }
    Ok(())
}
