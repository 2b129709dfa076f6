//! `gptkctl`: drive filter runs against a library snapshot, and hash or group
//! local images with the same perceptual hash the toolkit uses.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gptk_core::Action;
use gptk_model::{AlbumKey, Source, SourceKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod settings;

#[derive(Parser, Debug)]
#[command(name = "gptkctl", version)]
#[command(about = "Filter a photo library and apply bulk actions to the matches")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a filter (and optionally an action) against a library snapshot
    Run(RunArgs),
    /// Check a filter and source without touching any library
    Validate(ValidateArgs),
    /// Print the difference hash of local image files
    Hash {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Thumbnail height the hash size is derived from
        #[arg(long, default_value_t = 1024)]
        height: u32,
    },
    /// Group local image files that look alike
    Similar {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Minimum similarity (0.0 to 1.0) for two images to share a group
        #[arg(long, default_value_t = 0.9)]
        threshold: f64,
        #[arg(long, default_value_t = 1024)]
        height: u32,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Library snapshot (JSON) to run against
    #[arg(long)]
    snapshot: PathBuf,

    #[command(flatten)]
    source: SourceArgs,

    /// Filter file (TOML or JSON)
    #[arg(long)]
    filter: Option<PathBuf>,

    #[command(flatten)]
    action: ActionArgs,

    /// Toolkit config file (TOML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the mutated snapshot back to --snapshot
    #[arg(long)]
    write_back: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Filter file (TOML or JSON)
    #[arg(long)]
    filter: PathBuf,

    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    action: ActionArgs,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Collection to read candidates from (library, search, trash,
    /// locked-folder, favorites, partner-shared, shared-links, albums)
    #[arg(long, default_value = "library")]
    source: SourceKind,

    /// Album to read from; repeat for several (albums source)
    #[arg(long = "album")]
    albums: Vec<AlbumKey>,

    /// Search query (search source)
    #[arg(long)]
    query: Option<String>,
}

impl SourceArgs {
    fn to_source(&self) -> Source {
        match self.source {
            SourceKind::Library => Source::Library,
            SourceKind::Search => Source::Search {
                query: self.query.clone().unwrap_or_default(),
            },
            SourceKind::Trash => Source::Trash,
            SourceKind::LockedFolder => Source::LockedFolder,
            SourceKind::Favorites => Source::Favorites,
            SourceKind::PartnerShared => Source::PartnerShared,
            SourceKind::SharedLinks => Source::SharedLinks,
            SourceKind::Albums => Source::Albums {
                albums: self.albums.clone(),
            },
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ActionArg {
    Trash,
    Restore,
    Archive,
    Unarchive,
    Favorite,
    Unfavorite,
    Lock,
    Unlock,
    AddToAlbum,
    AddToNewAlbum,
    CopyDescription,
}

#[derive(Args, Debug)]
struct ActionArgs {
    /// Action to apply to the matches; without one the run is a preview
    #[arg(long, value_enum)]
    action: Option<ActionArg>,

    /// Existing album for add-to-album
    #[arg(long)]
    target_album: Option<String>,

    /// Title for add-to-new-album
    #[arg(long)]
    album_title: Option<String>,

    /// Order album entries the way the matches are ordered
    #[arg(long)]
    preserve_order: bool,
}

impl ActionArgs {
    /// Missing album names are left blank so validation reports them.
    fn to_action(&self) -> Option<Action> {
        let action = match self.action? {
            ActionArg::Trash => Action::Trash,
            ActionArg::Restore => Action::Restore,
            ActionArg::Archive => Action::Archive,
            ActionArg::Unarchive => Action::Unarchive,
            ActionArg::Favorite => Action::Favorite,
            ActionArg::Unfavorite => Action::Unfavorite,
            ActionArg::Lock => Action::Lock,
            ActionArg::Unlock => Action::Unlock,
            ActionArg::AddToAlbum => Action::AddToAlbum {
                album: AlbumKey::new(self.target_album.clone().unwrap_or_default()),
                preserve_order: self.preserve_order,
            },
            ActionArg::AddToNewAlbum => Action::AddToNewAlbum {
                title: self.album_title.clone().unwrap_or_default(),
                preserve_order: self.preserve_order,
            },
            ActionArg::CopyDescription => Action::CopyDescriptionFromOther,
        };
        Some(action)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => {
            let request = commands::RunInput {
                snapshot: args.snapshot,
                source: args.source.to_source(),
                filter: args.filter,
                action: args.action.to_action(),
                config: args.config,
                write_back: args.write_back,
            };
            commands::run(request).await
        }
        Command::Validate(args) => commands::validate(
            &args.filter,
            &args.source.to_source(),
            args.action.to_action().as_ref(),
        ),
        Command::Hash { images, height } => commands::hash(&images, height).await,
        Command::Similar {
            images,
            threshold,
            height,
        } => commands::similar(&images, threshold, height).await,
    }
}
