use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use mede8er_metadata::{
    Episode, Mede8erMetadata, MetadataConfig, MetadataGenerator, ProgressEvent, Show,
    TvMazeDatabase, generate_episode_files, generate_show_files,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mede8er-metadata")]
#[command(author, version, about = "Generate Mede8er metadata and artwork for TV shows")]
struct Cli {
    /// Enabled file categories as ten pipe-separated flags, e.g. "1|1|1|1|0|0|1|1|0|0"
    #[arg(short, long, global = true)]
    config: Option<MetadataConfig>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write series.xml and show artwork into a show directory
    Show {
        /// Root directory of the show
        #[arg(required = true)]
        directory: PathBuf,

        /// Show identifier in the episode database
        #[arg(long)]
        id: u64,

        /// Display name of the show (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,

        /// Metadata language
        #[arg(long)]
        lang: Option<String>,
    },

    /// Write the metadata file and thumbnail next to an episode's media file
    Episode {
        /// Media file of the episode
        #[arg(required = true)]
        file: PathBuf,

        /// Root directory of the show
        #[arg(long)]
        show_dir: PathBuf,

        /// Show identifier in the episode database
        #[arg(long)]
        show_id: u64,

        /// Display name of the show (defaults to the directory name)
        #[arg(long)]
        show_name: Option<String>,

        /// Metadata language
        #[arg(long)]
        lang: Option<String>,

        #[arg(long)]
        season: u32,

        #[arg(long)]
        episode: u32,

        /// Further episode numbers contained in the same file
        #[arg(long)]
        related: Vec<u32>,

        /// Episode identifier in the episode database
        #[arg(long, default_value_t = 0)]
        episode_id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Air date as YYYY-MM-DD
        #[arg(long)]
        airdate: Option<NaiveDate>,
    },

    /// Print where each file is written
    Layout,
}

/// Handles progress events and prints formatted output to stdout
fn handle_progress_event(event: ProgressEvent) {
    match event {
        ProgressEvent::Started { provider, target } => {
            println!("{} metadata for {}", provider, target.display());
        }
        ProgressEvent::Written { artifact, count } => {
            println!("  wrote {} ({})", artifact, count);
        }
        ProgressEvent::Skipped { artifact } => {
            println!("  skipped {}", artifact);
        }
        ProgressEvent::Complete { written } => {
            println!("Done, {} file(s) written.", written);
        }
    }
}

fn make_show(id: u64, directory: PathBuf, name: Option<String>, lang: Option<String>) -> Show {
    let name = name.unwrap_or_else(|| {
        directory
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    });

    let show = Show::new(id, name, directory);
    match lang {
        Some(lang) => show.with_language(lang),
        None => show,
    }
}

fn main() {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mede8er_metadata=debug".to_string()
        } else {
            "mede8er_metadata=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config = cli.config.unwrap_or_else(MetadataConfig::all);
    if !config.is_enabled() {
        eprintln!("Warning: every file category is disabled, nothing will be written");
    }

    let generator = Mede8erMetadata::new(config, TvMazeDatabase::new());

    let result = match cli.command {
        Commands::Show {
            directory,
            id,
            name,
            lang,
        } => {
            if !directory.is_dir() {
                eprintln!("Error: Path is not a directory: {}", directory.display());
                process::exit(1);
            }

            let show = make_show(id, directory, name, lang);
            generate_show_files(&generator, &show, handle_progress_event)
        }
        Commands::Episode {
            file,
            show_dir,
            show_id,
            show_name,
            lang,
            season,
            episode,
            related,
            episode_id,
            name,
            description,
            airdate,
        } => {
            if !file.is_file() {
                eprintln!("Error: Media file does not exist: {}", file.display());
                process::exit(1);
            }

            let show = Arc::new(make_show(show_id, show_dir, show_name, lang));

            let mut primary = Episode::new(show.clone(), season, episode, &file).with_id(episode_id);
            primary.name = name;
            primary.description = description;
            primary.airdate = airdate;

            let primary = related.into_iter().fold(primary, |primary, number| {
                primary.with_related(Episode::new(show.clone(), season, number, &file))
            });

            generate_episode_files(&generator, &primary, handle_progress_event)
        }
        Commands::Layout => {
            println!("{} file layout:", generator.name());
            for (label, template) in generator.layout_examples().entries() {
                println!("  {:<20} {}", label, template);
            }
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("\nError during metadata generation: {}", e);
        process::exit(1);
    }
}
