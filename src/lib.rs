//! Mede8er Metadata - Sidecar metadata and artwork for Mede8er media players
//!
//! This library builds the `series.xml`, episode `.xml` and artwork files a
//! Mede8er player's library scanner reads, using show and episode details
//! looked up in a remote episode database.

mod config;
mod episode_database;
mod fields;
mod file_resolver;
mod generator;
mod media;
mod mede8er;
mod xml;

// Re-export error types
pub use config::ConfigError;
pub use episode_database::{DatabaseError, EpisodeLookupError};
pub use file_resolver::FileResolverError;
pub use xml::XmlError;

pub use config::{CONFIG_FLAG_COUNT, MetadataConfig};
pub use episode_database::{
    Actor, Artwork, ArtworkKind, DEFAULT_LANGUAGE, EpisodeData, EpisodeDatabase, LookupOptions,
    SeasonData, SeriesRecord, ShowLookup, TvMazeDatabase,
};
pub use file_resolver::{
    SPECIALS_DIR_NAME, find_season_dir, list_subdirectories, match_season_dir, media_file_exists,
    replace_extension,
};
pub use generator::{
    FileLayout, LayoutExamples, MetadataGenerator, NOT_SUPPORTED, write_image, write_xml_file,
};
pub use media::{Episode, Show, unknown_airdate};
pub use mede8er::{
    BANNER_NAME, EPISODE_METADATA_EXTENSION, EPISODE_THUMB_EXTENSION, FANART_NAME,
    Mede8erMetadata, POSTER_NAME, PersonRole, SHOW_METADATA_FILENAME,
};
pub use xml::{Element, ShowIdentity, XmlDocument, read_show_identity};

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for metadata generation
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The episode database does not know the show
    #[error("Show {0} not found in episode database")]
    ShowNotFound(u64),

    /// The episode database could not be reached
    #[error("Episode database unavailable: {0}")]
    ServiceUnavailable(String),

    /// Error during an episode database request
    #[error("Episode database error: {0}")]
    Database(#[from] DatabaseError),

    /// Error while serializing or reading XML
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Writing a metadata or artwork file failed
    #[error("Failed to write {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },
}

/// A file category a provider can create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    ShowMetadata,
    Fanart,
    Poster,
    Banner,
    SeasonPosters,
    SeasonBanners,
    SeasonAllPoster,
    SeasonAllBanner,
    EpisodeMetadata,
    EpisodeThumbnail,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ShowMetadata => "show metadata",
            Self::Fanart => "fanart",
            Self::Poster => "poster",
            Self::Banner => "banner",
            Self::SeasonPosters => "season posters",
            Self::SeasonBanners => "season banners",
            Self::SeasonAllPoster => "season all poster",
            Self::SeasonAllBanner => "season all banner",
            Self::EpisodeMetadata => "episode metadata",
            Self::EpisodeThumbnail => "episode thumbnail",
        };
        f.write_str(label)
    }
}

/// Progress event emitted while generating files
///
/// These events allow library users to report what was written without
/// the library printing anything itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Generation started for a show directory or episode file
    Started { provider: String, target: PathBuf },

    /// Files of one category were written
    Written { artifact: Artifact, count: usize },

    /// Nothing was written for a category (disabled, present, or no data)
    Skipped { artifact: Artifact },

    /// Generation finished
    Complete { written: usize },
}

fn report<F>(artifact: Artifact, count: usize, progress_callback: &mut F) -> usize
where
    F: FnMut(ProgressEvent),
{
    if count > 0 {
        progress_callback(ProgressEvent::Written { artifact, count });
    } else {
        progress_callback(ProgressEvent::Skipped { artifact });
    }
    count
}

/// Creates every enabled show-level file for a show
///
/// Runs the provider's show metadata and show artwork operations in order and
/// reports the outcome of each through the callback. Files that already exist
/// are left untouched.
///
/// # Arguments
///
/// * `generator` - The metadata provider to generate files with
/// * `show` - The show whose directory receives the files
/// * `progress_callback` - Closure called with progress events (can be empty for silent operation)
///
/// # Returns
///
/// The number of files written
///
/// # Examples
///
/// ```no_run
/// use mede8er_metadata::{
///     generate_show_files, Mede8erMetadata, MetadataConfig, ProgressEvent, Show, TvMazeDatabase,
/// };
///
/// let generator = Mede8erMetadata::new(MetadataConfig::all(), TvMazeDatabase::new());
/// let show = Show::new(4607, "Lost", "/tv/Lost");
///
/// let written = generate_show_files(&generator, &show, |event| {
///     if let ProgressEvent::Written { artifact, count } = event {
///         println!("wrote {count} {artifact} file(s)");
///     }
/// })
/// .unwrap();
/// ```
pub fn generate_show_files<G, F>(
    generator: &G,
    show: &Show,
    mut progress_callback: F,
) -> Result<usize, MetadataError>
where
    G: MetadataGenerator + ?Sized,
    F: FnMut(ProgressEvent),
{
    progress_callback(ProgressEvent::Started {
        provider: generator.name().to_string(),
        target: show.location.clone(),
    });

    let steps: [(Artifact, fn(&G, &Show) -> Result<bool, MetadataError>); 6] = [
        (Artifact::ShowMetadata, G::create_show_metadata),
        (Artifact::Fanart, G::create_fanart),
        (Artifact::Poster, G::create_poster),
        (Artifact::Banner, G::create_banner),
        (Artifact::SeasonAllPoster, G::create_season_all_poster),
        (Artifact::SeasonAllBanner, G::create_season_all_banner),
    ];

    let mut written = 0;

    for (artifact, create) in steps {
        let count = usize::from(create(generator, show)?);
        written += report(artifact, count, &mut progress_callback);
    }

    let count = generator.create_season_posters(show)?;
    written += report(Artifact::SeasonPosters, count, &mut progress_callback);

    let count = generator.create_season_banners(show)?;
    written += report(Artifact::SeasonBanners, count, &mut progress_callback);

    progress_callback(ProgressEvent::Complete { written });

    Ok(written)
}

/// Creates every enabled episode-level file for an episode
///
/// Writes the episode metadata document (covering related episodes in the
/// same media file) and the episode thumbnail.
///
/// # Arguments
///
/// * `generator` - The metadata provider to generate files with
/// * `episode` - The episode, backed by an existing media file
/// * `progress_callback` - Closure called with progress events (can be empty for silent operation)
///
/// # Returns
///
/// The number of files written
pub fn generate_episode_files<G, F>(
    generator: &G,
    episode: &Episode,
    mut progress_callback: F,
) -> Result<usize, MetadataError>
where
    G: MetadataGenerator + ?Sized,
    F: FnMut(ProgressEvent),
{
    progress_callback(ProgressEvent::Started {
        provider: generator.name().to_string(),
        target: episode.location.clone(),
    });

    let mut written = 0;

    let count = usize::from(generator.create_episode_metadata(episode)?);
    written += report(Artifact::EpisodeMetadata, count, &mut progress_callback);

    let count = usize::from(generator.create_episode_thumb(episode)?);
    written += report(Artifact::EpisodeThumbnail, count, &mut progress_callback);

    progress_callback(ProgressEvent::Complete { written });

    Ok(written)
}
