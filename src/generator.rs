//! The metadata provider contract
//!
//! [`MetadataGenerator`] describes what every metadata provider offers: where
//! each artifact lives on disk, how its documents are built, and how artifacts
//! are created. Default methods implement the generic layout; providers
//! override the pieces their media player expects differently.

use crate::MetadataError;
use crate::config::MetadataConfig;
use crate::episode_database::{
    ArtworkKind, DEFAULT_LANGUAGE, EpisodeDatabase, LookupOptions, SeriesRecord, ShowLookup,
};
use crate::file_resolver::{ensure_parent_dir, media_file_exists, replace_extension};
use crate::media::{Episode, Show};
use crate::xml::{ShowIdentity, XmlDocument, read_show_identity};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Placeholder used in layout examples for artifacts a provider cannot create.
pub const NOT_SUPPORTED: &str = "not supported";

/// File names and extensions of a provider's artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLayout {
    pub show_metadata_filename: &'static str,
    pub episode_metadata_extension: &'static str,
    pub episode_thumb_extension: &'static str,
    pub poster_name: &'static str,
    pub fanart_name: &'static str,
    pub banner_name: &'static str,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            show_metadata_filename: "tvshow.nfo",
            episode_metadata_extension: "nfo",
            episode_thumb_extension: "tbn",
            poster_name: "poster.jpg",
            fanart_name: "fanart.jpg",
            banner_name: "banner.jpg",
        }
    }
}

/// Human readable templates of where a provider writes each artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutExamples {
    pub show_metadata: String,
    pub episode_metadata: String,
    pub fanart: String,
    pub poster: String,
    pub banner: String,
    pub episode_thumbnails: String,
    pub season_posters: String,
    pub season_banners: String,
    pub season_all_poster: String,
    pub season_all_banner: String,
}

impl LayoutExamples {
    /// Templates for the generic layout described by `layout`
    pub fn for_layout(layout: &FileLayout) -> Self {
        Self {
            show_metadata: layout.show_metadata_filename.to_string(),
            episode_metadata: format!("Season##/<filename>.{}", layout.episode_metadata_extension),
            fanart: layout.fanart_name.to_string(),
            poster: layout.poster_name.to_string(),
            banner: layout.banner_name.to_string(),
            episode_thumbnails: format!("Season##/<filename>.{}", layout.episode_thumb_extension),
            season_posters: "season##-poster.jpg".to_string(),
            season_banners: "season##-banner.jpg".to_string(),
            season_all_poster: "season-all-poster.jpg".to_string(),
            season_all_banner: "season-all-banner.jpg".to_string(),
        }
    }

    /// (label, template) pairs in display order
    pub fn entries(&self) -> [(&'static str, &str); 10] {
        [
            ("Show metadata", self.show_metadata.as_str()),
            ("Episode metadata", self.episode_metadata.as_str()),
            ("Fanart", self.fanart.as_str()),
            ("Poster", self.poster.as_str()),
            ("Banner", self.banner.as_str()),
            ("Episode thumbnails", self.episode_thumbnails.as_str()),
            ("Season posters", self.season_posters.as_str()),
            ("Season banners", self.season_banners.as_str()),
            ("Season all poster", self.season_all_poster.as_str()),
            ("Season all banner", self.season_all_banner.as_str()),
        ]
    }
}

fn season_art_filename(season: u32, kind: &str) -> String {
    if season == 0 {
        format!("season-specials-{kind}.jpg")
    } else {
        format!("season{season:02}-{kind}.jpg")
    }
}

/// Writes a document with XML declaration to `path`, creating parent directories
pub fn write_xml_file(document: &XmlDocument, path: &Path) -> Result<(), MetadataError> {
    let xml = document.to_xml_string()?;

    ensure_parent_dir(path).map_err(|e| MetadataError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, xml).map_err(|e| MetadataError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!(path = %path.display(), "wrote metadata file");
    Ok(())
}

/// Writes image bytes to `path`, creating parent directories
pub fn write_image(path: &Path, bytes: &[u8]) -> Result<(), MetadataError> {
    ensure_parent_dir(path).map_err(|e| MetadataError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, bytes).map_err(|e| MetadataError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!(path = %path.display(), size = bytes.len(), "wrote image file");
    Ok(())
}

/// Contract shared by all metadata providers.
///
/// Implementors supply the accessors and the two document builders; every
/// other operation has a default that follows the generic layout.
///
/// Creation methods return `Ok(true)` when a file was written and `Ok(false)`
/// when the category is disabled, the file already exists, or there was
/// nothing to write.
pub trait MetadataGenerator {
    /// Display name of the provider
    fn name(&self) -> &str;

    fn config(&self) -> &MetadataConfig;

    fn layout(&self) -> &FileLayout;

    fn database(&self) -> &dyn EpisodeDatabase;

    /// Builds the show-level document.
    ///
    /// `Ok(None)` means the database record was too incomplete to describe the show.
    fn show_data(&self, show: &Show) -> Result<Option<XmlDocument>, MetadataError>;

    /// Builds the episode-level document, merging related episodes.
    ///
    /// `Ok(None)` means the episode could not be described and should be skipped.
    fn episode_data(&self, episode: &Episode) -> Result<Option<XmlDocument>, MetadataError>;

    /// Lookup options for a show, honoring its language preference.
    fn lookup_options(&self, show: &Show) -> LookupOptions {
        let options = self.database().default_options();

        match show.language.as_deref() {
            Some(language) if !language.is_empty() && language != DEFAULT_LANGUAGE => {
                options.with_language(language)
            }
            _ => options,
        }
    }

    /// Fetches the series record including artwork.
    fn lookup_series(&self, show: &Show) -> Result<SeriesRecord, MetadataError> {
        let options = self.lookup_options(show).with_banners(true);

        match self.database().lookup_show(show.id, &options) {
            ShowLookup::Found(series) => Ok(*series),
            ShowLookup::NotFound => Err(MetadataError::ShowNotFound(show.id)),
            ShowLookup::ServiceUnavailable(reason) => Err(MetadataError::ServiceUnavailable(reason)),
        }
    }

    fn show_file_path(&self, show: &Show) -> PathBuf {
        show.location.join(self.layout().show_metadata_filename)
    }

    fn poster_path(&self, show: &Show) -> PathBuf {
        show.location.join(self.layout().poster_name)
    }

    fn fanart_path(&self, show: &Show) -> PathBuf {
        show.location.join(self.layout().fanart_name)
    }

    fn banner_path(&self, show: &Show) -> PathBuf {
        show.location.join(self.layout().banner_name)
    }

    /// Path of the episode metadata file next to the media file.
    ///
    /// An empty path means there is no metadata file to write.
    fn episode_file_path(&self, episode: &Episode) -> PathBuf {
        replace_extension(&episode.location, self.layout().episode_metadata_extension)
    }

    /// Path of the episode thumbnail, `None` if the media file is missing.
    fn episode_thumb_path(&self, episode: &Episode) -> Option<PathBuf> {
        if !media_file_exists(&episode.location) {
            debug!(location = %episode.location.display(), "episode location doesn't exist");
            return None;
        }

        Some(replace_extension(
            &episode.location,
            self.layout().episode_thumb_extension,
        ))
    }

    fn season_poster_path(&self, show: &Show, season: u32) -> Option<PathBuf> {
        Some(show.location.join(season_art_filename(season, "poster")))
    }

    fn season_banner_path(&self, show: &Show, season: u32) -> Option<PathBuf> {
        Some(show.location.join(season_art_filename(season, "banner")))
    }

    fn season_all_poster_path(&self, show: &Show) -> PathBuf {
        show.location.join("season-all-poster.jpg")
    }

    fn season_all_banner_path(&self, show: &Show) -> PathBuf {
        show.location.join("season-all-banner.jpg")
    }

    /// Reads the id and name of a show from its existing show metadata file.
    fn retrieve_show_metadata(&self, show_dir: &Path) -> Option<ShowIdentity> {
        let path = show_dir.join(self.layout().show_metadata_filename);
        if !path.is_file() {
            return None;
        }

        match read_show_identity(&path) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unable to read show metadata file");
                None
            }
        }
    }

    fn layout_examples(&self) -> LayoutExamples {
        LayoutExamples::for_layout(self.layout())
    }

    fn create_show_metadata(&self, show: &Show) -> Result<bool, MetadataError> {
        if !self.config().show_metadata {
            return Ok(false);
        }

        let path = self.show_file_path(show);
        if path.exists() {
            debug!(path = %path.display(), "show metadata already exists");
            return Ok(false);
        }

        info!(provider = self.name(), show_id = show.id, "writing show metadata");
        match self.show_data(show)? {
            Some(document) => {
                write_xml_file(&document, &path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn create_episode_metadata(&self, episode: &Episode) -> Result<bool, MetadataError> {
        if !self.config().episode_metadata {
            return Ok(false);
        }

        let path = self.episode_file_path(episode);
        if path.as_os_str().is_empty() {
            return Ok(false);
        }
        if path.exists() {
            debug!(path = %path.display(), "episode metadata already exists");
            return Ok(false);
        }

        info!(
            provider = self.name(),
            show_id = episode.show.id,
            season = episode.season,
            episode = episode.episode,
            "writing episode metadata"
        );
        match self.episode_data(episode)? {
            Some(document) => {
                write_xml_file(&document, &path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn create_fanart(&self, show: &Show) -> Result<bool, MetadataError> {
        if !self.config().fanart {
            return Ok(false);
        }
        save_show_artwork(self, show, &self.fanart_path(show), &ArtworkKind::Fanart)
    }

    fn create_poster(&self, show: &Show) -> Result<bool, MetadataError> {
        if !self.config().poster {
            return Ok(false);
        }
        save_show_artwork(self, show, &self.poster_path(show), &ArtworkKind::Poster)
    }

    fn create_banner(&self, show: &Show) -> Result<bool, MetadataError> {
        if !self.config().banner {
            return Ok(false);
        }
        save_show_artwork(self, show, &self.banner_path(show), &ArtworkKind::Banner)
    }

    fn create_episode_thumb(&self, episode: &Episode) -> Result<bool, MetadataError> {
        if !self.config().episode_thumbnails {
            return Ok(false);
        }

        let Some(path) = self.episode_thumb_path(episode) else {
            return Ok(false);
        };
        if path.exists() {
            debug!(path = %path.display(), "episode thumbnail already exists");
            return Ok(false);
        }

        let series = self.lookup_series(&episode.show)?;
        let thumbnail = match series.episode(episode.season, episode.episode) {
            Ok(data) => data.thumbnail.clone(),
            Err(e) => {
                info!(error = %e, "unable to find episode thumbnail in episode database");
                None
            }
        };

        let Some(location) = thumbnail else {
            debug!(
                season = episode.season,
                episode = episode.episode,
                "no thumbnail available for episode"
            );
            return Ok(false);
        };

        let bytes = self.database().fetch_artwork(&location)?;
        write_image(&path, &bytes)?;
        Ok(true)
    }

    /// Writes a poster for every season that has one. Returns the count written.
    fn create_season_posters(&self, show: &Show) -> Result<usize, MetadataError> {
        if !self.config().season_posters {
            return Ok(0);
        }
        save_season_artwork(self, show, &ArtworkKind::Season, |season| {
            self.season_poster_path(show, season)
        })
    }

    /// Writes a banner for every season that has one. Returns the count written.
    fn create_season_banners(&self, show: &Show) -> Result<usize, MetadataError> {
        if !self.config().season_banners {
            return Ok(0);
        }
        save_season_artwork(self, show, &ArtworkKind::SeasonWide, |season| {
            self.season_banner_path(show, season)
        })
    }

    fn create_season_all_poster(&self, show: &Show) -> Result<bool, MetadataError> {
        if !self.config().season_all_poster {
            return Ok(false);
        }
        save_show_artwork(
            self,
            show,
            &self.season_all_poster_path(show),
            &ArtworkKind::Poster,
        )
    }

    fn create_season_all_banner(&self, show: &Show) -> Result<bool, MetadataError> {
        if !self.config().season_all_banner {
            return Ok(false);
        }
        save_show_artwork(
            self,
            show,
            &self.season_all_banner_path(show),
            &ArtworkKind::Banner,
        )
    }
}

/// Downloads the first show-level artwork of `kind` to `path`.
fn save_show_artwork<G: MetadataGenerator + ?Sized>(
    generator: &G,
    show: &Show,
    path: &Path,
    kind: &ArtworkKind,
) -> Result<bool, MetadataError> {
    if path.exists() {
        debug!(path = %path.display(), "artwork already exists");
        return Ok(false);
    }

    let series = generator.lookup_series(show)?;
    let Some(artwork) = series.show_artwork(kind) else {
        debug!(show_id = show.id, kind = ?kind, "no artwork of this kind available");
        return Ok(false);
    };

    let bytes = generator.database().fetch_artwork(&artwork.path)?;
    write_image(path, &bytes)?;
    Ok(true)
}

/// Downloads the first artwork of `kind` for each season to the path chosen by `target`.
fn save_season_artwork<G, F>(
    generator: &G,
    show: &Show,
    kind: &ArtworkKind,
    target: F,
) -> Result<usize, MetadataError>
where
    G: MetadataGenerator + ?Sized,
    F: Fn(u32) -> Option<PathBuf>,
{
    let series = generator.lookup_series(show)?;

    let seasons: BTreeSet<u32> = series
        .artwork
        .iter()
        .filter(|a| a.kind.satisfies(kind))
        .filter_map(|a| a.season)
        .collect();

    let mut written = 0;

    for season in seasons {
        let Some(path) = target(season) else {
            continue;
        };
        if path.exists() {
            continue;
        }
        let Some(artwork) = series.season_artwork(kind, season) else {
            continue;
        };

        let bytes = generator.database().fetch_artwork(&artwork.path)?;
        write_image(&path, &bytes)?;
        written += 1;
    }

    Ok(written)
}
