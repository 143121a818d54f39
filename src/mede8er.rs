//! Metadata provider for Mede8er media players
//!
//! Mede8er players read a `series.xml` in the show directory and one `.xml`
//! file next to every episode. Artwork lives in `folder.jpg`, `fanart.jpg`
//! and `banner.jpg`, with per-season artwork placed inside the season
//! directories themselves.

use crate::MetadataError;
use crate::config::MetadataConfig;
use crate::episode_database::{
    ArtworkKind, EpisodeData, EpisodeDatabase, LookupOptions, SeriesRecord, ShowLookup,
};
use crate::fields::{dedupe, has_text, join_list, split_list, unique_list};
use crate::file_resolver::{find_season_dir, media_file_exists, replace_extension};
use crate::generator::{FileLayout, LayoutExamples, MetadataGenerator, NOT_SUPPORTED};
use crate::media::{Episode, Show};
use crate::xml::{Element, ShowIdentity, XmlDocument};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const SHOW_METADATA_FILENAME: &str = "series.xml";
pub const EPISODE_METADATA_EXTENSION: &str = "xml";
pub const EPISODE_THUMB_EXTENSION: &str = "jpg";
pub const POSTER_NAME: &str = "folder.jpg";
pub const FANART_NAME: &str = "fanart.jpg";
pub const BANNER_NAME: &str = "banner.jpg";

static MEDE8ER_LAYOUT: FileLayout = FileLayout {
    show_metadata_filename: SHOW_METADATA_FILENAME,
    episode_metadata_extension: EPISODE_METADATA_EXTENSION,
    episode_thumb_extension: EPISODE_THUMB_EXTENSION,
    poster_name: POSTER_NAME,
    fanart_name: FANART_NAME,
    banner_name: BANNER_NAME,
};

/// Separator between the names of merged episodes
const NAME_SEPARATOR: &str = ", ";
/// Separator between the descriptions of merged episodes
const PLOT_SEPARATOR: &str = "\r";

/// Mede8er metadata provider backed by an episode database
pub struct Mede8erMetadata<D: EpisodeDatabase> {
    config: MetadataConfig,
    database: D,
}

impl<D: EpisodeDatabase> Mede8erMetadata<D> {
    /// Creates a provider that generates the categories enabled in `config`
    ///
    /// # Arguments
    ///
    /// * `config` - Which metadata and artwork categories to create
    /// * `database` - Episode database queried for show and episode details
    pub fn new(config: MetadataConfig, database: D) -> Self {
        Self { config, database }
    }

    /// Looks up the show with its cast on top of `options`.
    fn fetch_series(&self, show: &Show, options: LookupOptions) -> ShowLookup {
        self.database.lookup_show(show.id, &options.with_actors(true))
    }

    /// Resolves `file_name` inside the season directory of `season`.
    fn season_dir_file(&self, show: &Show, season: u32, file_name: &str) -> Option<PathBuf> {
        let season_dir = match find_season_dir(&show.location, season) {
            Ok(dir) => dir,
            Err(e) => {
                debug!(location = %show.location.display(), error = %e, "unable to list show directory");
                return None;
            }
        };

        let Some(season_dir) = season_dir else {
            debug!(season, "unable to find a season dir");
            return None;
        };

        debug!(season, dir = %season_dir, file = file_name, "using season dir");
        Some(show.location.join(season_dir).join(file_name))
    }
}

impl<D: EpisodeDatabase> MetadataGenerator for Mede8erMetadata<D> {
    fn name(&self) -> &str {
        "Mede8er"
    }

    fn config(&self) -> &MetadataConfig {
        &self.config
    }

    fn layout(&self) -> &FileLayout {
        &MEDE8ER_LAYOUT
    }

    fn database(&self) -> &dyn EpisodeDatabase {
        &self.database
    }

    fn episode_file_path(&self, episode: &Episode) -> PathBuf {
        if !media_file_exists(&episode.location) {
            debug!(
                location = %episode.location.display(),
                "episode location doesn't exist, not generating metadata"
            );
            return PathBuf::new();
        }

        replace_extension(&episode.location, EPISODE_METADATA_EXTENSION)
    }

    fn episode_thumb_path(&self, episode: &Episode) -> Option<PathBuf> {
        if !media_file_exists(&episode.location) {
            debug!(location = %episode.location.display(), "episode location doesn't exist");
            return None;
        }

        Some(replace_extension(&episode.location, EPISODE_THUMB_EXTENSION))
    }

    fn season_poster_path(&self, show: &Show, season: u32) -> Option<PathBuf> {
        self.season_dir_file(show, season, POSTER_NAME)
    }

    fn season_banner_path(&self, show: &Show, season: u32) -> Option<PathBuf> {
        self.season_dir_file(show, season, BANNER_NAME)
    }

    fn retrieve_show_metadata(&self, _show_dir: &Path) -> Option<ShowIdentity> {
        None
    }

    fn layout_examples(&self) -> LayoutExamples {
        LayoutExamples {
            show_metadata: SHOW_METADATA_FILENAME.to_string(),
            episode_metadata: "Season##/<filename>.xml".to_string(),
            fanart: FANART_NAME.to_string(),
            poster: POSTER_NAME.to_string(),
            banner: BANNER_NAME.to_string(),
            episode_thumbnails: "Season##/<filename>.jpg".to_string(),
            season_posters: "Season##/folder.jpg".to_string(),
            season_banners: "Season##/banner.jpg".to_string(),
            season_all_poster: NOT_SUPPORTED.to_string(),
            season_all_banner: NOT_SUPPORTED.to_string(),
        }
    }

    fn create_season_all_poster(&self, _show: &Show) -> Result<bool, MetadataError> {
        Ok(false)
    }

    fn create_season_all_banner(&self, _show: &Show) -> Result<bool, MetadataError> {
        Ok(false)
    }

    fn show_data(&self, show: &Show) -> Result<Option<XmlDocument>, MetadataError> {
        info!(show_id = show.id, "building Mede8er show metadata");

        let options = self.lookup_options(show).with_banners(true);
        let series = match self.fetch_series(show, options) {
            ShowLookup::Found(series) => series,
            ShowLookup::NotFound => {
                error!(show_id = show.id, "unable to find show in episode database");
                return Err(MetadataError::ShowNotFound(show.id));
            }
            ShowLookup::ServiceUnavailable(reason) => {
                error!(%reason, "episode database is down, can't use its data to make the XML");
                return Err(MetadataError::ServiceUnavailable(reason));
            }
        };

        if !has_text(series.name.as_deref()) || !has_text(series.id.as_deref()) {
            error!(show_id = show.id, "incomplete info for show in episode database, skipping it");
            return Ok(None);
        }

        Ok(Some(build_show_document(&series)))
    }

    fn episode_data(&self, episode: &Episode) -> Result<Option<XmlDocument>, MetadataError> {
        debug!(
            show_id = episode.show.id,
            season = episode.season,
            episode = episode.episode,
            "building Mede8er episode metadata"
        );

        let options = self
            .lookup_options(&episode.show)
            .with_credits_for(episode.worklist().map(|e| (e.season, e.episode)));
        let series = match self.fetch_series(&episode.show, options) {
            ShowLookup::Found(series) => series,
            ShowLookup::NotFound => return Err(MetadataError::ShowNotFound(episode.show.id)),
            ShowLookup::ServiceUnavailable(reason) => {
                error!(%reason, "unable to connect to episode database while creating metadata, skipping");
                return Ok(None);
            }
        };

        let mut builder: Option<EpisodeDocumentBuilder> = None;

        for current in episode.worklist() {
            let data = match series.episode(current.season, current.episode) {
                Ok(data) => data,
                Err(e) => {
                    info!(
                        season = current.season,
                        episode = current.episode,
                        error = %e,
                        "unable to find episode in episode database, has it been removed?"
                    );
                    return Ok(None);
                }
            };

            if let Some(builder) = builder.as_mut() {
                builder.append_related(current);
                builder.credits.collect(data);
                continue;
            }

            if !has_usable_details(current, data) {
                info!(
                    season = current.season,
                    episode = current.episode,
                    "episode is missing its name or air date, skipping"
                );
                return Ok(None);
            }

            let thumb = self.episode_thumb_path(episode);
            let mut primary = EpisodeDocumentBuilder::primary(episode, &series, data, thumb.as_deref());
            primary.credits.collect(data);
            builder = Some(primary);
        }

        Ok(builder.map(EpisodeDocumentBuilder::finish))
    }
}

/// True if the primary episode has both a name and an air date.
///
/// Specials without an air date count as aired on the unknown-date marker.
fn has_usable_details(episode: &Episode, data: &EpisodeData) -> bool {
    let aired = has_text(data.first_aired.as_deref()) || episode.season == 0;
    has_text(data.name.as_deref()) && aired
}

fn premiere_year(first_aired: Option<&str>) -> Option<String> {
    let date = NaiveDate::parse_from_str(first_aired?, "%Y-%m-%d").ok()?;
    Some(date.year().to_string())
}

fn build_show_document(series: &SeriesRecord) -> XmlDocument {
    let mut root = Element::new("details");
    let movie = root.sub_element("movie");
    movie
        .set_attribute("isExtra", "false")
        .set_attribute("isSet", "false")
        .set_attribute("isTV", "true");

    movie.sub_element("title").set_optional_text(series.name.as_deref());
    movie.sub_element("tvdbid").set_optional_text(series.id.as_deref());
    movie
        .sub_element("id")
        .set_attribute("moviedb", "imdb")
        .set_optional_text(series.imdb_id.as_deref());
    movie
        .sub_element("id")
        .set_attribute("moviedb", "zap2it")
        .set_optional_text(series.zap2it_id.as_deref());
    movie.sub_element("premiered").set_optional_text(series.first_aired.as_deref());
    movie
        .sub_element("rating")
        .set_optional_text(series.rating.map(|r| ((r * 10.0) as i64).to_string()));
    movie
        .sub_element("ratingcount")
        .set_optional_text(series.rating_count.map(|c| c.to_string()));
    movie.sub_element("status").set_optional_text(series.status.as_deref());
    movie.sub_element("network").set_optional_text(series.network.as_deref());
    movie
        .sub_element("runtime")
        .set_optional_text(series.runtime.map(|r| r.to_string()));
    movie.sub_element("Airs_Time").set_optional_text(series.airs_time.as_deref());
    movie
        .sub_element("Airs_DayOfWeek")
        .set_optional_text(series.airs_day_of_week.as_deref());
    movie.sub_element("mpaa").set_optional_text(series.content_rating.as_deref());
    movie.sub_element("plot").set_optional_text(series.overview.as_deref());
    movie
        .sub_element("year")
        .set_optional_text(premiere_year(series.first_aired.as_deref()));

    let genres = series.genre.as_deref().map(unique_list);
    let genres_node = movie.sub_element("genres");
    for genre in genres.iter().flatten() {
        genres_node.sub_element("genre").set_text(genre.as_str());
    }
    movie
        .sub_element("genre")
        .set_optional_text(genres.as_deref().map(join_list));

    let cast = movie.sub_element("cast");
    for actor in &series.actors {
        cast.sub_element("actor").set_text(actor.name.as_str());
    }

    add_artwork(movie.sub_element("image"), series);

    XmlDocument::new(root)
}

/// Adds the show-level artwork entries to the `image` section.
///
/// Entries tied to a season are grouped per season and logged only; the
/// Mede8er schema has no place for them in `series.xml`.
fn add_artwork(image: &mut Element, series: &SeriesRecord) {
    let mut seasons: BTreeMap<u32, Vec<&str>> = BTreeMap::new();

    for artwork in &series.artwork {
        if artwork.path.trim().is_empty() {
            warn!(kind = ?artwork.kind, "skipping artwork entry without a path");
            continue;
        }

        if let Some(season) = artwork.season {
            seasons.entry(season).or_default().push(&artwork.path);
            continue;
        }

        let element_name = match &artwork.kind {
            ArtworkKind::Fanart => "fanart",
            ArtworkKind::Poster => "poster",
            ArtworkKind::Banner | ArtworkKind::Series => "banner",
            other => {
                debug!(kind = ?other, path = %artwork.path, "ignoring artwork of unsupported kind");
                continue;
            }
        };

        debug!(kind = element_name, path = %artwork.path, "artwork found");
        image.sub_element(element_name).set_text(artwork.path.as_str());
    }

    for (season, paths) in &seasons {
        debug!(season, count = paths.len(), "season artwork not written to series.xml");
    }
}

/// Role a person is credited with in an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonRole {
    Director,
    GuestStar,
    Writer,
}

impl PersonRole {
    fn element_name(self) -> &'static str {
        match self {
            Self::Director => "director",
            Self::GuestStar => "gueststar",
            Self::Writer => "credits",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Director => "Director",
            Self::GuestStar => "GuestStar",
            Self::Writer => "Writer",
        }
    }
}

/// Directors, guest stars and writers collected across merged episodes
#[derive(Debug, Default)]
struct PersonCredits {
    directors: Vec<String>,
    guest_stars: Vec<String>,
    writers: Vec<String>,
}

impl PersonCredits {
    fn collect(&mut self, data: &EpisodeData) {
        if let Some(director) = data.director.as_deref() {
            self.directors.extend(split_list(director));
        }
        if let Some(guest_stars) = data.guest_stars.as_deref() {
            self.guest_stars.extend(split_list(guest_stars));
        }
        if let Some(writer) = data.writer.as_deref() {
            self.writers.extend(split_list(writer));
        }
    }

    /// Writes one element per unique name, in order of first appearance.
    fn write_to(self, cast: &mut Element) {
        let roles = [
            (PersonRole::Director, self.directors),
            (PersonRole::GuestStar, self.guest_stars),
            (PersonRole::Writer, self.writers),
        ];

        for (role, names) in roles {
            for name in dedupe(names) {
                cast.sub_element(role.element_name())
                    .set_attribute("role", role.label())
                    .set_text(name);
            }
        }
    }
}

/// Episode document under construction.
///
/// Holds the positions of the fields that related episodes extend, so the
/// merge step edits them directly.
struct EpisodeDocumentBuilder {
    root: Element,
    episode_name: usize,
    episode_plot: usize,
    episode_number_end: Option<usize>,
    cast: usize,
    credits: PersonCredits,
}

impl EpisodeDocumentBuilder {
    /// Seeds the document with the fields of the primary episode.
    fn primary(
        episode: &Episode,
        series: &SeriesRecord,
        data: &EpisodeData,
        thumb: Option<&Path>,
    ) -> Self {
        let has_related = !episode.related_episodes.is_empty();
        let mut root = Element::new("movie");

        root.sub_element("tvdbid").set_text(episode.id.to_string());
        root.sub_element("id")
            .set_attribute("moviedb", "imdb")
            .set_optional_text(series.imdb_id.as_deref());
        root.sub_element("title").set_text(episode.show.name.as_str());
        root.sub_element("seriesid").set_text(episode.show.id.to_string());
        root.sub_element("season").set_text(episode.season.to_string());
        root.sub_element("seasonid").set_optional_text(data.season_id.as_deref());

        let episode_name = root.sub_element_index("episodename");
        root.child_at_mut(episode_name)
            .set_text(episode.name.clone().unwrap_or_default());

        root.sub_element("episodeNumber").set_text(episode.episode.to_string());

        let episode_number_end = if has_related {
            let index = root.sub_element_index("episodeNumberEnd");
            root.child_at_mut(index).set_text(episode.episode.to_string());
            Some(index)
        } else {
            root.sub_element("absolute_number")
                .set_optional_text(data.absolute_number.map(|n| n.to_string()));
            None
        };

        root.sub_element("episodereleasedate").set_text(
            episode
                .known_airdate()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        );

        let episode_plot = root.sub_element_index("episodeplot");
        root.child_at_mut(episode_plot)
            .set_text(episode.description.clone().unwrap_or_default());

        let plot = root.sub_element("plot");
        if episode.description.is_some() {
            plot.set_optional_text(series.overview.as_deref());
        }

        let genres = root.sub_element("genres");
        for genre in series.genre.as_deref().map(unique_list).unwrap_or_default() {
            genres.sub_element("genre").set_text(genre);
        }

        root.sub_element("mpaa").set_optional_text(series.content_rating.as_deref());
        root.sub_element("runtime")
            .set_optional_text(series.runtime.map(|r| r.to_string()));

        if !has_related {
            root.sub_element("rating")
                .set_optional_text(data.rating.map(|r| r.to_string()));
        }

        let cast = root.sub_element_index("cast");

        root.sub_element("language").set_optional_text(data.language.as_deref());
        root.sub_element("filename")
            .set_optional_text(thumb.map(|path| path.display().to_string()));

        Self {
            root,
            episode_name,
            episode_plot,
            episode_number_end,
            cast,
            credits: PersonCredits::default(),
        }
    }

    /// Merges a related episode into the end number, name and plot fields.
    fn append_related(&mut self, related: &Episode) {
        if let Some(index) = self.episode_number_end {
            self.root
                .child_at_mut(index)
                .set_text(related.episode.to_string());
        }

        if let Some(name) = related.name.as_deref().filter(|n| !n.is_empty()) {
            append_text(self.root.child_at_mut(self.episode_name), name, NAME_SEPARATOR);
        }

        if let Some(description) = related.description.as_deref().filter(|d| !d.is_empty()) {
            append_text(
                self.root.child_at_mut(self.episode_plot),
                description,
                PLOT_SEPARATOR,
            );
        }
    }

    fn finish(self) -> XmlDocument {
        let mut root = self.root;
        self.credits.write_to(root.child_at_mut(self.cast));
        XmlDocument::new(root)
    }
}

fn append_text(element: &mut Element, value: &str, separator: &str) {
    let text = match element.text().filter(|t| !t.is_empty()) {
        Some(existing) => format!("{existing}{separator}{value}"),
        None => value.to_string(),
    };
    element.set_text(text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode_database::fake::FakeDatabase;
    use crate::episode_database::{Actor, Artwork, SeasonData};
    use crate::media::unknown_airdate;
    use std::fs::{self, File};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn episode_data(season: u32, number: u32, name: &str) -> EpisodeData {
        EpisodeData {
            season_number: season,
            episode_number: number,
            id: Some(format!("{season}{number:02}")),
            name: Some(name.to_string()),
            first_aired: Some("2004-09-22".to_string()),
            absolute_number: Some(number),
            rating: Some(8.5),
            language: Some("en".to_string()),
            season_id: Some("1001".to_string()),
            ..EpisodeData::default()
        }
    }

    fn artwork(kind: ArtworkKind, season: Option<u32>, path: &str) -> Artwork {
        Artwork {
            kind,
            season,
            resolution: None,
            path: path.to_string(),
        }
    }

    fn series() -> SeriesRecord {
        let mut pilot = episode_data(1, 1, "Pilot (1)");
        pilot.director = Some("Alice|Bob|Alice".to_string());
        pilot.writer = Some("Carol".to_string());

        let mut pilot_two = episode_data(1, 2, "Pilot (2)");
        pilot_two.director = Some("Bob| Dave ".to_string());
        pilot_two.guest_stars = Some("|Eve|".to_string());

        SeriesRecord {
            id: Some("73739".to_string()),
            name: Some("Lost".to_string()),
            imdb_id: Some("tt0411008".to_string()),
            zap2it_id: Some("SH672362".to_string()),
            first_aired: Some("2004-09-22".to_string()),
            rating: Some(9.13),
            rating_count: Some(512),
            status: Some("Ended".to_string()),
            network: Some("ABC".to_string()),
            runtime: Some(60),
            airs_time: Some("21:00".to_string()),
            airs_day_of_week: Some("Tuesday".to_string()),
            content_rating: Some("TV-14".to_string()),
            overview: Some("Survivors of a plane crash.".to_string()),
            genre: Some("Drama|Comedy| Action ".to_string()),
            actors: vec![
                Actor {
                    name: "Matthew Fox".to_string(),
                },
                Actor {
                    name: "Evangeline Lilly".to_string(),
                },
            ],
            artwork: vec![
                artwork(ArtworkKind::Fanart, None, "fanart/original/73739-1.jpg"),
                artwork(ArtworkKind::Poster, None, "posters/73739-1.jpg"),
                artwork(ArtworkKind::Series, None, "graphical/73739-g.jpg"),
                artwork(ArtworkKind::Season, Some(1), "seasons/73739-1.jpg"),
            ],
            seasons: vec![
                SeasonData {
                    season_number: 0,
                    episodes: vec![
                        EpisodeData {
                            season_number: 0,
                            episode_number: 1,
                            name: Some("Destination: Lost".to_string()),
                            ..EpisodeData::default()
                        },
                        EpisodeData {
                            season_number: 0,
                            episode_number: 2,
                            ..EpisodeData::default()
                        },
                    ],
                },
                SeasonData {
                    season_number: 1,
                    episodes: vec![
                        pilot,
                        pilot_two,
                        EpisodeData {
                            season_number: 1,
                            episode_number: 3,
                            ..EpisodeData::default()
                        },
                        EpisodeData {
                            season_number: 1,
                            episode_number: 4,
                            name: Some("Walkabout".to_string()),
                            ..EpisodeData::default()
                        },
                        EpisodeData {
                            season_number: 1,
                            episode_number: 5,
                            first_aired: Some("2004-10-20".to_string()),
                            ..EpisodeData::default()
                        },
                    ],
                },
            ],
        }
    }

    fn provider(database: FakeDatabase) -> Mede8erMetadata<FakeDatabase> {
        Mede8erMetadata::new(MetadataConfig::all(), database)
    }

    fn show_in(dir: &TempDir) -> Arc<Show> {
        Arc::new(Show::new(73739, "Lost", dir.path()))
    }

    fn media_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    fn texts<'a>(element: &'a Element, name: &'a str) -> Vec<&'a str> {
        element
            .children_named(name)
            .map(|e| e.text_or_empty())
            .collect()
    }

    #[test]
    fn test_show_document_structure() {
        let provider = provider(FakeDatabase::found(series()));
        let show = Show::new(73739, "Lost", "/tv/Lost");

        let document = provider.show_data(&show).unwrap().unwrap();
        let root = document.root();

        assert_eq!(root.name(), "details");
        assert_eq!(root.children().len(), 1);

        let movie = &root.children()[0];
        assert_eq!(movie.name(), "movie");
        assert_eq!(movie.attr("isExtra"), Some("false"));
        assert_eq!(movie.attr("isSet"), Some("false"));
        assert_eq!(movie.attr("isTV"), Some("true"));
    }

    #[test]
    fn test_show_document_fields() {
        let provider = provider(FakeDatabase::found(series()));
        let show = Show::new(73739, "Lost", "/tv/Lost");

        let document = provider.show_data(&show).unwrap().unwrap();
        let movie = &document.root().children()[0];

        let names: Vec<&str> = movie.children().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "title",
                "tvdbid",
                "id",
                "id",
                "premiered",
                "rating",
                "ratingcount",
                "status",
                "network",
                "runtime",
                "Airs_Time",
                "Airs_DayOfWeek",
                "mpaa",
                "plot",
                "year",
                "genres",
                "genre",
                "cast",
                "image",
            ]
        );

        assert_eq!(movie.child("title").unwrap().text(), Some("Lost"));
        assert_eq!(movie.child("tvdbid").unwrap().text(), Some("73739"));
        let ids: Vec<(Option<&str>, &str)> = movie
            .children_named("id")
            .map(|e| (e.attr("moviedb"), e.text_or_empty()))
            .collect();
        assert_eq!(
            ids,
            vec![(Some("imdb"), "tt0411008"), (Some("zap2it"), "SH672362")]
        );
        assert_eq!(movie.child("rating").unwrap().text(), Some("91"));
        assert_eq!(movie.child("ratingcount").unwrap().text(), Some("512"));
        assert_eq!(movie.child("year").unwrap().text(), Some("2004"));
        assert_eq!(
            texts(movie.child("cast").unwrap(), "actor"),
            vec!["Matthew Fox", "Evangeline Lilly"]
        );
    }

    #[test]
    fn test_show_document_genres() {
        let provider = provider(FakeDatabase::found(series()));
        let show = Show::new(73739, "Lost", "/tv/Lost");

        let document = provider.show_data(&show).unwrap().unwrap();
        let movie = &document.root().children()[0];

        assert_eq!(
            texts(movie.child("genres").unwrap(), "genre"),
            vec!["Drama", "Comedy", "Action"]
        );
        assert_eq!(movie.child("genre").unwrap().text(), Some("Drama|Comedy|Action"));
    }

    #[test]
    fn test_show_document_artwork() {
        let provider = provider(FakeDatabase::found(series()));
        let show = Show::new(73739, "Lost", "/tv/Lost");

        let document = provider.show_data(&show).unwrap().unwrap();
        let image = document.root().children()[0].child("image").unwrap();

        assert_eq!(texts(image, "fanart"), vec!["fanart/original/73739-1.jpg"]);
        assert_eq!(texts(image, "poster"), vec!["posters/73739-1.jpg"]);
        assert_eq!(texts(image, "banner"), vec!["graphical/73739-g.jpg"]);
        // season artwork is not serialized
        assert_eq!(image.children().len(), 3);
    }

    #[test]
    fn test_show_document_keeps_empty_fields() {
        let record = SeriesRecord {
            id: Some("1".to_string()),
            name: Some("Sparse".to_string()),
            first_aired: Some("sometime".to_string()),
            ..SeriesRecord::default()
        };
        let provider = provider(FakeDatabase::found(record));
        let show = Show::new(1, "Sparse", "/tv/Sparse");

        let document = provider.show_data(&show).unwrap().unwrap();
        let movie = &document.root().children()[0];

        assert_eq!(movie.child("network").unwrap().text(), None);
        assert_eq!(movie.child("year").unwrap().text(), None);
        assert!(movie.child("genres").unwrap().children().is_empty());
        assert!(movie.child("image").unwrap().children().is_empty());
    }

    #[test]
    fn test_show_document_requests_artwork_and_cast() {
        let provider = provider(FakeDatabase::found(series()));
        let show = Show::new(73739, "Dark", "/tv/Dark").with_language("de");

        provider.show_data(&show).unwrap();

        let requests = provider.database.requests();
        assert_eq!(requests.len(), 1);
        let (id, options) = &requests[0];
        assert_eq!(*id, 73739);
        assert_eq!(options.language, "de");
        assert!(options.banners);
        assert!(options.actors);
    }

    #[test]
    fn test_show_document_incomplete_record() {
        let record = SeriesRecord {
            id: Some("73739".to_string()),
            name: Some(String::new()),
            ..SeriesRecord::default()
        };
        let provider = provider(FakeDatabase::found(record));
        let show = Show::new(73739, "Lost", "/tv/Lost");

        assert_eq!(provider.show_data(&show).unwrap(), None);
    }

    #[test]
    fn test_show_document_propagates_not_found() {
        let provider = provider(FakeDatabase::not_found());
        let show = Show::new(73739, "Lost", "/tv/Lost");

        assert!(matches!(
            provider.show_data(&show),
            Err(MetadataError::ShowNotFound(73739))
        ));
    }

    #[test]
    fn test_show_document_propagates_service_failure() {
        let provider = provider(FakeDatabase::unavailable());
        let show = Show::new(73739, "Lost", "/tv/Lost");

        assert!(matches!(
            provider.show_data(&show),
            Err(MetadataError::ServiceUnavailable(_))
        ));
    }

    #[test]
    fn test_episode_document_single_episode() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E01.mkv");
        let episode = Episode::new(show_in(&dir), 1, 1, &media)
            .with_id(127131)
            .with_name("Pilot (1)")
            .with_description("Stranded.")
            .with_airdate(NaiveDate::from_ymd_opt(2004, 9, 22).unwrap());
        let provider = provider(FakeDatabase::found(series()));

        let document = provider.episode_data(&episode).unwrap().unwrap();
        let root = document.root();

        let names: Vec<&str> = root.children().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "tvdbid",
                "id",
                "title",
                "seriesid",
                "season",
                "seasonid",
                "episodename",
                "episodeNumber",
                "absolute_number",
                "episodereleasedate",
                "episodeplot",
                "plot",
                "genres",
                "mpaa",
                "runtime",
                "rating",
                "cast",
                "language",
                "filename",
            ]
        );

        assert_eq!(root.name(), "movie");
        assert_eq!(root.child("tvdbid").unwrap().text(), Some("127131"));
        assert_eq!(root.child("title").unwrap().text(), Some("Lost"));
        assert_eq!(root.child("seriesid").unwrap().text(), Some("73739"));
        assert_eq!(root.child("episodename").unwrap().text(), Some("Pilot (1)"));
        assert_eq!(root.child("absolute_number").unwrap().text(), Some("1"));
        assert_eq!(
            root.child("episodereleasedate").unwrap().text(),
            Some("2004-09-22")
        );
        assert_eq!(root.child("episodeplot").unwrap().text(), Some("Stranded."));
        assert_eq!(
            root.child("plot").unwrap().text(),
            Some("Survivors of a plane crash.")
        );
        assert_eq!(root.child("rating").unwrap().text(), Some("8.5"));
        assert_eq!(
            root.child("filename").unwrap().text(),
            Some(dir.path().join("Lost.S01E01.jpg").display().to_string().as_str())
        );
    }

    #[test]
    fn test_episode_document_defaults_to_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E01.mkv");
        let episode = Episode::new(show_in(&dir), 1, 1, &media).with_airdate(unknown_airdate());
        let provider = provider(FakeDatabase::found(series()));

        let document = provider.episode_data(&episode).unwrap().unwrap();
        let root = document.root();

        assert_eq!(root.child("episodename").unwrap().text(), Some(""));
        assert_eq!(root.child("episodeplot").unwrap().text(), Some(""));
        assert_eq!(root.child("episodereleasedate").unwrap().text(), Some(""));
        // the show overview is only used next to a local description
        assert_eq!(root.child("plot").unwrap().text(), None);
    }

    #[test]
    fn test_episode_document_deduplicates_credits() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E01.mkv");
        let episode = Episode::new(show_in(&dir), 1, 1, &media).with_name("Pilot (1)");
        let provider = provider(FakeDatabase::found(series()));

        let document = provider.episode_data(&episode).unwrap().unwrap();
        let cast = document.root().child("cast").unwrap();

        assert_eq!(texts(cast, "director"), vec!["Alice", "Bob"]);
        assert!(
            cast.children_named("director")
                .all(|d| d.attr("role") == Some("Director"))
        );
        assert_eq!(texts(cast, "credits"), vec!["Carol"]);
        assert_eq!(cast.child("credits").unwrap().attr("role"), Some("Writer"));
    }

    #[test]
    fn test_episode_document_merges_related_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E01-E02.mkv");
        let show = show_in(&dir);
        let episode = Episode::new(show.clone(), 1, 1, &media)
            .with_name("Part 1")
            .with_description("A")
            .with_related(
                Episode::new(show, 1, 2, &media)
                    .with_name("Part 2")
                    .with_description("B"),
            );
        let provider = provider(FakeDatabase::found(series()));

        let document = provider.episode_data(&episode).unwrap().unwrap();
        let root = document.root();

        assert_eq!(root.child("episodename").unwrap().text(), Some("Part 1, Part 2"));
        assert_eq!(root.child("episodeplot").unwrap().text(), Some("A\rB"));
        assert_eq!(root.child("episodeNumber").unwrap().text(), Some("1"));
        assert_eq!(root.child("episodeNumberEnd").unwrap().text(), Some("2"));
        assert!(root.child("absolute_number").is_none());
        assert!(root.child("rating").is_none());

        let cast = root.child("cast").unwrap();
        assert_eq!(texts(cast, "director"), vec!["Alice", "Bob", "Dave"]);
        assert_eq!(texts(cast, "gueststar"), vec!["Eve"]);
        assert_eq!(cast.child("gueststar").unwrap().attr("role"), Some("GuestStar"));
    }

    #[test]
    fn test_episode_document_related_episode_fills_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E01-E02.mkv");
        let show = show_in(&dir);
        let episode = Episode::new(show.clone(), 1, 1, &media)
            .with_related(Episode::new(show, 1, 2, &media).with_name("Part 2"));
        let provider = provider(FakeDatabase::found(series()));

        let document = provider.episode_data(&episode).unwrap().unwrap();
        let root = document.root();

        assert_eq!(root.child("episodename").unwrap().text(), Some("Part 2"));
        assert_eq!(root.child("episodeplot").unwrap().text(), Some(""));
    }

    #[test]
    fn test_episode_document_without_name_or_airdate() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E03.mkv");
        let episode = Episode::new(show_in(&dir), 1, 3, &media);
        let provider = provider(FakeDatabase::found(series()));

        assert_eq!(provider.episode_data(&episode).unwrap(), None);
    }

    #[test]
    fn test_episode_document_special_without_airdate() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S00E01.mkv");
        let episode = Episode::new(show_in(&dir), 0, 1, &media);
        let provider = provider(FakeDatabase::found(series()));

        let document = provider.episode_data(&episode).unwrap().unwrap();
        assert_eq!(document.root().child("season").unwrap().text(), Some("0"));
    }

    #[test]
    fn test_episode_document_special_without_name() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S00E02.mkv");
        let episode = Episode::new(show_in(&dir), 0, 2, &media);
        let provider = provider(FakeDatabase::found(series()));

        assert_eq!(provider.episode_data(&episode).unwrap(), None);
    }

    #[test]
    fn test_episode_document_named_but_undated() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E04.mkv");
        let episode = Episode::new(show_in(&dir), 1, 4, &media).with_name("Walkabout");
        let provider = provider(FakeDatabase::found(series()));

        assert_eq!(provider.episode_data(&episode).unwrap(), None);
    }

    #[test]
    fn test_episode_document_dated_but_unnamed() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E05.mkv");
        let episode = Episode::new(show_in(&dir), 1, 5, &media)
            .with_airdate(NaiveDate::from_ymd_opt(2004, 10, 20).unwrap());
        let provider = provider(FakeDatabase::found(series()));

        assert_eq!(provider.episode_data(&episode).unwrap(), None);
    }

    #[test]
    fn test_episode_document_lookup_failures() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S05E01.mkv");
        let episode = Episode::new(show_in(&dir), 5, 1, &media).with_name("Because You Left");

        let missing_episode = provider(FakeDatabase::found(series()));
        assert_eq!(missing_episode.episode_data(&episode).unwrap(), None);

        let down = provider(FakeDatabase::unavailable());
        assert_eq!(down.episode_data(&episode).unwrap(), None);

        let missing_show = provider(FakeDatabase::not_found());
        assert!(matches!(
            missing_show.episode_data(&episode),
            Err(MetadataError::ShowNotFound(73739))
        ));
    }

    #[test]
    fn test_episode_document_requests_cast_only() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E01.mkv");
        let episode = Episode::new(show_in(&dir), 1, 1, &media).with_name("Pilot (1)");
        let provider = provider(FakeDatabase::found(series()));

        provider.episode_data(&episode).unwrap();

        let (_, options) = &provider.database.requests()[0];
        assert!(options.actors);
        assert!(!options.banners);
        assert_eq!(options.credits_for, vec![(1, 1)]);
    }

    #[test]
    fn test_episode_document_requests_credits_for_related_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E01-E02.mkv");
        let show = show_in(&dir);
        let episode = Episode::new(show.clone(), 1, 1, &media)
            .with_name("Part 1")
            .with_related(Episode::new(show, 1, 2, &media));
        let provider = provider(FakeDatabase::found(series()));

        provider.episode_data(&episode).unwrap();

        let (_, options) = &provider.database.requests()[0];
        assert_eq!(options.credits_for, vec![(1, 1), (1, 2)]);
    }

    #[test]
    fn test_season_artwork_paths() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Season 1", "Season 02", "Specials"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        let show = Show::new(73739, "Lost", dir.path());
        let provider = provider(FakeDatabase::not_found());

        assert_eq!(
            provider.season_poster_path(&show, 0),
            Some(dir.path().join("Specials").join("folder.jpg"))
        );
        assert_eq!(
            provider.season_poster_path(&show, 2),
            Some(dir.path().join("Season 02").join("folder.jpg"))
        );
        assert_eq!(provider.season_poster_path(&show, 5), None);
        assert_eq!(
            provider.season_banner_path(&show, 1),
            Some(dir.path().join("Season 1").join("banner.jpg"))
        );
    }

    #[test]
    fn test_missing_media_file_paths() {
        let dir = tempfile::tempdir().unwrap();
        let episode = Episode::new(show_in(&dir), 1, 1, dir.path().join("missing.mkv"));
        let provider = provider(FakeDatabase::not_found());

        assert_eq!(provider.episode_thumb_path(&episode), None);
        assert_eq!(provider.episode_file_path(&episode), PathBuf::new());
        assert!(!provider.create_episode_metadata(&episode).unwrap());
    }

    #[test]
    fn test_episode_paths_replace_extension() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E01.mkv");
        let episode = Episode::new(show_in(&dir), 1, 1, &media);
        let provider = provider(FakeDatabase::not_found());

        assert_eq!(
            provider.episode_file_path(&episode),
            dir.path().join("Lost.S01E01.xml")
        );
        assert_eq!(
            provider.episode_thumb_path(&episode),
            Some(dir.path().join("Lost.S01E01.jpg"))
        );
    }

    #[test]
    fn test_create_files() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_file(&dir, "Lost.S01E01.mkv");
        let show = show_in(&dir);
        let episode = Episode::new(show.clone(), 1, 1, &media).with_name("Pilot (1)");
        let provider = provider(
            FakeDatabase::found(series()).with_artwork("posters/73739-1.jpg", b"poster"),
        );

        assert!(provider.create_show_metadata(&show).unwrap());
        assert!(provider.create_episode_metadata(&episode).unwrap());
        assert!(provider.create_poster(&show).unwrap());

        let series_xml = fs::read_to_string(dir.path().join("series.xml")).unwrap();
        assert!(series_xml.contains("<movie isExtra=\"false\" isSet=\"false\" isTV=\"true\">"));

        let episode_xml = fs::read_to_string(dir.path().join("Lost.S01E01.xml")).unwrap();
        assert!(episode_xml.contains("<episodename>Pilot (1)</episodename>"));

        assert_eq!(fs::read(dir.path().join("folder.jpg")).unwrap(), b"poster");
    }

    #[test]
    fn test_season_all_artwork_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let show = show_in(&dir);
        let provider = provider(FakeDatabase::found(series()));

        assert!(!provider.create_season_all_poster(&show).unwrap());
        assert!(!provider.create_season_all_banner(&show).unwrap());
        assert!(provider.database.requests().is_empty());
        assert_eq!(provider.layout_examples().season_all_poster, NOT_SUPPORTED);
    }

    #[test]
    fn test_retrieve_show_metadata_is_not_supported() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(FakeDatabase::found(series()));
        provider.create_show_metadata(&show_in(&dir)).unwrap();

        assert_eq!(provider.retrieve_show_metadata(dir.path()), None);
    }
}
