/// Data structures and traits for episode database lookups.
///
/// This module provides structures to represent a TV series as reported by a
/// remote episode database (show fields, cast, artwork, seasons and episodes),
/// as well as the trait metadata providers use to query such a database.
#[cfg(test)]
pub(crate) mod fake;
mod tvmaze;
mod tvmaze_types;

pub use tvmaze::TvMazeDatabase;

use thiserror::Error;

/// Language the episode database is queried in unless a show asks otherwise.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Errors that can occur during episode database requests.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Request to the episode database failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Failed to parse the database's response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The requested resource was not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Failure to navigate from a series to one of its episodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EpisodeLookupError {
    #[error("Season {season} not found")]
    SeasonNotFound { season: u32 },

    #[error("Episode {season}x{episode} not found")]
    EpisodeNotFound { season: u32, episode: u32 },
}

/// Parameters for a show lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOptions {
    /// Language to request titles and overviews in
    pub language: String,
    /// Include artwork entries in the result
    pub banners: bool,
    /// Include the cast list in the result
    pub actors: bool,
    /// Episodes, as `(season, episode)`, whose directors, writers and guest
    /// stars should be filled in
    pub credits_for: Vec<(u32, u32)>,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            banners: false,
            actors: false,
            credits_for: Vec::new(),
        }
    }
}

impl LookupOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_banners(mut self, banners: bool) -> Self {
        self.banners = banners;
        self
    }

    pub fn with_actors(mut self, actors: bool) -> Self {
        self.actors = actors;
        self
    }

    pub fn with_credits_for(mut self, episodes: impl IntoIterator<Item = (u32, u32)>) -> Self {
        self.credits_for = episodes.into_iter().collect();
        self
    }
}

/// Outcome of looking up a show in the episode database.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowLookup {
    /// The show was found
    Found(Box<SeriesRecord>),
    /// The database does not know the show
    NotFound,
    /// The database could not be reached or answered with garbage
    ServiceUnavailable(String),
}

/// Kind of an artwork entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkKind {
    Fanart,
    Poster,
    Banner,
    /// Generic series graphic, used as a banner
    Series,
    /// Season poster
    Season,
    /// Wide season banner
    SeasonWide,
    Other(String),
}

impl ArtworkKind {
    pub fn parse(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "fanart" | "background" => Self::Fanart,
            "poster" => Self::Poster,
            "banner" => Self::Banner,
            "series" => Self::Series,
            "season" => Self::Season,
            "seasonwide" => Self::SeasonWide,
            _ => Self::Other(kind.to_string()),
        }
    }

    /// True if an entry of this kind can stand in for `wanted`
    ///
    /// Series graphics count as banners.
    pub fn satisfies(&self, wanted: &ArtworkKind) -> bool {
        match (self, wanted) {
            (Self::Series, Self::Banner) => true,
            _ => self == wanted,
        }
    }
}

/// A single artwork entry of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub kind: ArtworkKind,
    /// Season the artwork belongs to, if any
    pub season: Option<u32>,
    /// Resolution bucket such as `1920x1080`
    pub resolution: Option<String>,
    /// Location of the image (path or URL understood by the database)
    pub path: String,
}

/// A cast member of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
}

/// Episode fields as reported by the episode database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeData {
    pub season_number: u32,
    pub episode_number: u32,
    pub id: Option<String>,
    pub name: Option<String>,
    /// First-aired date as `YYYY-MM-DD`
    pub first_aired: Option<String>,
    pub absolute_number: Option<u32>,
    pub rating: Option<f64>,
    pub language: Option<String>,
    pub season_id: Option<String>,
    /// Pipe-separated director names
    pub director: Option<String>,
    /// Pipe-separated guest star names
    pub guest_stars: Option<String>,
    /// Pipe-separated writer names
    pub writer: Option<String>,
    /// Location of the episode still, if any
    pub thumbnail: Option<String>,
}

/// A season and its episodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonData {
    pub season_number: u32,
    pub episodes: Vec<EpisodeData>,
}

/// A complete series record with show fields, cast, artwork and episodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub imdb_id: Option<String>,
    pub zap2it_id: Option<String>,
    /// First-aired date as `YYYY-MM-DD`
    pub first_aired: Option<String>,
    /// Average rating on a 0-10 scale
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub status: Option<String>,
    pub network: Option<String>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    pub airs_time: Option<String>,
    pub airs_day_of_week: Option<String>,
    pub content_rating: Option<String>,
    pub overview: Option<String>,
    /// Pipe-separated genre names
    pub genre: Option<String>,
    pub actors: Vec<Actor>,
    pub artwork: Vec<Artwork>,
    pub seasons: Vec<SeasonData>,
}

impl SeriesRecord {
    /// Navigates to an episode by season and episode number.
    pub fn episode(&self, season: u32, episode: u32) -> Result<&EpisodeData, EpisodeLookupError> {
        let season_data = self
            .seasons
            .iter()
            .find(|s| s.season_number == season)
            .ok_or(EpisodeLookupError::SeasonNotFound { season })?;

        season_data
            .episodes
            .iter()
            .find(|e| e.episode_number == episode)
            .ok_or(EpisodeLookupError::EpisodeNotFound { season, episode })
    }

    /// First artwork entry of `kind` that is not tied to a season.
    pub fn show_artwork(&self, kind: &ArtworkKind) -> Option<&Artwork> {
        self.artwork
            .iter()
            .find(|a| a.season.is_none() && a.kind.satisfies(kind))
    }

    /// First artwork entry of `kind` for the given season.
    pub fn season_artwork(&self, kind: &ArtworkKind, season: u32) -> Option<&Artwork> {
        self.artwork
            .iter()
            .find(|a| a.season == Some(season) && a.kind.satisfies(kind))
    }
}

/// Trait for episode databases that can describe a TV series.
///
/// Implementors of this trait retrieve series records from sources such as
/// TVDB or TVmaze. Lookups are synchronous and are attempted exactly once.
pub trait EpisodeDatabase {
    /// Lookup parameters used when a show does not request anything else.
    fn default_options(&self) -> LookupOptions {
        LookupOptions::default()
    }

    /// Looks up a show by its numeric identifier.
    ///
    /// # Arguments
    ///
    /// * `show_id` - Identifier of the show in this database
    /// * `options` - Language and which optional sections to include
    fn lookup_show(&self, show_id: u64, options: &LookupOptions) -> ShowLookup;

    /// Downloads the image behind an artwork or thumbnail location.
    fn fetch_artwork(&self, location: &str) -> Result<Vec<u8>, DatabaseError>;
}
