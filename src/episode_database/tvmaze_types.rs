/// TVmaze API response types for deserialization.
///
/// These structures mirror the JSON response format from the TVmaze API.
use serde::Deserialize;

/// The response of the `/shows/:id` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeShow {
    pub id: u64,
    pub name: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub status: Option<String>,
    pub runtime: Option<u32>,
    #[serde(rename = "averageRuntime")]
    pub average_runtime: Option<u32>,
    /// Premiere date as `YYYY-MM-DD`
    pub premiered: Option<String>,
    pub schedule: Option<TvMazeSchedule>,
    pub rating: Option<TvMazeRating>,
    pub network: Option<TvMazeNetwork>,
    #[serde(rename = "webChannel")]
    pub web_channel: Option<TvMazeNetwork>,
    pub externals: Option<TvMazeExternals>,
    /// Show summary in HTML format (may be null)
    pub summary: Option<String>,
    /// Embedded resources (episodes, cast) when requested with ?embed[]=
    #[serde(rename = "_embedded")]
    pub embedded: Option<TvMazeEmbedded>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeSchedule {
    pub time: Option<String>,
    #[serde(default)]
    pub days: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeRating {
    pub average: Option<f64>,
}

/// A broadcast network or web channel.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeNetwork {
    pub name: String,
}

/// Identifiers of the show in other databases.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeExternals {
    pub imdb: Option<String>,
}

/// Embedded resources in a TVmaze show response.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeEmbedded {
    #[serde(default)]
    pub episodes: Vec<TvMazeEpisode>,
    #[serde(default)]
    pub cast: Vec<TvMazeCastCredit>,
}

/// A single episode from the TVmaze API.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeEpisode {
    pub id: u64,
    /// Season number (0 for specials)
    pub season: u32,
    /// Episode number within the season (null for some specials)
    pub number: Option<u32>,
    pub name: Option<String>,
    /// Air date as `YYYY-MM-DD`, empty when unknown
    pub airdate: Option<String>,
    pub rating: Option<TvMazeRating>,
    pub image: Option<TvMazeImageLinks>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeImageLinks {
    pub medium: Option<String>,
    pub original: Option<String>,
}

/// A cast or guest cast credit.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeCastCredit {
    pub person: TvMazePerson,
}

/// A guest crew credit such as `Director` or `Written by`.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeCrewCredit {
    #[serde(rename = "guestCrewType")]
    pub kind: Option<String>,
    pub person: TvMazePerson,
}

/// The response of `/episodes/:id` with guest cast and crew embedded.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeEpisodeCredits {
    #[serde(rename = "_embedded")]
    pub embedded: Option<TvMazeEpisodeEmbedded>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeEpisodeEmbedded {
    #[serde(default)]
    pub guestcast: Vec<TvMazeCastCredit>,
    #[serde(default)]
    pub guestcrew: Vec<TvMazeCrewCredit>,
}

/// An entry of the `/shows/:id/seasons` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeSeason {
    pub id: u64,
    pub number: Option<u32>,
    pub image: Option<TvMazeImageLinks>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazePerson {
    pub name: String,
}

/// An entry of the `/shows/:id/images` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeImage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub resolutions: TvMazeResolutions,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeResolutions {
    pub original: TvMazeResolution,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeResolution {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
