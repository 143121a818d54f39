/// TVmaze episode database implementation.
use super::tvmaze_types::{
    TvMazeEpisode, TvMazeEpisodeCredits, TvMazeImage, TvMazeSeason, TvMazeShow,
};
use super::{
    Actor, Artwork, ArtworkKind, DatabaseError, EpisodeData, EpisodeDatabase, LookupOptions,
    SeasonData, SeriesRecord, ShowLookup,
};
use crate::fields::join_list;
use reqwest::StatusCode;
use reqwest::header::ACCEPT_LANGUAGE;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com";

/// Guest crew types credited as writers (compared lowercase).
const WRITER_CREDITS: [&str; 5] = ["writer", "written by", "teleplay by", "story by", "screenplay by"];

/// Episode database backed by the TVmaze API.
///
/// Shows are fetched from https://api.tvmaze.com with their episodes (and
/// cast, if requested) embedded. Season ids and posters come from the
/// show's season list, artwork from its image list. Directors, writers and
/// guest stars are fetched per episode, only for the episodes asked for.
pub struct TvMazeDatabase {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Default for TvMazeDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl TvMazeDatabase {
    /// Creates a new TVmaze database client.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client talking to a different TVmaze-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Sends a GET request and parses the JSON response.
    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DatabaseError> {
        debug!(url, "TVmaze request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| DatabaseError::RequestError(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DatabaseError::NotFound(url.to_string()));
        }

        if !response.status().is_success() {
            return Err(DatabaseError::RequestError(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .map_err(|e| DatabaseError::ParseError(e.to_string()))
    }

    /// Fetches the image list of a show and converts it to artwork entries.
    fn fetch_images(&self, show_id: u64) -> Result<Vec<Artwork>, DatabaseError> {
        let url = format!("{}/shows/{}/images", self.base_url, show_id);
        let images: Vec<TvMazeImage> = self.get_json(&url, &[])?;

        Ok(Self::convert_images(images))
    }

    fn fetch_seasons(&self, show_id: u64) -> Result<Vec<TvMazeSeason>, DatabaseError> {
        let url = format!("{}/shows/{}/seasons", self.base_url, show_id);
        self.get_json(&url, &[])
    }

    /// Fetches the guest cast and guest crew of a single episode.
    fn fetch_credits(&self, episode_id: &str) -> Result<TvMazeEpisodeCredits, DatabaseError> {
        let url = format!("{}/episodes/{}", self.base_url, episode_id);
        self.get_json(&url, &[("embed[]", "guestcast"), ("embed[]", "guestcrew")])
    }

    /// Fills in directors, writers and guest stars of the listed episodes.
    ///
    /// A failed request leaves that episode's credits empty.
    fn fill_credits(&self, series: &mut SeriesRecord, episodes: &[(u32, u32)]) {
        for &(season, number) in episodes {
            let Some(episode) = series
                .seasons
                .iter_mut()
                .filter(|s| s.season_number == season)
                .flat_map(|s| s.episodes.iter_mut())
                .find(|e| e.episode_number == number)
            else {
                continue;
            };

            let Some(id) = episode.id.clone() else {
                continue;
            };

            match self.fetch_credits(&id) {
                Ok(credits) => Self::apply_credits(episode, credits),
                Err(e) => {
                    warn!(season, episode = number, error = %e, "unable to fetch episode credits");
                }
            }
        }
    }

    /// Copies guest crew and guest cast names into the episode's credit fields.
    fn apply_credits(episode: &mut EpisodeData, credits: TvMazeEpisodeCredits) {
        let Some(embedded) = credits.embedded else {
            return;
        };

        let mut directors = Vec::new();
        let mut writers = Vec::new();

        for credit in embedded.guestcrew {
            let kind = credit.kind.unwrap_or_default().to_ascii_lowercase();
            if kind == "director" {
                directors.push(credit.person.name);
            } else if WRITER_CREDITS.contains(&kind.as_str()) {
                writers.push(credit.person.name);
            }
        }

        let guest_stars: Vec<String> = embedded
            .guestcast
            .into_iter()
            .map(|credit| credit.person.name)
            .collect();

        episode.director = non_empty_list(&directors);
        episode.writer = non_empty_list(&writers);
        episode.guest_stars = non_empty_list(&guest_stars);
    }

    /// Converts season posters to season-tagged artwork entries.
    fn convert_season_images(seasons: &[TvMazeSeason]) -> Vec<Artwork> {
        seasons
            .iter()
            .filter_map(|season| {
                let image = season.image.as_ref()?;
                let path = image.original.clone().or_else(|| image.medium.clone())?;

                Some(Artwork {
                    kind: ArtworkKind::Season,
                    season: Some(season.number?),
                    resolution: None,
                    path,
                })
            })
            .collect()
    }

    /// Converts TVmaze images to artwork entries.
    ///
    /// `background` images become fanart. Show images carry no season.
    fn convert_images(images: Vec<TvMazeImage>) -> Vec<Artwork> {
        images
            .into_iter()
            .filter_map(|image| {
                let kind = ArtworkKind::parse(image.kind.as_deref()?);
                let original = image.resolutions.original;
                let resolution = match (original.width, original.height) {
                    (Some(width), Some(height)) => Some(format!("{width}x{height}")),
                    _ => None,
                };

                Some(Artwork {
                    kind,
                    season: None,
                    resolution,
                    path: original.url,
                })
            })
            .collect()
    }

    /// Converts a TVmaze episode to our internal EpisodeData structure.
    fn convert_episode(
        tvmaze_episode: TvMazeEpisode,
        absolute_number: Option<u32>,
        season_id: Option<String>,
        language: &str,
    ) -> Option<EpisodeData> {
        let episode_number = tvmaze_episode.number?;

        Some(EpisodeData {
            season_number: tvmaze_episode.season,
            episode_number,
            id: Some(tvmaze_episode.id.to_string()),
            name: tvmaze_episode.name.filter(|n| !n.trim().is_empty()),
            first_aired: tvmaze_episode.airdate.filter(|d| !d.trim().is_empty()),
            absolute_number,
            rating: tvmaze_episode.rating.and_then(|r| r.average),
            language: Some(language.to_string()),
            season_id,
            director: None,
            guest_stars: None,
            writer: None,
            thumbnail: tvmaze_episode
                .image
                .and_then(|image| image.original.or(image.medium)),
        })
    }

    /// Converts TVmaze show data to our internal SeriesRecord structure.
    ///
    /// Groups episodes by season. Absolute numbers count regular episodes
    /// in airing order; specials have none.
    fn convert_show(
        tvmaze_show: TvMazeShow,
        artwork: Vec<Artwork>,
        tvmaze_seasons: &[TvMazeSeason],
        options: &LookupOptions,
    ) -> SeriesRecord {
        let (episodes, cast) = match tvmaze_show.embedded {
            Some(embedded) => (embedded.episodes, embedded.cast),
            None => (Vec::new(), Vec::new()),
        };

        let season_ids: HashMap<u32, String> = tvmaze_seasons
            .iter()
            .filter_map(|season| Some((season.number?, season.id.to_string())))
            .collect();

        let mut seasons_map: HashMap<u32, Vec<EpisodeData>> = HashMap::new();
        let mut absolute_number = 0;

        for tvmaze_episode in episodes {
            let absolute = if tvmaze_episode.season > 0 && tvmaze_episode.number.is_some() {
                absolute_number += 1;
                Some(absolute_number)
            } else {
                None
            };

            let season_id = season_ids.get(&tvmaze_episode.season).cloned();
            if let Some(episode) =
                Self::convert_episode(tvmaze_episode, absolute, season_id, &options.language)
            {
                seasons_map
                    .entry(episode.season_number)
                    .or_default()
                    .push(episode);
            }
        }

        let mut seasons: Vec<SeasonData> = seasons_map
            .into_iter()
            .map(|(season_number, mut episodes)| {
                episodes.sort_by_key(|e| e.episode_number);
                SeasonData {
                    season_number,
                    episodes,
                }
            })
            .collect();
        seasons.sort_by_key(|s| s.season_number);

        let actors = if options.actors {
            cast.into_iter()
                .map(|credit| Actor {
                    name: credit.person.name,
                })
                .collect()
        } else {
            Vec::new()
        };

        let (airs_time, airs_day_of_week) = match tvmaze_show.schedule {
            Some(schedule) => (
                schedule.time.filter(|t| !t.is_empty()),
                (!schedule.days.is_empty()).then(|| schedule.days.join(", ")),
            ),
            None => (None, None),
        };

        let externals = tvmaze_show.externals;

        SeriesRecord {
            id: Some(tvmaze_show.id.to_string()),
            name: tvmaze_show.name,
            imdb_id: externals.as_ref().and_then(|e| e.imdb.clone()),
            zap2it_id: None,
            first_aired: tvmaze_show.premiered,
            rating: tvmaze_show.rating.and_then(|r| r.average),
            rating_count: None,
            status: tvmaze_show.status,
            network: tvmaze_show
                .network
                .or(tvmaze_show.web_channel)
                .map(|n| n.name),
            runtime: tvmaze_show.runtime.or(tvmaze_show.average_runtime),
            airs_time,
            airs_day_of_week,
            content_rating: None,
            overview: tvmaze_show
                .summary
                .map(|s| nanohtml2text::html2text(&s).trim().to_string()),
            genre: (!tvmaze_show.genres.is_empty())
                .then(|| join_list(&tvmaze_show.genres)),
            actors,
            artwork,
            seasons,
        }
    }
}

impl EpisodeDatabase for TvMazeDatabase {
    fn lookup_show(&self, show_id: u64, options: &LookupOptions) -> ShowLookup {
        let url = format!("{}/shows/{}", self.base_url, show_id);

        let mut query = vec![("embed[]", "episodes")];
        if options.actors {
            query.push(("embed[]", "cast"));
        }

        debug!(url = %url, language = %options.language, "TVmaze show request");

        let response = match self
            .client
            .get(&url)
            .query(&query)
            .header(ACCEPT_LANGUAGE, options.language.as_str())
            .send()
        {
            Ok(response) => response,
            Err(e) => return ShowLookup::ServiceUnavailable(e.to_string()),
        };

        if response.status() == StatusCode::NOT_FOUND {
            return ShowLookup::NotFound;
        }

        if !response.status().is_success() {
            return ShowLookup::ServiceUnavailable(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            ));
        }

        let tvmaze_show: TvMazeShow = match response.json() {
            Ok(show) => show,
            Err(e) => {
                return ShowLookup::ServiceUnavailable(format!("Failed to parse API response: {e}"));
            }
        };

        let seasons = self.fetch_seasons(show_id).unwrap_or_else(|e| {
            warn!(show_id, error = %e, "unable to fetch seasons, continuing without season data");
            Vec::new()
        });

        let mut artwork = Vec::new();
        if options.banners {
            artwork = self.fetch_images(show_id).unwrap_or_else(|e| {
                warn!(show_id, error = %e, "unable to fetch show images, continuing without artwork");
                Vec::new()
            });
            artwork.extend(Self::convert_season_images(&seasons));
        }

        let mut series = Self::convert_show(tvmaze_show, artwork, &seasons, options);
        self.fill_credits(&mut series, &options.credits_for);

        ShowLookup::Found(Box::new(series))
    }

    fn fetch_artwork(&self, location: &str) -> Result<Vec<u8>, DatabaseError> {
        debug!(location, "TVmaze artwork download");

        let response = self
            .client
            .get(location)
            .send()
            .map_err(|e| DatabaseError::RequestError(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DatabaseError::NotFound(location.to_string()));
        }

        if !response.status().is_success() {
            return Err(DatabaseError::RequestError(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| DatabaseError::RequestError(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

fn non_empty_list(names: &[String]) -> Option<String> {
    (!names.is_empty()).then(|| join_list(names))
}
