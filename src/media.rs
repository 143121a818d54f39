//! Shows and episodes as known to the media library
//!
//! These records are owned by the calling application. Metadata providers only
//! read them.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;

/// Air date stored for episodes whose real air date is unknown (0001-01-01).
pub fn unknown_airdate() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// A TV show in the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    /// Identifier of the show in the episode database
    pub id: u64,
    /// Display name of the show
    pub name: String,
    /// Preferred metadata language, if different from the default
    pub language: Option<String>,
    /// Root directory of the show on disk
    pub location: PathBuf,
}

impl Show {
    pub fn new(id: u64, name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            id,
            name: name.into(),
            language: None,
            location: location.into(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// An episode in the library, backed by a media file
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// The show this episode belongs to
    pub show: Arc<Show>,
    /// Identifier of the episode in the episode database
    pub id: u64,
    pub season: u32,
    pub episode: u32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub airdate: Option<NaiveDate>,
    /// Path of the episode's media file
    pub location: PathBuf,
    /// Further episodes contained in the same media file
    pub related_episodes: Vec<Episode>,
}

impl Episode {
    pub fn new(show: Arc<Show>, season: u32, episode: u32, location: impl Into<PathBuf>) -> Self {
        Self {
            show,
            id: 0,
            season,
            episode,
            name: None,
            description: None,
            airdate: None,
            location: location.into(),
            related_episodes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_airdate(mut self, airdate: NaiveDate) -> Self {
        self.airdate = Some(airdate);
        self
    }

    pub fn with_related(mut self, related: Episode) -> Self {
        self.related_episodes.push(related);
        self
    }

    /// The air date, unless it is unset or the unknown-date marker
    pub fn known_airdate(&self) -> Option<NaiveDate> {
        self.airdate.filter(|date| *date != unknown_airdate())
    }

    /// This episode followed by its related episodes
    pub fn worklist(&self) -> impl Iterator<Item = &Episode> {
        std::iter::once(self).chain(self.related_episodes.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show() -> Arc<Show> {
        Arc::new(Show::new(73739, "Lost", "/tv/Lost"))
    }

    #[test]
    fn test_known_airdate_hides_unknown_marker() {
        let date = NaiveDate::from_ymd_opt(2004, 9, 22).unwrap();
        let episode = Episode::new(show(), 1, 1, "/tv/Lost/Season 1/e1.mkv").with_airdate(date);
        assert_eq!(episode.known_airdate(), Some(date));

        let unknown = Episode::new(show(), 0, 1, "/tv/Lost/Specials/s1.mkv")
            .with_airdate(unknown_airdate());
        assert_eq!(unknown.known_airdate(), None);
        assert_eq!(unknown_airdate().to_string(), "0001-01-01");
    }

    #[test]
    fn test_worklist_starts_with_primary_episode() {
        let show = show();
        let episode = Episode::new(show.clone(), 1, 1, "/tv/Lost/Season 1/e1-e2.mkv")
            .with_related(Episode::new(show.clone(), 1, 2, "/tv/Lost/Season 1/e1-e2.mkv"))
            .with_related(Episode::new(show, 1, 3, "/tv/Lost/Season 1/e1-e2.mkv"));

        let numbers: Vec<u32> = episode.worklist().map(|e| e.episode).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
