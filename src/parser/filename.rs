use crate::models::EpisodeIdentity;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Free-text recognition rules for feed titles, in priority order.
///
/// The first rule whose pattern matches decides the outcome. A rule that
/// matches but cannot produce both a season and an episode number fails the
/// whole parse instead of falling through to the next rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRule {
    /// `Show Name 2x10 anything`
    SeasonByEpisode,
    /// `Show Name - Description 4x12 anything`
    DescribedSeasonByEpisode,
}

impl TitleRule {
    pub const ALL: [Self; 2] = [Self::SeasonByEpisode, Self::DescribedSeasonByEpisode];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SeasonByEpisode => "season_by_episode",
            Self::DescribedSeasonByEpisode => "described_season_by_episode",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::SeasonByEpisode => {
                static RE: OnceLock<Regex> = OnceLock::new();
                get_regex(
                    &RE,
                    r"^(?P<show>[a-zA-Z0-9\s.]+[ -]*) (?P<season>\d+)x(?P<episode>\d+)",
                )
            }
            Self::DescribedSeasonByEpisode => {
                static RE: OnceLock<Regex> = OnceLock::new();
                get_regex(
                    &RE,
                    r"^(?P<show>[a-zA-Z0-9\s.]+) - (?P<description>[a-zA-Z0-9\s]+) (?P<season>\d+)x(?P<episode>\d+)",
                )
            }
        }
    }

    fn matches<'t>(self, title: &'t str) -> Option<Captures<'t>> {
        self.regex().captures(title)
    }

    fn extract(self, caps: &Captures) -> Option<EpisodeIdentity> {
        let show_name = caps.name("show")?.as_str().to_string();
        let season = caps.name("season")?.as_str().parse().ok()?;
        let episode = caps.name("episode")?.as_str().parse().ok()?;
        let description = match self {
            Self::SeasonByEpisode => None,
            Self::DescribedSeasonByEpisode => caps
                .name("description")
                .map(|m| m.as_str().to_string()),
        };

        Some(EpisodeIdentity {
            show_name,
            season,
            episode,
            description,
        })
    }
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

/// Parses a feed title whose show name is not known in advance.
///
/// Returns the identity and the rule that produced it, or `None` when the
/// title is unparsable. Surrounding whitespace and anything after the
/// episode number are ignored.
#[must_use]
pub fn parse_title_with_rule(title: &str) -> Option<(EpisodeIdentity, TitleRule)> {
    let title = title.trim();
    for rule in TitleRule::ALL {
        if let Some(caps) = rule.matches(title) {
            return rule.extract(&caps).map(|identity| (identity, rule));
        }
    }
    None
}

#[must_use]
pub fn parse_title(title: &str) -> Option<EpisodeIdentity> {
    parse_title_with_rule(title).map(|(identity, _)| identity)
}

/// Recognises the library naming convention for one known show:
/// `<show> - Season <n> - Episode <n> - <title>.<ext>`.
#[derive(Debug, Clone)]
pub struct ShowFilePattern {
    show_name: String,
    re: Regex,
}

/// A filename matched by [`ShowFilePattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileMatch {
    pub season: u32,
    pub episode: u32,
    pub title: String,
}

impl ShowFilePattern {
    /// Builds the matcher for `show_name`. The name is matched literally.
    ///
    /// # Errors
    /// Returns an error if the resulting expression exceeds the regex size limit.
    pub fn new(show_name: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"^{} - Season (?P<season>\d+) - Episode (?P<episode>\d+) - (?P<title>.*)\.[a-zA-Z]{{2,}}$",
            regex::escape(show_name)
        );

        Ok(Self {
            show_name: show_name.to_string(),
            re: Regex::new(&pattern)?,
        })
    }

    #[must_use]
    pub fn show_name(&self) -> &str {
        &self.show_name
    }

    #[must_use]
    pub fn parse(&self, filename: &str) -> Option<LocalFileMatch> {
        let caps = self.re.captures(filename)?;

        Some(LocalFileMatch {
            season: caps.name("season")?.as_str().parse().ok()?,
            episode: caps.name("episode")?.as_str().parse().ok()?,
            title: caps.name("title")?.as_str().to_string(),
        })
    }
}

/// Parses a `Season <n>` folder name into its season number. Text after the
/// number, such as a year, is ignored.
#[must_use]
pub fn parse_season_folder(name: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"^Season (?P<season>\d+)\b");

    re.captures(name)?.name("season")?.as_str().parse().ok()
}
