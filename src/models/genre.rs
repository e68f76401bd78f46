use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// The closed set of genres the predictor may choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Fantasy,
    Science,
    Crime,
    History,
    Horror,
    Thriller,
    Psychology,
    Romance,
    Sports,
    Travel,
}

impl Genre {
    pub const ALL: [Genre; 10] = [
        Genre::Fantasy,
        Genre::Science,
        Genre::Crime,
        Genre::History,
        Genre::Horror,
        Genre::Thriller,
        Genre::Psychology,
        Genre::Romance,
        Genre::Sports,
        Genre::Travel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fantasy => "fantasy",
            Genre::Science => "science",
            Genre::Crime => "crime",
            Genre::History => "history",
            Genre::Horror => "horror",
            Genre::Thriller => "thriller",
            Genre::Psychology => "psychology",
            Genre::Romance => "romance",
            Genre::Sports => "sports",
            Genre::Travel => "travel",
        }
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown genre: {0}")]
pub struct UnknownGenre(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Genre::ALL
            .into_iter()
            .find(|genre| genre.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}
