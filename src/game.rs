//! Recorded games and corpus loading.
//!
//! A corpus is a JSON array of game objects as exported by the battle
//! runner:
//!
//! ```json
//! [{"lightPlayer":"mm4","darkPlayer":"mm6","winner":1,
//!   "boardHistory":[0,1,4100],"reserveSize":3}]
//! ```
//!
//! Unknown fields are ignored. A missing field or a winner other than
//! `1`/`-1` fails the whole load and reports the game's position.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors that can occur while loading a corpus.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("corpus is not a JSON array of games: {0}")]
    Json(#[source] serde_json::Error),

    #[error("malformed game at position {index}: {source}")]
    MalformedGame {
        index: usize,
        source: serde_json::Error,
    },
}

/// A winner value outside `{1, -1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("winner must be 1 (light) or -1 (dark), got {0}")]
pub struct InvalidWinner(pub i64);

/// The side that won a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Winner {
    Light,
    Dark,
}

impl Winner {
    /// `+1.0` for light, `-1.0` for dark.
    pub const fn sign(self) -> f64 {
        match self {
            Winner::Light => 1.0,
            Winner::Dark => -1.0,
        }
    }
}

impl TryFrom<i64> for Winner {
    type Error = InvalidWinner;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Winner::Light),
            -1 => Ok(Winner::Dark),
            other => Err(InvalidWinner(other)),
        }
    }
}

impl From<Winner> for i64 {
    fn from(w: Winner) -> i64 {
        match w {
            Winner::Light => 1,
            Winner::Dark => -1,
        }
    }
}

/// One completed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub light_player: String,
    pub dark_player: String,
    pub winner: Winner,
    /// Packed boards in chronological order.
    pub board_history: Vec<u64>,
    pub reserve_size: u32,
}

impl GameRecord {
    /// Number of recorded positions.
    pub fn len(&self) -> usize {
        self.board_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.board_history.is_empty()
    }
}

/// Parses a corpus from a JSON string.
pub fn parse_corpus(json: &str) -> Result<Vec<GameRecord>, CorpusError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json).map_err(CorpusError::Json)?;
    games_from_values(values)
}

/// Reads a corpus from any reader.
pub fn read_corpus<R: Read>(reader: R) -> Result<Vec<GameRecord>, CorpusError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_reader(reader).map_err(CorpusError::Json)?;
    games_from_values(values)
}

/// Loads a corpus from a JSON file.
pub fn load_corpus(path: &Path) -> Result<Vec<GameRecord>, CorpusError> {
    let file = File::open(path).map_err(|source| CorpusError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_corpus(BufReader::new(file))
}

/// Converts each element separately so a failure can name its position.
fn games_from_values(values: Vec<serde_json::Value>) -> Result<Vec<GameRecord>, CorpusError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, v)| {
            serde_json::from_value(v).map_err(|source| CorpusError::MalformedGame { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_GAMES: &str = r#"[
        {"lightPlayer":"mm4","darkPlayer":"mm6","winner":1,"boardHistory":[0,1,6],"reserveSize":3},
        {"lightPlayer":"mm6","darkPlayer":"mm4","winner":-1,"boardHistory":[],"reserveSize":0,
         "extra":"ignored"}
    ]"#;

    #[test]
    fn parses_valid_corpus() {
        let games = parse_corpus(TWO_GAMES).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].light_player, "mm4");
        assert_eq!(games[0].dark_player, "mm6");
        assert_eq!(games[0].winner, Winner::Light);
        assert_eq!(games[0].board_history, vec![0, 1, 6]);
        assert_eq!(games[0].reserve_size, 3);
        assert_eq!(games[1].winner, Winner::Dark);
        assert!(games[1].is_empty());
    }

    #[test]
    fn missing_field_reports_position() {
        let json = r#"[
            {"lightPlayer":"a","darkPlayer":"b","winner":1,"boardHistory":[0],"reserveSize":1},
            {"lightPlayer":"a","winner":1,"boardHistory":[0],"reserveSize":1}
        ]"#;
        match parse_corpus(json) {
            Err(CorpusError::MalformedGame { index, source }) => {
                assert_eq!(index, 1);
                assert!(source.to_string().contains("darkPlayer"), "{}", source);
            }
            other => panic!("expected MalformedGame, got {:?}", other),
        }
    }

    #[test]
    fn invalid_winner_is_malformed() {
        let json = r#"[{"lightPlayer":"a","darkPlayer":"b","winner":0,"boardHistory":[],"reserveSize":1}]"#;
        match parse_corpus(json) {
            Err(CorpusError::MalformedGame { index, source }) => {
                assert_eq!(index, 0);
                assert!(source.to_string().contains("winner must be"), "{}", source);
            }
            other => panic!("expected MalformedGame, got {:?}", other),
        }
    }

    #[test]
    fn non_array_is_rejected() {
        assert!(matches!(parse_corpus("{}"), Err(CorpusError::Json(_))));
    }

    #[test]
    fn serialize_roundtrip() {
        let games = parse_corpus(TWO_GAMES).unwrap();
        let json = serde_json::to_string(&games).unwrap();
        assert!(json.contains("\"lightPlayer\":\"mm4\""));
        assert!(json.contains("\"winner\":-1"));
        assert_eq!(parse_corpus(&json).unwrap(), games);
    }

    #[test]
    fn read_corpus_from_reader() {
        let games = read_corpus(TWO_GAMES.as_bytes()).unwrap();
        assert_eq!(games.len(), 2);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_corpus(Path::new("/nonexistent/corpus.json")).unwrap_err();
        assert!(matches!(err, CorpusError::Io { .. }));
    }

    #[test]
    fn winner_sign() {
        assert_eq!(Winner::Light.sign(), 1.0);
        assert_eq!(Winner::Dark.sign(), -1.0);
        assert_eq!(Winner::try_from(2i64), Err(InvalidWinner(2)));
    }
}
