//! Local JSON puzzle file: `{"fen": "...", "moves": ["e2e4", ...]}`.

use super::{PuzzleSource, SourceError};
use crate::puzzle::Puzzle;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct PuzzleFile {
    fen: String,
    moves: Vec<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    rating: Option<u32>,
    #[serde(default)]
    themes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PuzzleSource for FileSource {
    fn fetch(&self) -> Result<Puzzle, SourceError> {
        let json = fs::read_to_string(&self.path)
            .map_err(|e| SourceError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        let data: PuzzleFile =
            serde_json::from_str(&json).map_err(|e| SourceError::InvalidFormat(e.to_string()))?;

        let mut puzzle = Puzzle::new(data.fen, data.moves.as_slice())?;
        puzzle.id = data.id;
        puzzle.rating = data.rating;
        puzzle.themes = data.themes;
        Ok(puzzle)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
