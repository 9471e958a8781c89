// Static team -> division reference data, loaded once per session.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DivisionsError {
    #[error("failed to read division file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("division file {path} contains no teams")]
    Empty { path: String },
}

/// One row of the divisions CSV (`Team_Abv,Conference,Division`).
#[derive(Debug, Deserialize)]
struct DivisionRow {
    #[serde(rename = "Team_Abv")]
    team_abv: String,
    #[serde(rename = "Conference")]
    conference: String,
    #[serde(rename = "Division")]
    division: String,
}

/// Immutable lookup from team abbreviation to its division key
/// (conference + division, e.g. "AFC West").
#[derive(Debug, Clone, Default)]
pub struct DivisionIndex {
    by_team: HashMap<String, String>,
}

impl DivisionIndex {
    /// Load the index from a CSV file with `Team_Abv,Conference,Division`
    /// columns (the same shape the reference data ships in).
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DivisionsError> {
        let path_str = path.as_ref().display().to_string();
        let file = std::fs::File::open(&path).map_err(|e| DivisionsError::Io {
            path: path_str.clone(),
            source: e,
        })?;

        let mut reader = csv::Reader::from_reader(file);
        let mut by_team = HashMap::new();
        for row in reader.deserialize::<DivisionRow>() {
            let row = row.map_err(|e| DivisionsError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            by_team.insert(
                row.team_abv,
                format!("{} {}", row.conference, row.division),
            );
        }

        if by_team.is_empty() {
            return Err(DivisionsError::Empty { path: path_str });
        }

        Ok(DivisionIndex { by_team })
    }

    /// Build an index from (team, division key) pairs.
    pub fn from_pairs<I, S, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: Into<String>,
        D: Into<String>,
    {
        DivisionIndex {
            by_team: pairs
                .into_iter()
                .map(|(team, div)| (team.into(), div.into()))
                .collect(),
        }
    }

    /// The division key for a team, or None if the team is not on record.
    pub fn division_of(&self, team: &str) -> Option<&str> {
        self.by_team.get(team).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_team.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_team.is_empty()
    }
}
