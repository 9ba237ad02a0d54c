use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

// One format for the searches file and the remote query string.
pub static DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum SearchesError {
    #[error("could not open searches file {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid search row: {0}")]
    Row(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchParam {
    pub from: String,
    pub to: String,
    #[serde(with = "csv_date")]
    pub date_departure: NaiveDate,
    #[serde(with = "csv_date")]
    pub date_arrival: NaiveDate,
    #[serde(default)]
    pub filter: String,
}

pub mod csv_date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, super::DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

pub fn read_searches(path: &Path) -> Result<Vec<SearchParam>, SearchesError> {
    let file = File::open(path).map_err(|source| SearchesError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let mut searches = Vec::new();
    for row in reader.deserialize() {
        searches.push(row?);
    }
    Ok(searches)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
