use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::flights::Journey;
use crate::roundtrips::Roundtrip;

pub static HEADER: [&str; 22] = [
    "Price",
    "Taxes",
    "outbound 1 airport departure",
    "outbound 1 airport arrival",
    "outbound 1 time departure",
    "outbound 1 time arrival",
    "outbound 1 flight number",
    "outbound 2 airport departure",
    "outbound 2 airport arrival",
    "outbound 2 time departure",
    "outbound 2 time arrival",
    "outbound 2 flight number",
    "inbound 1 airport departure",
    "inbound 1 airport arrival",
    "inbound 1 time departure",
    "inbound 1 time arrival",
    "inbound 1 flight number",
    "inbound 2 airport departure",
    "inbound 2 airport arrival",
    "inbound 2 time departure",
    "inbound 2 time arrival",
    "inbound 2 flight number",
];

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("could not write table to {path}: {source}")]
    Write { path: String, source: csv::Error },
}

/// Projected roundtrip rows accumulated across all search requests,
/// persisted once at the end of the batch.
#[derive(Debug, Default)]
pub struct FareTable {
    rows: Vec<Vec<String>>,
}

impl FareTable {
    pub fn new() -> FareTable {
        FareTable::default()
    }

    pub fn append(&mut self, roundtrips: &[Roundtrip]) {
        for trip in roundtrips {
            self.rows.push(project_row(trip));
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), OutputError> {
        self.try_write(path).map_err(|source| OutputError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    fn try_write(&self, path: &Path) -> Result<(), csv::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(HEADER)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub fn project_row(trip: &Roundtrip) -> Vec<String> {
    let mut row = Vec::with_capacity(HEADER.len());
    row.push(format_amount(trip.availability.total));
    row.push(format_amount(
        trip.outbound.import_tax + trip.inbound.import_tax,
    ));
    push_legs(&mut row, trip.outbound);
    push_legs(&mut row, trip.inbound);
    row
}

// Exactly two 5-field leg slots per direction; a missing second leg
// stays blank so the columns always line up.
fn push_legs(row: &mut Vec<String>, journey: &Journey) {
    for slot in 0..2 {
        match journey.flights.get(slot) {
            Some(flight) => {
                row.push(flight.departure_code.clone());
                row.push(flight.arrival_code.clone());
                row.push(flight.date_departure.clone());
                row.push(flight.date_arrival.clone());
                row.push(format!("{}{}", flight.company_code, flight.number));
            }
            None => row.extend(std::iter::repeat(String::new()).take(5)),
        }
    }
}

fn format_amount(amount: f64) -> String {
    amount.to_string()
}
