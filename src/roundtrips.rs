use std::collections::HashMap;
use std::fmt;

use log::warn;

use crate::flights::{Availability, Direction, Journey};

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    MissingAvailability { recommendation_id: i64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Diagnostic::MissingAvailability { recommendation_id } => {
                write!(f, "no availability for recommendation {}", recommendation_id)
            }
        }
    }
}

pub trait DiagnosticSink {
    fn record(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

// Sink used by the batch run; assembly itself stays free of logging.
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
    }
}

#[derive(Debug)]
pub struct RecommendationGroup {
    pub recommendation_id: i64,
    pub outbound: Vec<Journey>,
    pub inbound: Vec<Journey>,
}

impl RecommendationGroup {
    fn new(recommendation_id: i64) -> RecommendationGroup {
        RecommendationGroup {
            recommendation_id,
            outbound: Vec::new(),
            inbound: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roundtrip<'a> {
    pub availability: &'a Availability,
    pub outbound: &'a Journey,
    pub inbound: &'a Journey,
}

impl<'a> Roundtrip<'a> {
    pub fn cost(&self) -> f64 {
        self.availability.total + self.outbound.import_tax + self.inbound.import_tax
    }
}

fn admitted(journey: &Journey, connection_filter: &str) -> bool {
    // Direct legs always pass; two legs must connect through the requested
    // airport when one is set; anything longer is dropped.
    match journey.flights.len() {
        1 => true,
        2 => {
            connection_filter.is_empty()
                || journey.flights[1].departure_code == connection_filter
        }
        _ => false,
    }
}

pub fn group_journeys(journeys: Vec<Journey>, connection_filter: &str) -> Vec<RecommendationGroup> {
    let mut groups: Vec<RecommendationGroup> = Vec::new();
    let mut slots: HashMap<i64, usize> = HashMap::new();

    for journey in journeys {
        if !admitted(&journey, connection_filter) {
            continue;
        }
        let slot = *slots.entry(journey.recommendation_id).or_insert_with(|| {
            groups.push(RecommendationGroup::new(journey.recommendation_id));
            groups.len() - 1
        });
        match journey.direction {
            Direction::Outbound => groups[slot].outbound.push(journey),
            Direction::Inbound => groups[slot].inbound.push(journey),
            Direction::Unknown => {}
        }
    }

    groups
}

pub fn assemble_roundtrips<'a>(
    groups: &'a [RecommendationGroup],
    availabilities: &'a [Availability],
    diagnostics: &mut dyn DiagnosticSink,
) -> Vec<Roundtrip<'a>> {
    let priced = availability_index(availabilities);
    let mut roundtrips = Vec::new();

    for group in groups {
        for outbound in &group.outbound {
            for inbound in &group.inbound {
                match priced.get(&outbound.recommendation_id) {
                    Some(&availability) => roundtrips.push(Roundtrip {
                        availability,
                        outbound,
                        inbound,
                    }),
                    None => diagnostics.record(Diagnostic::MissingAvailability {
                        recommendation_id: outbound.recommendation_id,
                    }),
                }
            }
        }
    }

    roundtrips
}

// First entry wins when an id repeats.
fn availability_index(availabilities: &[Availability]) -> HashMap<i64, &Availability> {
    let mut index = HashMap::new();
    for availability in availabilities {
        index
            .entry(availability.recommendation_id)
            .or_insert(availability);
    }
    index
}

pub fn select_cheapest<'a>(roundtrips: &[Roundtrip<'a>]) -> Vec<Roundtrip<'a>> {
    let mut winners: Vec<Roundtrip<'a>> = Vec::new();
    let mut slots: HashMap<(&str, &str), usize> = HashMap::new();

    for candidate in roundtrips {
        let key = (
            candidate.outbound.flights[0].departure_code.as_str(),
            candidate.inbound.flights[0].departure_code.as_str(),
        );
        match slots.get(&key) {
            None => {
                slots.insert(key, winners.len());
                winners.push(*candidate);
            }
            // Strictly lower only, so the first seen keeps ties.
            Some(&slot) => {
                if candidate.cost() < winners[slot].cost() {
                    winners[slot] = *candidate;
                }
            }
        }
    }

    winners
}
