use std::path::PathBuf;
use std::process;

use log::{debug, error, info};
use prettytable::{format, row, Table};
use reqwest::Client;
use structopt::StructOpt;

mod flights;
mod report;
mod roundtrips;
mod searches;

use flights::Journey;
use report::FareTable;
use roundtrips::{LogSink, Roundtrip};

#[derive(StructOpt, Debug)]
#[structopt(name = "farescan")]
struct Opt {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,

    /// File with the search requests to run
    #[structopt(short, long, default_value = "Searches.csv", parse(from_os_str))]
    searches: PathBuf,

    /// Where every assembled roundtrip gets written
    #[structopt(long, default_value = "data/all_trips.csv", parse(from_os_str))]
    all_out: PathBuf,

    /// Where the cheapest roundtrip per route gets written
    #[structopt(long, default_value = "data/cheapest_trips.csv", parse(from_os_str))]
    cheapest_out: PathBuf,

    /// Base URL of the flight search endpoint
    #[structopt(long, default_value = flights::DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Debug)]
struct RouteSummary {
    from: String,
    to: String,
    price: f64,
    taxes: f64,
    flights: String,
}

impl RouteSummary {
    fn new(trip: &Roundtrip) -> RouteSummary {
        RouteSummary {
            from: trip.outbound.flights[0].departure_code.clone(),
            to: trip.inbound.flights[0].departure_code.clone(),
            price: trip.cost(),
            taxes: trip.outbound.import_tax + trip.inbound.import_tax,
            flights: format!(
                "{} / {}",
                flight_numbers(trip.outbound),
                flight_numbers(trip.inbound)
            ),
        }
    }
}

fn flight_numbers(journey: &Journey) -> String {
    journey
        .flights
        .iter()
        .map(|flight| format!("{}{}", flight.company_code, flight.number))
        .collect::<Vec<String>>()
        .join(" ")
}

#[tokio::main]
async fn main() {
    let opt = Opt::from_args();
    setup_logging(opt.verbose);

    debug!("Parsed opts: {:#?}", opt);

    let searches = match searches::read_searches(&opt.searches) {
        Ok(res) => res,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    if searches.is_empty() {
        println!("The searches file has no requests, nothing to do.");
        return;
    }

    let client = Client::new();
    let mut all_trips = FareTable::new();
    let mut cheapest_trips = FareTable::new();
    let mut summaries = Vec::new();
    let mut sink = LogSink;

    // One search request is fully resolved before the next begins.
    for search in &searches {
        info!(
            "Searching {} -> {} ({} - {})",
            search.from, search.to, search.date_departure, search.date_arrival
        );

        let (journeys, availabilities) =
            match flights::fetch_search(&client, &opt.base_url, search).await {
                Ok(res) => res,
                Err(err) => {
                    error!("Skipping search {} -> {}: {}", search.from, search.to, err);
                    continue;
                }
            };

        let groups = roundtrips::group_journeys(journeys, &search.filter);
        let trips = roundtrips::assemble_roundtrips(&groups, &availabilities, &mut sink);
        let cheapest = roundtrips::select_cheapest(&trips);

        info!(
            "{} -> {}: {} roundtrips over {} routes",
            search.from,
            search.to,
            trips.len(),
            cheapest.len()
        );

        all_trips.append(&trips);
        cheapest_trips.append(&cheapest);
        summaries.extend(cheapest.iter().map(RouteSummary::new));
    }

    for (table, path) in [
        (&all_trips, &opt.all_out),
        (&cheapest_trips, &opt.cheapest_out),
    ] {
        match table.write_csv(path) {
            Ok(()) => info!("Wrote {} rows to {}", table.len(), path.display()),
            Err(err) => error!("{}", err),
        }
    }

    if summaries.is_empty() {
        println!("No roundtrip could be assembled for any search :(");
    } else {
        format_results(summaries).printstd();
    }
}

fn format_results(mut summaries: Vec<RouteSummary>) -> Table {
    summaries.sort_by(|a, b| a.price.total_cmp(&b.price));

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["Route", "Price", "Taxes", "Flights"]);

    for summary in summaries.iter() {
        table.add_row(row![
            format!("{} - {}", summary.from, summary.to),
            summary.price,
            summary.taxes,
            summary.flights
        ]);
    }
    table
}

fn setup_logging(level: usize) {
    stderrlog::new()
        .module(module_path!())
        .verbosity(level)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}
