use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::searches::{self, SearchParam};

pub static DEFAULT_BASE_URL: &str = "http://homeworktask.infare.lt";
static SEARCH_LOCATION: &str = "search.php";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("got {status} response: {body}")]
    BadStatus { status: StatusCode, body: String },
    #[error("could not decode search reply: {source}; raw response: {body}")]
    BadReply {
        source: serde_json::Error,
        body: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Direction {
    #[serde(rename = "I")]
    Outbound,
    #[serde(rename = "V")]
    Inbound,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub company_code: String,
    pub number: String,
    #[serde(rename = "airportDeparture", deserialize_with = "airport_code")]
    pub departure_code: String,
    #[serde(rename = "airportArrival", deserialize_with = "airport_code")]
    pub arrival_code: String,
    pub date_departure: String,
    pub date_arrival: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub recommendation_id: i64,
    pub direction: Direction,
    #[serde(rename = "importTaxAdl")]
    pub import_tax: f64,
    pub cabin_class: String,
    pub flights: Vec<Flight>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub recommendation_id: i64,
    pub total: f64,
}

#[derive(Deserialize)]
struct SearchReply {
    body: ReplyBody,
}

#[derive(Deserialize)]
struct ReplyBody {
    data: ReplyData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyData {
    journeys: Vec<Journey>,
    total_availabilities: Vec<Availability>,
}

// The reply nests airports as objects; only their code matters here.
fn airport_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Airport {
        code: String,
    }

    Ok(Airport::deserialize(deserializer)?.code)
}

pub async fn fetch_search(
    client: &Client,
    base_url: &str,
    search: &SearchParam,
) -> Result<(Vec<Journey>, Vec<Availability>), FetchError> {
    let request = client
        .get(format!("{}/{}", base_url, SEARCH_LOCATION))
        .query(&[
            ("from", search.from.clone()),
            ("to", search.to.clone()),
            ("depart", searches::format_date(search.date_departure)),
            ("return", searches::format_date(search.date_arrival)),
        ]);

    debug!("Prepared request: {:?}", request);

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if status.is_client_error() || status.is_server_error() {
        return Err(FetchError::BadStatus { status, body });
    }
    debug!("Got {} response", status);

    parse_reply(&body)
}

pub fn parse_reply(body: &str) -> Result<(Vec<Journey>, Vec<Availability>), FetchError> {
    let reply: SearchReply =
        serde_json::from_str(body).map_err(|source| FetchError::BadReply {
            source,
            body: body.to_string(),
        })?;

    let data = reply.body.data;
    Ok((data.journeys, data.total_availabilities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::{Matcher, Mock, ServerGuard};

    static REPLY: &str = include_str!("test_resources/search_reply.json");

    fn search() -> SearchParam {
        SearchParam {
            from: "CPH".to_string(),
            to: "LHR".to_string(),
            date_departure: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            date_arrival: NaiveDate::from_ymd_opt(2026, 9, 17).unwrap(),
            filter: String::new(),
        }
    }

    fn search_mock(server: &mut ServerGuard) -> Mock {
        server
            .mock("GET", "/search.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("from".into(), "CPH".into()),
                Matcher::UrlEncoded("to".into(), "LHR".into()),
                Matcher::UrlEncoded("depart".into(), "2026-09-10".into()),
                Matcher::UrlEncoded("return".into(), "2026-09-17".into()),
            ]))
            .with_header("content-type", "application/json")
    }

    #[tokio::test]
    async fn test_fetch_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = search_mock(&mut server)
            .with_status(200)
            .with_body(REPLY)
            .create_async()
            .await;

        let (journeys, availabilities) =
            fetch_search(&Client::new(), &server.url(), &search())
                .await
                .unwrap();

        mock.assert_async().await;

        assert_eq!(journeys.len(), 4);
        assert_eq!(
            journeys[0],
            Journey {
                recommendation_id: 1,
                direction: Direction::Outbound,
                import_tax: 30.03,
                cabin_class: "Economy".to_string(),
                flights: vec![Flight {
                    company_code: "SK".to_string(),
                    number: "501".to_string(),
                    departure_code: "CPH".to_string(),
                    arrival_code: "LHR".to_string(),
                    date_departure: "2026-09-10 07:55".to_string(),
                    date_arrival: "2026-09-10 08:10".to_string(),
                }],
            }
        );
        assert_eq!(journeys[1].direction, Direction::Inbound);
        assert_eq!(journeys[2].flights.len(), 2);
        assert_eq!(journeys[2].flights[1].departure_code, "FRA");
        assert_eq!(journeys[3].flights[1].arrival_code, "CPH");

        assert_eq!(
            availabilities,
            vec![
                Availability {
                    recommendation_id: 1,
                    total: 500.0,
                },
                Availability {
                    recommendation_id: 2,
                    total: 420.5,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_search_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = search_mock(&mut server)
            .with_status(500)
            .with_body("server crashed")
            .create_async()
            .await;

        match fetch_search(&Client::new(), &server.url(), &search()).await {
            Err(FetchError::BadStatus { status, body }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "server crashed");
            }
            other => panic!(
                "fetch_search returned {:?}, it should return FetchError::BadStatus!",
                other
            ),
        }
    }

    #[tokio::test]
    async fn test_fetch_search_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = search_mock(&mut server)
            .with_status(404)
            .with_body("never existed")
            .create_async()
            .await;

        match fetch_search(&Client::new(), &server.url(), &search()).await {
            Err(FetchError::BadStatus { status, .. }) => {
                assert_eq!(status, StatusCode::NOT_FOUND)
            }
            other => panic!(
                "fetch_search returned {:?}, it should return FetchError::BadStatus!",
                other
            ),
        }
    }

    #[tokio::test]
    async fn test_fetch_search_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = search_mock(&mut server)
            .with_status(200)
            .with_body("not a json")
            .create_async()
            .await;

        match fetch_search(&Client::new(), &server.url(), &search()).await {
            Err(FetchError::BadReply { body, .. }) => assert_eq!(body, "not a json"),
            other => panic!(
                "fetch_search returned {:?}, it should return FetchError::BadReply!",
                other
            ),
        }
    }

    #[test]
    fn test_parse_reply_unknown_direction() {
        let body = r#"{"body": {"data": {"journeys": [
            {"recommendationId": 9, "direction": "X", "importTaxAdl": 1.5,
             "cabinClass": "Economy", "flights": []}
        ], "totalAvailabilities": []}}}"#;

        let (journeys, _) = parse_reply(body).unwrap();

        assert_eq!(journeys[0].direction, Direction::Unknown);
    }

    #[test]
    fn test_parse_reply_missing_sections() -> Result<(), String> {
        match parse_reply("{}") {
            Err(FetchError::BadReply { body, .. }) => {
                assert_eq!(body, "{}");
                Ok(())
            }
            other => Err(format!(
                "parse_reply returned {:?}, it should return FetchError::BadReply!",
                other
            )),
        }
    }
}
