use std::io::Read;

use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use vivu_api::datetime::{is_date_time_string, DateTimeNormalizer, Payload, DEFAULT_MAX_DEPTH};

#[derive(Parser)]
#[command(name = "vivu-cli")]
#[command(about = "Client and date/time tooling for the Vivu booking API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Bearer token for authenticated routes.
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// List airports
    Airports,
    /// List airlines
    Airlines,
    /// Search flights
    Search {
        #[arg(long)]
        departure: Option<String>,
        #[arg(long)]
        arrival: Option<String>,
        /// Departure day, e.g. 2025-10-25
        #[arg(long)]
        date: Option<String>,
    },
    /// List the caller's bookings
    Bookings,
    /// Show how a JSON document (stdin) leaves the API
    Normalize {
        #[arg(long, value_enum, default_value_t = Direction::Roundtrip)]
        direction: Direction,
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Report whether each argument is accepted as an ISO-8601 date/time
    Check { values: Vec<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    /// Inbound pass only; date/times are printed in canonical form
    Inbound,
    /// Inbound then outbound, as a request body echoed in a response
    Roundtrip,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
    }

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/api/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Airports => {
            let res = client
                .get(format!("{}/api/flights/airports/list", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Airlines => {
            let res = client
                .get(format!("{}/api/flights/airlines/list", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Search {
            departure,
            arrival,
            date,
        } => {
            let query: Vec<(&str, String)> = [
                ("departure", departure),
                ("arrival", arrival),
                ("date", date),
            ]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();
            let res = client
                .get(format!("{}/api/flights/search", cli.url))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Bookings => {
            let res = client
                .get(format!("{}/api/bookings/user", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Normalize {
            direction,
            max_depth,
        } => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            let value: Value = serde_json::from_str(&input)?;

            let normalizer = DateTimeNormalizer::new(max_depth);
            let inbound = normalizer.normalize_inbound(Payload::from(value));
            let output = match direction {
                Direction::Inbound => serde_json::to_string_pretty(&inbound)?,
                Direction::Roundtrip => {
                    let wire = normalizer.to_json_vec(inbound)?;
                    serde_json::to_string_pretty(&serde_json::from_slice::<Value>(&wire)?)?
                }
            };
            println!("{output}");
        }
        Commands::Check { values } => {
            for value in values {
                let verdict = if is_date_time_string(&value) {
                    "date-time"
                } else {
                    "text"
                };
                println!("{verdict}\t{value}");
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
