use std::sync::Arc;

use clap::Parser;
use log::{debug, info, warn};

use geofix_logic::{LocateSettings, LocationView, Locator, UpdateSender, prelude::*};
use geofix_provider::{ConsentPolicy, HttpLocationSource};

#[derive(Parser)]
/// Locate this device once and report where it is
struct Cli {
    /// Answer the location permission prompt with a denial
    #[arg(long)]
    deny: bool,
    /// Seconds to wait for a position before giving up
    #[arg(long)]
    timeout: Option<u32>,
    /// Print the reading as JSON on stdout instead of a log line
    #[arg(long)]
    json: bool,
}

struct LogUpdates;

impl UpdateSender for LogUpdates {
    fn send_update(&self) {
        debug!("Location view updated");
    }
}

#[tokio::main]
async fn main() -> Result {
    colog::init();

    let cli = Cli::parse();

    let mut settings = LocateSettings::default();
    if let Some(timeout) = cli.timeout {
        settings.timeout_seconds = timeout;
    }

    let policy = if cli.deny {
        ConsentPolicy::Deny
    } else {
        ConsentPolicy::Grant
    };

    let source = Arc::new(HttpLocationSource::new(policy, &settings)?);
    let locator = Arc::new(Locator::new(source, settings));

    tokio::spawn({
        let locator = locator.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, cancelling the location request");
                locator.cancel();
            }
        }
    });

    let mut view = LocationView::new(locator, LogUpdates);
    view.activate().await;

    match view.last_location() {
        Some(location) if cli.json => {
            let encoded =
                serde_json::to_string(&location).context("Could not encode the reading")?;
            println!("{encoded}");
        }
        Some(location) => info!("You are at {}", location.coordinate),
        None => warn!("The device could not be located"),
    }

    Ok(())
}
