mod config;
mod contests;
mod countdown;
mod init;
mod render;

use std::sync::Arc;

use config::Config;
use contests::catalog::ContestCatalog;
use contests::feed::{self, FeedSource};
use countdown::clock::{Clock, SystemClock};
use countdown::formatter::TimerFormat;
use countdown::ticker::{CountdownSource, Ticker};
use init::init_logger;
use render::ConsoleSink;
use tokio::time::sleep;

type Error = Box<dyn std::error::Error + Send + Sync>;

async fn interval(
    catalog: Arc<ContestCatalog>,
    source: FeedSource,
    period: std::time::Duration,
    clock: Arc<dyn Clock>,
) {
    loop {
        match feed::refresh(&catalog, &source).await {
            Ok(_) => {
                let now = clock.now();
                let ongoing = render::contest_list("current contests", &catalog.ongoing(now));
                let upcoming = render::contest_list("upcoming contests", &catalog.upcoming(now));
                log::info!("\n{}\n{}", ongoing, upcoming);
            }
            Err(e) => log::warn!("catalog {:?}, retrying in {:?}: {}", catalog.status(), period, e),
        }
        sleep(period).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_logger(config.log_level, config.log_file.as_deref())?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let catalog = Arc::new(ContestCatalog::new());

    let refresher = config
        .feed
        .clone()
        .map(|source| {
            tokio::spawn(interval(catalog.clone(), source, config.refresh, clock.clone()))
        });

    let source = match config.target {
        Some(target) => {
            log::info!("counting down to {}", target);
            CountdownSource::Target(target)
        }
        None => CountdownSource::NextContest(catalog.clone()),
    };

    let sink = Arc::new(ConsoleSink::new(TimerFormat {
        show_seconds: config.show_seconds,
    }));
    let mut ticker = Ticker::new();
    ticker.start(config.tick, source, clock, sink)?;
    log::info!("countdown started");

    tokio::signal::ctrl_c().await?;
    if ticker.is_running() {
        ticker.stop();
    }
    if let Some(refresher) = refresher {
        refresher.abort();
    }
    println!();
    log::info!("countdown stopped");
    Ok(())
}
