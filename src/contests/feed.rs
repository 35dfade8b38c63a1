use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use super::catalog::ContestCatalog;
use super::contest_type::Contest;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("could not read feed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("feed is not a contest list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where the contest list comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedSource {
    Http(Url),
    File(PathBuf),
}

impl FeedSource {
    pub async fn fetch(&self) -> Result<Vec<Contest>, FeedError> {
        let body = match self {
            FeedSource::Http(url) => {
                log::info!("Get Contests: {}", url);
                let response = reqwest::get(url.clone()).await?;
                if !response.status().is_success() {
                    return Err(FeedError::Status(response.status()));
                }
                response.text().await?
            }
            FeedSource::File(path) => {
                log::info!("Read Contests: {}", path.display());
                tokio::fs::read_to_string(path).await?
            }
        };
        decode(&body)
    }
}

pub fn decode(body: &str) -> Result<Vec<Contest>, FeedError> {
    Ok(serde_json::from_str(body)?)
}

/// One refresh cycle: `Loading`, then `Loaded` with the new records or `LoadFailed`.
pub async fn refresh(catalog: &ContestCatalog, source: &FeedSource) -> Result<usize, FeedError> {
    catalog.begin_refresh();
    match source.fetch().await {
        Ok(contests) => {
            let count = contests.len();
            catalog.replace_all(contests);
            log::info!("contests loaded: {}", count);
            Ok(count)
        }
        Err(e) => {
            catalog.mark_failed(&e.to_string());
            Err(e)
        }
    }
}
