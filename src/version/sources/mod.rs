//! HTTP implementations of the version and package sources

pub mod fetcher;
pub mod poller;

pub use fetcher::HttpPackageFetcher;
pub use poller::HttpVersionPoller;

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

fn client_builder() -> ClientBuilder {
    Client::builder().user_agent(concat!("models-loader/", env!("CARGO_PKG_VERSION")))
}

/// Build the client used to poll version endpoints.
///
/// Every request is bounded by `timeout` so an unresponsive endpoint cannot
/// stall the run.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    client_builder().timeout(timeout).build()
}

/// Build the client used to download packages.
///
/// `timeout` bounds connecting and each wait for body data, not the whole
/// transfer, so a large package that keeps arriving is never cut off.
pub fn build_download_client(timeout: Duration) -> reqwest::Result<Client> {
    client_builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()
}
