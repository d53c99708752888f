use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;

const REQUEST_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = concat!("liga_predict/", env!("CARGO_PKG_VERSION"));
const API_SPORTS_HOST: &str = "v3.football.api-sports.io";

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client; the request timeout lives here, not in the engine.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

/// GET against the api-sports v3 host with the account key; returns the raw body.
pub fn api_sports_get(path: &str, api_key: &str, query: &[(&str, String)]) -> Result<String> {
    let url = format!("https://{API_SPORTS_HOST}/{}", path.trim_start_matches('/'));
    let resp = http_client()?
        .get(&url)
        .query(query)
        .header("x-rapidapi-key", api_key)
        .header("x-rapidapi-host", API_SPORTS_HOST)
        .send()
        .with_context(|| format!("request to {url} failed"))?;
    let status = resp.status();
    let body = resp.text().with_context(|| format!("failed reading body of {url}"))?;
    body_or_error(status, body)
}

fn body_or_error(status: StatusCode, body: String) -> Result<String> {
    if status.is_success() {
        return Ok(body);
    }
    let snippet: String = body.chars().take(200).collect();
    Err(anyhow!("http {status}: {snippet}"))
}
