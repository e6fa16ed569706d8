//! Remote events service: the data source when no local file is given.
//!
//! One GET per call; no retries and no token acquisition.

use anyhow::{Context, Result, bail};
use cashflow_core::EventKind;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::config::ApiSection;

/// `GET {base_url}/events[?type=...]`, returning the raw JSON body.
pub async fn fetch_events_payload(api: &ApiSection, kind: Option<EventKind>) -> Result<String> {
    let url = events_url(&api.base_url, kind);
    tracing::info!(%url, "fetching events");
    let body = get_authorized(api, &url).await?;
    Ok(body.unwrap_or_else(|| r#"{"events":[]}"#.to_string()))
}

/// Starting balance from `GET {base_url}/users/profile`. `None` when the
/// profile has no `initialMoney`.
pub async fn fetch_profile_initial_money(api: &ApiSection) -> Result<Option<f64>> {
    let url = format!("{}/users/profile", api.base_url.trim_end_matches('/'));
    tracing::info!(%url, "fetching profile");
    match get_authorized(api, &url).await? {
        Some(body) => initial_money_from_profile(&body),
        None => Ok(None),
    }
}

/// Bearer GET. `Ok(None)` on 204, the body on any other success.
async fn get_authorized(api: &ApiSection, url: &str) -> Result<Option<String>> {
    let token = api
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .context("no API token configured (set [api].token in config.toml or run `cashflow setup`)")?;

    let resp = reqwest::Client::new()
        .get(url)
        .bearer_auth(token)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = resp.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let body = resp.text().await.with_context(|| format!("reading body of {url}"))?;
    if !status.is_success() {
        bail!("{url} returned {status}: {}", error_message(&body));
    }
    Ok(Some(body))
}

/// `initialMoney` from a `{"user": {...}}` envelope or a bare user object.
fn initial_money_from_profile(body: &str) -> Result<Option<f64>> {
    let json: Value = serde_json::from_str(body).context("profile response is not JSON")?;
    let user = json.get("user").unwrap_or(&json);
    match user.get("initialMoney") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map(Some)
            .with_context(|| format!("profile initialMoney out of range: {n}")),
        Some(other) => bail!("profile initialMoney must be a number, got {other}"),
    }
}

fn events_url(base_url: &str, kind: Option<EventKind>) -> String {
    let mut url = format!("{}/events", base_url.trim_end_matches('/'));
    if let Some(kind) = kind {
        url.push_str("?type=");
        url.push_str(kind.as_str());
    }
    url
}

/// Best human-readable message from an error body: `message`, plus
/// `errors[]` or `error` when the service sends them.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().chars().take(200).collect();
    };

    let mut msg = json
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();

    let details: Vec<&str> = json
        .get("errors")
        .and_then(Value::as_array)
        .map(|errs| errs.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if !details.is_empty() {
        msg.push_str(": ");
        msg.push_str(&details.join(", "));
    } else if let Some(err) = json.get("error").and_then(Value::as_str) {
        msg.push_str(": ");
        msg.push_str(err);
    }
    msg
}
