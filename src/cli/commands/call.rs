//! Raw API call command.

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tokio_util::sync::CancellationToken;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::api::{Client, Payload};

#[derive(Args, Debug)]
pub struct CallArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,
    /// Path relative to the API base URL, e.g. /zones?per_page=5
    pub path: String,
    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,
    /// Extra header (format: "name: value"), may be repeated
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct CallOutput {
    pub method: String,
    pub path: String,
    pub body: serde_json::Value,
}

impl CommandOutput for CallOutput {
    fn to_human(&self) -> String {
        match &self.body {
            serde_json::Value::String(text) => text.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_default(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        self.body.clone()
    }
}

pub async fn execute(
    args: CallArgs,
    client: &Client,
    cancel: &CancellationToken,
    json_mode: bool,
) -> Result<()> {
    let method = parse_method(&args.method)?;
    let path = normalize_path(&args.path);
    let headers = parse_headers(&args.headers)?;

    let payload = match &args.data {
        Some(data) => {
            let value: serde_json::Value =
                serde_json::from_str(data).context("--data must be valid JSON")?;
            Payload::Json(value)
        }
        None => Payload::Empty,
    };

    let body = client
        .call_with_headers(cancel, method.clone(), &path, payload, &headers)
        .await
        .with_context(|| format!("{method} {path} failed"))?;

    let body = serde_json::from_slice(&body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&body).into_owned()));

    let out = CallOutput {
        method: method.to_string(),
        path,
        body,
    };
    output(&out, json_mode);
    Ok(())
}

fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.to_uppercase().as_bytes())
        .map_err(|_| anyhow!("Invalid HTTP method: {method}"))
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let Some((name, value)) = entry.split_once(':') else {
            bail!("Invalid header {entry:?}: expected \"name: value\"");
        };
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .with_context(|| format!("Invalid header name in {entry:?}"))?;
        let value = HeaderValue::from_str(value.trim())
            .with_context(|| format!("Invalid header value in {entry:?}"))?;
        headers.append(name, value);
    }
    Ok(headers)
}
