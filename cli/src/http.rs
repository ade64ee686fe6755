//! Native transport over `reqwest` with a persistent cookie jar.
//!
//! DESIGN
//! ======
//! The browser attaches cookies on its own; here a `reqwest::cookie::Jar`
//! plays that role. The jar is seeded from and written back to an optional
//! cookie file so `login` in one invocation carries into `settings` in the
//! next. The file holds one `name=value` pair per line.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use hirevoo_session::ApiError;
use hirevoo_session::net::transport::{CookieSource, CredentialedRequest, HttpResponse, Method, Transport, parse_cookie_header};
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};

use crate::CliError;

/// Cookie jar scoped to one backend origin.
pub struct CookieJar {
    jar: Arc<Jar>,
    origin: Url,
}

impl CookieJar {
    /// # Errors
    ///
    /// Returns [`CliError::InvalidBaseUrl`] when `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, CliError> {
        let origin = Url::parse(base_url).map_err(|_| CliError::InvalidBaseUrl(base_url.to_owned()))?;
        Ok(Self { jar: Arc::new(Jar::default()), origin })
    }

    /// The `Cookie` header the jar would send to the origin.
    pub fn header(&self) -> String {
        self.jar
            .cookies(&self.origin)
            .and_then(|value| value.to_str().map(ToOwned::to_owned).ok())
            .unwrap_or_default()
    }

    pub fn insert(&self, name: &str, value: &str) {
        self.jar.add_cookie_str(&format!("{name}={value}; Path=/"), &self.origin);
    }

    /// Seed the jar from `path`. A missing file is an empty jar.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] when the file exists but cannot be read.
    pub fn load(&self, path: &Path) -> Result<(), CliError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        for (name, value) in parse_cookie_file(&text) {
            self.insert(&name, &value);
        }
        Ok(())
    }

    /// Write the jar's current cookies to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        std::fs::write(path, render_cookie_file(&cookie_pairs(&self.header())))?;
        Ok(())
    }
}

impl CookieSource for CookieJar {
    fn cookie(&self, name: &str) -> Option<String> {
        parse_cookie_header(&self.header(), name)
    }
}

/// Split a `Cookie` header into `(name, value)` pairs.
pub fn cookie_pairs(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_owned(), value.trim().to_owned()))
        })
        .collect()
}

pub fn render_cookie_file(pairs: &[(String, String)]) -> String {
    pairs.iter().map(|(name, value)| format!("{name}={value}\n")).collect()
}

pub fn parse_cookie_file(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (name, value) = line.split_once('=')?;
            Some((name.trim().to_owned(), value.trim().to_owned()))
        })
        .collect()
}

/// `Transport` backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns [`CliError::Http`] when the client cannot be built.
    pub fn new(jar: &CookieJar) -> Result<Self, CliError> {
        let client = reqwest::Client::builder().cookie_provider(jar.jar.clone()).build()?;
        Ok(Self { client })
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: CredentialedRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let mut builder = self.client.request(reqwest_method(request.method), &request.url);
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        tracing::debug!(status, "response received");
        Ok(HttpResponse::new(status, body))
    }
}

/// Default cookie file location, `$HOME/.hirevoo-cookies`.
pub fn default_cookie_file() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".hirevoo-cookies"))
}
