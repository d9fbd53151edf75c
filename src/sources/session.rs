use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header, Client, Url};

use crate::error::{Error, Result};
use crate::http::{RateLimiter, USER_AGENT};

pub const SENATE_BASE_URL: &str = "https://efdsearch.senate.gov";
const HOME_PATH: &str = "/search/home/";
const SEARCH_PATH: &str = "/search/";

static RE_CSRF_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="csrfmiddlewaretoken"\s+value="([^"]+)""#).unwrap()
});

/// An eFD search session with the usage agreement accepted.
///
/// One session serves every Senate request of a run. Dropping it releases
/// the connection pool and cookie jar.
pub struct SenateSession {
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
    rate_limiter: RateLimiter,
}

impl SenateSession {
    pub async fn open(timeout: Duration) -> Result<Self> {
        Self::open_at(SENATE_BASE_URL, timeout).await
    }

    pub async fn open_at(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Session(format!("invalid base url {}: {}", base_url, e)))?;
        let jar = Arc::new(Jar::default());

        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .cookie_provider(jar.clone())
            .timeout(timeout)
            .build()?;

        let session = Self {
            client,
            jar,
            base_url,
            rate_limiter: RateLimiter::senate_web(),
        };
        session.accept_agreement().await?;
        tracing::info!("Senate eFD session opened");
        Ok(session)
    }

    async fn accept_agreement(&self) -> Result<()> {
        let home = self.url(HOME_PATH)?;
        self.rate_limiter.wait().await;
        let page = self.client.get(home.clone()).send().await?.text().await?;

        let token = extract_csrf_input(&page)
            .ok_or_else(|| Error::Session("agreement form has no CSRF token".to_string()))?;

        self.rate_limiter.wait().await;
        let response = self
            .client
            .post(home.clone())
            .header(header::REFERER, home.as_str())
            .form(&[
                ("prohibition_agreement", "1"),
                ("csrfmiddlewaretoken", token.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Session(format!(
                "agreement rejected with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Session(format!("invalid path {}: {}", path, e)))
    }

    /// Current `csrftoken` cookie, required on every search POST.
    fn csrf_cookie(&self) -> Option<String> {
        let cookies = self.jar.cookies(&self.base_url)?;
        let cookies = cookies.to_str().ok()?;
        cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == "csrftoken")
            .map(|(_, value)| value.to_string())
    }

    /// POST a search form and decode the JSON reply.
    pub async fn post_search<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path)?;
        let referer = self.url(SEARCH_PATH)?;
        let token = self
            .csrf_cookie()
            .ok_or_else(|| Error::Session("session has no csrftoken cookie".to_string()))?;

        self.rate_limiter.wait().await;
        let response = self
            .client
            .post(url)
            .header(header::REFERER, referer.as_str())
            .header("X-CSRFToken", token)
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Session(format!(
                "search request {} failed with status {}",
                path,
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// Fetch a report page within the session.
    pub async fn get_page(&self, url: &str) -> Result<String> {
        self.rate_limiter.wait().await;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }
}

impl Drop for SenateSession {
    fn drop(&mut self) {
        tracing::debug!("Senate eFD session released");
    }
}

fn extract_csrf_input(html: &str) -> Option<String> {
    RE_CSRF_INPUT
        .captures(html)
        .map(|caps| caps[1].to_string())
}
