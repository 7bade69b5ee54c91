//! HTTP client for the Radar Bot Directory API.

use crate::autopost::AutopostHandle;
use crate::error::Error;
use crate::identity::{self, Identity};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const API_BASE: &str = "https://radarbotdirectory.xyz/api";
/// Delay between automatic stats submissions.
pub const AUTOPOST_INTERVAL: Duration = Duration::from_secs(120);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Body of a stats submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsPayload {
    pub guilds: u64,
    pub shards: u32,
}

impl StatsPayload {
    /// Validates caller counts. The guild count is required; shards default to 1.
    pub fn from_counts(guild_count: Option<u64>, shard_count: Option<u32>) -> Result<Self, Error> {
        let guilds = guild_count
            .ok_or_else(|| Error::InvalidArgument("The guild count is required".to_string()))?;
        let shards = shard_count.unwrap_or(1);
        if shards == 0 {
            return Err(Error::InvalidArgument(
                "The shard count must be at least 1".to_string(),
            ));
        }
        Ok(Self { guilds, shards })
    }
}

/// Widget image returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Widget {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Radar Bot Directory API client.
#[derive(Clone)]
pub struct Client {
    authorization: HeaderValue,
    user_agent: HeaderValue,
    api_base: Url,
    autopost_interval: Duration,
    identity: Arc<dyn Identity>,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client with default settings for the given token and bot identity.
    pub fn new(token: impl Into<String>, identity: impl Identity + 'static) -> Result<Self, Error> {
        Self::builder().token(token).identity(identity).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub fn autopost_interval(&self) -> Duration {
        self.autopost_interval
    }

    /// Post guild and shard counts once.
    ///
    /// Resolves with the server's JSON body on 200. Any other status yields
    /// [`Error::StatsRejected`] carrying the server's JSON error body.
    pub async fn post_stats(
        &self,
        guild_count: Option<u64>,
        shard_count: Option<u32>,
    ) -> Result<Value, Error> {
        let payload = StatsPayload::from_counts(guild_count, shard_count)?;
        self.submit(payload).await
    }

    /// Post stats now and then again every [`Client::autopost_interval`], using the
    /// counts given here for every submission.
    ///
    /// Arguments are validated before anything is spawned. Outcomes of individual
    /// submissions are only logged. Dropping the returned handle leaves the loop running.
    /// Fails with [`Error::NoRuntime`] when called outside a tokio runtime.
    pub fn autopost_stats(
        &self,
        guild_count: Option<u64>,
        shard_count: Option<u32>,
    ) -> Result<AutopostHandle, Error> {
        let payload = StatsPayload::from_counts(guild_count, shard_count)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(AutopostHandle::spawn(
            &runtime,
            self.clone(),
            payload,
            self.autopost_interval,
        ))
    }

    /// Fetch the bot's directory listing.
    pub async fn bot_info(&self) -> Result<Value, Error> {
        let id = self.bot_id()?;
        let url = self.endpoint(&["bot", &id])?;
        let res = self.send(Method::GET, url, None, true).await?;
        ensure_ok(&res)?;
        decode_json(&res.body)
    }

    /// Fetch the bot's widget image.
    pub async fn bot_widget(&self) -> Result<Widget, Error> {
        let id = self.bot_id()?;
        let url = self.endpoint(&["bot", &id, "widget"])?;
        let res = self.send(Method::GET, url, None, false).await?;
        ensure_ok(&res)?;
        let content_type = res
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        Ok(Widget {
            content_type,
            data: res.body,
        })
    }

    /// Fetch when the given user last voted for the bot.
    pub async fn last_voted(&self, user_id: &str) -> Result<Value, Error> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(Error::InvalidArgument("The user ID is required".to_string()));
        }
        let id = self.bot_id()?;
        let url = self.endpoint(&["lastvoted", user_id, &id])?;
        let res = self.send(Method::GET, url, None, true).await?;
        ensure_ok(&res)?;
        decode_json(&res.body)
    }

    pub(crate) async fn submit(&self, payload: StatsPayload) -> Result<Value, Error> {
        let id = self.bot_id()?;
        let url = self.endpoint(&["bot", &id, "stats"])?;
        let body = serde_json::to_vec(&payload)?;
        let res = self.send(Method::POST, url, Some(body), true).await?;
        if res.status != StatusCode::OK {
            return Err(Error::StatsRejected {
                status: res.status.as_u16(),
                body: lenient_json(&res.body),
            });
        }
        decode_json(&res.body)
    }

    fn bot_id(&self) -> Result<String, Error> {
        identity::resolve(&*self.identity).ok_or(Error::IdentityUnavailable)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        // `extend` silently skips dot segments, which would change the route.
        if let Some(seg) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(Error::InvalidArgument(format!(
                "Path segment {:?} is not allowed",
                seg
            )));
        }
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidArgument("API base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn headers(&self, json: bool, has_body: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers.insert(USER_AGENT, self.user_agent.clone());
        if json {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        json: bool,
    ) -> Result<HttpResponse, Error> {
        let headers = self.headers(json, body.is_some());
        debug!("{} {}", method, url);
        let req = HttpRequest {
            method: method.clone(),
            url: url.clone(),
            headers,
            body,
        };
        let res = self.transport.execute(req).await?;
        debug!("{} {} -> {}", method, url, res.status);
        Ok(res)
    }
}

fn ensure_ok(res: &HttpResponse) -> Result<(), Error> {
    if res.status != StatusCode::OK {
        return Err(Error::from_status(res.status));
    }
    Ok(())
}

fn decode_json(body: &[u8]) -> Result<Value, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Error bodies that are not JSON are kept as a JSON string.
fn lenient_json(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    token: Option<String>,
    identity: Option<Arc<dyn Identity>>,
    api_base: Option<String>,
    timeout: Option<Option<Duration>>,
    autopost_interval: Option<Duration>,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// API token from the bot's page on the directory.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn identity(mut self, identity: impl Identity + 'static) -> Self {
        self.identity = Some(Arc::new(identity));
        self
    }

    pub fn shared_identity(mut self, identity: Arc<dyn Identity>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Whole-request timeout for the default transport. `None` waits forever.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn autopost_interval(mut self, interval: Duration) -> Self {
        self.autopost_interval = Some(interval);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Replace the default `reqwest` transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let token = self
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidArgument("An API token is required".to_string()))?;
        let mut authorization = HeaderValue::from_str(&token).map_err(|_| {
            Error::InvalidArgument("API token contains invalid header characters".to_string())
        })?;
        authorization.set_sensitive(true);

        let identity = self.identity.ok_or_else(|| {
            Error::InvalidArgument("A bot identity source is required".to_string())
        })?;

        let api_base = Url::parse(self.api_base.as_deref().unwrap_or(API_BASE))?;
        if api_base.cannot_be_a_base() {
            return Err(Error::InvalidArgument(format!(
                "API base URL cannot carry a path: {}",
                api_base
            )));
        }

        let autopost_interval = self.autopost_interval.unwrap_or(AUTOPOST_INTERVAL);
        if autopost_interval.is_zero() {
            return Err(Error::InvalidArgument(
                "The autopost interval must be non-zero".to_string(),
            ));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("radarbots/{}", crate::VERSION));
        let user_agent = HeaderValue::from_str(&user_agent).map_err(|_| {
            Error::InvalidArgument("User agent contains invalid header characters".to_string())
        })?;

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(
                self.timeout.unwrap_or(Some(DEFAULT_TIMEOUT)),
            )?),
        };

        Ok(Client {
            authorization,
            user_agent,
            api_base,
            autopost_interval,
            identity,
            transport,
        })
    }
}
