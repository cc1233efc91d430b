// crates/shelfmark-remote/src/http.rs
// ============================================================================
// Module: HTTP Archive Client
// Description: Blocking HTTP adapter for ArchivesSpace-style REST endpoints.
// Purpose: Resolve, search, and update archival records over an authenticated session.
// Dependencies: shelfmark-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! The HTTP client speaks the ArchivesSpace REST dialect: a login request
//! opens a session, and the issued token authenticates every subsequent
//! request. Lookups are bounded GET requests addressed by service-relative
//! record URIs; updates and batch links are POST requests. Responses are
//! validated into the typed records from `shelfmark-core` at this boundary,
//! so the synchronizer never sees wire payloads.
//! Invariants:
//! - Redirects are not followed.
//! - A 404 lookup answer resolves to `Ok(None)`, not an error.
//! - A 400 update answer resolves to `Ok(None)`; the caller decides severity.
//! - Response bodies above the configured limit fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shelfmark_core::ArchiveClient;
use shelfmark_core::ContainerLocation;
use shelfmark_core::ContainerRecord;
use shelfmark_core::ContainerUpdate;
use shelfmark_core::LocationRecord;
use shelfmark_core::RecordUri;
use shelfmark_core::RemoteError;
use shelfmark_core::RepositoryRecord;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Session token header presented on every authenticated request.
const SESSION_HEADER: &str = "x-archivesspace-session";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for one archival service endpoint.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` URLs.
/// - `max_response_bytes` is enforced as a hard upper bound on response bodies.
/// - URLs with embedded credentials are rejected.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct HttpArchiveConfig {
    /// Service base URL, scheme and host included.
    pub base_url: String,
    /// Username presented at session login.
    pub username: String,
    /// Password presented at session login.
    pub password: String,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            allow_http: false,
            timeout_ms: 10_000,
            max_response_bytes: 1024 * 1024,
            user_agent: "shelfmark/0.1".to_string(),
        }
    }
}

impl fmt::Debug for HttpArchiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpArchiveConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("allow_http", &self.allow_http)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking client for one archival service endpoint.
///
/// # Invariants
/// - The session token is obtained once at [`HttpArchiveClient::connect`].
/// - Every request after login carries the session token header.
/// - Responses exceeding configured limits fail closed.
pub struct HttpArchiveClient {
    /// Endpoint configuration, including limits and policy.
    config: HttpArchiveConfig,
    /// Validated base URL record URIs are joined onto.
    base: Url,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Session token issued at login.
    session: HeaderValue,
}

impl HttpArchiveClient {
    /// Validates the endpoint, builds the HTTP client, and opens a session.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Endpoint`] when the configuration is unusable,
    /// and transport or API errors when the login exchange fails.
    pub fn connect(config: HttpArchiveConfig) -> Result<Self, RemoteError> {
        let base = validate_endpoint(&config)?;
        let client = build_http_client(&config)?;
        let session = open_session(&client, &base, &config)?;
        Ok(Self {
            config,
            base,
            client,
            session,
        })
    }

    /// Joins a service-relative URI onto the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Endpoint`] when the URI does not join.
    fn record_url(&self, uri: &str) -> Result<Url, RemoteError> {
        join_endpoint(&self.base, uri)
    }

    /// Fetches one record payload by service-relative URI.
    ///
    /// Returns `Ok(None)` when the service answers 404.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] for transport failures, non-success statuses,
    /// and bodies that do not decode.
    fn fetch<P: DeserializeOwned>(&self, uri: &str) -> Result<Option<P>, RemoteError> {
        let url = self.record_url(uri)?;
        let mut response = self
            .client
            .get(url)
            .header(SESSION_HEADER, self.session.clone())
            .send()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                uri: uri.to_string(),
            });
        }
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        serde_json::from_slice(&body)
            .map_err(|err| RemoteError::InvalidPayload(format!("{uri}: {err}")))
            .map(Some)
    }

    /// Runs the repository container search with one query value.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the search cannot be executed.
    fn search_containers(
        &self,
        repository: &RepositoryRecord,
        query: &str,
    ) -> Result<Vec<ContainerRecord>, RemoteError> {
        let path = format!("{}/top_containers/search", repository.uri.as_str());
        let mut url = self.record_url(&path)?;
        url.query_pairs_mut().append_pair("q", query);
        let mut response = self
            .client
            .get(url)
            .header(SESSION_HEADER, self.session.clone())
            .send()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                uri: path,
            });
        }
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        let payload: ContainerListPayload = serde_json::from_slice(&body)
            .map_err(|err| RemoteError::InvalidPayload(format!("{path}: {err}")))?;
        payload.into_records()
    }

    /// Issues one batch link call and validates the returned containers.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the call cannot be sent or the response
    /// does not decode.
    fn link_batch(
        &self,
        repository: &RepositoryRecord,
        containers: &[ContainerRecord],
        action: &str,
        param: &str,
        target: &RecordUri,
    ) -> Result<Vec<ContainerRecord>, RemoteError> {
        let path = format!("{}/top_containers/batch/{action}", repository.uri.as_str());
        let mut url = self.record_url(&path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(param, target.as_str());
            for container in containers {
                pairs.append_pair("ids[]", &container.id.to_string());
            }
        }
        let mut response = self
            .client
            .post(url)
            .header(SESSION_HEADER, self.session.clone())
            .send()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                uri: path,
            });
        }
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        let payload: ContainerListPayload = serde_json::from_slice(&body)
            .map_err(|err| RemoteError::InvalidPayload(format!("{path}: {err}")))?;
        payload.into_records()
    }
}

impl ArchiveClient for HttpArchiveClient {
    fn find_repository(&self, uri: &RecordUri) -> Result<Option<RepositoryRecord>, RemoteError> {
        let Some(payload) = self.fetch::<RepositoryPayload>(uri.as_str())? else {
            return Ok(None);
        };
        payload.into_record().map(Some)
    }

    fn find_top_container(
        &self,
        uri: &RecordUri,
    ) -> Result<Option<ContainerRecord>, RemoteError> {
        let Some(payload) = self.fetch::<ContainerPayload>(uri.as_str())? else {
            return Ok(None);
        };
        payload.into_record().map(Some)
    }

    fn find_location(&self, uri: &RecordUri) -> Result<Option<LocationRecord>, RemoteError> {
        let Some(payload) = self.fetch::<LocationPayload>(uri.as_str())? else {
            return Ok(None);
        };
        payload.into_record().map(Some)
    }

    fn search_containers_by_barcode(
        &self,
        repository: &RepositoryRecord,
        barcode: &str,
    ) -> Result<Vec<ContainerRecord>, RemoteError> {
        self.search_containers(repository, barcode)
    }

    fn search_containers_by_indicator(
        &self,
        repository: &RepositoryRecord,
        indicator: &str,
    ) -> Result<Vec<ContainerRecord>, RemoteError> {
        self.search_containers(repository, indicator)
    }

    fn update_container(
        &self,
        container: &ContainerRecord,
        update: &ContainerUpdate,
    ) -> Result<Option<ContainerRecord>, RemoteError> {
        let url = self.record_url(container.uri.as_str())?;
        let body = serde_json::to_vec(&ContainerUpdateBody::from_update(update))
            .map_err(|err| RemoteError::InvalidPayload(format!("update encoding failed: {err}")))?;
        let mut response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(SESSION_HEADER, self.session.clone())
            .body(body)
            .send()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RemoteError::Update(format!(
                "status {} for {}",
                status.as_u16(),
                container.uri.as_str()
            )));
        }
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        let payload: ContainerPayload = serde_json::from_slice(&body).map_err(|err| {
            RemoteError::InvalidPayload(format!("{}: {err}", container.uri.as_str()))
        })?;
        payload.into_record().map(Some)
    }

    fn batch_link_container_profile(
        &self,
        repository: &RepositoryRecord,
        containers: &[ContainerRecord],
        profile_uri: &RecordUri,
    ) -> Result<Vec<ContainerRecord>, RemoteError> {
        self.link_batch(
            repository,
            containers,
            "container_profile",
            "container_profile_uri",
            profile_uri,
        )
    }

    fn batch_link_location(
        &self,
        repository: &RepositoryRecord,
        containers: &[ContainerRecord],
        location_uri: &RecordUri,
    ) -> Result<Vec<ContainerRecord>, RemoteError> {
        self.link_batch(repository, containers, "location", "location_uri", location_uri)
    }
}

// ============================================================================
// SECTION: Endpoint Helpers
// ============================================================================

/// Validates endpoint scheme, credential policy, and login credentials.
///
/// # Errors
///
/// Returns [`RemoteError::Endpoint`] when the configuration is unusable.
fn validate_endpoint(config: &HttpArchiveConfig) -> Result<Url, RemoteError> {
    let mut base = Url::parse(&config.base_url)
        .map_err(|_| RemoteError::Endpoint(format!("invalid base url: {}", config.base_url)))?;
    match base.scheme() {
        "https" => {}
        "http" if config.allow_http => {}
        _ => return Err(RemoteError::Endpoint("unsupported url scheme".to_string())),
    }
    if !base.username().is_empty() || base.password().is_some() {
        return Err(RemoteError::Endpoint("url credentials are not allowed".to_string()));
    }
    if base.host_str().is_none() {
        return Err(RemoteError::Endpoint("url host required".to_string()));
    }
    if config.username.is_empty() || config.password.is_empty() {
        return Err(RemoteError::Endpoint("login credentials are required".to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Builds the blocking HTTP client for an endpoint.
///
/// # Errors
///
/// Returns [`RemoteError::Endpoint`] when the client cannot be built.
fn build_http_client(config: &HttpArchiveConfig) -> Result<Client, RemoteError> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(config.user_agent.clone())
        .redirect(Policy::none())
        .build()
        .map_err(|_| RemoteError::Endpoint("http client build failed".to_string()))
}

/// Opens a session and validates the issued token as a header value.
///
/// # Errors
///
/// Returns [`RemoteError`] when the login exchange fails or the token is
/// unusable.
fn open_session(
    client: &Client,
    base: &Url,
    config: &HttpArchiveConfig,
) -> Result<HeaderValue, RemoteError> {
    let path = format!("/users/{}/login", config.username);
    let url = join_endpoint(base, &path)?;
    let mut response = client
        .post(url)
        .form(&[("password", config.password.as_str())])
        .send()
        .map_err(|err| RemoteError::Transport(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(RemoteError::Api {
            status: status.as_u16(),
            uri: path,
        });
    }
    let body = read_response_limited(&mut response, config.max_response_bytes)?;
    let payload: SessionPayload = serde_json::from_slice(&body)
        .map_err(|err| RemoteError::InvalidPayload(format!("{path}: {err}")))?;
    HeaderValue::from_str(&payload.session)
        .map_err(|_| RemoteError::InvalidPayload("session token is not a header value".to_string()))
}

/// Joins a service-relative URI onto a validated base URL.
///
/// # Errors
///
/// Returns [`RemoteError::Endpoint`] when the URI does not join.
fn join_endpoint(base: &Url, uri: &str) -> Result<Url, RemoteError> {
    let relative = uri.trim_start_matches('/');
    base.join(relative)
        .map_err(|_| RemoteError::Endpoint(format!("uri does not join onto the endpoint: {uri}")))
}

/// Reads the response body while enforcing a byte limit.
///
/// # Errors
///
/// Returns [`RemoteError`] when the body exceeds the limit, is truncated, or
/// cannot be read.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, RemoteError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| RemoteError::InvalidPayload("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(RemoteError::InvalidPayload("response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|_| RemoteError::Transport("failed to read response".to_string()))?;
    if buf.len() > max_bytes {
        return Err(RemoteError::InvalidPayload("response exceeds size limit".to_string()));
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected)
            .map_err(|_| RemoteError::InvalidPayload("invalid response length".to_string()))?;
        if buf.len() < expected {
            return Err(RemoteError::Transport("response truncated".to_string()));
        }
    }
    Ok(buf)
}

/// Extracts the trailing numeric id from a service-relative URI.
///
/// # Errors
///
/// Returns [`RemoteError::InvalidPayload`] when the URI carries no id.
fn id_from_uri(uri: &str) -> Result<u64, RemoteError> {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u64>().ok())
        .ok_or_else(|| RemoteError::InvalidPayload(format!("record uri has no numeric id: {uri}")))
}

// ============================================================================
// SECTION: Wire Payloads
// ============================================================================

/// Login response issued by the session endpoint.
#[derive(Debug, Deserialize)]
struct SessionPayload {
    /// Session token echoed back on subsequent requests.
    session: String,
}

/// Repository record as served on the wire.
#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    /// Service-relative URI.
    uri: String,
    /// Short repository code.
    #[serde(default)]
    repo_code: Option<String>,
    /// Human-readable name.
    #[serde(default)]
    name: Option<String>,
}

impl RepositoryPayload {
    /// Validates the payload into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidPayload`] when the URI carries no id.
    fn into_record(self) -> Result<RepositoryRecord, RemoteError> {
        let id = id_from_uri(&self.uri)?;
        Ok(RepositoryRecord {
            id,
            uri: RecordUri::from(self.uri),
            repo_code: self.repo_code,
            name: self.name,
        })
    }
}

/// Top container record as served on the wire.
#[derive(Debug, Deserialize)]
struct ContainerPayload {
    /// Service-relative URI.
    uri: String,
    /// Display indicator.
    #[serde(default)]
    indicator: Option<String>,
    /// Attached barcode.
    #[serde(default)]
    barcode: Option<String>,
    /// Attached location links.
    #[serde(default)]
    container_locations: Vec<LocationLinkPayload>,
}

impl ContainerPayload {
    /// Validates the payload into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidPayload`] when the URI carries no id.
    fn into_record(self) -> Result<ContainerRecord, RemoteError> {
        let id = id_from_uri(&self.uri)?;
        let container_locations = self
            .container_locations
            .into_iter()
            .map(|link| ContainerLocation {
                uri: RecordUri::from(link.reference),
                status: link.status,
            })
            .collect();
        Ok(ContainerRecord {
            id,
            uri: RecordUri::from(self.uri),
            indicator: self.indicator,
            barcode: self.barcode,
            container_locations,
        })
    }
}

/// Location link as embedded in container payloads.
#[derive(Debug, Deserialize)]
struct LocationLinkPayload {
    /// Reference to the linked location record.
    #[serde(rename = "ref")]
    reference: String,
    /// Link status reported by the service.
    #[serde(default)]
    status: Option<String>,
}

/// Location record as served on the wire.
#[derive(Debug, Deserialize)]
struct LocationPayload {
    /// Service-relative URI.
    uri: String,
    /// Building the location sits in.
    #[serde(default)]
    building: Option<String>,
    /// Shelving classification code.
    #[serde(default)]
    classification: Option<String>,
}

impl LocationPayload {
    /// Validates the payload into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidPayload`] when the URI carries no id.
    fn into_record(self) -> Result<LocationRecord, RemoteError> {
        let id = id_from_uri(&self.uri)?;
        Ok(LocationRecord {
            id,
            uri: RecordUri::from(self.uri),
            building: self.building,
            classification: self.classification,
        })
    }
}

/// Container list response served by search and batch link endpoints.
#[derive(Debug, Deserialize)]
struct ContainerListPayload {
    /// Containers matched or updated by the call.
    #[serde(default)]
    results: Vec<ContainerPayload>,
}

impl ContainerListPayload {
    /// Validates every listed container into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidPayload`] when any entry is unusable.
    fn into_records(self) -> Result<Vec<ContainerRecord>, RemoteError> {
        self.results.into_iter().map(ContainerPayload::into_record).collect()
    }
}

/// Container update request as sent on the wire.
#[derive(Debug, Serialize)]
struct ContainerUpdateBody<'a> {
    /// New barcode value.
    barcode: &'a str,
    /// New display indicator.
    indicator: &'a str,
    /// Replacement set of location links.
    container_locations: Vec<LocationLinkBody<'a>>,
}

impl<'a> ContainerUpdateBody<'a> {
    /// Borrows an update into its wire form.
    fn from_update(update: &'a ContainerUpdate) -> Self {
        Self {
            barcode: update.barcode.as_str(),
            indicator: update.indicator.as_str(),
            container_locations: update
                .container_locations
                .iter()
                .map(|link| LocationLinkBody {
                    reference: link.uri.as_str(),
                    status: link.status.as_deref(),
                })
                .collect(),
        }
    }
}

/// Location link as sent in update requests.
#[derive(Debug, Serialize)]
struct LocationLinkBody<'a> {
    /// Reference to the linked location record.
    #[serde(rename = "ref")]
    reference: &'a str,
    /// Link status reported by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}
