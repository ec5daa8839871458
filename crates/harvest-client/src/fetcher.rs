use std::net::IpAddr;
use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use harvest_core::error::AppError;
use harvest_core::traits::Fetcher;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use url::{Host, Url};

/// Fetch timeout applied to every request. There are no retries.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Same hop limit as reqwest's default policy.
const MAX_REDIRECTS: usize = 10;

/// HTTP fetcher using reqwest.
///
/// Downloads a page's markup with a short fixed timeout. Non-2xx responses
/// still yield their body; only transport failures are errors.
///
/// Requests to private/reserved addresses are refused by default, both for
/// the requested URL and for every redirect hop. The CLI opts out with
/// [`allow_private_urls`](Self::allow_private_urls).
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout: Duration,
    block_private: bool,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(timeout, true)?,
            timeout,
            block_private: true,
        })
    }

    /// Allow requests (and redirects) to loopback, private and link-local
    /// addresses.
    pub fn allow_private_urls(self) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(self.timeout, false)?,
            block_private: false,
            ..self
        })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let target = parse_target(url)?;
        if self.block_private {
            ensure_public(&target).await?;
        }

        let response = self.client.get(target).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout.as_secs())
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), %url, "Non-success response, parsing body anyway");
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout.as_secs())
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })?;

        Ok(decode_body(&body, content_type.as_deref()))
    }
}

fn build_client(timeout: Duration, block_private: bool) -> Result<Client, AppError> {
    Client::builder()
        .user_agent(concat!("Harvest/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .redirect(redirect_policy(block_private))
        .build()
        .map_err(|e| AppError::HttpError(e.to_string()))
}

/// Redirect policy: reqwest's default, plus a target check when private
/// addresses are blocked.
fn redirect_policy(block_private: bool) -> Policy {
    if !block_private {
        return Policy::limited(MAX_REDIRECTS);
    }
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(AppError::HttpError("Too many redirects".to_string()));
        }
        match check_redirect_target(attempt.url()) {
            Ok(()) => attempt.follow(),
            Err(e) => attempt.error(e),
        }
    })
}

/// Refuse redirect hops to non-http(s) schemes, `localhost`, or literal
/// private/reserved addresses. Hostnames are not resolved here.
fn check_redirect_target(target: &Url) -> Result<(), AppError> {
    match target.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::HttpError(format!(
                "Redirect to scheme '{scheme}' is not allowed"
            )));
        }
    }

    match target.host() {
        Some(Host::Ipv4(ip)) => check_ip(&ip.to_string(), IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => check_ip(&ip.to_string(), IpAddr::V6(ip)),
        Some(Host::Domain(domain)) if is_localhost(domain) => Err(AppError::HttpError(format!(
            "Blocked: redirect to {domain}"
        ))),
        Some(Host::Domain(_)) => Ok(()),
        None => Err(AppError::HttpError("Redirect target has no host".to_string())),
    }
}

fn is_localhost(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    domain == "localhost" || domain.ends_with(".localhost")
}

// ---------------------------------------------------------------------------
// Charset
// ---------------------------------------------------------------------------

/// How far into the body a `<meta charset>` declaration is looked for.
const META_PRESCAN_BYTES: usize = 1024;

/// Decode a page body to text.
///
/// A byte order mark wins, then the `Content-Type` charset, then a
/// `<meta charset>` / `http-equiv` declaration near the top of the document,
/// then UTF-8. Malformed sequences become U+FFFD.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| sniff_meta_charset(body))
        .unwrap_or(UTF_8);

    let (text, used, malformed) = encoding.decode(body);
    if malformed {
        tracing::debug!(encoding = used.name(), "Body contained malformed sequences");
    }
    text.into_owned()
}

/// `charset` parameter of a `Content-Type` value.
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c: char| c == '"' || c == '\''))
    })
}

/// Encoding declared by a `charset=` attribute in the first bytes of the page.
fn sniff_meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_PRESCAN_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    head.match_indices("charset=").find_map(|(at, needle)| {
        let rest = head[at + needle.len()..].trim_start_matches(['"', '\'', ' ']);
        let end = rest
            .find(|c: char| matches!(c, '"' | '\'' | ';' | '>' | '/') || c.is_whitespace())
            .unwrap_or(rest.len());
        // a UTF-16 label in markup is read as UTF-8
        Encoding::for_label(rest[..end].as_bytes()).map(Encoding::output_encoding)
    })
}

/// Parse a user-supplied URL, accepting only http and https.
fn parse_target(url: &str) -> Result<Url, AppError> {
    let parsed =
        Url::parse(url.trim()).map_err(|e| AppError::HttpError(format!("Invalid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(AppError::HttpError(format!(
            "URL scheme '{scheme}' is not allowed (only http/https)"
        ))),
    }
}

/// Resolve the target host and refuse it if any address is private/reserved.
async fn ensure_public(target: &Url) -> Result<(), AppError> {
    let host = target
        .host_str()
        .ok_or_else(|| AppError::HttpError("URL has no host".to_string()))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = host.parse::<IpAddr>() {
        return check_ip(host, ip);
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| AppError::NetworkError(format!("DNS resolution failed for {host}: {e}")))?;

    let mut resolved = false;
    for addr in addrs {
        resolved = true;
        check_ip(host, addr.ip())?;
    }
    if !resolved {
        return Err(AppError::NetworkError(format!(
            "DNS resolution returned no addresses for {host}"
        )));
    }
    Ok(())
}

fn check_ip(host: &str, ip: IpAddr) -> Result<(), AppError> {
    if is_private_ip(ip) {
        return Err(AppError::HttpError(format!(
            "Blocked: {host} resolves to private/reserved address {ip}"
        )));
    }
    Ok(())
}

/// Check if an IP address is in a private/reserved/link-local range.
fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation()
                || (a == 100 && (b & 0xC0) == 64) // 100.64.0.0/10
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xFFC0) == 0xFE80 // link-local
                || (first & 0xFE00) == 0xFC00 // unique local
                || v6.to_ipv4_mapped().is_some_and(|v4| is_private_ip(IpAddr::V4(v4)))
        }
    }
}
