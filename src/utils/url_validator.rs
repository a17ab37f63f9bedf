//! Long URL validation and sanitization.
//!
//! A candidate URL is accepted only if it passes three stages:
//!
//! 1. **Shape**: a conservative regex over the lower-cased input (optional
//!    `http(s)://` and `www.` prefix, dotted host with an alphabetic TLD, optional port
//!    and path)
//! 2. **Structure**: parses as a [`Url`] with a non-empty host
//! 3. **Security**: the host is not loopback, private, link-local, unspecified or
//!    `localhost`, unless private hosts are explicitly allowed

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Position, Url};

/// Longest stored URL, matching the `url` column.
pub const MAX_URL_LENGTH: usize = 2048;

static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(http://www\.|https://www\.|http://|https://)?[a-z0-9]+([\-\.]{1}[a-z0-9]+)*\.[a-z]{2,5}(:[0-9]{1,5})?(/.*)?$",
    )
    .expect("URL shape regex is valid")
});

/// Validates and normalizes long URLs before they reach storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlValidator {
    allow_private_hosts: bool,
}

impl UrlValidator {
    pub fn new(allow_private_hosts: bool) -> Self {
        Self {
            allow_private_hosts,
        }
    }

    /// Returns `true` if the URL passes shape, structure and host checks.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let validator = UrlValidator::default();
    /// assert!(validator.validate("https://www.example.com"));
    /// assert!(!validator.validate("ftp://example.com"));
    /// assert!(!validator.validate("http://"));
    /// ```
    pub fn validate(&self, url: &str) -> bool {
        let candidate = url.trim();
        if candidate.is_empty() {
            return false;
        }

        if !URL_SHAPE.is_match(&candidate.to_lowercase()) {
            return false;
        }

        let Some(parsed) = parse_with_default_scheme(candidate, "http") else {
            return false;
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }

        match parsed.host() {
            None => false,
            Some(Host::Domain(domain)) if domain.is_empty() => false,
            Some(host) => self.allow_private_hosts || !is_private_host(&host),
        }
    }

    /// Trims the input, supplies `https://` when no scheme is present and returns the
    /// canonical form of the parsed URL. The host keeps the case it was written in.
    ///
    /// Never fails: input that does not parse is returned unchanged.
    pub fn sanitize(&self, url: &str) -> String {
        let trimmed = url.trim();

        let Some(parsed) = parse_with_default_scheme(trimmed, "https") else {
            return url.to_string();
        };

        let host = match parsed.host_str() {
            Some(parsed_host) => written_host(trimmed, parsed_host).unwrap_or(parsed_host),
            None => "",
        };
        let mut canonical = format!(
            "{}{}{}",
            &parsed[..Position::BeforeHost],
            host,
            &parsed[Position::AfterHost..]
        );

        // `Url` always renders an empty path as "/"; keep bare hosts as written.
        let bare_host = parsed.path() == "/"
            && parsed.query().is_none()
            && parsed.fragment().is_none()
            && !trimmed.ends_with('/');
        if bare_host {
            canonical.pop();
        }

        canonical
    }

    /// Validates, then sanitizes. `None` means the URL must be rejected.
    pub fn validate_and_sanitize(&self, url: &str) -> Option<String> {
        if self.validate(url) {
            Some(self.sanitize(url))
        } else {
            None
        }
    }
}

fn parse_with_default_scheme(input: &str, default_scheme: &str) -> Option<Url> {
    if input.is_empty() {
        return None;
    }

    let lower = input.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else if input.contains("://") {
        return Url::parse(input).ok();
    } else {
        format!("{default_scheme}://{input}")
    };

    Url::parse(&with_scheme).ok()
}

/// Returns the host exactly as written in `input` when it matches the parsed host up to
/// ASCII case.
fn written_host<'a>(input: &'a str, parsed_host: &str) -> Option<&'a str> {
    let rest = input.split_once("://").map_or(input, |(_, rest)| rest);
    let authority_end = rest
        .find(|c| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    let host_start = authority.rfind('@').map_or(0, |at| at + 1);

    authority[host_start..]
        .get(..parsed_host.len())
        .filter(|written| written.eq_ignore_ascii_case(parsed_host))
}

fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_private_ip(&IpAddr::V4(*ip)),
        Host::Ipv6(ip) => is_private_ip(&IpAddr::V6(*ip)),
    }
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_unique_local()
                || v6.is_unicast_link_local()
                || v6
                    .to_ipv4_mapped()
                    .is_some_and(|v4| is_private_ip(&IpAddr::V4(v4)))
        }
    }
}
