//! URL classification for the hosted design tool.
//!
//! Pure, total predicates: every function accepts arbitrary input and
//! answers `false` for anything that does not parse as an absolute URL.

use url::Url;

/// Apex domain of the hosted site.
pub const TARGET_SITE_DOMAIN: &str = "figma.com";

/// Address a tab opens when no usable URL is given.
pub const DEFAULT_URL: &str = "https://www.figma.com/files/recent";

/// The blank-page sentinel used for freshly opened popups.
pub const PLACEHOLDER_URL: &str = "about:blank";

/// Identity-provider hosts matched exactly.
const AUTH_HOSTS: &[&str] = &[
    "accounts.google.com",
    "accounts.youtube.com",
    "appleid.apple.com",
    "idmsa.apple.com",
    "login.microsoftonline.com",
    "login.live.com",
    "github.com",
];

/// Identity-provider domains matched with any subdomain.
const AUTH_DOMAINS: &[&str] = &["okta.com", "oktapreview.com", "auth0.com", "onelogin.com"];

/// Content-relay suffix used by identity providers for redirect hops.
const AUTH_RELAY_SUFFIX: &str = ".googleusercontent.com";

/// Paths on the target site that belong to its sign-in flows.
const AUTH_PATH_PREFIXES: &[&str] = &["/login", "/signup", "/oauth"];

fn parse_secure(u: &str) -> Option<Url> {
    let url = Url::parse(u).ok()?;
    if url.scheme() != "https" {
        return None;
    }
    url.host_str()?;
    Some(url)
}

fn host_in_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|rest| rest.ends_with('.'))
}

fn is_target_host(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|h| host_in_domain(h, TARGET_SITE_DOMAIN))
}

fn is_auth_host(host: &str) -> bool {
    AUTH_HOSTS.contains(&host)
        || AUTH_DOMAINS.iter().any(|d| host_in_domain(host, d))
        || host.ends_with(AUTH_RELAY_SUFFIX)
}

/// True iff `u` is an absolute URL with a secure-transport scheme.
pub fn is_secure_url(u: &str) -> bool {
    parse_secure(u).is_some()
}

/// True iff `u` is secure and points at the target site or a subdomain.
pub fn is_target_site_url(u: &str) -> bool {
    parse_secure(u).is_some_and(|url| is_target_host(&url))
}

/// True iff `u` belongs to an authentication flow: an identity-provider
/// host, or a sign-in path on the target site.
pub fn is_auth_url(u: &str) -> bool {
    let Some(url) = parse_secure(u) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    if is_auth_host(host) {
        return true;
    }
    is_target_host(&url)
        && AUTH_PATH_PREFIXES
            .iter()
            .any(|prefix| url.path().starts_with(prefix))
}

/// True iff `u` is absent, empty, or the blank-page sentinel (optionally
/// followed by a fragment).
pub fn is_placeholder_url(u: Option<&str>) -> bool {
    match u {
        None => true,
        Some(s) if s.is_empty() => true,
        Some(s) => match s.strip_prefix(PLACEHOLDER_URL) {
            Some(rest) => rest.is_empty() || rest.starts_with('#'),
            None => false,
        },
    }
}

/// True iff `u` may be reopened after a restart.
pub fn is_restorable(u: &str) -> bool {
    is_secure_url(u) && (is_target_site_url(u) || is_auth_url(u))
}
