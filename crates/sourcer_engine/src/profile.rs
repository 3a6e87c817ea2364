use std::collections::HashSet;
use std::fmt;

use url::Url;

/// LinkedIn's opaque member ids start with this prefix. Anchors carrying one
/// point at an internal record, not a public profile, and must be resolved
/// through the lookup path instead of submitted as-is.
pub const INTERNAL_HANDLE_PREFIX: &str = "ACoAA";

/// Prefix every canonical profile URL is rendered under.
pub const PUBLIC_PROFILE_BASE: &str = "https://www.linkedin.com/in/";

/// A public profile URL in canonical form. Two values are equal iff their
/// handles are equal; query strings and fragments never participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileUrl {
    handle: String,
}

impl ProfileUrl {
    /// Parses an href as found in page markup: absolute or root-relative,
    /// with or without tracking query parameters.
    pub fn parse(href: &str) -> Option<Self> {
        let trimmed = href.trim();
        if trimmed.is_empty() {
            return None;
        }
        // Root-relative hrefs resolve against the public host; anything
        // else must parse as an absolute URL on its own.
        let url = if trimmed.starts_with('/') {
            Url::parse(PUBLIC_PROFILE_BASE).ok()?.join(trimmed).ok()?
        } else {
            Url::parse(trimmed).ok()?
        };
        if !is_linkedin_host(&url) {
            return None;
        }
        let mut segments = url.path_segments()?;
        if segments.next()? != "in" {
            return None;
        }
        Self::from_handle(segments.next()?)
    }

    pub fn from_handle(handle: &str) -> Option<Self> {
        let handle = handle.trim().trim_matches('/');
        if handle.is_empty() || handle.starts_with(INTERNAL_HANDLE_PREFIX) {
            return None;
        }
        Some(Self {
            handle: handle.to_string(),
        })
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn canonical(&self) -> String {
        format!("{PUBLIC_PROFILE_BASE}{}", self.handle)
    }
}

impl fmt::Display for ProfileUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PUBLIC_PROFILE_BASE}{}", self.handle)
    }
}

fn is_linkedin_host(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| host == "linkedin.com" || host.ends_with(".linkedin.com"))
}

/// Removes duplicate handles keeping first-seen order. Idempotent.
pub fn dedupe(urls: Vec<ProfileUrl>) -> Vec<ProfileUrl> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.handle.clone()))
        .collect()
}
