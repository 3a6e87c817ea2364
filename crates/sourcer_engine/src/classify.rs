use url::Url;

use crate::types::Strategy;

/// Decides the harvesting strategy for a page from its URL alone. Returns
/// `None` for pages no strategy covers. Recruiter surfaces are matched before
/// the public ones so `/talent/...` paths never classify as plain profiles.
///
/// Callers re-run this on every navigation; nothing is cached.
pub fn classify(page_url: &str) -> Option<Strategy> {
    let url = Url::parse(page_url.trim()).ok()?;
    let host_ok = url
        .host_str()
        .is_some_and(|host| host == "linkedin.com" || host.ends_with(".linkedin.com"));
    if !host_ok {
        return None;
    }

    let path = url.path();
    if path.starts_with("/talent/") {
        if path.starts_with("/talent/hire/") && path.contains("/manage") {
            return Some(Strategy::RecruiterList);
        }
        if path.starts_with("/talent/search") || path.starts_with("/talent/profile/") {
            return Some(Strategy::RecruiterProfile);
        }
        return None;
    }
    if path.starts_with("/search/results/people") {
        return Some(Strategy::SearchResults);
    }
    if path.starts_with("/company/") && has_segment(path, "people") {
        return Some(Strategy::CompanyPeople);
    }
    if path.starts_with("/in/") && path.len() > "/in/".len() {
        return Some(Strategy::SingleProfile);
    }
    None
}

fn has_segment(path: &str, segment: &str) -> bool {
    path.split('/').any(|part| part == segment)
}
