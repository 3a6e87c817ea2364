use scraper::{ElementRef, Html, Selector};

use crate::profile::{dedupe, ProfileUrl};

const PROFILE_ANCHOR: &str = "a[href*='/in/']";

/// A recruiter list row before its public URL has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecruiterRow {
    pub internal_handle: String,
    pub selected: bool,
}

/// Generic anchor scan: every profile link on the page, deduplicated.
/// This is the whole strategy for search result pages.
pub fn search_result_profiles(html: &str) -> Vec<ProfileUrl> {
    let doc = Html::parse_document(html);
    let Ok(anchor) = Selector::parse(PROFILE_ANCHOR) else {
        return Vec::new();
    };
    let urls = doc
        .select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(ProfileUrl::parse)
        .collect();
    dedupe(urls)
}

/// Company people grids wrap each person in a profile card; the first profile
/// link in a card is the person it shows. Card markup shifts between page
/// variants, so unknown layouts fall back to the generic anchor scan.
pub fn company_people_profiles(html: &str) -> Vec<ProfileUrl> {
    let card_selectors = [
        ".org-people-profile-card",
        "li.org-people-profile-card__profile-card-spacing",
        ".artdeco-entity-lockup",
    ];

    let doc = Html::parse_document(html);
    let Ok(anchor) = Selector::parse(PROFILE_ANCHOR) else {
        return Vec::new();
    };
    for selector_str in card_selectors {
        let Ok(card) = Selector::parse(selector_str) else {
            continue;
        };
        let urls: Vec<ProfileUrl> = doc
            .select(&card)
            .filter_map(|element| {
                element
                    .select(&anchor)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .and_then(ProfileUrl::parse)
            })
            .collect();
        if !urls.is_empty() {
            return dedupe(urls);
        }
    }
    search_result_profiles(html)
}

/// Recruiter list rows expose only internal profile identifiers plus a
/// selection checkbox; resolution to public URLs happens later.
pub fn recruiter_rows(html: &str) -> Vec<RecruiterRow> {
    let row_selectors = [
        "li[data-test-paginated-list-item]",
        "ol.profile-list > li",
        "li.profile-list-item",
    ];

    let doc = Html::parse_document(html);
    for selector_str in row_selectors {
        let Ok(row_sel) = Selector::parse(selector_str) else {
            continue;
        };
        let rows: Vec<RecruiterRow> = doc.select(&row_sel).filter_map(parse_row).collect();
        if !rows.is_empty() {
            return rows;
        }
    }
    Vec::new()
}

/// First public profile link in the document, used by search-mode single adds.
pub fn first_profile_anchor(html: &str) -> Option<ProfileUrl> {
    let doc = Html::parse_document(html);
    let anchor = Selector::parse(PROFILE_ANCHOR).ok()?;
    doc.select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| ProfileUrl::parse(href))
}

/// Subject of a recruiter profile view, read from its first internal link.
pub fn recruiter_profile_handle(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let anchor = Selector::parse("a[href*='/talent/profile/']").ok()?;
    doc.select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .find_map(internal_handle_from_href)
}

/// Pulls the opaque member id out of an internal profile href or URL.
pub fn internal_handle_from_href(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("/talent/profile/")?;
    let handle = rest.split(['?', '#', '/']).next()?.trim();
    (!handle.is_empty()).then(|| handle.to_string())
}

fn parse_row(row: ElementRef) -> Option<RecruiterRow> {
    let link_selectors = [
        "a[href*='/talent/profile/']",
        "a[data-test-link-to-profile]",
    ];

    let mut internal_handle = None;
    for selector_str in link_selectors {
        let Ok(sel) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(href) = row.select(&sel).next().and_then(|a| a.value().attr("href")) {
            internal_handle = internal_handle_from_href(href);
            if internal_handle.is_some() {
                break;
            }
        }
    }

    Some(RecruiterRow {
        internal_handle: internal_handle?,
        selected: row_is_selected(row),
    })
}

fn row_is_selected(row: ElementRef) -> bool {
    let Ok(sel) = Selector::parse("input[type='checkbox']") else {
        return false;
    };
    row.select(&sel).next().is_some_and(|checkbox| {
        checkbox.value().attr("checked").is_some()
            || checkbox.value().attr("aria-checked") == Some("true")
    })
}
