use pretty_assertions::assert_eq;
use sourcer_engine::{
    company_people_profiles, first_profile_anchor, internal_handle_from_href,
    recruiter_profile_handle, recruiter_rows, search_result_profiles, ProfileUrl, RecruiterRow,
};

fn handles(urls: &[ProfileUrl]) -> Vec<&str> {
    urls.iter().map(ProfileUrl::handle).collect()
}

const SEARCH_PAGE: &str = r#"
<html><body>
  <ul class="reusable-search__entity-result-list">
    <li><a href="https://www.linkedin.com/in/alice?miniProfileUrn=urn%3Ali">Alice</a></li>
    <li><a href="/in/bob/">Bob</a></li>
    <li><a href="https://www.linkedin.com/in/alice">Alice again</a></li>
    <li><a href="https://www.linkedin.com/in/ACoAAbc123">Internal record</a></li>
    <li><a href="https://example.com/in/mallory">Elsewhere</a></li>
  </ul>
</body></html>
"#;

#[test]
fn search_page_anchors_dedupe_to_public_profiles() {
    let urls = search_result_profiles(SEARCH_PAGE);
    assert_eq!(handles(&urls), vec!["alice", "bob"]);
}

const COMPANY_PAGE: &str = r#"
<html><body>
  <div class="org-people-profile-card">
    <a href="https://www.linkedin.com/in/carol">Carol</a>
    <a href="https://www.linkedin.com/in/carol?follow=true">Follow</a>
  </div>
  <div class="org-people-profile-card">
    <a href="https://www.linkedin.com/in/dave">Dave</a>
  </div>
  <div class="org-people-profile-card"></div>
</body></html>
"#;

#[test]
fn company_cards_yield_one_profile_each() {
    let urls = company_people_profiles(COMPANY_PAGE);
    assert_eq!(handles(&urls), vec!["carol", "dave"]);
}

#[test]
fn unknown_company_layout_falls_back_to_anchor_scan() {
    let html = r#"<html><body>
        <div class="future-grid-layout"><a href="/in/erin">Erin</a></div>
    </body></html>"#;
    let urls = company_people_profiles(html);
    assert_eq!(handles(&urls), vec!["erin"]);
}

const RECRUITER_PAGE: &str = r#"
<html><body><ol>
  <li data-test-paginated-list-item>
    <input type="checkbox" checked>
    <a href="/talent/profile/ACoAA111?project=9">Row one</a>
  </li>
  <li data-test-paginated-list-item>
    <input type="checkbox">
    <a href="/talent/profile/ACoAA222">Row two</a>
  </li>
  <li data-test-paginated-list-item>
    <input type="checkbox" aria-checked="true">
    <a href="/talent/profile/ACoAA333#overview">Row three</a>
  </li>
  <li data-test-paginated-list-item>
    <input type="checkbox">
    <span>Row without a profile link</span>
  </li>
</ol></body></html>
"#;

#[test]
fn recruiter_rows_carry_handles_and_selection() {
    let rows = recruiter_rows(RECRUITER_PAGE);
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        RecruiterRow {
            internal_handle: "ACoAA111".to_string(),
            selected: true,
        }
    );
    assert_eq!(rows[1].internal_handle, "ACoAA222");
    assert!(!rows[1].selected);
    assert_eq!(rows[2].internal_handle, "ACoAA333");
    assert!(rows[2].selected);
}

#[test]
fn legacy_profile_list_rows_still_parse() {
    let html = r#"<html><body><ol class="profile-list">
        <li><a data-test-link-to-profile href="/talent/profile/ACoAA444">Row</a></li>
    </ol></body></html>"#;
    let rows = recruiter_rows(html);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].internal_handle, "ACoAA444");
    assert!(!rows[0].selected);
}

#[test]
fn first_anchor_skips_internal_handles() {
    let html = r#"<html><body>
        <a href="/in/ACoAAinternal">internal record</a>
        <a href="/in/frank">Frank</a>
    </body></html>"#;
    let url = first_profile_anchor(html).expect("public anchor");
    assert_eq!(url.handle(), "frank");
}

#[test]
fn recruiter_profile_subject_comes_from_internal_link() {
    let html = r#"<html><body>
        <div class="profile__topcard">
          <a href="https://www.linkedin.com/talent/profile/ACoAA555?trk=topcard">Jane</a>
        </div>
    </body></html>"#;
    assert_eq!(recruiter_profile_handle(html).as_deref(), Some("ACoAA555"));
}

#[test]
fn internal_handles_strip_query_fragment_and_trailing_path() {
    assert_eq!(
        internal_handle_from_href("/talent/profile/ACoAA1?x=1").as_deref(),
        Some("ACoAA1")
    );
    assert_eq!(
        internal_handle_from_href("https://www.linkedin.com/talent/profile/ACoAA2#top").as_deref(),
        Some("ACoAA2")
    );
    assert_eq!(
        internal_handle_from_href("/talent/profile/ACoAA3/recent-activity").as_deref(),
        Some("ACoAA3")
    );
    assert_eq!(internal_handle_from_href("/talent/profile/"), None);
    assert_eq!(internal_handle_from_href("/in/jane"), None);
}

#[test]
fn pages_without_profiles_extract_nothing() {
    let html = "<html><body><p>Nothing to see</p></body></html>";
    assert!(search_result_profiles(html).is_empty());
    assert!(company_people_profiles(html).is_empty());
    assert!(recruiter_rows(html).is_empty());
    assert!(first_profile_anchor(html).is_none());
}
