use sourcer_engine::{classify, Strategy};

#[test]
fn public_profile_pages_classify_as_single() {
    assert_eq!(
        classify("https://www.linkedin.com/in/jane-doe/"),
        Some(Strategy::SingleProfile)
    );
    assert_eq!(
        classify("https://www.linkedin.com/in/jane-doe?original_referer=x"),
        Some(Strategy::SingleProfile)
    );
}

#[test]
fn people_search_classifies_as_search_results() {
    assert_eq!(
        classify("https://www.linkedin.com/search/results/people/?keywords=rust"),
        Some(Strategy::SearchResults)
    );
}

#[test]
fn company_people_tab_classifies_as_company_people() {
    assert_eq!(
        classify("https://www.linkedin.com/company/acme/people/"),
        Some(Strategy::CompanyPeople)
    );
    // The company overview tab has no people listing.
    assert_eq!(classify("https://www.linkedin.com/company/acme/about/"), None);
}

#[test]
fn recruiter_pipeline_classifies_as_recruiter_list() {
    assert_eq!(
        classify("https://www.linkedin.com/talent/hire/456/manage/all"),
        Some(Strategy::RecruiterList)
    );
}

#[test]
fn recruiter_search_and_profile_views_classify_as_recruiter_profile() {
    assert_eq!(
        classify("https://www.linkedin.com/talent/search?project=456"),
        Some(Strategy::RecruiterProfile)
    );
    assert_eq!(
        classify("https://www.linkedin.com/talent/profile/ACoAAbc123"),
        Some(Strategy::RecruiterProfile)
    );
}

#[test]
fn recruiter_paths_never_classify_as_public_surfaces() {
    // A recruiter URL mentioning people-search-like segments stays in the
    // talent branch.
    assert_eq!(classify("https://www.linkedin.com/talent/home"), None);
    assert_eq!(
        classify("https://www.linkedin.com/talent/hire/456/discover/recommended"),
        None
    );
}

#[test]
fn unrelated_pages_classify_as_none() {
    assert_eq!(classify("https://www.linkedin.com/feed/"), None);
    assert_eq!(classify("https://www.linkedin.com/in/"), None);
    assert_eq!(classify("https://example.com/in/jane-doe"), None);
    assert_eq!(classify("not a url"), None);
}
