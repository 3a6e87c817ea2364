use sourcer_engine::{dedupe, ProfileUrl, INTERNAL_HANDLE_PREFIX, PUBLIC_PROFILE_BASE};

#[test]
fn parse_accepts_absolute_and_root_relative_hrefs() {
    let absolute = ProfileUrl::parse("https://www.linkedin.com/in/jane-doe").expect("absolute");
    assert_eq!(absolute.handle(), "jane-doe");

    let relative = ProfileUrl::parse("/in/jane-doe/").expect("root-relative");
    assert_eq!(relative.handle(), "jane-doe");

    let bare_host = ProfileUrl::parse("https://linkedin.com/in/jane-doe").expect("bare host");
    assert_eq!(bare_host.handle(), "jane-doe");
}

#[test]
fn parse_strips_query_and_fragment() {
    let url = ProfileUrl::parse(
        "https://www.linkedin.com/in/jane-doe?miniProfileUrn=urn%3Ali%3Afs#experience",
    )
    .expect("tracked href");
    assert_eq!(url.handle(), "jane-doe");
    assert_eq!(url.canonical(), format!("{PUBLIC_PROFILE_BASE}jane-doe"));
}

#[test]
fn parse_rejects_non_profile_input() {
    assert!(ProfileUrl::parse("https://example.com/in/jane-doe").is_none());
    assert!(ProfileUrl::parse("https://www.linkedin.com/company/acme").is_none());
    assert!(ProfileUrl::parse("https://www.linkedin.com/in/").is_none());
    assert!(ProfileUrl::parse("/pub/in/jane-doe").is_none());
    assert!(ProfileUrl::parse("not a url").is_none());
    assert!(ProfileUrl::parse("").is_none());
}

#[test]
fn internal_handles_never_become_profiles() {
    let href = format!("https://www.linkedin.com/in/{INTERNAL_HANDLE_PREFIX}xYz123");
    assert!(ProfileUrl::parse(&href).is_none());
    assert!(ProfileUrl::from_handle("ACoAAbC123").is_none());
    assert!(ProfileUrl::from_handle("  ").is_none());
}

#[test]
fn two_hrefs_with_one_handle_are_equal() {
    let plain = ProfileUrl::parse("https://www.linkedin.com/in/jane-doe").expect("plain");
    let tracked =
        ProfileUrl::parse("https://www.linkedin.com/in/jane-doe/?trk=search").expect("tracked");
    assert_eq!(plain, tracked);
}

#[test]
fn dedupe_keeps_first_seen_order_and_is_idempotent() {
    let urls = vec![
        ProfileUrl::from_handle("alice").expect("alice"),
        ProfileUrl::from_handle("bob").expect("bob"),
        ProfileUrl::from_handle("alice").expect("alice again"),
        ProfileUrl::from_handle("carol").expect("carol"),
        ProfileUrl::from_handle("bob").expect("bob again"),
    ];

    let once = dedupe(urls);
    let handles: Vec<&str> = once.iter().map(ProfileUrl::handle).collect();
    assert_eq!(handles, vec!["alice", "bob", "carol"]);

    let twice = dedupe(once.clone());
    assert_eq!(once, twice);
}
