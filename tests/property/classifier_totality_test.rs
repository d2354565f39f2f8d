//! Property-based tests for the URL classifier.
//!
//! The predicates must answer for any input without panicking, and the
//! derived predicates must stay consistent with the basic ones.

use figdesk::services::navigation_policy::{decide_navigation, decide_popup, PopupShape, PopupVerdict};
use figdesk::services::url_classifier::*;
use proptest::prelude::*;

const HOSTS: &[&str] = &[
    "www.figma.com",
    "figma.com",
    "evilfigma.com",
    "figma.com.evil.net",
    "accounts.google.com",
    "login.microsoftonline.com",
    "acme.okta.com",
    "example.com",
    "blank",
];

const PATHS: &[&str] = &["", "/login", "/file/abc", "/oauth/x"];

/// Strategy for URL-like strings built from the pieces the classifier cares
/// about: scheme, host (target site, identity providers, look-alikes) and path.
fn arb_url_like() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("https://"), Just("http://"), Just("ftp://"), Just(""), Just("about:")],
        prop_oneof![
            3 => prop::sample::select(HOSTS).prop_map(str::to_string),
            1 => "[a-z]{1,10}\\.[a-z]{2,3}",
        ],
        prop_oneof![
            prop::sample::select(PATHS).prop_map(str::to_string),
            "/[a-z0-9/]{0,12}",
        ],
    )
        .prop_map(|(scheme, host, path)| format!("{}{}{}", scheme, host, path))
}

// For any input, no predicate panics, and the implications between them hold:
// target-site and auth URLs are secure, restorable URLs are secure and either
// target-site or auth.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn classifier_is_total_on_arbitrary_strings(s in any::<String>()) {
        let secure = is_secure_url(&s);
        let target = is_target_site_url(&s);
        let auth = is_auth_url(&s);
        let _ = is_placeholder_url(Some(&s));

        prop_assert!(!target || secure);
        prop_assert!(!auth || secure);
        prop_assert_eq!(is_restorable(&s), secure && (target || auth));
    }

    #[test]
    fn classifier_implications_on_url_like_input(u in arb_url_like()) {
        let secure = is_secure_url(&u);
        prop_assert!(!is_target_site_url(&u) || secure, "target but insecure: {}", u);
        prop_assert!(!is_auth_url(&u) || secure, "auth but insecure: {}", u);
        prop_assert!(!is_restorable(&u) || secure, "restorable but insecure: {}", u);

        if !u.starts_with("https://") {
            prop_assert!(!secure, "non-https counted secure: {}", u);
        }
    }

    #[test]
    fn tab_navigation_allows_exactly_target_or_auth(u in arb_url_like()) {
        let expected = is_target_site_url(&u) || is_auth_url(&u);
        prop_assert_eq!(decide_navigation(&u).is_allowed(), expected);
    }

    #[test]
    fn popup_verdict_never_redirects_auth(u in arb_url_like()) {
        let verdict = decide_popup(&u, Some(DEFAULT_URL), PopupShape::default());
        if is_auth_url(&u) || is_placeholder_url(Some(&u)) {
            prop_assert!(matches!(verdict, PopupVerdict::AllowAuthPopup(_)), "{}: {:?}", u, verdict);
        } else if is_target_site_url(&u) {
            prop_assert_eq!(verdict, PopupVerdict::RedirectToTab(u.clone()));
        } else {
            prop_assert_eq!(verdict, PopupVerdict::Deflect(u.clone()));
        }
    }
}
