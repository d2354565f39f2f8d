use figdesk::services::navigation_policy::*;
use figdesk::types::settings::PopupSettings;
use rstest::rstest;

const RECENT: &str = "https://www.figma.com/files/recent";

#[test]
fn test_target_site_popup_redirects_to_tab() {
    let verdict = decide_popup("https://www.figma.com/file/abc", Some(RECENT), PopupShape::default());
    assert_eq!(
        verdict,
        PopupVerdict::RedirectToTab("https://www.figma.com/file/abc".to_string())
    );
}

#[test]
fn test_foreign_popup_is_deflected() {
    let verdict = decide_popup("https://example.com", Some(RECENT), PopupShape::default());
    assert_eq!(verdict, PopupVerdict::Deflect("https://example.com".to_string()));
}

#[rstest]
#[case("https://accounts.google.com/o/oauth2/v2/auth", Some(RECENT))]
#[case("https://www.figma.com/login", Some(RECENT))]
#[case("about:blank", Some(RECENT))]
#[case("", None)]
fn test_auth_and_placeholder_popups_are_allowed(#[case] url: &str, #[case] referrer: Option<&str>) {
    let shape = PopupShape::default();
    assert_eq!(decide_popup(url, referrer, shape), PopupVerdict::AllowAuthPopup(shape));
}

#[test]
fn test_auth_continuation_stays_in_popup() {
    let referrer = Some("https://accounts.google.com/signin/oauth/consent");
    let url = "https://www.figma.com/finish_google_sso";
    assert!(is_auth_continuation(url, referrer));
    assert!(matches!(
        decide_popup(url, referrer, PopupShape::default()),
        PopupVerdict::AllowAuthPopup(_)
    ));
}

#[test]
fn test_continuation_needs_auth_referrer() {
    assert!(!is_auth_continuation("https://www.figma.com/file/x", Some(RECENT)));
    assert!(!is_auth_continuation("https://www.figma.com/file/x", None));
    assert!(!is_auth_continuation("https://example.com", Some("https://accounts.google.com/")));
}

#[test]
fn test_malformed_popup_target_is_deflected_not_allowed() {
    let verdict = decide_popup("javascript:alert(1)", Some(RECENT), PopupShape::default());
    assert_eq!(verdict, PopupVerdict::Deflect("javascript:alert(1)".to_string()));
}

#[rstest]
#[case("https://www.figma.com/file/abc", true)]
#[case("https://accounts.google.com/signin", true)]
#[case("https://example.com", false)]
#[case("http://www.figma.com/file/abc", false)]
#[case("about:blank", false)]
fn test_tab_navigation(#[case] url: &str, #[case] allowed: bool) {
    assert_eq!(decide_navigation(url).is_allowed(), allowed);
}

#[test]
fn test_tab_navigation_deflects_with_original_url() {
    assert_eq!(
        decide_navigation("https://example.com/docs"),
        NavigationVerdict::Deflect("https://example.com/docs".to_string())
    );
}

#[test]
fn test_popup_navigation_accepts_placeholder() {
    assert!(decide_popup_navigation("about:blank").is_allowed());
    assert!(decide_popup_navigation("https://accounts.google.com/").is_allowed());
    assert!(!decide_popup_navigation("https://example.com").is_allowed());
}

#[test]
fn test_popup_shape_is_clamped() {
    let tiny = PopupShape::from_settings(&PopupSettings { width: 10.0, height: 10.0 });
    assert_eq!(tiny, PopupShape { width: 400.0, height: 500.0 });

    let huge = PopupShape::from_settings(&PopupSettings { width: 5000.0, height: 5000.0 });
    assert_eq!(huge, PopupShape { width: 1000.0, height: 900.0 });

    assert_eq!(PopupShape::default(), PopupShape { width: 500.0, height: 700.0 });
}
