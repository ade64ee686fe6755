use super::*;

// =============================================================================
// cookie header / file format
// =============================================================================

#[test]
fn cookie_pairs_splits_header() {
    let pairs = cookie_pairs("csrftoken=abc; sessionid=xyz");
    assert_eq!(
        pairs,
        vec![("csrftoken".to_owned(), "abc".to_owned()), ("sessionid".to_owned(), "xyz".to_owned())]
    );
}

#[test]
fn cookie_pairs_skips_malformed_entries() {
    assert_eq!(cookie_pairs("junk; =nameless; a=1"), vec![("a".to_owned(), "1".to_owned())]);
    assert!(cookie_pairs("").is_empty());
}

#[test]
fn cookie_file_ignores_blank_and_comment_lines() {
    let text = "# saved cookies\n\ncsrftoken=abc\n  sessionid = xyz  \n";
    assert_eq!(
        parse_cookie_file(text),
        vec![("csrftoken".to_owned(), "abc".to_owned()), ("sessionid".to_owned(), "xyz".to_owned())]
    );
}

#[test]
fn rendered_file_parses_back() {
    let pairs = vec![("csrftoken".to_owned(), "abc".to_owned())];
    assert_eq!(render_cookie_file(&pairs), "csrftoken=abc\n");
    assert_eq!(parse_cookie_file(&render_cookie_file(&pairs)), pairs);
}

// =============================================================================
// jar
// =============================================================================

#[test]
fn jar_rejects_bad_base_url() {
    assert!(matches!(CookieJar::new("not a url"), Err(CliError::InvalidBaseUrl(_))));
}

#[test]
fn jar_serves_inserted_cookies_as_source() {
    let jar = CookieJar::new("http://localhost:8000").expect("jar");
    assert_eq!(jar.cookie("csrftoken"), None);
    jar.insert("csrftoken", "tok123");
    assert_eq!(jar.cookie("csrftoken").as_deref(), Some("tok123"));
    assert_eq!(jar.cookie("sessionid"), None);
}

#[test]
fn jar_load_of_missing_file_is_empty() {
    let jar = CookieJar::new("http://localhost:8000").expect("jar");
    let path = std::env::temp_dir().join("hirevoo-cli-missing-cookie-file");
    let _ = std::fs::remove_file(&path);
    jar.load(&path).expect("missing file is fine");
    assert_eq!(jar.header(), "");
}

#[test]
fn jar_save_then_load_restores_cookies() {
    let path = std::env::temp_dir().join(format!("hirevoo-cli-cookies-{}", std::process::id()));
    let first = CookieJar::new("http://localhost:8000").expect("jar");
    first.insert("sessionid", "s1");
    first.save(&path).expect("save");

    let second = CookieJar::new("http://localhost:8000").expect("jar");
    second.load(&path).expect("load");
    assert_eq!(second.cookie("sessionid").as_deref(), Some("s1"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn methods_map_to_reqwest() {
    assert_eq!(reqwest_method(Method::Get), reqwest::Method::GET);
    assert_eq!(reqwest_method(Method::Post), reqwest::Method::POST);
    assert_eq!(reqwest_method(Method::Put), reqwest::Method::PUT);
}
