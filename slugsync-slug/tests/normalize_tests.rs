use pretty_assertions::assert_eq;
use slugsync_model::AppConfig;
use slugsync_slug::{NormalizationPolicy, normalize, normalize_manual};

fn default_policy() -> NormalizationPolicy {
    NormalizationPolicy::default()
}

// ── Basic normalization ──────────────────────────────────────────

#[test]
fn lowercases_and_hyphenates() {
    assert_eq!(normalize("Hello World!", &default_policy()), "hello-world");
}

#[test]
fn collapses_runs_and_trims() {
    assert_eq!(normalize("  --Hello,   World--  ", &default_policy()), "hello-world");
    assert_eq!(normalize("a___b...c", &default_policy()), "a-b-c");
}

#[test]
fn keeps_digits() {
    assert_eq!(normalize("Top 10 Tips (2024)", &default_policy()), "top-10-tips-2024");
}

#[test]
fn empty_and_symbol_only_inputs() {
    assert_eq!(normalize("", &default_policy()), "");
    assert_eq!(normalize("!!! ???", &default_policy()), "");
}

#[test]
fn transliterates_non_ascii() {
    assert_eq!(normalize("Grüße aus Köln", &default_policy()), "grusse-aus-koln");
    assert_eq!(normalize("Crème Brûlée", &default_policy()), "creme-brulee");
}

#[test]
fn maintains_case_when_not_lowercasing() {
    let policy = default_policy().with_lowercase(false);
    assert_eq!(normalize("Hello World", &policy), "Hello-World");
}

#[test]
fn splits_camel_case_words() {
    assert_eq!(normalize("fooBar HelloWorld", &default_policy()), "foo-bar-hello-world");
    assert_eq!(normalize("XMLHttpRequest", &default_policy()), "xml-http-request");
    assert_eq!(normalize("ABC123 abc123", &default_policy()), "abc-123-abc123");
    assert_eq!(normalize("iPhone 15", &default_policy()), "i-phone-15");
}

#[test]
fn plural_acronyms_stay_whole() {
    assert_eq!(normalize("APIs", &default_policy()), "apis");
}

#[test]
fn camel_case_split_keeps_case_when_maintained() {
    let policy = default_policy().with_lowercase(false);
    let once = normalize("fooBar XMLHttp", &policy);
    assert_eq!(once, "foo-Bar-XML-Http");
    assert_eq!(normalize(&once, &policy), once);
}

#[test]
fn strips_slashes_by_default() {
    assert_eq!(normalize("a/b", &default_policy()), "a-b");
}

// ── Replacements ─────────────────────────────────────────────────

#[test]
fn builtin_ampersand_replacement() {
    assert_eq!(normalize("Salt & Pepper", &default_policy()), "salt-and-pepper");
}

#[test]
fn builtin_symbol_replacements() {
    assert_eq!(normalize("I \u{2665} Rust", &default_policy()), "i-love-rust");
    assert_eq!(normalize("\u{1F984} Club", &default_policy()), "unicorn-club");
}

#[test]
fn custom_replacement_overrides_builtin() {
    let policy = default_policy().with_replacement("&", " und ");
    assert_eq!(normalize("Salz & Pfeffer", &policy), "salz-und-pfeffer");
}

#[test]
fn custom_replacements_apply_in_order() {
    let policy = default_policy()
        .with_replacement("ab", " first ")
        .with_replacement("b", " second ");
    assert_eq!(normalize("ab", &policy), "first");
    assert_eq!(normalize("b", &policy), "second");
}

#[test]
fn custom_replacement_runs_before_transliteration() {
    let policy = default_policy().with_replacement("ü", "ue");
    assert_eq!(normalize("Grüße", &policy), "gruesse");
}

#[test]
fn empty_replacement_key_is_ignored() {
    let policy = default_policy().with_replacement("", "x");
    assert_eq!(normalize("abc", &policy), "abc");
}

// ── Preserved characters ─────────────────────────────────────────

#[test]
fn preserved_characters_survive() {
    let policy = default_policy().preserving(['#']);
    assert_eq!(normalize("a#b", &policy), "a#b");
}

#[test]
fn preserved_characters_are_separated_from_words() {
    let policy = default_policy().preserving(['.']);
    assert_eq!(normalize("Version 1.2 notes", &policy), "version-1.2-notes");
    assert_eq!(normalize("a . b", &policy), "a-.-b");
}

#[test]
fn preserved_non_ascii_is_not_transliterated() {
    let policy = default_policy().preserving(['ß']);
    assert_eq!(normalize("Straße", &policy), "straße");
}

#[test]
fn preserved_letters_follow_the_case_policy() {
    let policy = default_policy().preserving(['Ä']);
    assert_eq!(normalize("ÄRGER", &policy), "ärger");
    assert_eq!(normalize("ärger", &policy), "ärger");

    let kept = default_policy().with_lowercase(false).preserving(['Ä']);
    assert_eq!(normalize("ÄRGER", &kept), "ÄRGER");
}

#[test]
fn preserved_slash_keeps_path_segments() {
    let policy = default_policy().preserving(['/']);
    assert_eq!(normalize("News/Local Events", &policy), "news/local-events");
}

// ── Leading underscore ───────────────────────────────────────────

#[test]
fn leading_underscore_is_stripped_by_default() {
    assert_eq!(normalize("_draft post", &default_policy()), "draft-post");
}

#[test]
fn leading_underscore_is_kept_when_enabled() {
    let policy = default_policy().with_leading_underscore(true);
    assert_eq!(normalize("_draft post", &policy), "_draft-post");
    assert_eq!(normalize("draft post", &policy), "draft-post");
}

#[test]
fn leading_underscore_not_doubled_when_preserved() {
    let policy = default_policy().with_leading_underscore(true).preserving(['_']);
    assert_eq!(normalize("_a_b", &policy), "_a_b");
}

// ── Config mapping ───────────────────────────────────────────────

#[test]
fn policy_from_config() {
    let config = AppConfig {
        maintain_case: true,
        preserve_leading_underscore: true,
        preserve_characters: vec!["#".into(), ".~".into()],
        custom_replacements: vec![("@".into(), " at ".into())],
        ..AppConfig::default()
    };
    let policy = NormalizationPolicy::from_config(&config);
    assert!(!policy.lowercase);
    assert!(policy.preserve_leading_underscore);
    assert!(policy.preserves('#'));
    assert!(policy.preserves('.'));
    assert!(policy.preserves('~'));
    assert_eq!(normalize("Mail @ Home", &policy), "Mail-at-Home");
}

#[test]
fn default_config_gives_default_policy() {
    assert_eq!(NormalizationPolicy::from_config(&AppConfig::default()), default_policy());
}

// ── Manual edits ─────────────────────────────────────────────────

#[test]
fn manual_edit_is_normalized() {
    assert_eq!(
        normalize_manual("My Custom Slug", &default_policy()),
        Some("my-custom-slug".to_string())
    );
}

#[test]
fn manual_edit_keeps_typed_hyphens() {
    assert_eq!(normalize_manual("my-", &default_policy()), Some("my-".to_string()));
    assert_eq!(normalize_manual("a--b", &default_policy()), Some("a--b".to_string()));
}

#[test]
fn manual_edit_normalizes_each_part() {
    assert_eq!(
        normalize_manual("Hello World-Über Uns", &default_policy()),
        Some("hello-world-uber-uns".to_string())
    );
}

#[test]
fn manual_edit_keeps_path_segments() {
    assert_eq!(
        normalize_manual("hello-world/dex", &default_policy()),
        Some("hello-world/dex".to_string())
    );
    assert_eq!(
        normalize_manual("News/Local Events", &default_policy()),
        Some("news/local-events".to_string())
    );
}

#[test]
fn manual_edit_empty_clears() {
    assert_eq!(normalize_manual("", &default_policy()), None);
    assert_eq!(normalize_manual("!!!", &default_policy()), None);
}
