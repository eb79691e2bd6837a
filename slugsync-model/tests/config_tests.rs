use pretty_assertions::assert_eq;
use slugsync_model::{AppConfig, ContentModelConfig, InstanceConfig};
use slugsync_types::LocaleCode;

fn en() -> LocaleCode {
    LocaleCode::from("en-US")
}

fn de() -> LocaleCode {
    LocaleCode::from("de-DE")
}

const STORED: &str = r##"{
    "pathPrefix": "https://example.com",
    "showPathPrefix": false,
    "customReplacements": [["&", " und "], ["@", " at "]],
    "lockWhenPublished": true,
    "maintainCase": true,
    "preserveLeadingUnderscore": true,
    "showCopyButton": true,
    "showPreviewLink": false,
    "preserveCharacters": ["#", "."],
    "paths": {"en-US": "en", "de-DE": "de"},
    "models": {
        "blogPost": {
            "id": "blogPost",
            "slugField": "slug",
            "patterns": {"en-US": "[locale]/[field:title]", "de-DE": "[locale]/blog/[field:title]"}
        }
    }
}"##;

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parses_stored_parameters() {
    let config = AppConfig::from_json(STORED).unwrap();
    assert_eq!(config.path_prefix, "https://example.com");
    assert!(!config.show_path_prefix);
    assert_eq!(
        config.custom_replacements,
        vec![("&".to_string(), " und ".to_string()), ("@".to_string(), " at ".to_string())]
    );
    assert!(config.lock_when_published);
    assert!(config.maintain_case);
    assert!(config.preserve_leading_underscore);
    assert!(config.show_copy_button);
    assert!(!config.show_preview_link);
    assert_eq!(config.preserve_characters, vec!["#".to_string(), ".".to_string()]);
    assert_eq!(config.slug_field("blogPost"), Some("slug"));
}

#[test]
fn missing_keys_take_field_defaults() {
    let config = AppConfig::from_json("{}").unwrap();
    assert_eq!(config, AppConfig::default());
    assert!(config.show_path_prefix);
    assert!(config.show_preview_link);
    assert!(!config.lock_when_published);
    assert!(!config.maintain_case);
}

#[test]
fn initial_config_locks_when_published() {
    let config = AppConfig::initial();
    assert!(config.lock_when_published);
    assert!(config.models.is_empty());
}

#[test]
fn invalid_json_is_an_error() {
    assert!(AppConfig::from_json("{\"models\": 3}").is_err());
    assert!(AppConfig::from_json("not json").is_err());
}

#[test]
fn json_roundtrip() {
    let config = AppConfig::from_json(STORED).unwrap();
    let json = config.to_json().unwrap();
    assert_eq!(AppConfig::from_json(&json).unwrap(), config);
}

// ── Pattern lookup ───────────────────────────────────────────────

#[test]
fn pattern_for_exact_locale() {
    let config = AppConfig::from_json(STORED).unwrap();
    assert_eq!(config.pattern_for("blogPost", &de(), &en()), Some("[locale]/blog/[field:title]"));
}

#[test]
fn pattern_for_falls_back_to_default_locale() {
    let config = AppConfig::from_json(STORED).unwrap();
    assert_eq!(
        config.pattern_for("blogPost", &LocaleCode::from("fr-FR"), &en()),
        Some("[locale]/[field:title]")
    );
}

#[test]
fn blank_pattern_falls_back() {
    let mut config = AppConfig::default();
    config.models.insert(
        "page".into(),
        ContentModelConfig::new("page", "slug")
            .with_pattern(en(), "[field:title]")
            .with_pattern(de(), "  "),
    );
    assert_eq!(config.pattern_for("page", &de(), &en()), Some("[field:title]"));
}

#[test]
fn pattern_for_unknown_model() {
    let config = AppConfig::from_json(STORED).unwrap();
    assert_eq!(config.pattern_for("product", &en(), &en()), None);
}

// ── Locale paths ─────────────────────────────────────────────────

#[test]
fn locale_path_lookup_and_fallback() {
    let config = AppConfig::from_json(STORED).unwrap();
    assert_eq!(config.locale_path(&de(), &en()), Some("de"));
    assert_eq!(config.locale_path(&LocaleCode::from("it-IT"), &en()), Some("en"));
    assert_eq!(AppConfig::default().locale_path(&de(), &en()), None);
}

// ── Presentation ─────────────────────────────────────────────────

#[test]
fn preview_url_requires_prefix_and_value() {
    let mut config = AppConfig::default();
    let instance = InstanceConfig::default();
    assert_eq!(config.preview_url("my-slug", &instance), None);

    config.path_prefix = "https://example.com".into();
    assert_eq!(config.preview_url("", &instance), None);
    assert_eq!(
        config.preview_url("my-slug", &instance),
        Some("https://example.com/my-slug".to_string())
    );
}

#[test]
fn preview_url_disabled_by_both_toggles() {
    let config = AppConfig {
        path_prefix: "https://example.com".into(),
        show_preview_link: false,
        ..AppConfig::default()
    };
    let instance = InstanceConfig {
        show_preview_url: false,
        ..InstanceConfig::default()
    };
    assert_eq!(config.preview_url("x", &instance), None);
    assert!(config.preview_url("x", &InstanceConfig::default()).is_some());
}

#[test]
fn prefix_visibility() {
    let config = AppConfig {
        path_prefix: "https://example.com".into(),
        show_path_prefix: false,
        ..AppConfig::default()
    };
    let hidden = InstanceConfig {
        show_website_url: false,
        ..InstanceConfig::default()
    };
    assert!(!config.shows_prefix(&hidden));
    assert!(config.shows_prefix(&InstanceConfig::default()));
    assert!(!AppConfig::default().shows_prefix(&InstanceConfig::default()));
}

#[test]
fn copy_text_joins_prefix() {
    let config = AppConfig {
        path_prefix: "https://example.com".into(),
        ..AppConfig::default()
    };
    assert_eq!(config.copy_text("a/b"), "https://example.com/a/b");
}
