use pretty_assertions::assert_eq;
use slugsync_cli::{StaticFetcher, load_config, load_entry, load_references, normalize_text, preview};
use slugsync_model::AppConfig;
use slugsync_types::{DateParts, FixedDate, LocaleCode};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

const CONFIG: &str = r#"{
    "pathPrefix": "https://example.com",
    "lockWhenPublished": true,
    "paths": { "en-US": "en", "de-DE": "de" },
    "models": {
        "blogPost": {
            "id": "blogPost",
            "slugField": "slug",
            "patterns": { "en-US": "[locale]/[field:title]" }
        },
        "page": {
            "id": "page",
            "slugField": "slug",
            "patterns": { "en-US": "[field:author:name]/[year]/[field:title]" }
        }
    }
}"#;

const POST: &str = r#"{
    "sys": { "id": "post-1", "contentType": "blogPost", "version": 3 },
    "fields": {
        "title": { "en-US": "Hello World!", "de-DE": "Hallo Welt!" }
    }
}"#;

const PAGE: &str = r#"{
    "sys": { "id": "page-1", "contentType": "page", "version": 6, "publishedVersion": 5 },
    "fields": {
        "title": { "en-US": "About Us" },
        "author": { "en-US": { "sys": { "type": "Link", "linkType": "Entry", "id": "author-1" } } }
    }
}"#;

const REFERENCES: &str = r#"[
    {
        "sys": { "id": "author-1", "contentType": "person" },
        "fields": { "name": { "en-US": "Jane Doe" } }
    }
]"#;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn dates() -> FixedDate {
    FixedDate(DateParts::new(2024, 3, 7).unwrap())
}

fn en() -> LocaleCode {
    LocaleCode::from("en-US")
}

fn de() -> LocaleCode {
    LocaleCode::from("de-DE")
}

// ── Loading ──────────────────────────────────────────────────────

#[test]
fn loads_config_and_entry_files() {
    let dir = TempDir::new().unwrap();
    let config = load_config(&write_file(&dir, "app.json", CONFIG)).unwrap();
    let entry = load_entry(&write_file(&dir, "post.json", POST)).unwrap();

    assert!(config.lock_when_published);
    assert_eq!(config.slug_field("blogPost"), Some("slug"));
    assert_eq!(entry.content_type(), "blogPost");
    assert_eq!(entry.sys.version, 3);
}

#[test]
fn loads_references() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(REFERENCES.as_bytes()).unwrap();

    let references = load_references(file.path()).unwrap();
    assert_eq!(references.len(), 1);
}

#[test]
fn missing_file_names_the_path() {
    let err = load_config(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.json"));
}

#[test]
fn invalid_json_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "broken.json", "{ not json");
    assert!(load_entry(&path).is_err());
    assert!(StaticFetcher::from_json("{}").is_err());
}

// ── Preview ──────────────────────────────────────────────────────

#[tokio::test]
async fn previews_slug_per_locale() {
    let dir = TempDir::new().unwrap();
    let config = load_config(&write_file(&dir, "app.json", CONFIG)).unwrap();
    let entry = load_entry(&write_file(&dir, "post.json", POST)).unwrap();
    let references = Arc::new(StaticFetcher::default());

    let english = preview(&config, &entry, references.clone(), &en(), &en(), &dates())
        .await
        .unwrap();
    assert_eq!(english.outcome.slug, "en/hello-world");
    assert!(!english.locked);
    assert_eq!(english.url.as_deref(), Some("https://example.com/en/hello-world"));

    let german = preview(&config, &entry, references, &de(), &en(), &dates())
        .await
        .unwrap();
    assert_eq!(german.outcome.slug, "de/hallo-welt");
}

#[tokio::test]
async fn previews_references_and_lock_state() {
    let config: AppConfig = AppConfig::from_json(CONFIG).unwrap();
    let entry = serde_json::from_str(PAGE).unwrap();
    let references = Arc::new(StaticFetcher::from_json(REFERENCES).unwrap());

    let result = preview(&config, &entry, references, &en(), &en(), &dates())
        .await
        .unwrap();
    assert_eq!(result.outcome.slug, "jane-doe/2024/about-us");
    assert!(result.outcome.gaps.is_empty());
    assert!(result.locked);
}

#[tokio::test]
async fn missing_reference_gives_partial_slug() {
    let config = AppConfig::from_json(CONFIG).unwrap();
    let entry = serde_json::from_str(PAGE).unwrap();

    let result = preview(&config, &entry, Arc::new(StaticFetcher::default()), &en(), &en(), &dates())
        .await
        .unwrap();
    assert_eq!(result.outcome.slug, "2024/about-us");
    assert_eq!(result.outcome.gaps.len(), 1);
}

#[tokio::test]
async fn unconfigured_content_type_is_an_error() {
    let entry = serde_json::from_str(POST).unwrap();
    let result = preview(
        &AppConfig::default(),
        &entry,
        Arc::new(StaticFetcher::default()),
        &en(),
        &en(),
        &dates(),
    )
    .await;
    assert!(result.is_err());
}

// ── Normalize ────────────────────────────────────────────────────

#[test]
fn normalizes_with_config_policy() {
    let mut config = AppConfig::default();
    assert_eq!(normalize_text(&config, "Grüße & Co").as_deref(), Some("grusse-and-co"));

    config.maintain_case = true;
    config.custom_replacements = vec![("&".into(), " und ".into())];
    assert_eq!(normalize_text(&config, "Grüße & Co").as_deref(), Some("Grusse-und-Co"));
}

#[test]
fn normalizing_symbols_only_clears() {
    assert_eq!(normalize_text(&AppConfig::default(), "???"), None);
}
