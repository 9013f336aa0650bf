use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tinyurl_core::{
    clean, generate, generate_to_dir, parse_contract, AppError, CleanOutcome, DateLibrary,
    Framework, GenerationReport, GeneratorConfig,
};

const SHORTENER: &str = include_str!("fixtures/shortener.yaml");
const BROKEN_REF: &str = include_str!("fixtures/broken_ref.yaml");

fn render(config: GeneratorConfig) -> BTreeMap<String, String> {
    let contract = parse_contract(SHORTENER).unwrap();
    generate(&contract, &config)
        .unwrap()
        .into_iter()
        .map(|file| (file.path.to_string_lossy().into_owned(), file.contents))
        .collect()
}

fn read_tree(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    walk(dir, dir)
}

fn walk(root: &Path, dir: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(walk(root, &path));
        } else {
            let key = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
            files.insert(key, fs::read(&path).unwrap());
        }
    }
    files
}

#[test]
fn test_regeneration_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("openapi.yaml");
    fs::write(&spec, SHORTENER).unwrap();
    let out = dir.path().join("generated");
    let config = GeneratorConfig::default();

    let first = generate_to_dir(&spec, &out, &config).unwrap();
    assert_eq!(first, GenerationReport::Written { files: 4 });
    let before = read_tree(&out);

    let second = generate_to_dir(&spec, &out, &config).unwrap();
    assert_eq!(second, GenerationReport::Unchanged { files: 4 });
    assert_eq!(read_tree(&out), before);

    fs::remove_dir_all(&out).unwrap();
    generate_to_dir(&spec, &out, &config).unwrap();
    assert_eq!(read_tree(&out), before);
}

#[test]
fn test_unresolved_reference_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("broken.yaml");
    fs::write(&spec, BROKEN_REF).unwrap();
    let out = dir.path().join("generated");

    let err = generate_to_dir(&spec, &out, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, AppError::UnresolvedRef(_)));
    assert!(err.to_string().contains("#/components/schemas/Thing"));
    assert!(!out.exists());
}

#[test]
fn test_failed_generation_keeps_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("openapi.yaml");
    fs::write(&spec, SHORTENER).unwrap();
    let out = dir.path().join("generated");
    generate_to_dir(&spec, &out, &GeneratorConfig::default()).unwrap();
    let before = read_tree(&out);

    fs::write(&spec, BROKEN_REF).unwrap();
    assert!(generate_to_dir(&spec, &out, &GeneratorConfig::default()).is_err());
    assert_eq!(read_tree(&out), before);
}

#[test]
fn test_framework_only_changes_server() {
    let actix = render(GeneratorConfig::default());
    let axum = render(GeneratorConfig {
        framework: Framework::Axum,
        ..GeneratorConfig::default()
    });
    let none = render(GeneratorConfig {
        framework: Framework::None,
        ..GeneratorConfig::default()
    });

    for file in ["api.rs", "models.rs"] {
        assert_eq!(actix[file], axum[file]);
        assert_eq!(actix[file], none[file]);
    }
    assert_ne!(actix["server.rs"], axum["server.rs"]);
    assert!(!none.contains_key("server.rs"));
}

#[test]
fn test_unreadable_headers_are_rejected_in_both_servers() {
    for framework in [Framework::ActixWeb, Framework::Axum] {
        let files = render(GeneratorConfig {
            framework,
            ..GeneratorConfig::default()
        });
        let server = &files["server.rs"];
        assert!(server.contains("fn header_text<'a>("));
        assert!(server.contains("support::header_text("));
        assert!(!server.contains("and_then(|value| value.to_str().ok())"));
    }
}

#[test]
fn test_interface_only_changes_only_trait_bodies() {
    let interfaces = render(GeneratorConfig::default());
    let defaults = render(GeneratorConfig {
        interface_only: false,
        ..GeneratorConfig::default()
    });

    assert_eq!(interfaces["models.rs"], defaults["models.rs"]);
    assert_eq!(interfaces["server.rs"], defaults["server.rs"]);
    assert!(!interfaces["api.rs"].contains("NotImplemented)"));
    assert!(defaults["api.rs"].contains("Err(HandlerError::NotImplemented)"));
}

#[test]
fn test_shortener_models_and_traits() {
    let files = render(GeneratorConfig::default());
    let models = &files["models.rs"];
    assert!(models.starts_with("// @generated by tinyurl-codegen from \"tiny-url\" 1.0.0."));
    assert!(models.contains("pub struct UrlResource {"));
    assert!(models.contains("pub id: uuid::Uuid,"));
    assert!(models.contains("pub created_at: chrono::DateTime<chrono::Utc>,"));
    assert!(models.contains("pub expires_at: Option<chrono::DateTime<chrono::Utc>>,"));
    assert!(models.contains("pub date: chrono::NaiveDate,"));
    assert!(models.contains("pub enum ErrorResponseCode {"));
    assert!(models.contains("#[serde(rename = \"not_found\")]"));

    let api = &files["api.rs"];
    assert!(api.contains("pub trait UrlsApi: Send + Sync + 'static {"));
    assert!(api.contains("pub trait AliasApi: Send + Sync + 'static {"));
    assert!(api.contains("pub enum ListUrlsResponse {"));
    assert!(api.contains("x_total_count: i64"));
    assert!(api.contains("location: String"));
    assert!(api.contains("async fn resolve_alias("));

    let server = &files["server.rs"];
    let literal = server.find("web::resource(\"/urls\")").unwrap();
    let templated = server.find("web::resource(\"/{alias}\")").unwrap();
    assert!(literal < templated);
    assert!(server.contains("pub fn configure<T>("));
}

#[test]
fn test_time_library_changes_models() {
    let files = render(GeneratorConfig {
        date_library: DateLibrary::Time,
        ..GeneratorConfig::default()
    });
    assert!(files["models.rs"].contains("time::OffsetDateTime"));
    assert!(files["models.rs"].contains("time::serde::rfc3339"));
}

#[test]
fn test_clean_leaves_hand_written_files() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("openapi.yaml");
    fs::write(&spec, SHORTENER).unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("main.rs"), "fn main() {}\n").unwrap();
    let out = src.join("generated");
    generate_to_dir(&spec, &out, &GeneratorConfig::default()).unwrap();

    assert_eq!(clean(&out).unwrap(), CleanOutcome::Removed { files: 4 });
    assert!(!out.exists());
    assert_eq!(fs::read_to_string(src.join("main.rs")).unwrap(), "fn main() {}\n");

    let err = clean(&src).unwrap_err();
    assert!(matches!(err, AppError::Refused(_)));
    assert!(src.join("main.rs").exists());
}
