//! Loading configuration files from disk
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

use jumbo_facets::infrastructure::{CategorySeed, ConfigManager, LogLevel, ScraperError};

fn yaml_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const MINIMAL: &str = r#"
site_url: "https://www.jumbo.com.ar"
output_file: "output/categorias_jumbo.md"
max_retries: 2
timeout: 15
"#;

#[test]
fn minimal_file_fills_in_defaults() {
    let file = yaml_file(MINIMAL);
    let config = ConfigManager::with_path(file.path()).load_config().unwrap();

    assert_eq!(config.max_retries, 2);
    assert_eq!(config.timeout(), Duration::from_secs(15));
    assert_eq!(config.delay_between_requests(), Duration::from_secs(1));
    assert_eq!(config.log_level().unwrap(), LogLevel::Info);
    assert_eq!(config.site_identity, "jumbo");
    assert_eq!(config.max_filters, 50);
    assert!(config.categories.is_empty());
    assert_eq!(config.json_output_file(), PathBuf::from("output/categorias_jumbo.json"));
}

#[test]
fn full_file_with_seeds() {
    let file = yaml_file(
        r#"
site_url: "https://www.jumbo.com.ar"
output_file: "salida/jumbo.md"
max_retries: 0
timeout: 5
delay_between_requests: 0.5
log_level: "DEBUG"
log_json: true
max_filters: 20
categories:
  - name: "Almacén"
    path: "/almacen"
  - name: "Bebidas"
    path: "/bebidas"
"#,
    );
    let config = ConfigManager::with_path(file.path()).load_config().unwrap();

    assert_eq!(config.delay_between_requests(), Duration::from_millis(500));
    assert_eq!(config.log_level().unwrap(), LogLevel::Debug);
    assert!(config.log_json);
    assert_eq!(config.max_filters, 20);
    assert_eq!(
        config.categories,
        vec![
            CategorySeed {
                name: "Almacén".to_string(),
                path: "/almacen".to_string(),
            },
            CategorySeed {
                name: "Bebidas".to_string(),
                path: "/bebidas".to_string(),
            },
        ]
    );
}

#[test]
fn missing_required_key_is_rejected() {
    let file = yaml_file(
        r#"
site_url: "https://www.jumbo.com.ar"
output_file: "output/categorias_jumbo.md"
max_retries: 2
"#,
    );
    let error = ConfigManager::with_path(file.path()).load_config().unwrap_err();
    assert!(matches!(error, ScraperError::Configuration { .. }));
    assert!(error.to_string().contains("timeout"), "{error}");
}

#[test]
fn missing_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let error = ConfigManager::with_path(dir.path().join("nope.yaml")).load_config().unwrap_err();
    assert!(error.to_string().contains("not found"), "{error}");
}

#[test]
fn invalid_values_fail_validation() {
    for (key, value) in [
        ("log_level", "\"LOUD\""),
        ("delay_between_requests", "-1.0"),
        ("delay_between_requests", "1000000000000000000000000000000.0"),
        ("site_url", "\"http://www.jumbo.com.ar\""),
        ("max_filters", "2"),
    ] {
        let content = if key == "site_url" {
            MINIMAL.replace("\"https://www.jumbo.com.ar\"", value)
        } else {
            format!("{MINIMAL}{key}: {value}\n")
        };
        let file = yaml_file(&content);
        let error = ConfigManager::with_path(file.path()).load_config().unwrap_err();
        assert!(
            matches!(&error, ScraperError::Configuration { field, .. } if field == key),
            "{key}: {error}"
        );
    }
}

#[test]
fn seed_paths_must_be_absolute() {
    let file = yaml_file(&format!("{MINIMAL}categories:\n  - name: \"Almacén\"\n    path: \"almacen\"\n"));
    let error = ConfigManager::with_path(file.path()).load_config().unwrap_err();
    assert!(matches!(error, ScraperError::Configuration { field, .. } if field == "categories"));
}
