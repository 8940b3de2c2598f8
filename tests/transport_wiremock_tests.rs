//! The real reqwest transport and the full pipeline against a local mock site
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jumbo_facets::application::{FilterPipeline, SiteProbe};
use jumbo_facets::infrastructure::{AppConfig, CategorySeed, FetchStatus, HttpClient, HttpClientConfig, RetryPolicy, ScraperError};

fn page(body: &str) -> String {
    format!(
        "<html><head><title>Jumbo Argentina</title></head><body>{}<footer>{}</footer></body></html>",
        body,
        "jumbo ".repeat(200)
    )
}

fn fast_client() -> HttpClient {
    HttpClient::with_config(HttpClientConfig {
        timeout: Duration::from_secs(5),
        retry: RetryPolicy::new(2, Duration::ZERO),
        ..HttpClientConfig::default()
    })
    .unwrap()
}

fn test_config(server: &MockServer, seeds: Vec<CategorySeed>) -> AppConfig {
    AppConfig {
        site_url: server.uri(),
        max_retries: 1,
        timeout: 5,
        delay_between_requests: 0.0,
        categories: seeds,
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn sends_spanish_accept_language_and_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("accept-language", "es-AR,es;q=0.9,en;q=0.8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("hola")))
        .expect(1)
        .mount(&server)
        .await;

    let result = fast_client().fetch(&server.uri()).await;
    assert!(result.is_ok());
    assert_eq!(result.attempts, 1);
}

#[tokio::test]
async fn server_errors_use_the_whole_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/almacen"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let result = fast_client().fetch(&format!("{}/almacen", server.uri())).await;
    assert_eq!(result.attempts, 3);
    assert!(matches!(result.status, FetchStatus::Failed(ScraperError::HttpStatus { status: 503, .. })));
}

#[tokio::test]
async fn forbidden_is_requested_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/privado"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let result = fast_client().fetch(&format!("{}/privado", server.uri())).await;
    assert_eq!(result.attempts, 1);
}

#[tokio::test]
async fn redirects_are_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/viejo"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/nuevo"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nuevo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("nuevo")))
        .mount(&server)
        .await;

    let result = fast_client().fetch(&format!("{}/viejo", server.uri())).await;
    assert!(result.is_ok());
    assert!(result.content.unwrap().contains("nuevo"));
}

#[tokio::test]
async fn site_probe_reports_title_and_validity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("inicio")))
        .mount(&server)
        .await;

    let client = fast_client();
    let probe = SiteProbe::new(&client, server.uri(), "jumbo");
    assert!(probe.test_connection().await);
    assert!(probe.validate_site_content().await);

    let info = probe.site_info().await;
    assert_eq!(info.title.as_deref(), Some("Jumbo Argentina"));
    assert!(info.has_identity);
}

#[tokio::test]
async fn pipeline_discovers_categories_and_degrades_missing_pages() {
    let server = MockServer::start().await;
    let menu: String = [
        ("/almacen", "Almacén"),
        ("/bebidas", "Bebidas"),
        ("/frescos", "Frescos"),
        ("/limpieza", "Limpieza"),
        ("/perfumeria", "Perfumería"),
        ("/congelados", "Congelados"),
        ("/mascotas", "Mascotas"),
        ("/electro", "Electro"),
        ("/login", "Ingresar"),
    ]
    .iter()
    .map(|(href, text)| format!(r#"<a href="{href}">{text}</a>"#))
    .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&format!(r#"<nav class="main-menu">{menu}</nav>"#))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/almacen"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(
            r#"<aside class="filters"><h4>Marca</h4><h4>Envase</h4><div>Tipo Mostrar 12 más</div></aside>"#,
        )))
        .mount(&server)
        .await;

    let config = test_config(&server, Vec::new());
    let pipeline = FilterPipeline::from_config(&config, CancellationToken::new()).unwrap();

    let categories = pipeline.categories().await.unwrap();
    assert_eq!(categories.len(), 8);
    assert_eq!(categories[0].name, "Almacén");
    assert_eq!(categories[0].url, format!("{}/almacen", server.uri()));

    let results = pipeline.run(&categories[..2]).await;
    assert_eq!(results.len(), 2);

    let almacen: Vec<_> = results[0].filters().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(almacen, vec!["Category", "Sub-Category", "Product Type", "Envase", "Marca", "Tipo"]);

    assert!(results[1].is_degraded());
    assert_eq!(results[1].filters_count(), 3);
    assert_eq!(results[1].category.name, "Bebidas");
}

#[tokio::test]
async fn discovery_fails_when_root_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let pipeline = FilterPipeline::from_config(&test_config(&server, Vec::new()), CancellationToken::new()).unwrap();
    let error = pipeline.discover_categories().await.unwrap_err();
    assert!(matches!(error, ScraperError::HttpStatus { status: 404, .. }));
}
