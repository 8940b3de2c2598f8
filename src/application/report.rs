//! Report writers: Markdown with a fixed grammar, plus a JSON twin

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fmt::{self, Write as _};
use std::path::Path;
use tracing::info;

use super::dto::{CategoryRecord, RunSummary};
use crate::domain::CategoryResult;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the Markdown report
pub fn render_markdown(results: &[CategoryResult], generated_at: DateTime<Local>) -> Result<String> {
    let mut out = String::new();
    write_markdown(&mut out, results, generated_at).context("Failed to render Markdown report")?;
    Ok(out)
}

fn write_markdown(out: &mut impl fmt::Write, results: &[CategoryResult], generated_at: DateTime<Local>) -> fmt::Result {
    let summary = RunSummary::from_results(results);
    let stamp = generated_at.format(TIMESTAMP_FORMAT);

    writeln!(out, "# Categorias")?;
    writeln!(out, "<!-- Generado automáticamente por jumbo-facets {} -->", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "<!-- Fecha: {stamp} -->")?;
    writeln!(out, "<!-- Total de categorías: {} -->", summary.categories)?;
    writeln!(out)?;

    for (index, result) in results.iter().enumerate() {
        writeln!(out, "{}. {}: {}", index + 1, result.category.name, result.category.url)?;
    }

    writeln!(out, "\n## Filtros por Categoría\n")?;

    for result in results {
        writeln!(out, "### {}", result.category.name)?;
        writeln!(out, "**Total de filtros: {}**", result.filters_count())?;
        writeln!(out, "-- FiltrosCategory")?;
        for base in &result.filters()[..result.base_filter_count.min(result.filters_count())] {
            writeln!(out, "{}", base.name)?;
        }
        writeln!(out, "-- Subfiltros")?;
        for filter in result.discovered_filters() {
            writeln!(out, "{}", filter.name)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "---\n")?;
    writeln!(out, "**Estadísticas de la extracción:**")?;
    writeln!(out, "- Categorías procesadas: {}", summary.categories)?;
    writeln!(out, "- Categorías sin acceso: {}", summary.degraded)?;
    writeln!(out, "- Total de filtros: {}", summary.total_filters)?;
    writeln!(out, "- Filtros descubiertos: {}", summary.discovered_filters)?;
    writeln!(out, "- Promedio de filtros por categoría: {:.1}", summary.average_filters())?;
    writeln!(out, "- Fecha de generación: {stamp}")
}

pub fn render_json(results: &[CategoryResult]) -> Result<String> {
    let records: Vec<CategoryRecord> = results.iter().map(CategoryRecord::from).collect();
    serde_json::to_string_pretty(&records).context("Failed to serialize category records")
}

async fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the Markdown report and its JSON twin
pub async fn write_reports(markdown_path: &Path, json_path: &Path, results: &[CategoryResult]) -> Result<()> {
    info!("📝 Writing Markdown report: {}", markdown_path.display());
    write_file(markdown_path, &render_markdown(results, Local::now())?).await?;

    info!("📝 Writing JSON report: {}", json_path.display());
    write_file(json_path, &render_json(results)?).await?;

    let summary = RunSummary::from_results(results);
    info!(
        "✅ Reports written: {} categories, {} filters in total",
        summary.categories, summary.total_filters
    );
    Ok(())
}

/// Sanity check of a written Markdown report
pub async fn validate_report(path: &Path) -> Result<bool> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(false);
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content.chars().count() >= 100 && content.contains("# Categorias") && content.contains("## Filtros por Categoría"))
}
