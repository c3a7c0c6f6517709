use std::env;
use std::process;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use vendas_pipeline::aggregate::AggregateResult;
use vendas_pipeline::currency::{format_brl, format_quantidade};
use vendas_pipeline::dashboard::{build_dashboard, Dashboard, DashboardConfig};
use vendas_pipeline::filter::FilterConfig;
use vendas_pipeline::loader::load_file;

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportJson<'a> {
    generated_at: String,
    source: String,
    load_ms: u128,
    pipeline_ms: u128,
    dashboard: &'a Dashboard,
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

const BAR_WIDTH: usize = 28;
const TABLE_LIMIT: usize = 25;

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "\u{2588}".repeat(filled.clamp(1, BAR_WIDTH))
}

fn truncate_label(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    let cut: String = label.chars().take(width.saturating_sub(1)).collect();
    format!("{cut}\u{2026}")
}

fn print_series(title: &str, series: &AggregateResult) {
    println!("  {}", title);
    println!("  {:\u{2500}<64}", "");
    if series.groups.is_empty() {
        println!("  (sem dados)");
        println!();
        return;
    }

    let max = series
        .groups
        .iter()
        .map(|group| group.values.first().copied().unwrap_or(0.0))
        .fold(f64::NEG_INFINITY, f64::max);

    for group in &series.groups {
        let label = group.key.join(" / ");
        let label = if label.is_empty() { "(vazio)".to_string() } else { label };
        let value = group.values.first().copied().unwrap_or(0.0);
        println!(
            "  {:<24} {:>16}  {}",
            truncate_label(&label, 24),
            format_brl(value),
            bar(value, max)
        );
    }
    println!();
}

fn print_top_produtos(series: &AggregateResult) {
    println!("  Anúncios mais vendidos");
    println!("  {:\u{2500}<64}", "");
    if series.groups.is_empty() {
        println!("  (sem dados)");
        println!();
        return;
    }

    println!(
        "  {:<26} {:<14} {:>6} {:>14} {:>12} {:>12}",
        "Produto", "Marca", "Qtde", "Total", "Preço Médio", "Ticket Médio"
    );
    for group in series.groups.iter().take(TABLE_LIMIT) {
        let produto = group.key.first().map(String::as_str).unwrap_or("");
        let marca = group.key.get(1).map(String::as_str).unwrap_or("");
        let value = |index: usize| group.values.get(index).copied().unwrap_or(0.0);
        println!(
            "  {:<26} {:<14} {:>6} {:>14} {:>12} {:>12}",
            truncate_label(produto, 26),
            truncate_label(marca, 14),
            format_quantidade(value(0)),
            format_brl(value(1)),
            format_brl(value(2)),
            format_brl(value(3)),
        );
    }
    if series.groups.len() > TABLE_LIMIT {
        println!("  ... +{} anúncios", series.groups.len() - TABLE_LIMIT);
    }
    println!();
}

fn print_human(dashboard: &Dashboard, source: &str, load_ms: u128, pipeline_ms: u128) {
    println!();
    println!("  \u{2554}{:\u{2550}<62}\u{2557}", "");
    println!("  \u{2551}{:^62}\u{2551}", "DASHBOARD DE VENDAS \u{2014} Base Calçados");
    println!("  \u{255a}{:\u{2550}<62}\u{255d}", "");
    println!();
    println!(
        "  {}  \u{00b7}  {} de {} registros após filtros",
        source, dashboard.filtered_rows, dashboard.total_rows
    );
    println!(
        "  Total Vendido: {}  \u{00b7}  Quantidade Vendida: {}",
        format_brl(dashboard.total_vendido),
        format_quantidade(dashboard.quantidade_vendida)
    );
    println!();

    match &dashboard.vendas_por_mes {
        Some(series) => print_series("Vendas por Mês", series),
        None => {
            println!("  Vendas por Mês");
            println!("  {:\u{2500}<64}", "");
            println!("  (coluna de mês não encontrada na base)");
            println!();
        }
    }

    print_series("Vendas por Marca", &dashboard.vendas_por_marca);
    if let Some(series) = &dashboard.vendas_por_frete {
        print_series("Vendas por Frete Grátis", series);
    }
    if let Some(series) = &dashboard.vendas_por_catalogo {
        print_series("Vendas por Catálogo", series);
    }
    print_series("Vendas por Vendedor", &dashboard.vendas_por_vendedor);
    print_top_produtos(&dashboard.top_produtos);

    println!(
        "  \u{23f1}  arquivo carregado em {load_ms}ms \u{00b7} pipeline em {pipeline_ms}ms"
    );
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn usage() -> ! {
    eprintln!("Usage: vendas-server <vendas.xlsx|.csv> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --produto TEXT        Keep only products containing TEXT");
    eprintln!("  --marca TEXT          Keep only brands containing TEXT");
    eprintln!("  --rasteiras           Keep only 'rasteira' products");
    eprintln!("  --papetes             Keep only 'papete' products");
    eprintln!("  --top-marcas N        Brand ranking size (5-30, default 10)");
    eprintln!("  --top-vendedores N    Salesperson ranking size (5-30, default 10)");
    eprintln!("  --json                Output as JSON instead of formatted text");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  vendas-server vendas.xlsx");
    eprintln!("  vendas-server vendas.csv --rasteiras --marca grendha --json");
    process::exit(1);
}

fn flag_value<'a>(args: &'a [String], index: usize, flag: &str) -> &'a str {
    match args.get(index + 1) {
        Some(value) => value,
        None => {
            eprintln!("Error: {flag} requires a value");
            process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let path = &args[1];
    let mut config = DashboardConfig::default();
    let mut filters = FilterConfig::default();
    let mut json_output = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--produto" => {
                filters.product_contains = Some(flag_value(&args, i, "--produto").to_string());
                i += 2;
            }
            "--marca" => {
                filters.brand_search = Some(flag_value(&args, i, "--marca").to_string());
                i += 2;
            }
            "--rasteiras" => {
                filters.only_rasteiras = true;
                i += 1;
            }
            "--papetes" => {
                filters.only_papetes = true;
                i += 1;
            }
            "--top-marcas" => {
                config.top_marcas = flag_value(&args, i, "--top-marcas").parse().unwrap_or_else(|_| {
                    eprintln!("Error: --top-marcas requires a positive integer");
                    process::exit(1);
                });
                i += 2;
            }
            "--top-vendedores" => {
                config.top_vendedores =
                    flag_value(&args, i, "--top-vendedores").parse().unwrap_or_else(|_| {
                        eprintln!("Error: --top-vendedores requires a positive integer");
                        process::exit(1);
                    });
                i += 2;
            }
            "--json" => {
                json_output = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                usage();
            }
        }
    }
    config.filters = filters;

    let load_start = Instant::now();
    let raw = match load_file(path) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("Error loading '{path}': {err}");
            process::exit(1);
        }
    };
    let load_ms = load_start.elapsed().as_millis();

    let pipeline_start = Instant::now();
    let dashboard = match build_dashboard(&raw, &config) {
        Ok(dashboard) => dashboard,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };
    let pipeline_ms = pipeline_start.elapsed().as_millis();

    if json_output {
        let report = ReportJson {
            generated_at: Utc::now().to_rfc3339(),
            source: path.clone(),
            load_ms,
            pipeline_ms,
            dashboard: &dashboard,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Error serializing report: {err}");
                process::exit(1);
            }
        }
    } else {
        print_human(&dashboard, path, load_ms, pipeline_ms);
    }
}
