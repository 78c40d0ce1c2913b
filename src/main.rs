use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

mod core;
mod logging;
mod system;

use crate::core::{default_config_path, GeneratorConfig};
use crate::core::generator::{generate_favicons, preview, IcoOutcome};
use crate::core::icon_table::expected_outputs;
use crate::system::tools::{build_tool, ToolKind};
use logging::setup_logging;

/// favicon-gen - Genera el catálogo completo de favicons a partir de una sola imagen
#[derive(Debug, Parser)]
#[command(name = "favicon-gen", version, about, long_about = None)]
#[command(after_help = "EJEMPLOS:
  favicon-gen logo.png public/icons                 # Backend interno
  favicon-gen logo.png public/icons --tool sips     # sips de macOS
  favicon-gen --config favicon-gen.json --dry-run   # Ver comandos sin ejecutar")]
struct Cli {
    /// Imagen origen (cuadrada, idealmente >= 1024px)
    source: Option<PathBuf>,

    /// Directorio destino de los iconos (se crea si no existe)
    target_dir: Option<PathBuf>,

    /// Backend de imágenes
    #[arg(short, long, value_enum)]
    tool: Option<ToolKind>,

    /// Ruta al ejecutable del backend externo (sips / magick)
    #[arg(long)]
    tool_program: Option<String>,

    /// Archivo de configuración JSON [default: favicon-gen.json junto al ejecutable]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Guardar la configuración efectiva en el archivo de configuración y salir
    #[arg(long)]
    init_config: bool,

    /// Mostrar los comandos que se ejecutarían sin escribir nada
    #[arg(long)]
    dry_run: bool,
}

/// Entry point principal de favicon-gen
fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = setup_logging()?;

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = GeneratorConfig::load(&config_path)?.merge_cli(
        cli.source,
        cli.target_dir,
        cli.tool,
        cli.tool_program,
    );

    if cli.init_config {
        config.save(&config_path)?;
        println!("💾 Configuración escrita en {}", config_path.display());
        return Ok(());
    }

    let (source, target_dir) = config.require_paths()?;
    let tool = build_tool(config.tool, config.tool_program.as_deref());

    if cli.dry_run {
        info!("🔍 Dry run con {} - no se escribe nada", tool.name());
        for line in preview(source, target_dir, tool.as_ref()) {
            println!("{}", line);
        }
        println!("📦 {} archivos en {}", expected_outputs().len(), target_dir.display());
        return Ok(());
    }

    if !tool.is_available() {
        warn!("⚠️ {} no parece estar instalado; el primer resize probablemente falle", tool.name());
    }

    let report = generate_favicons(source, target_dir, tool.as_ref())
        .with_context(|| format!("Error generando favicons desde {}", source.display()))?;

    if report.ico == IcoOutcome::PngFallback {
        warn!("⚠️ favicon.ico contiene un PNG: {} no soporta exportar ICO", tool.name());
    }

    println!(
        "✅ Listo! {} favicons generados en {}",
        report.written.len(),
        report.target_dir.display()
    );
    Ok(())
}
