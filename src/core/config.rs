use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::system::tools::ToolKind;

pub const CONFIG_FILE_NAME: &str = "favicon-gen.json";

/// Configuración opcional - JSON junto al ejecutable o la ruta pasada con --config
/// Los argumentos de CLI tienen prioridad sobre cualquier campo
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Imagen origen (idealmente cuadrada, >= 1024px)
    pub source: Option<PathBuf>,

    /// Directorio donde se escriben todos los iconos
    pub target_dir: Option<PathBuf>,

    /// Backend de imágenes: sips, magick o builtin
    pub tool: ToolKind,

    /// Ruta explícita al ejecutable del backend externo
    pub tool_program: Option<String>,
}

impl GeneratorConfig {
    /// Cargar configuración desde `path`
    /// Si no existe, devolver valores por defecto (no se crea el archivo)
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("📁 {} no encontrado, usando configuración por defecto", path.display());
            return Ok(Self::default());
        }

        debug!("📁 Cargando configuración desde: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Error leyendo configuración: {}", path.display()))?;

        let config: GeneratorConfig = serde_json::from_str(&content)
            .with_context(|| format!("Error parseando {} - JSON inválido", path.display()))?;

        info!("✅ Configuración cargada correctamente");
        debug!("🔧 Tool: {}", config.tool);
        Ok(config)
    }

    /// Guardar configuración a `path` (JSON con formato)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Error creando carpeta de configuración: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)
            .context("Error serializando configuración a JSON")?;

        fs::write(path, json)
            .with_context(|| format!("Error escribiendo configuración: {}", path.display()))?;

        info!("💾 Configuración guardada en: {}", path.display());
        Ok(())
    }

    /// Aplicar los valores de la línea de comandos encima de los del archivo
    pub fn merge_cli(
        mut self,
        source: Option<PathBuf>,
        target_dir: Option<PathBuf>,
        tool: Option<ToolKind>,
        tool_program: Option<String>,
    ) -> Self {
        if source.is_some() {
            self.source = source;
        }
        if target_dir.is_some() {
            self.target_dir = target_dir;
        }
        if let Some(tool) = tool {
            self.tool = tool;
        }
        if tool_program.is_some() {
            self.tool_program = tool_program;
        }
        self
    }

    /// Rutas obligatorias para ejecutar; error de uso si falta alguna
    pub fn require_paths(&self) -> Result<(&Path, &Path)> {
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("❌ Falta la imagen origen (argumento SOURCE o campo \"source\")"))?;
        let target = self
            .target_dir
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("❌ Falta el directorio destino (argumento TARGET_DIR o campo \"target_dir\")"))?;
        Ok((source, target))
    }
}

/// Ruta por defecto del archivo de configuración (carpeta del ejecutable)
pub fn default_config_path() -> PathBuf {
    // Prioridad: carpeta del ejecutable
    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(CONFIG_FILE_NAME);
        }
    }

    warn!("⚠️ No se pudo resolver la carpeta del ejecutable, usando directorio actual");
    PathBuf::from(CONFIG_FILE_NAME)
}
