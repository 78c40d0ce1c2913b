/// Backends de manipulación de imágenes
/// El generador solo conoce el trait `ImageTool`; cada plataforma elige su backend

use image::{imageops::FilterType, ImageFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::core::ToolError;
use crate::system::process::{is_program_available, run_command};

/// Primitivas que el generador necesita de una herramienta de imágenes
pub trait ImageTool {
    fn name(&self) -> &str;

    /// Resize forzado (sin conservar aspect ratio) de `src` a `width`x`height`, escrito en `dst`
    fn resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> Result<(), ToolError>;

    /// Re-codificar `src` al formato `format` (p.ej. "ico"), escrito en `dst`
    fn convert(&self, src: &Path, format: &str, dst: &Path) -> Result<(), ToolError>;

    fn preview_resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> String;

    fn preview_convert(&self, src: &Path, format: &str, dst: &Path) -> String;

    fn is_available(&self) -> bool {
        true
    }
}

/// Backend seleccionable desde CLI / config
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// `sips` de macOS
    Sips,
    /// ImageMagick 7 (`magick`)
    Magick,
    /// En proceso, con el crate `image`
    #[default]
    Builtin,
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolKind::Sips => "sips",
            ToolKind::Magick => "magick",
            ToolKind::Builtin => "builtin",
        };
        f.write_str(name)
    }
}

/// Construir el backend. `program` reemplaza el ejecutable por defecto de los backends externos
pub fn build_tool(kind: ToolKind, program: Option<&str>) -> Box<dyn ImageTool> {
    match kind {
        ToolKind::Sips => Box::new(SipsTool::new(program.unwrap_or(SipsTool::DEFAULT_PROGRAM))),
        ToolKind::Magick => Box::new(MagickTool::new(program.unwrap_or(MagickTool::DEFAULT_PROGRAM))),
        ToolKind::Builtin => Box::new(BuiltinTool::default()),
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Línea de comando legible, con comillas en los argumentos que tienen espacios
fn format_command(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.contains(' ') {
            line.push_str(&format!("\"{}\"", arg));
        } else {
            line.push_str(arg);
        }
    }
    line
}

/// `sips` de macOS: `-z` recibe alto y después ancho
#[derive(Debug, Clone)]
pub struct SipsTool {
    program: String,
}

impl SipsTool {
    pub const DEFAULT_PROGRAM: &'static str = "sips";

    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    pub fn resize_args(&self, src: &Path, width: u32, height: u32, dst: &Path) -> Vec<String> {
        vec![
            "-z".to_string(),
            height.to_string(),
            width.to_string(),
            path_arg(src),
            "--out".to_string(),
            path_arg(dst),
        ]
    }

    pub fn convert_args(&self, src: &Path, format: &str, dst: &Path) -> Vec<String> {
        vec![
            "-s".to_string(),
            "format".to_string(),
            format.to_string(),
            path_arg(src),
            "--out".to_string(),
            path_arg(dst),
        ]
    }
}

impl ImageTool for SipsTool {
    fn name(&self) -> &str {
        &self.program
    }

    fn resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> Result<(), ToolError> {
        run_command(&self.program, &self.resize_args(src, width, height, dst)).map(|_| ())
    }

    fn convert(&self, src: &Path, format: &str, dst: &Path) -> Result<(), ToolError> {
        run_command(&self.program, &self.convert_args(src, format, dst)).map(|_| ())
    }

    fn preview_resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> String {
        format_command(&self.program, &self.resize_args(src, width, height, dst))
    }

    fn preview_convert(&self, src: &Path, format: &str, dst: &Path) -> String {
        format_command(&self.program, &self.convert_args(src, format, dst))
    }

    fn is_available(&self) -> bool {
        is_program_available(&self.program, &["--help"])
    }
}

/// ImageMagick 7. El `!` en la geometría fuerza las dimensiones exactas
#[derive(Debug, Clone)]
pub struct MagickTool {
    program: String,
}

impl MagickTool {
    pub const DEFAULT_PROGRAM: &'static str = "magick";

    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    pub fn resize_args(&self, src: &Path, width: u32, height: u32, dst: &Path) -> Vec<String> {
        vec![
            path_arg(src),
            "-resize".to_string(),
            format!("{}x{}!", width, height),
            path_arg(dst),
        ]
    }

    pub fn convert_args(&self, src: &Path, format: &str, dst: &Path) -> Vec<String> {
        vec![path_arg(src), format!("{}:{}", format, path_arg(dst))]
    }
}

impl ImageTool for MagickTool {
    fn name(&self) -> &str {
        &self.program
    }

    fn resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> Result<(), ToolError> {
        run_command(&self.program, &self.resize_args(src, width, height, dst)).map(|_| ())
    }

    fn convert(&self, src: &Path, format: &str, dst: &Path) -> Result<(), ToolError> {
        run_command(&self.program, &self.convert_args(src, format, dst)).map(|_| ())
    }

    fn preview_resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> String {
        format_command(&self.program, &self.resize_args(src, width, height, dst))
    }

    fn preview_convert(&self, src: &Path, format: &str, dst: &Path) -> String {
        format_command(&self.program, &self.convert_args(src, format, dst))
    }

    fn is_available(&self) -> bool {
        is_program_available(&self.program, &["-version"])
    }
}

/// Backend en proceso con el crate `image`. No depende de ningún binario del sistema
#[derive(Debug, Clone)]
pub struct BuiltinTool {
    filter: FilterType,
}

impl Default for BuiltinTool {
    fn default() -> Self {
        Self::with_filter(FilterType::Lanczos3)
    }
}

impl BuiltinTool {
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl ImageTool for BuiltinTool {
    fn name(&self) -> &str {
        "builtin"
    }

    fn resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> Result<(), ToolError> {
        let img = image::open(src)?;
        let resized = img.resize_exact(width, height, self.filter);
        resized.save_with_format(dst, ImageFormat::Png)?;
        debug!("🖼️ {} -> {}x{}", dst.display(), width, height);
        Ok(())
    }

    fn convert(&self, src: &Path, format: &str, dst: &Path) -> Result<(), ToolError> {
        let target = ImageFormat::from_extension(format)
            .filter(|f| f.writing_enabled())
            .ok_or_else(|| ToolError::UnsupportedFormat(format.to_string()))?;
        let img = image::open(src)?;
        img.save_with_format(dst, target)?;
        Ok(())
    }

    fn preview_resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> String {
        format!(
            "builtin resize_exact {}x{} ({:?}) {} -> {}",
            width,
            height,
            self.filter,
            src.display(),
            dst.display()
        )
    }

    fn preview_convert(&self, src: &Path, format: &str, dst: &Path) -> String {
        format!("builtin encode {} {} -> {}", format, src.display(), dst.display())
    }
}
