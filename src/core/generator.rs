/// Generador de favicons - resize secuencial de la tabla + tile ancho + favicon.ico con fallback

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::core::icon_table::{IconSpec, ICON_TABLE, ICO_FILE_NAME, ICO_FORMAT, ICO_INTERMEDIATE, WIDE_TILE};
use crate::core::GenerateError;
use crate::system::tools::ImageTool;

/// Un paso de la ejecución, en orden
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Resize de `source` a `dst` (entradas de la tabla y tile ancho)
    Resize { spec: IconSpec, dst: PathBuf },
    /// PNG temporal 32x32 que alimenta la conversión a ICO
    Intermediate { spec: IconSpec, dst: PathBuf },
    /// Conversión nativa a ICO, con copia fallback si la herramienta no la soporta
    ConvertIco { src: PathBuf, dst: PathBuf },
}

/// Cómo se produjo favicon.ico
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcoOutcome {
    Native,
    /// PNG copiado byte a byte con extensión .ico
    PngFallback,
}

/// Resultado de una ejecución completa
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub target_dir: PathBuf,
    pub written: Vec<PathBuf>,
    pub ico: IcoOutcome,
}

/// Archivo temporal que se borra al salir de scope (éxito, fallback o error)
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("🧹 Temporal eliminado: {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("⚠️ No se pudo eliminar {}: {}", self.path.display(), e),
        }
    }
}

/// Lista ordenada de pasos para `target_dir`. No toca el filesystem
pub fn plan(target_dir: &Path) -> Vec<Step> {
    let mut steps: Vec<Step> = ICON_TABLE
        .iter()
        .map(|spec| Step::Resize {
            spec: *spec,
            dst: target_dir.join(spec.file_name),
        })
        .collect();

    steps.push(Step::Resize {
        spec: WIDE_TILE,
        dst: target_dir.join(WIDE_TILE.file_name),
    });

    let intermediate = target_dir.join(ICO_INTERMEDIATE.file_name);
    steps.push(Step::Intermediate {
        spec: ICO_INTERMEDIATE,
        dst: intermediate.clone(),
    });
    steps.push(Step::ConvertIco {
        src: intermediate,
        dst: target_dir.join(ICO_FILE_NAME),
    });

    steps
}

/// Línea de comando que ejecutaría cada paso, para --dry-run
pub fn preview(source: &Path, target_dir: &Path, tool: &dyn ImageTool) -> Vec<String> {
    plan(target_dir)
        .iter()
        .map(|step| match step {
            Step::Resize { spec, dst } | Step::Intermediate { spec, dst } => {
                tool.preview_resize(source, spec.width, spec.height, dst)
            }
            Step::ConvertIco { src, dst } => format!(
                "{}  (fallback: copiar {} -> {})",
                tool.preview_convert(src, ICO_FORMAT, dst),
                src.display(),
                dst.display()
            ),
        })
        .collect()
}

/// Generar todos los iconos de `source` en `target_dir`
///
/// Cualquier fallo de resize aborta la ejecución. El único error recuperado es la
/// conversión a ICO: se copia el PNG intermedio con nombre `favicon.ico`.
pub fn generate_favicons(
    source: &Path,
    target_dir: &Path,
    tool: &dyn ImageTool,
) -> Result<GenerationReport, GenerateError> {
    if !source.is_file() {
        error!("❌ Imagen origen no existe: {}", source.display());
        return Err(GenerateError::SourceNotFound(source.to_path_buf()));
    }

    fs::create_dir_all(target_dir).map_err(|source| GenerateError::CreateDir {
        path: target_dir.to_path_buf(),
        source,
    })?;

    info!(
        "🚀 Generando favicons: {} -> {} (tool: {})",
        source.display(),
        target_dir.display(),
        tool.name()
    );

    let mut written = Vec::new();
    let mut intermediate: Option<TempFile> = None;
    let mut ico = IcoOutcome::Native;

    for step in plan(target_dir) {
        match step {
            Step::Resize { spec, dst } => {
                info!("🖼️ Generando {} ({}x{})...", spec.file_name, spec.width, spec.height);
                if !spec.is_square() {
                    debug!("↔️ {} se estira sin conservar aspect ratio", spec.file_name);
                }
                resize(tool, source, &spec, &dst)?;
                written.push(dst);
            }
            Step::Intermediate { spec, dst } => {
                info!("🖼️ Generando {}...", ICO_FILE_NAME);
                // Guard antes del resize: un archivo a medio escribir también se limpia
                let temp = intermediate.insert(TempFile::new(dst));
                resize(tool, source, &spec, temp.path())?;
            }
            Step::ConvertIco { src, dst } => {
                ico = convert_ico(tool, &src, &dst)?;
                written.push(dst);
            }
        }
    }

    drop(intermediate);

    info!(
        "🏁 {} archivos generados en {} (ico: {:?})",
        written.len(),
        target_dir.display(),
        ico
    );

    Ok(GenerationReport {
        target_dir: target_dir.to_path_buf(),
        written,
        ico,
    })
}

fn resize(tool: &dyn ImageTool, source: &Path, spec: &IconSpec, dst: &Path) -> Result<(), GenerateError> {
    debug!("🔧 {}", tool.preview_resize(source, spec.width, spec.height, dst));
    tool.resize(source, spec.width, spec.height, dst).map_err(|e| {
        error!("❌ Error generando {}: {}", spec.file_name, e);
        GenerateError::ResizeFailed {
            file: spec.file_name.to_string(),
            source: e,
        }
    })
}

fn convert_ico(tool: &dyn ImageTool, src: &Path, dst: &Path) -> Result<IcoOutcome, GenerateError> {
    debug!("🔧 {}", tool.preview_convert(src, ICO_FORMAT, dst));

    match tool.convert(src, ICO_FORMAT, dst) {
        Ok(()) => {
            info!("✅ {} generado con conversión nativa", ICO_FILE_NAME);
            Ok(IcoOutcome::Native)
        }
        Err(e) => {
            let failure = GenerateError::ConvertFailed {
                format: ICO_FORMAT.to_string(),
                source: e,
            };
            warn!("⚠️ {} - usando PNG como ICO", failure);

            fs::copy(src, dst).map_err(|source| GenerateError::Fallback {
                path: dst.to_path_buf(),
                source,
            })?;
            Ok(IcoOutcome::PngFallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::icon_table::expected_outputs;
    use crate::core::ToolError;
    use crate::system::tools::BuiltinTool;
    use image::imageops::FilterType;
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn fast_tool() -> BuiltinTool {
        BuiltinTool::with_filter(FilterType::Triangle)
    }

    fn write_source(dir: &Path) -> PathBuf {
        let path = dir.join("logo.png");
        image::RgbaImage::from_fn(64, 64, |x, y| image::Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn dir_listing(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    /// Backend sin soporte ICO, como algunas versiones de sips
    struct NoIcoTool(BuiltinTool);

    impl ImageTool for NoIcoTool {
        fn name(&self) -> &str {
            "no-ico"
        }
        fn resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> Result<(), ToolError> {
            self.0.resize(src, width, height, dst)
        }
        fn convert(&self, _src: &Path, _format: &str, _dst: &Path) -> Result<(), ToolError> {
            Err(ToolError::ExitStatus {
                program: "sips".to_string(),
                code: Some(13),
                stderr: "Cannot write format ico".to_string(),
            })
        }
        fn preview_resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> String {
            self.0.preview_resize(src, width, height, dst)
        }
        fn preview_convert(&self, src: &Path, format: &str, dst: &Path) -> String {
            self.0.preview_convert(src, format, dst)
        }
    }

    /// Falla el resize de un archivo concreto
    struct FailOn {
        inner: BuiltinTool,
        file_name: &'static str,
    }

    impl ImageTool for FailOn {
        fn name(&self) -> &str {
            "fail-on"
        }
        fn resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> Result<(), ToolError> {
            if dst.file_name().is_some_and(|n| n == self.file_name) {
                return Err(ToolError::ExitStatus {
                    program: "magick".to_string(),
                    code: Some(1),
                    stderr: "no space left".to_string(),
                });
            }
            self.inner.resize(src, width, height, dst)
        }
        fn convert(&self, src: &Path, format: &str, dst: &Path) -> Result<(), ToolError> {
            self.inner.convert(src, format, dst)
        }
        fn preview_resize(&self, src: &Path, width: u32, height: u32, dst: &Path) -> String {
            self.inner.preview_resize(src, width, height, dst)
        }
        fn preview_convert(&self, src: &Path, format: &str, dst: &Path) -> String {
            self.inner.preview_convert(src, format, dst)
        }
    }

    /// Registra las llamadas sin tocar disco (excepto el intermedio, que el convert necesita)
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl ImageTool for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        fn resize(&self, _src: &Path, width: u32, height: u32, dst: &Path) -> Result<(), ToolError> {
            let name = dst.file_name().unwrap().to_string_lossy().into_owned();
            fs::write(dst, b"png")?;
            self.calls.borrow_mut().push(format!("resize {} {}x{}", name, width, height));
            Ok(())
        }
        fn convert(&self, src: &Path, format: &str, dst: &Path) -> Result<(), ToolError> {
            fs::copy(src, dst)?;
            let name = dst.file_name().unwrap().to_string_lossy().into_owned();
            self.calls.borrow_mut().push(format!("convert {} {}", name, format));
            Ok(())
        }
        fn preview_resize(&self, _src: &Path, width: u32, height: u32, _dst: &Path) -> String {
            format!("{}x{}", width, height)
        }
        fn preview_convert(&self, _src: &Path, format: &str, _dst: &Path) -> String {
            format.to_string()
        }
    }

    #[test]
    fn test_every_output_has_declared_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let target = dir.path().join("icons");

        let report = generate_favicons(&source, &target, &fast_tool()).unwrap();
        assert_eq!(report.ico, IcoOutcome::Native);
        assert_eq!(report.written.len(), ICON_TABLE.len() + 2);

        for spec in ICON_TABLE {
            let dims = image::image_dimensions(target.join(spec.file_name)).unwrap();
            assert_eq!(dims, (spec.width, spec.height), "{}", spec.file_name);
        }
        assert_eq!(image::image_dimensions(target.join(WIDE_TILE.file_name)).unwrap(), (310, 150));

        let ico = fs::read(target.join(ICO_FILE_NAME)).unwrap();
        assert_eq!(&ico[..4], &[0, 0, 1, 0]);
    }

    #[test]
    fn test_target_contains_exactly_expected_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let target = dir.path().join("icons");

        generate_favicons(&source, &target, &fast_tool()).unwrap();

        let expected: BTreeSet<String> = expected_outputs().into_iter().map(String::from).collect();
        assert_eq!(dir_listing(&target), expected);
        assert!(!target.join(ICO_INTERMEDIATE.file_name).exists());
    }

    #[test]
    fn test_missing_source_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("icons");

        let err = generate_favicons(&dir.path().join("missing.png"), &target, &fast_tool()).unwrap_err();
        assert!(matches!(err, GenerateError::SourceNotFound(p) if p.ends_with("missing.png")));
        assert!(!target.exists());
    }

    #[test]
    fn test_second_run_overwrites_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let target = dir.path().join("icons");

        generate_favicons(&source, &target, &fast_tool()).unwrap();
        fs::write(target.join("favicon-16x16.png"), b"stale").unwrap();

        generate_favicons(&source, &target, &fast_tool()).unwrap();
        assert_eq!(image::image_dimensions(target.join("favicon-16x16.png")).unwrap(), (16, 16));
        assert_eq!(dir_listing(&target).len(), expected_outputs().len());
    }

    #[test]
    fn test_ico_fallback_copies_png_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let target = dir.path().join("icons");

        let report = generate_favicons(&source, &target, &NoIcoTool(fast_tool())).unwrap();
        assert_eq!(report.ico, IcoOutcome::PngFallback);

        let ico_path = target.join(ICO_FILE_NAME);
        let bytes = fs::read(&ico_path).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
        assert!(!target.join(ICO_INTERMEDIATE.file_name).exists());
    }

    #[test]
    fn test_failed_fallback_still_removes_intermediate() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let target = dir.path().join("icons");
        // Un directorio con el nombre del .ico hace fallar la copia
        fs::create_dir_all(target.join(ICO_FILE_NAME)).unwrap();

        let err = generate_favicons(&source, &target, &NoIcoTool(fast_tool())).unwrap_err();
        assert!(matches!(err, GenerateError::Fallback { .. }));
        assert!(!target.join(ICO_INTERMEDIATE.file_name).exists());
    }

    #[test]
    fn test_resize_failure_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let target = dir.path().join("icons");
        let tool = FailOn {
            inner: fast_tool(),
            file_name: "apple-touch-icon-57x57.png",
        };

        let err = generate_favicons(&source, &target, &tool).unwrap_err();
        match err {
            GenerateError::ResizeFailed { file, source } => {
                assert_eq!(file, "apple-touch-icon-57x57.png");
                assert!(matches!(source, ToolError::ExitStatus { code: Some(1), .. }));
            }
            other => panic!("error inesperado: {other:?}"),
        }
        // Lo posterior al fallo no se generó
        assert!(target.join("apple-touch-icon-180x180.png").exists());
        assert!(!target.join("apple-touch-icon-60x60.png").exists());
        assert!(!target.join(ICO_FILE_NAME).exists());
    }

    #[test]
    fn test_intermediate_resize_failure_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let target = dir.path().join("icons");
        let tool = FailOn {
            inner: fast_tool(),
            file_name: "favicon_temp.png",
        };

        let err = generate_favicons(&source, &target, &tool).unwrap_err();
        assert!(matches!(err, GenerateError::ResizeFailed { ref file, .. } if file == "favicon_temp.png"));
        assert!(!target.join(ICO_INTERMEDIATE.file_name).exists());
    }

    #[test]
    fn test_call_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("logo.png");
        fs::write(&source, b"not decoded by the recorder").unwrap();
        let target = dir.path().join("icons");

        let tool = Recorder::default();
        generate_favicons(&source, &target, &tool).unwrap();

        let calls = tool.calls.into_inner();
        assert_eq!(calls.len(), ICON_TABLE.len() + 3);
        assert_eq!(calls[0], "resize android-chrome-144x144.png 144x144");
        assert_eq!(calls[ICON_TABLE.len()], "resize mstile-310x150.png 310x150");
        assert_eq!(calls[ICON_TABLE.len() + 1], "resize favicon_temp.png 32x32");
        assert_eq!(calls[ICON_TABLE.len() + 2], "convert favicon.ico ico");
    }

    #[test]
    fn test_plan_and_preview_do_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("icons");

        let steps = plan(&target);
        assert_eq!(steps.len(), ICON_TABLE.len() + 3);
        assert!(matches!(steps.last(), Some(Step::ConvertIco { dst, .. }) if dst.ends_with(ICO_FILE_NAME)));

        let lines = preview(Path::new("logo.png"), &target, &Recorder::default());
        assert_eq!(lines.len(), steps.len());
        assert_eq!(lines[0], "144x144");
        assert!(lines.last().unwrap().starts_with("ico  (fallback: copiar"));
        assert!(!target.exists());
    }
}
