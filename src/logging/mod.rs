use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

pub const LOG_FILE_NAME: &str = "favicon-gen.log";

/// Setup del sistema de logging multi-target
/// - Console: progreso de cada paso (RUST_LOG para ajustar)
/// - File: solo warnings y errores, en la primera carpeta escribible
///
/// Sin carpeta escribible se sigue solo con console. El guard debe vivir hasta el final de `main`
pub fn setup_logging() -> Result<Option<WorkerGuard>> {
    let log_file = open_first_writable(&log_dir_candidates());

    let (file_layer, guard, log_path) = match log_file {
        Some((appender, path)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(EnvFilter::new("warn"));
            (Some(layer), Some(guard), Some(path))
        }
        None => (None, None, None),
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(false)
        .with_filter(console_filter());

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    match log_path {
        Some(path) => tracing::debug!("📁 Log de errores: {}", path.display()),
        None => tracing::warn!("⚠️ Ninguna carpeta de logs es escribible - solo console"),
    }

    Ok(guard)
}

/// Abrir `favicon-gen.log` dentro de `dir`. Error si no se puede crear (sin panic)
pub fn open_log_file(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(dir)?;
    Ok(appender)
}

/// Primer candidato donde se pudo abrir el log, con la ruta final del archivo
fn open_first_writable(candidates: &[PathBuf]) -> Option<(RollingFileAppender, PathBuf)> {
    candidates.iter().find_map(|dir| match open_log_file(dir) {
        Ok(appender) => Some((appender, dir.join(LOG_FILE_NAME))),
        Err(e) => {
            // El subscriber todavía no existe
            eprintln!("⚠️ No se pudo abrir log en {}: {}", dir.display(), e);
            None
        }
    })
}

/// Carpeta del ejecutable, después cache del usuario, después directorio actual
fn log_dir_candidates() -> Vec<PathBuf> {
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cache_dir = dirs::cache_dir().map(|dir| dir.join("favicon-gen"));

    exe_dir
        .into_iter()
        .chain(cache_dir)
        .chain(std::iter::once(PathBuf::from(".")))
        .collect()
}

/// RUST_LOG si está definido; si no, debug en builds de desarrollo e info en release
fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cfg!(debug_assertions) { "debug" } else { "info" })
    })
}
