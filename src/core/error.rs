use std::path::PathBuf;
use thiserror::Error;

/// Error de una invocación a la herramienta de imágenes
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("no se pudo ejecutar `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` terminó con código {code:?}: {stderr}")]
    ExitStatus {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("formato no soportado: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errores del generador de favicons
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("la imagen origen no existe: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("error creando directorio destino {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("falló el resize de {file}: {source}")]
    ResizeFailed {
        file: String,
        #[source]
        source: ToolError,
    },

    /// Solo se construye para el log: el generador lo recupera con la copia fallback
    #[error("falló la conversión a {format}: {source}")]
    ConvertFailed {
        format: String,
        #[source]
        source: ToolError,
    },

    #[error("error en la copia fallback hacia {}: {source}", .path.display())]
    Fallback {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
