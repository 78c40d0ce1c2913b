/// Ejecución de programas externos (sips, magick) con stdout/stderr capturados

use std::process::{Command, Output, Stdio};
use tracing::{debug, info};

use crate::core::ToolError;

/// Ejecutar comando y devolver su output. Código de salida != 0 se convierte en `ToolError::ExitStatus`
pub fn run_command(program: &str, args: &[String]) -> Result<Output, ToolError> {
    debug!("🔧 Ejecutando: {} {:?}", program, args);

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Solo en Windows: usar CREATE_NO_WINDOW
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(0x08000000);
    }

    let output = command.output().map_err(|source| ToolError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        debug!("📄 {} stdout: {}", program, stdout.trim());
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!("⚠️ {} terminó con {:?}", program, output.status.code());
        return Err(ToolError::ExitStatus {
            program: program.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    Ok(output)
}

/// Verificar si un programa está disponible en el sistema
/// Solo importa que se pueda lanzar, no su código de salida
pub fn is_program_available(program: &str, probe_args: &[&str]) -> bool {
    match Command::new(program)
        .args(probe_args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => {
            info!("✅ {} disponible", program);
            true
        }
        Err(_) => {
            info!("❌ {} no encontrado", program);
            false
        }
    }
}
