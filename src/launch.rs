use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Slicer not found at:\n{}", .0.display())]
    HandlerNotFound(PathBuf),
    #[error("Failed to launch {}:\n{source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn parse_target_file_from_args(args: &[String]) -> Result<Option<PathBuf>, String> {
    if args.is_empty() {
        return Ok(None);
    }

    let paths = if args[0] == "--open" {
        if args.len() == 1 {
            return Err("Missing file path after --open.".to_string());
        }
        &args[1..]
    } else {
        args
    };

    match paths {
        [path] if path.trim().is_empty() => Ok(None),
        [path] => Ok(Some(PathBuf::from(path))),
        _ => Err(format!(
            "Expected at most one file path, got {}.",
            paths.len()
        )),
    }
}

pub fn target_display_name(target: &Path) -> String {
    target
        .file_name()
        .and_then(|value| value.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| target.display().to_string())
}

pub fn launch(executable: &Path, target: Option<&Path>) -> Result<(), LaunchError> {
    if !executable.exists() {
        return Err(LaunchError::HandlerNotFound(executable.to_path_buf()));
    }

    let mut command = Command::new(executable);
    if let Some(target) = target {
        command.arg(target);
    }

    let child = command.spawn().map_err(|source| LaunchError::Spawn {
        path: executable.to_path_buf(),
        source,
    })?;
    log::info!(
        "Launched {} (pid {}){}",
        executable.display(),
        child.id(),
        target
            .map(|target| format!(" with {}", target.display()))
            .unwrap_or_default()
    );
    Ok(())
}
