//! Shader hot-reloading support.
//!
//! Watches a directory for changes to `.wgsl` files through the
//! `notify` crate and raises a shared flag. The application loop
//! drains the flag between ticks and recompiles the shader programs;
//! a failed recompile keeps the previous programs bound, so a broken
//! edit never takes the window down.
//!
//! The caller must keep the returned watcher alive; dropping it stops
//! the notifications.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tracing::{error, info};

const SHADER_EXTENSION: &str = "wgsl";

/// Start watching `directory`, setting `changed` whenever a shader
/// source is modified or created.
pub fn start(directory: &Path, changed: Arc<AtomicBool>) -> Result<RecommendedWatcher> {
    if !directory.exists() {
        anyhow::bail!("shader directory {:?} not found", directory);
    }

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        match result {
            Ok(event) => {
                if !event.kind.is_modify() && !event.kind.is_create() {
                    return;
                }
                if event.paths.iter().any(|p| is_shader_file(p)) {
                    info!("shader source changed, reload scheduled");
                    changed.store(true, Ordering::Relaxed);
                }
            }
            Err(e) => error!("file watcher error: {e:?}"),
        }
    })
    .context("failed to create file watcher")?;

    watcher
        .watch(directory, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {:?}", directory))?;

    info!(directory = %directory.display(), "shader watcher active");
    Ok(watcher)
}

fn is_shader_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == SHADER_EXTENSION)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn only_wgsl_files_are_relevant() {
        assert!(is_shader_file(&PathBuf::from("shaders/primary.frag.wgsl")));
        assert!(!is_shader_file(&PathBuf::from("shaders/notes.txt")));
        assert!(!is_shader_file(&PathBuf::from("shaders/wgsl")));
    }
}
