//! Dynamic native-library resolution and loading, per `spec.md` §4.6's
//! "Dynamic load protocol".

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::registry::{NativeRegistry, RegisterFunctionsFn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("native library '{0}' not found in any search directory")]
    NotFound(String),
    #[error("failed to open native library '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("native library '{path}' has no 'registerFunctions' entry point: {source}")]
    MissingEntryPoint {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
}

/// The candidate file names a dynamic library search tries for a given
/// basename, in order, on the current platform. `spec.md` §4.6: "probing
/// each search directory in order for `lib<lib>`, `lib<lib>.so`, and
/// `lib<lib>.dylib` (or `lib<lib>`, `lib<lib>.dll` on Windows)."
fn candidate_names(name: &str) -> Vec<String> {
    if cfg!(target_os = "windows") {
        vec![format!("lib{name}"), format!("lib{name}.dll"), format!("{name}.dll")]
    } else if cfg!(target_os = "macos") {
        vec![format!("lib{name}"), format!("lib{name}.so"), format!("lib{name}.dylib")]
    } else {
        vec![format!("lib{name}"), format!("lib{name}.so")]
    }
}

/// Searches `search_dirs` (already including the implied `"."` first
/// entry) for a file matching one of `name`'s candidate forms.
fn resolve(name: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    for dir in search_dirs {
        for candidate in candidate_names(name) {
            let path = dir.join(&candidate);
            if path.is_file() {
                return Some(path);
            }
        }
    }
    None
}

/// Resolves, opens, and registers a single `load "<lib>"` dynamic native
/// library. The `libloading::Library` handle is handed to the registry,
/// which keeps it alive for the process's lifetime — per `spec.md` §5,
/// the handles are leaked intentionally so the function pointers they
/// back remain valid.
pub fn load_library(
    name: &str,
    search_dirs: &[PathBuf],
    registry: &mut NativeRegistry,
) -> Result<(), LoadError> {
    let path = resolve(name, search_dirs).ok_or_else(|| LoadError::NotFound(name.to_string()))?;
    debug!(library = %path.display(), "resolved native library");

    let lib = unsafe { libloading::Library::new(&path) }
        .map_err(|source| LoadError::Open { path: path.clone(), source })?;

    unsafe {
        let register: libloading::Symbol<RegisterFunctionsFn> = lib
            .get(b"registerFunctions\0")
            .map_err(|source| LoadError::MissingEntryPoint { path: path.clone(), source })?;
        register(registry);
    }

    info!(library = %path.display(), "loaded native library");
    registry.keep_library_alive(lib);
    Ok(())
}

/// Builds the default search-directory list: `.` first, then whatever the
/// driver configured (CLI `-S` flags / `glint.toml`'s `search_dirs`).
pub fn search_dirs(extra: impl IntoIterator<Item = impl AsRef<Path>>) -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    dirs.extend(extra.into_iter().map(|p| p.as_ref().to_path_buf()));
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_library_is_not_found() {
        let dirs = search_dirs(Vec::<PathBuf>::new());
        assert!(resolve("definitely-not-a-real-lib", &dirs).is_none());
    }

    #[test]
    fn search_dirs_puts_dot_first() {
        let dirs = search_dirs(vec![PathBuf::from("/opt/libs")]);
        assert_eq!(dirs[0], PathBuf::from("."));
        assert_eq!(dirs[1], PathBuf::from("/opt/libs"));
    }
}
