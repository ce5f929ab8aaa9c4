//! Servo resource reader.
//!
//! Servo needs its `resources/` directory (preferences, certificates,
//! public suffix list…). It is looked up, in order:
//! 1. `SERVO_RESOURCES_PATH`
//! 2. next to the executable, or the project root when running from
//!    `target/{debug,release}`
//! 3. the current directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::{env, fs};

use servo::resources::{self, Resource};
use tracing::{error, info};

static RESOURCES_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Registers the reader. Must run before the Servo instance is built.
pub fn init() {
    match resources_dir() {
        Some(dir) => info!(dir = %dir.display(), "Servo resources found"),
        None => error!("No 'resources/' directory found, set SERVO_RESOURCES_PATH"),
    }
    resources::set(Box::new(ResourceReader));
}

struct ResourceReader;

impl resources::ResourceReaderMethods for ResourceReader {
    fn read(&self, file: Resource) -> Vec<u8> {
        let Some(dir) = resources_dir() else {
            return Vec::new();
        };
        match read_confined(dir, file.filename()) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(file = file.filename(), error = %e, "Cannot read Servo resource");
                Vec::new()
            }
        }
    }

    fn sandbox_access_files_dirs(&self) -> Vec<PathBuf> {
        resources_dir().map(Path::to_path_buf).into_iter().collect()
    }

    fn sandbox_access_files(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// Reads `name` from `dir`, refusing anything resolving outside of it.
fn read_confined(dir: &Path, name: &str) -> std::io::Result<Vec<u8>> {
    // SECURITY: path traversal. Both sides are canonicalized so `../` and
    // symlinks are resolved before the prefix check.
    let root = dir.canonicalize()?;
    let path = root.join(name).canonicalize()?;
    if !path.starts_with(&root) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("{} escapes the resources directory", path.display()),
        ));
    }
    fs::read(path)
}

fn resources_dir() -> Option<&'static Path> {
    RESOURCES_DIR.get_or_init(find_resources_dir).as_deref()
}

fn find_resources_dir() -> Option<PathBuf> {
    if let Ok(path) = env::var("SERVO_RESOURCES_PATH") {
        let path = PathBuf::from(path);
        if path.is_dir() {
            return Some(path);
        }
    }

    if let Ok(exe) = env::current_exe()
        && let Ok(exe) = exe.canonicalize()
        && let Some(exe_dir) = exe.parent()
    {
        let path = exe_dir.join("resources");
        if path.is_dir() {
            return Some(path);
        }
        // target/{debug,release}/lumen → project root
        if let Some(target_dir) = exe_dir.parent()
            && target_dir.file_name().is_some_and(|n| n == "target")
            && let Some(project_root) = target_dir.parent()
        {
            let path = project_root.join("resources");
            if path.is_dir() {
                return Some(path);
            }
        }
    }

    let path = env::current_dir().ok()?.join("resources");
    path.is_dir().then_some(path)
}
