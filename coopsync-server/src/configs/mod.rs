pub mod settings;

use std::path::PathBuf;
use std::{env, io};

pub use settings::{Auth, Context, Dashboard, Logger, Server, Settings, Store, StoreKind, WeekStart};

/// Resolves a configured path against the working directory.
pub fn normalize_path(path: &str) -> io::Result<PathBuf> {
    let path_buf = PathBuf::from(path);

    Ok(if path_buf.is_absolute() {
        path_buf
    } else {
        env::current_dir()?.join(path_buf)
    })
}
