use std::path::Path;

use crate::core::paths::managed_bin_dir;

fn enhanced_path() -> Option<String> {
    let bin_dir = managed_bin_dir()?;
    let current = std::env::var("PATH").unwrap_or_default();
    Some(path_with_fallback(&current, &bin_dir))
}

/// Appends `bin_dir` so system installs on PATH win over the managed copy.
fn path_with_fallback(current: &str, bin_dir: &Path) -> String {
    let sep = if cfg!(windows) { ";" } else { ":" };
    if current.is_empty() {
        return bin_dir.display().to_string();
    }
    format!("{}{}{}", current, sep, bin_dir.display())
}

/// Child process with the managed bin dir on PATH and UTF-8 Python I/O.
pub fn command<S: AsRef<std::ffi::OsStr>>(program: S) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    if let Some(path) = enhanced_path() {
        cmd.env("PATH", path);
    }
    cmd.env("PYTHONIOENCODING", "utf-8");
    cmd.env("PYTHONUTF8", "1");
    cmd.kill_on_drop(true);
    cmd
}
