use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// Resolve the service home directory.
///
/// - `None` => `$HOME/<default_subdir>` (`%APPDATA%` on Windows)
/// - `~` / `~/x` => expanded against the user's home
/// - relative paths => joined with the current working directory
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured {
        None => user_home()?.join(default_subdir),
        Some(raw) => {
            if raw == "~" {
                user_home()?
            } else if let Some(rest) = raw.strip_prefix("~/") {
                user_home()?.join(rest)
            } else {
                let p = PathBuf::from(&raw);
                if p.is_absolute() {
                    p
                } else {
                    std::env::current_dir()
                        .context("current directory is not accessible")?
                        .join(p)
                }
            }
        }
    };

    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("cannot create home_dir {}", resolved.display()))?;
    }
    Ok(resolved)
}

fn user_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("environment variable {var} is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested/home");
        let out = resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", true).unwrap();
        assert_eq!(out, target);
        assert!(target.exists());
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let out = resolve_home_dir(Some("some/rel".into()), ".x", false).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with("some/rel"));
    }
}
