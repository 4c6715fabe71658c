//! Small helpers shared by the daemon and the CLI commands.

use std::path::{Path, PathBuf};

/// Replace the home directory prefix with `~` so logs don't leak the user name.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

/// Per-user runtime directory for the lock file and the IPC socket.
///
/// `$XDG_RUNTIME_DIR`, else `/run/user/<uid>` when it exists, else the
/// system temp directory.
pub fn runtime_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from)
        && dir.is_absolute()
    {
        return dir;
    }
    let per_user = PathBuf::from(format!("/run/user/{}", nix::unistd::getuid()));
    if per_user.is_dir() {
        return per_user;
    }
    std::env::temp_dir()
}

/// Render a coordinate as `51.500°N, 0.120°W`.
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    let lat_dir = if latitude >= 0.0 { "N" } else { "S" };
    let lon_dir = if longitude >= 0.0 { "E" } else { "W" };
    format!(
        "{:.3}°{}, {:.3}°{}",
        latitude.abs(),
        lat_dir,
        longitude.abs(),
        lon_dir
    )
}

/// Check whether `program` can be found on `PATH`.
pub fn command_exists(program: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(program).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coordinates_hemispheres() {
        assert_eq!(format_coordinates(51.5, -0.12), "51.500°N, 0.120°W");
        assert_eq!(format_coordinates(-33.8688, 151.2093), "33.869°S, 151.209°E");
        assert_eq!(format_coordinates(0.0, 0.0), "0.000°N, 0.000°E");
    }

    #[test]
    fn test_private_path_hides_home() {
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".config").join("geodark");
            assert_eq!(private_path(&path), "~/.config/geodark");
            assert_eq!(private_path(&home), "~");
        }
    }

    #[test]
    fn test_private_path_leaves_other_paths() {
        assert_eq!(private_path(Path::new("/etc/geodark.toml")), "/etc/geodark.toml");
    }

    #[test]
    fn test_command_exists_rejects_nonsense() {
        assert!(!command_exists("geodark-definitely-not-installed-anywhere"));
    }
}
