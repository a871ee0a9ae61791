use camino::Utf8PathBuf;

pub mod config;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        for __line in format!($($arg)*).lines() {
            println!("    {}", __line);
        }
    }};
}

/// The profile directory a command should operate on: the explicit flag if
/// given, else the configured default, else the current directory.
pub fn effective_profile(explicit: Option<String>) -> Utf8PathBuf {
    if let Some(path) = explicit {
        return Utf8PathBuf::from(path);
    }
    if let Some(path) = config::load_config().profile_dir {
        return path;
    }
    Utf8PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_profile_wins() {
        let path = effective_profile(Some("profiles/main".to_string()));
        assert_eq!(path, Utf8PathBuf::from("profiles/main"));
    }
}
