//! Virtual asset paths and the source files mods map them to.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest virtual path the consuming system will ask to resolve.
pub const MAX_GAME_PATH_LENGTH: usize = 256;

/// A normalized virtual asset path.
///
/// Stored lowercase with forward slashes and no leading separator, so two
/// spellings of the same path compare equal. Construction fails when the
/// normalized form is longer than [`MAX_GAME_PATH_LENGTH`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GamePath(String);

impl GamePath {
    pub fn new(path: &str) -> Result<Self> {
        let normalized: String = path
            .trim_start_matches(['/', '\\'])
            .chars()
            .map(|c| if c == '\\' { '/' } else { c.to_ascii_lowercase() })
            .collect();
        if normalized.len() > MAX_GAME_PATH_LENGTH {
            return Err(Error::PathTooLong {
                length: normalized.len(),
                max: MAX_GAME_PATH_LENGTH,
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The extension after the final dot of the file name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.0
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && !ext.contains('/'))
    }
}

impl fmt::Display for GamePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GamePath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl TryFrom<&str> for GamePath {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<GamePath> for String {
    fn from(path: GamePath) -> String {
        path.0
    }
}

/// Where a mod sources an asset from: a rooted on-disk file, or another
/// virtual path for a pure redirect.
///
/// Kept verbatim as the author wrote it; comparison for resolution purposes
/// goes through [`SourcePath::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourcePath(Utf8PathBuf);

impl SourcePath {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Utf8Path {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether this points at an on-disk location rather than a virtual path.
    /// Drive-letter prefixes count as rooted on every platform, since mod
    /// definitions travel between machines.
    pub fn is_rooted(&self) -> bool {
        let bytes = self.0.as_str().as_bytes();
        match bytes {
            [b'/' | b'\\', ..] => true,
            [drive, b':', ..] => drive.is_ascii_alphabetic(),
            _ => false,
        }
    }

    /// Whether the file is currently present on disk. Only meaningful for
    /// rooted paths.
    pub fn exists(&self) -> bool {
        self.0.exists()
    }

    /// Case-insensitive, separator-normalized form used for equality
    /// matching during reverse resolution.
    pub fn normalized(&self) -> String {
        self.0
            .as_str()
            .chars()
            .map(|c| if c == '\\' { '/' } else { c.to_ascii_lowercase() })
            .collect()
    }

    /// Reinterpret as a virtual path when not rooted, for redirects whose
    /// source is itself a game asset.
    pub fn game_path(&self) -> Option<GamePath> {
        if self.is_rooted() {
            return None;
        }
        GamePath::new(self.0.as_str()).ok()
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for SourcePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<Utf8PathBuf> for SourcePath {
    fn from(path: Utf8PathBuf) -> Self {
        Self(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_path_normalizes() {
        let path = GamePath::new("\\Chara\\Equipment\\E0001\\Texture.TEX").unwrap();
        assert_eq!(path.as_str(), "chara/equipment/e0001/texture.tex");
        assert_eq!(path, GamePath::new("chara/equipment/e0001/texture.tex").unwrap());
        assert_eq!(path.extension(), Some("tex"));
    }

    #[test]
    fn test_game_path_length_limit() {
        let long = "a/".repeat(130);
        assert_eq!(
            GamePath::new(&long),
            Err(Error::PathTooLong {
                length: 260,
                max: MAX_GAME_PATH_LENGTH
            })
        );
        // The limit applies to the normalized form, not the input.
        let trimmed = format!("/{}", "b".repeat(MAX_GAME_PATH_LENGTH));
        assert!(GamePath::new(&trimmed).is_ok());
    }

    #[test]
    fn test_game_path_serde_rejects_overlong() {
        let ok: GamePath = serde_json::from_str("\"A/B.tex\"").unwrap();
        assert_eq!(ok.as_str(), "a/b.tex");
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"a/b.tex\"");

        let long = format!("\"{}\"", "c".repeat(300));
        assert!(serde_json::from_str::<GamePath>(&long).is_err());
    }

    #[test]
    fn test_extension_ignores_dotted_directories() {
        let path = GamePath::new("some.dir/file").unwrap();
        assert_eq!(path.extension(), None);
        let imc = GamePath::new("chara/equipment/e0001/e0001.imc").unwrap();
        assert_eq!(imc.extension(), Some("imc"));
    }

    #[test]
    fn test_source_path_rooted_detection() {
        assert!(SourcePath::from("C:\\mods\\file.tex").is_rooted());
        assert!(SourcePath::from("/opt/mods/file.tex").is_rooted());
        assert!(!SourcePath::from("chara/equipment/e0001/texture.tex").is_rooted());
    }

    #[test]
    fn test_source_path_normalized_matching() {
        let a = SourcePath::from("C:\\Mods\\File.TEX");
        let b = SourcePath::from("c:/mods/file.tex");
        assert_eq!(a.normalized(), b.normalized());
    }

    #[test]
    fn test_source_path_as_game_path() {
        let redirect = SourcePath::from("chara/Equipment/e0002/texture.tex");
        assert_eq!(
            redirect.game_path(),
            Some(GamePath::new("chara/equipment/e0002/texture.tex").unwrap())
        );
        assert_eq!(SourcePath::from("/rooted/file.tex").game_path(), None);
    }
}
