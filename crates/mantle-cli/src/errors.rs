use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Profile directory not found: {path}")]
    #[diagnostic(
        code(profile::not_found),
        help("Pass --profile <DIR> or set a default with 'mantle config set-profile'")
    )]
    ProfileNotFound { path: Utf8PathBuf },

    #[error("Profile has no mods directory: {path}")]
    #[diagnostic(
        code(profile::mods_missing),
        help("Create mods/ inside the profile and add one JSON file per mod")
    )]
    ModsDirectoryMissing { path: Utf8PathBuf },

    #[error("Profile has no collections file: {path}")]
    #[diagnostic(
        code(profile::collections_missing),
        help("Create collections.json holding an array of collections, e.g. [{{\"name\": \"default\", \"settings\": []}}]")
    )]
    CollectionsFileMissing { path: Utf8PathBuf },

    #[error("Could not parse {path}")]
    #[diagnostic(
        code(profile::parse_error),
        help("Check the file for JSON syntax errors")
    )]
    ParseError {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown collection: {name}")]
    #[diagnostic(
        code(collection::not_found),
        help("Available collections: {available}")
    )]
    CollectionNotFound { name: String, available: String },

    #[error("Unknown mod: {name}")]
    #[diagnostic(
        code(mods::not_found),
        help("Use the name field from the mod's JSON file")
    )]
    ModNotFound { name: String },

    #[error("Invalid virtual path: {path}")]
    #[diagnostic(
        code(path::invalid),
        help("Virtual paths are relative, like chara/equipment/e0001/model.mdl")
    )]
    InvalidGamePath { path: String },

    #[error("File not found: {path}")]
    #[diagnostic(
        code(file::not_found),
        help("Make sure the file exists and the path is correct")
    )]
    FileNotFound { path: Utf8PathBuf },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn parse_error(path: Utf8PathBuf, source: serde_json::Error) -> Self {
        Self::ParseError { path, source }
    }

    pub fn collection_not_found(name: impl Into<String>, available: impl Into<String>) -> Self {
        Self::CollectionNotFound {
            name: name.into(),
            available: available.into(),
        }
    }

    pub fn mod_not_found(name: impl Into<String>) -> Self {
        Self::ModNotFound { name: name.into() }
    }

    pub fn invalid_game_path(path: impl Into<String>) -> Self {
        Self::InvalidGamePath { path: path.into() }
    }
}
