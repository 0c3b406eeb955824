//! Connection settings: base URL, credentials and the photo fixture directory.
//!
//! Settings are always passed around as a value; nothing here is global.
//! They come from the environment (with `.env` support) or a TOML file.
//! Reading a `.env` file never modifies the process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ApiError;
use crate::types::Credentials;

pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru";
/// Relative fixture directory used when none is configured.
pub const DEFAULT_IMAGES_DIR: &str = "images";

pub const ENV_BASE_URL: &str = "PETFRIENDS_BASE_URL";
pub const ENV_EMAIL: &str = "PETFRIENDS_EMAIL";
pub const ENV_PASSWORD: &str = "PETFRIENDS_PASSWORD";
pub const ENV_IMAGES_DIR: &str = "PETFRIENDS_IMAGES_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub email: String,
    pub password: String,
    /// Directory photo fixtures are resolved against.
    pub images_dir: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    base_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    images_dir: Option<PathBuf>,
}

impl Settings {
    pub fn new(base_url: &str, email: &str, password: &str, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            images_dir: images_dir.into(),
        }
    }

    /// Read `PETFRIENDS_*` variables, falling back to a `.env` file found in
    /// the working directory or one of its parents.
    ///
    /// A relative `images_dir` stays relative to the working directory;
    /// callers that know their fixture location should replace it with
    /// [`Settings::with_images_dir`].
    pub fn from_env() -> Result<Self, ApiError> {
        let file = match dotenvy::dotenv_iter() {
            Ok(iter) => iter.collect::<Result<HashMap<_, _>, _>>()?,
            Err(err) if err.not_found() => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Self::from_lookup(|name| std::env::var(name).ok().or_else(|| file.get(name).cloned()), Path::new(""))
    }

    /// Read `PETFRIENDS_*` variables from the process environment only.
    pub fn from_env_vars() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok(), Path::new(""))
    }

    /// Like [`Settings::from_env`] with an explicit `.env` file. Process
    /// variables win over the file, and a relative `images_dir` is resolved
    /// against the file's directory.
    pub fn from_env_file(path: &Path) -> Result<Self, ApiError> {
        let file = read_env_file(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_lookup(|name| std::env::var(name).ok().or_else(|| file.get(name).cloned()), base_dir)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, base_dir: &Path) -> Result<Self, ApiError> {
        let images_dir = lookup(ENV_IMAGES_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR));

        Ok(Self {
            base_url: lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            email: lookup(ENV_EMAIL).ok_or(ApiError::MissingSetting(ENV_EMAIL))?,
            password: lookup(ENV_PASSWORD).ok_or(ApiError::MissingSetting(ENV_PASSWORD))?,
            images_dir: base_dir.join(images_dir),
        })
    }

    /// Load settings from a TOML file. A relative `images_dir` is resolved
    /// against the file's own directory.
    pub fn from_toml_file(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path).map_err(|source| ApiError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file: SettingsFile = toml::from_str(&content)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let images_dir = file
            .images_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR));

        Ok(Self {
            base_url: file.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            email: file.email.ok_or(ApiError::MissingSetting("email"))?,
            password: file.password.ok_or(ApiError::MissingSetting("password"))?,
            images_dir: base_dir.join(images_dir),
        })
    }

    pub fn with_images_dir(mut self, images_dir: impl Into<PathBuf>) -> Self {
        self.images_dir = images_dir.into();
        self
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.email, &self.password)
    }

    /// Path of a photo fixture inside `images_dir`.
    pub fn fixture(&self, name: &str) -> PathBuf {
        self.images_dir.join(name)
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ApiError> {
    Ok(dotenvy::from_path_iter(path)?.collect::<Result<HashMap<_, _>, _>>()?)
}
