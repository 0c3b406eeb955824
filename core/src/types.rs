//! Domain DTOs for the PetFriends API.
//!
//! # Design
//! These types mirror the service's JSON but are defined independently of
//! the mock service; the end-to-end scenarios catch schema drift. Values the
//! service echoes back unvalidated (age, timestamps) are kept as text, since
//! the service returns them as either strings or numbers.

use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Account email and password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// Token issued by `GET /api/key`, sent as the `auth_key` header afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthKey {
    pub key: String,
}

impl AuthKey {
    /// Wrap an arbitrary token, e.g. a deliberately wrong key.
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

/// A pet record as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    #[serde(deserialize_with = "string_or_number")]
    pub age: String,
    /// `data:` URI of the photo, empty when the pet has none.
    #[serde(default)]
    pub pet_photo: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub created_at: String,
}

/// Body of `GET /api/pets`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

impl PetList {
    pub fn first(&self) -> Option<&Pet> {
        self.pets.first()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.pets.iter().map(|pet| pet.id.as_str())
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids().any(|candidate| candidate == id)
    }

    pub fn len(&self) -> usize {
        self.pets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pets.is_empty()
    }
}

/// Fields submitted when creating or updating a pet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub animal_type: String,
    pub age: String,
}

impl NewPet {
    /// `age` is sent as text and never validated, so `3`, `"8"` and `-4` all work.
    pub fn new(name: &str, animal_type: &str, age: impl fmt::Display) -> Self {
        Self {
            name: name.to_string(),
            animal_type: animal_type.to_string(),
            age: age.to_string(),
        }
    }
}

/// The `filter` query parameter of `GET /api/pets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetFilter {
    All,
    MyPets,
    /// Any other value; the service answers these with 500.
    Other(String),
}

impl PetFilter {
    pub fn as_str(&self) -> &str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
            PetFilter::Other(value) => value.as_str(),
        }
    }
}

impl From<&str> for PetFilter {
    fn from(value: &str) -> Self {
        match value {
            "" => PetFilter::All,
            "my_pets" => PetFilter::MyPets,
            other => PetFilter::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Photo bytes read from disk, uploaded as the `pet_photo` form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetPhoto {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl PetPhoto {
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let data = std::fs::read(path).map_err(|source| ApiError::PhotoRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_bytes(&file_name, data))
    }

    pub fn from_bytes(file_name: &str, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type_for(file_name).to_string(),
            data,
        }
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// Status code plus whatever the body turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub status: u16,
    pub body: Body<T>,
}

/// A response body decoded into the expected record, or the raw text when
/// it does not decode (HTML error pages, empty bodies, error objects).
#[derive(Debug, Clone, PartialEq)]
pub enum Body<T> {
    Json(T),
    Text(String),
}

impl<T: DeserializeOwned> Reply<T> {
    pub fn decode(response: HttpResponse) -> Self {
        let body = match serde_json::from_str(&response.body) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(response.body),
        };
        Self {
            status: response.status,
            body,
        }
    }
}

impl<T> Reply<T> {
    pub fn json(&self) -> Option<&T> {
        match &self.body {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    pub fn into_json(self) -> Option<T> {
        match self.body {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Json(_) => None,
            Body::Text(text) => Some(text.as_str()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
