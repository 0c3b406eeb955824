//! In-memory stand-in for the PetFriends service.
//!
//! Reproduces the status-code contract the end-to-end suite asserts on:
//! 403 for bad credentials or keys, 500 for unknown list filters and
//! unsupported photo types, 404 for deleting unknown pets.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const AUTH_HEADER: &str = "auth_key";
pub const SUPPORTED_PHOTO_TYPES: [&str; 2] = ["image/jpeg", "image/png"];
/// Largest request body accepted, sized for full-resolution camera photos.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiKey {
    pub key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    email: String,
    password: String,
    key: Option<String>,
}

/// Accounts and pets; `pets` is kept newest first.
#[derive(Debug, Default)]
pub struct Store {
    accounts: Vec<Account>,
    pets: Vec<Pet>,
}

pub type Db = Arc<RwLock<Store>>;

type Rejection = (StatusCode, &'static str);

const FORBIDDEN: Rejection = (StatusCode::FORBIDDEN, "Forbidden");
const SERVER_ERROR: Rejection = (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");

fn bad_request(reason: &'static str) -> Rejection {
    (StatusCode::BAD_REQUEST, reason)
}

/// Builder for the service's initial state.
#[derive(Debug, Default)]
pub struct MockService {
    store: Store,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        self.store.accounts.push(Account {
            user_id: Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            key: None,
        });
        self
    }

    /// Seed a pet owned by `owner_email`, which should already be registered.
    pub fn with_pet(mut self, owner_email: &str, name: &str, animal_type: &str, age: &str) -> Self {
        let user_id = self
            .store
            .accounts
            .iter()
            .find(|account| account.email == owner_email)
            .map(|account| account.user_id.clone())
            .unwrap_or_default();
        let pet = new_pet(&user_id, name, animal_type, age, String::new());
        self.store.pets.insert(0, pet);
        self
    }

    pub fn into_router(self) -> Router {
        let db: Db = Arc::new(RwLock::new(self.store));
        Router::new()
            .route("/api/key", get(get_api_key))
            .route("/api/pets", get(list_pets).post(add_new_pet))
            .route("/api/create_pet_simple", post(create_pet_simple))
            .route("/api/pets/{id}", put(update_pet_info).delete(delete_pet))
            .route("/api/pets/set_photo/{id}", post(set_photo))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .with_state(db)
    }
}

pub fn app(service: MockService) -> Router {
    service.into_router()
}

pub async fn run(listener: TcpListener, service: MockService) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "petfriends mock listening");
    }
    axum::serve(listener, app(service)).await
}

async fn get_api_key(State(db): State<Db>, headers: HeaderMap) -> Result<Json<ApiKey>, Rejection> {
    let email = header(&headers, "email");
    let password = header(&headers, "password");

    let mut store = db.write().await;
    let account = store
        .accounts
        .iter_mut()
        .find(|account| !account.email.is_empty() && account.email == email && account.password == password)
        .ok_or_else(|| {
            tracing::debug!(email, "rejected credentials");
            FORBIDDEN
        })?;
    let key = account.key.get_or_insert_with(new_key).clone();
    Ok(Json(ApiKey { key }))
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    filter: String,
}

async fn list_pets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<PetList>, Rejection> {
    let store = db.read().await;
    let user_id = authorize(&store, &headers)?;
    let pets = match query.filter.as_str() {
        "" => store.pets.clone(),
        "my_pets" => store
            .pets
            .iter()
            .filter(|pet| pet.user_id == user_id)
            .cloned()
            .collect(),
        other => {
            tracing::debug!(filter = other, "unknown filter");
            return Err(SERVER_ERROR);
        }
    };
    Ok(Json(PetList { pets }))
}

async fn add_new_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, Rejection> {
    let user_id = authorize(&*db.read().await, &headers)?;
    let form = read_form(multipart).await?;
    let (name, animal_type, age) = form.pet_fields()?;
    let upload = form.photo.as_ref().ok_or_else(|| bad_request("pet_photo is required"))?;
    let photo = photo_uri(upload)?;

    let pet = new_pet(&user_id, name, animal_type, age, photo);
    db.write().await.pets.insert(0, pet.clone());
    Ok(Json(pet))
}

async fn create_pet_simple(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, Rejection> {
    let user_id = authorize(&*db.read().await, &headers)?;
    let form = read_form(multipart).await?;
    let (name, animal_type, age) = form.pet_fields()?;

    let pet = new_pet(&user_id, name, animal_type, age, String::new());
    db.write().await.pets.insert(0, pet.clone());
    Ok(Json(pet))
}

async fn update_pet_info(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, Rejection> {
    let user_id = authorize(&*db.read().await, &headers)?;
    let form = read_form(multipart).await?;

    let mut store = db.write().await;
    let pet = owned_pet(&mut store, &user_id, &id)?;
    if let Some(name) = form.fields.get("name") {
        pet.name = name.clone();
    }
    if let Some(animal_type) = form.fields.get("animal_type") {
        pet.animal_type = animal_type.clone();
    }
    if let Some(age) = form.fields.get("age") {
        pet.age = age.clone();
    }
    Ok(Json(pet.clone()))
}

async fn set_photo(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, Rejection> {
    let user_id = authorize(&*db.read().await, &headers)?;
    let form = read_form(multipart).await?;
    let upload = form.photo.as_ref().ok_or_else(|| bad_request("pet_photo is required"))?;
    let photo = photo_uri(upload)?;

    let mut store = db.write().await;
    let pet = owned_pet(&mut store, &user_id, &id)?;
    pet.pet_photo = photo;
    Ok(Json(pet.clone()))
}

async fn delete_pet(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, Rejection> {
    let mut store = db.write().await;
    let user_id = authorize(&store, &headers)?;
    let position = store
        .pets
        .iter()
        .position(|pet| pet.id == id && pet.user_id == user_id)
        .ok_or((StatusCode::NOT_FOUND, "Not Found"))?;
    store.pets.remove(position);
    Ok(StatusCode::OK)
}

/// Resolve the `auth_key` header to the owning account's user id.
fn authorize(store: &Store, headers: &HeaderMap) -> Result<String, Rejection> {
    let key = header(headers, AUTH_HEADER);
    if key.is_empty() {
        tracing::debug!("missing auth_key");
        return Err(FORBIDDEN);
    }
    store
        .accounts
        .iter()
        .find(|account| account.key.as_deref() == Some(key))
        .map(|account| account.user_id.clone())
        .ok_or_else(|| {
            tracing::debug!("unknown auth_key");
            FORBIDDEN
        })
}

fn owned_pet<'a>(store: &'a mut Store, user_id: &str, id: &str) -> Result<&'a mut Pet, Rejection> {
    store
        .pets
        .iter_mut()
        .find(|pet| pet.id == id && pet.user_id == user_id)
        .ok_or_else(|| bad_request("Pet not found"))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

fn new_key() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn new_pet(user_id: &str, name: &str, animal_type: &str, age: &str, pet_photo: String) -> Pet {
    let created = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Pet {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        animal_type: animal_type.to_string(),
        age: age.to_string(),
        pet_photo,
        user_id: user_id.to_string(),
        created_at: format!("{}.{:03}", created.as_secs(), created.subsec_millis()),
    }
}

#[derive(Debug)]
struct Upload {
    content_type: String,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct Form {
    fields: HashMap<String, String>,
    photo: Option<Upload>,
}

impl Form {
    fn pet_fields(&self) -> Result<(&str, &str, &str), Rejection> {
        let field = |name: &'static str| {
            self.fields
                .get(name)
                .map(String::as_str)
                .ok_or_else(|| bad_request("name, animal_type and age are required"))
        };
        Ok((field("name")?, field("animal_type")?, field("age")?))
    }
}

async fn read_form(mut multipart: Multipart) -> Result<Form, Rejection> {
    let mut form = Form::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("malformed multipart body"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if field.file_name().is_some() {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|_| bad_request("malformed multipart body"))?;
            if name == "pet_photo" {
                form.photo = Some(Upload {
                    content_type,
                    data: data.to_vec(),
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|_| bad_request("malformed multipart body"))?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}

/// Encode an upload as a `data:` URI, rejecting anything but JPEG and PNG.
fn photo_uri(upload: &Upload) -> Result<String, Rejection> {
    if !SUPPORTED_PHOTO_TYPES.contains(&upload.content_type.as_str()) {
        tracing::debug!(content_type = %upload.content_type, "unsupported photo type");
        return Err(SERVER_ERROR);
    }
    Ok(format!(
        "data:{};base64,{}",
        upload.content_type,
        STANDARD.encode(&upload.data)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_serializes_with_service_field_names() {
        let pet = new_pet("u1", "Вася", "кот", "2", String::new());
        let json = serde_json::to_value(&pet).unwrap();
        assert_eq!(json["name"], "Вася");
        assert_eq!(json["animal_type"], "кот");
        assert_eq!(json["age"], "2");
        assert_eq!(json["pet_photo"], "");
        assert_eq!(json["user_id"], "u1");
        assert!(Uuid::parse_str(json["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn keys_are_64_hex_digits() {
        let key = new_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn photo_uri_accepts_jpeg() {
        let upload = Upload {
            content_type: "image/jpeg".to_string(),
            data: vec![0xff, 0xd8, 0xff],
        };
        assert_eq!(photo_uri(&upload).unwrap(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn photo_uri_rejects_other_types() {
        let upload = Upload {
            content_type: "application/octet-stream".to_string(),
            data: b"PK".to_vec(),
        };
        let (status, _) = photo_uri(&upload).unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn pet_fields_require_all_three() {
        let mut form = Form::default();
        form.fields.insert("name".to_string(), "x".to_string());
        form.fields.insert("age".to_string(), String::new());
        let (status, _) = form.pet_fields().unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        form.fields.insert("animal_type".to_string(), "кот".to_string());
        assert_eq!(form.pet_fields().unwrap(), ("x", "кот", ""));
    }

    #[test]
    fn seeded_pets_belong_to_their_owner() {
        let service = MockService::new()
            .with_account("a@example.com", "pw")
            .with_pet("a@example.com", "first", "cat", "1")
            .with_pet("a@example.com", "second", "dog", "2");
        let owner = service.store.accounts[0].user_id.clone();
        assert_eq!(service.store.pets.len(), 2);
        assert_eq!(service.store.pets[0].name, "second");
        assert!(service.store.pets.iter().all(|pet| pet.user_id == owner));
    }
}
