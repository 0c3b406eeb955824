//! Stateless HTTP request builder and response parser for the PetFriends API.
//!
//! # Design
//! `PetFriendsClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Nothing is validated on this side: whatever status the
//! service answers with ends up in the returned `Reply`.

use crate::http::{HttpMethod, HttpRequest, HttpResponse, Multipart};
use crate::types::{AuthKey, Credentials, NewPet, Pet, PetFilter, PetList, PetPhoto, Reply};

const AUTH_HEADER: &str = "auth_key";
const PHOTO_FIELD: &str = "pet_photo";

/// Synchronous, stateless client for the PetFriends API.
#[derive(Debug, Clone)]
pub struct PetFriendsClient {
    base_url: String,
}

impl PetFriendsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/key` with the credentials in the `email` and `password` headers.
    pub fn build_get_api_key(&self, credentials: &Credentials) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/api/key", self.base_url),
            query: Vec::new(),
            headers: vec![
                ("email".to_string(), credentials.email.clone()),
                ("password".to_string(), credentials.password.clone()),
            ],
            body: None,
        }
    }

    pub fn build_get_list_of_pets(&self, auth_key: &AuthKey, filter: &PetFilter) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/api/pets", self.base_url),
            query: vec![("filter".to_string(), filter.as_str().to_string())],
            headers: auth_headers(auth_key),
            body: None,
        }
    }

    pub fn build_add_new_pet(&self, auth_key: &AuthKey, pet: &NewPet, photo: &PetPhoto) -> HttpRequest {
        let form = pet_fields(Multipart::new(), pet).file(
            PHOTO_FIELD,
            &photo.file_name,
            &photo.content_type,
            &photo.data,
        );
        self.form_request(HttpMethod::Post, "/api/pets", auth_key, form)
    }

    pub fn build_create_pet_simple(&self, auth_key: &AuthKey, pet: &NewPet) -> HttpRequest {
        let form = pet_fields(Multipart::new(), pet);
        self.form_request(HttpMethod::Post, "/api/create_pet_simple", auth_key, form)
    }

    pub fn build_update_pet_info(&self, auth_key: &AuthKey, pet_id: &str, pet: &NewPet) -> HttpRequest {
        let form = pet_fields(Multipart::new(), pet);
        self.form_request(HttpMethod::Put, &format!("/api/pets/{pet_id}"), auth_key, form)
    }

    pub fn build_set_photo(&self, auth_key: &AuthKey, pet_id: &str, photo: &PetPhoto) -> HttpRequest {
        let form = Multipart::new().file(PHOTO_FIELD, &photo.file_name, &photo.content_type, &photo.data);
        self.form_request(
            HttpMethod::Post,
            &format!("/api/pets/set_photo/{pet_id}"),
            auth_key,
            form,
        )
    }

    /// An empty `pet_id` yields `DELETE /api/pets/`, which the service answers with 404.
    pub fn build_delete_pet(&self, auth_key: &AuthKey, pet_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/api/pets/{pet_id}", self.base_url),
            query: Vec::new(),
            headers: auth_headers(auth_key),
            body: None,
        }
    }

    pub fn parse_get_api_key(&self, response: HttpResponse) -> Reply<AuthKey> {
        Reply::decode(response)
    }

    pub fn parse_list_of_pets(&self, response: HttpResponse) -> Reply<PetList> {
        Reply::decode(response)
    }

    /// Shared by every operation that echoes a single pet record back.
    pub fn parse_pet(&self, response: HttpResponse) -> Reply<Pet> {
        Reply::decode(response)
    }

    pub fn parse_delete_pet(&self, response: HttpResponse) -> Reply<serde_json::Value> {
        Reply::decode(response)
    }

    fn form_request(&self, method: HttpMethod, path: &str, auth_key: &AuthKey, form: Multipart) -> HttpRequest {
        let mut headers = auth_headers(auth_key);
        headers.push(("content-type".to_string(), form.content_type()));
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            query: Vec::new(),
            headers,
            body: Some(form.encode()),
        }
    }
}

fn auth_headers(auth_key: &AuthKey) -> Vec<(String, String)> {
    vec![(AUTH_HEADER.to_string(), auth_key.key.clone())]
}

fn pet_fields(form: Multipart, pet: &NewPet) -> Multipart {
    form.text("name", &pet.name)
        .text("animal_type", &pet.animal_type)
        .text("age", &pet.age)
}
