//! `PetFriends`: one call per API operation.
//!
//! Pairs a `PetFriendsClient` with a `Transport`, so a test reads as
//! "call, then assert on `(status, body)`".

use std::path::Path;

use crate::client::PetFriendsClient;
use crate::config::Settings;
use crate::error::ApiError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{AuthKey, Credentials, NewPet, Pet, PetFilter, PetList, PetPhoto, Reply};

#[derive(Debug, Clone)]
pub struct PetFriends<T = UreqTransport> {
    client: PetFriendsClient,
    transport: T,
}

impl PetFriends<UreqTransport> {
    /// Client for `settings.base_url` over a fresh ureq agent.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(PetFriendsClient::new(&settings.base_url), UreqTransport::new())
    }
}

impl<T: Transport> PetFriends<T> {
    pub fn new(client: PetFriendsClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PetFriendsClient {
        &self.client
    }

    /// 200 with a `key` on valid credentials, 403 without one otherwise.
    pub fn get_api_key(&self, email: &str, password: &str) -> Result<Reply<AuthKey>, ApiError> {
        let request = self.client.build_get_api_key(&Credentials::new(email, password));
        Ok(self.client.parse_get_api_key(self.transport.execute(request)?))
    }

    pub fn get_list_of_pets(
        &self,
        auth_key: &AuthKey,
        filter: impl Into<PetFilter>,
    ) -> Result<Reply<PetList>, ApiError> {
        let request = self.client.build_get_list_of_pets(auth_key, &filter.into());
        Ok(self.client.parse_list_of_pets(self.transport.execute(request)?))
    }

    /// Reads the photo from `photo_path` and submits it with the pet fields.
    pub fn add_new_pet(
        &self,
        auth_key: &AuthKey,
        pet: &NewPet,
        photo_path: &Path,
    ) -> Result<Reply<Pet>, ApiError> {
        let photo = PetPhoto::load(photo_path)?;
        let request = self.client.build_add_new_pet(auth_key, pet, &photo);
        Ok(self.client.parse_pet(self.transport.execute(request)?))
    }

    pub fn create_pet_simple(&self, auth_key: &AuthKey, pet: &NewPet) -> Result<Reply<Pet>, ApiError> {
        let request = self.client.build_create_pet_simple(auth_key, pet);
        Ok(self.client.parse_pet(self.transport.execute(request)?))
    }

    pub fn update_pet_info(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
        pet: &NewPet,
    ) -> Result<Reply<Pet>, ApiError> {
        let request = self.client.build_update_pet_info(auth_key, pet_id, pet);
        Ok(self.client.parse_pet(self.transport.execute(request)?))
    }

    pub fn set_photo(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
        photo_path: &Path,
    ) -> Result<Reply<Pet>, ApiError> {
        let photo = PetPhoto::load(photo_path)?;
        let request = self.client.build_set_photo(auth_key, pet_id, &photo);
        Ok(self.client.parse_pet(self.transport.execute(request)?))
    }

    pub fn delete_pet(&self, auth_key: &AuthKey, pet_id: &str) -> Result<Reply<serde_json::Value>, ApiError> {
        let request = self.client.build_delete_pet(auth_key, pet_id);
        Ok(self.client.parse_delete_pet(self.transport.execute(request)?))
    }
}
