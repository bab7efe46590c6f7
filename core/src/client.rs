//! Stateless HTTP request builder and response parser for the trip API.
//!
//! # Design
//! `TripClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the round-trip in between, either through a
//! `Transport` (see `ApiService`) or natively on the host side of the FFI.
//!
//! Collection responses go through `normalize::decode_list`, so every list
//! endpoint accepts bare arrays, `data` envelopes and single objects.

use serde::Serialize;

use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, APPLICATION_JSON, CONTENT_TYPE};
use crate::normalize::{decode_created, decode_list, decode_one};
use crate::transport::check_status;
use crate::types::{Record, Trip, User, UserPatch};

/// Request builder and response parser for `/trips` and `/users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripClient {
    base_url: String,
}

impl TripClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- generic operations over any record type ---------------------------

    pub fn build_list<R: Record>(&self) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Get, R::collection())
    }

    pub fn build_get<R: Record>(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Get, R::item(id))
    }

    pub fn build_create<R: Record>(&self, record: &R) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, R::collection(), record)
    }

    pub fn build_update<R: Record>(&self, id: &str, record: &R) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, R::item(id), record)
    }

    pub fn build_delete<R: Record>(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Delete, R::item(id))
    }

    pub fn parse_list<R: Record>(&self, response: HttpResponse) -> Result<Vec<R>, ApiError> {
        check_status(&response)?;
        decode_list(&response.body)
    }

    pub fn parse_one<R: Record>(&self, response: HttpResponse) -> Result<R, ApiError> {
        check_status(&response)?;
        decode_one(&response.body)
    }

    /// Parse a create reply; an empty body means the server accepted
    /// `submitted` as is.
    pub fn parse_created<R: Record>(
        &self,
        response: HttpResponse,
        submitted: R,
    ) -> Result<R, ApiError> {
        check_status(&response)?;
        decode_created(&response.body, submitted)
    }

    /// Delete replies carry no payload worth reading.
    pub fn parse_deleted(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // -- trips --------------------------------------------------------------

    pub fn build_list_trips(&self) -> Result<HttpRequest, ApiError> {
        self.build_list::<Trip>()
    }

    pub fn build_get_trip(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.build_get::<Trip>(id)
    }

    pub fn build_create_trip(&self, trip: &Trip) -> Result<HttpRequest, ApiError> {
        self.build_create(trip)
    }

    pub fn build_update_trip(&self, id: &str, trip: &Trip) -> Result<HttpRequest, ApiError> {
        self.build_update(id, trip)
    }

    pub fn build_delete_trip(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.build_delete::<Trip>(id)
    }

    pub fn parse_list_trips(&self, response: HttpResponse) -> Result<Vec<Trip>, ApiError> {
        self.parse_list(response)
    }

    pub fn parse_get_trip(&self, response: HttpResponse) -> Result<Trip, ApiError> {
        self.parse_one(response)
    }

    pub fn parse_create_trip(
        &self,
        response: HttpResponse,
        submitted: Trip,
    ) -> Result<Trip, ApiError> {
        self.parse_created(response, submitted)
    }

    pub fn parse_update_trip(&self, response: HttpResponse) -> Result<Trip, ApiError> {
        self.parse_one(response)
    }

    pub fn parse_delete_trip(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.parse_deleted(response)
    }

    // -- users --------------------------------------------------------------

    pub fn build_list_users(&self) -> Result<HttpRequest, ApiError> {
        self.build_list::<User>()
    }

    pub fn build_get_user(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.build_get::<User>(id)
    }

    pub fn build_create_user(&self, user: &User) -> Result<HttpRequest, ApiError> {
        self.build_create(user)
    }

    pub fn build_update_user(&self, id: &str, user: &User) -> Result<HttpRequest, ApiError> {
        self.build_update(id, user)
    }

    pub fn build_patch_user(&self, id: &str, patch: &UserPatch) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, Endpoint::User(id), patch)
    }

    pub fn build_delete_user(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.build_delete::<User>(id)
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        self.parse_list(response)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        self.parse_one(response)
    }

    pub fn parse_create_user(
        &self,
        response: HttpResponse,
        submitted: User,
    ) -> Result<User, ApiError> {
        self.parse_created(response, submitted)
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        self.parse_one(response)
    }

    /// PATCH always answers with the full updated user.
    pub fn parse_patch_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        self.parse_one(response)
    }

    pub fn parse_delete_user(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.parse_deleted(response)
    }

    // -- helpers ------------------------------------------------------------

    fn request(&self, method: HttpMethod, endpoint: Endpoint<'_>) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method,
            url: endpoint.url(&self.base_url)?,
            headers: Vec::new(),
            body: None,
        })
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        endpoint: Endpoint<'_>,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url: endpoint.url(&self.base_url)?,
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body: Some(body),
        })
    }
}
