//! Data layer of the Voyatek trip planner.
//!
//! # Overview
//! - `TripClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network, so a native host can run the
//!   round-trip itself (see the `voyatek-ffi` crate).
//! - `ApiService` pairs the client with a `Transport` and exposes every
//!   trip and user operation as an async call.
//! - `TripsViewModel` and `UsersViewModel` keep the lists a screen shows,
//!   together with the loading phase and the last error.
//!
//! # Design
//! - List responses are decoded by `normalize`, which accepts a bare array,
//!   a `{"data": [...]}` envelope or a single object.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod country;
pub mod draft;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod normalize;
pub mod service;
pub mod transport;
pub mod types;
pub mod view_model;

pub use async_trait::async_trait;
pub use client::TripClient;
pub use config::{ClientConfig, ConfigError};
pub use country::CountryCatalog;
pub use draft::{DraftError, TripDraft};
pub use endpoint::Endpoint;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::ApiService;
pub use transport::{Transport, UreqTransport};
pub use types::{
    duration_days, Activity, Country, Flight, Hotel, Record, TravelStyle, Trip, User, UserPatch,
};
pub use view_model::{ListViewModel, Phase, Snapshot, TripsViewModel, UsersViewModel};
