use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_style: Option<String>,
    #[serde(rename = "trip_description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flights: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotels: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<Value>>,
}

/// Body of `POST /trips` and `PUT /trips/{id}`. Ids and timestamps sent by
/// the client are ignored.
#[derive(Deserialize)]
pub struct NewTrip {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub title: Option<String>,
    pub travel_style: Option<String>,
    #[serde(rename = "trip_description")]
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub flights: Option<Vec<Value>>,
    pub hotels: Option<Vec<Value>>,
    pub activities: Option<Vec<Value>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// How collection endpoints shape their payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListShape {
    /// `[...]`
    #[default]
    Bare,
    /// `{"data": [...]}`
    Enveloped,
    /// The first record as a plain object; an empty body when there is none.
    Single,
}

impl FromStr for ListShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bare" => Ok(Self::Bare),
            "enveloped" => Ok(Self::Enveloped),
            "single" => Ok(Self::Single),
            other => Err(format!("unknown list shape '{other}'")),
        }
    }
}

#[derive(Clone, Default)]
pub struct Db {
    trips: Arc<RwLock<Vec<Trip>>>,
    users: Arc<RwLock<Vec<User>>>,
    shape: ListShape,
}

pub fn app() -> Router {
    app_with(ListShape::Bare)
}

pub fn app_with(shape: ListShape) -> Router {
    let db = Db {
        shape,
        ..Db::default()
    };
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route("/trips/{id}", get(get_trip).put(update_trip).delete(delete_trip))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).patch(patch_user).delete(delete_user),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, ListShape::Bare).await
}

pub async fn run_with(listener: TcpListener, shape: ListShape) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(shape)).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn list_response<T: Serialize>(shape: ListShape, mut items: Vec<T>) -> Response {
    match shape {
        ListShape::Bare => Json(items).into_response(),
        ListShape::Enveloped => Json(json!({ "data": items })).into_response(),
        ListShape::Single if items.is_empty() => StatusCode::OK.into_response(),
        ListShape::Single => Json(items.swap_remove(0)).into_response(),
    }
}

// --- trips ---

async fn list_trips(State(db): State<Db>) -> Response {
    let trips = db.trips.read().await.clone();
    tracing::debug!(count = trips.len(), "list trips");
    list_response(db.shape, trips)
}

async fn create_trip(State(db): State<Db>, Json(input): Json<NewTrip>) -> (StatusCode, Json<Trip>) {
    let stamp = now();
    let trip = Trip {
        id: Uuid::new_v4().to_string(),
        destination: input.destination,
        start_date: input.start_date,
        end_date: input.end_date,
        title: input.title,
        travel_style: input.travel_style,
        description: input.description,
        image_url: input.image_url,
        created_at: stamp.clone(),
        updated_at: stamp,
        flights: input.flights,
        hotels: input.hotels,
        activities: input.activities,
    };
    tracing::info!(id = %trip.id, destination = %trip.destination, "trip created");
    db.trips.write().await.push(trip.clone());
    (StatusCode::CREATED, Json(trip))
}

async fn get_trip(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Trip>, StatusCode> {
    let trips = db.trips.read().await;
    trips.iter().find(|t| t.id == id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_trip(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<NewTrip>,
) -> Result<Json<Trip>, StatusCode> {
    let mut trips = db.trips.write().await;
    let trip = trips.iter_mut().find(|t| t.id == id).ok_or(StatusCode::NOT_FOUND)?;
    trip.destination = input.destination;
    trip.start_date = input.start_date;
    trip.end_date = input.end_date;
    trip.title = input.title;
    trip.travel_style = input.travel_style;
    trip.description = input.description;
    trip.image_url = input.image_url;
    trip.flights = input.flights;
    trip.hotels = input.hotels;
    trip.activities = input.activities;
    trip.updated_at = now();
    Ok(Json(trip.clone()))
}

async fn delete_trip(State(db): State<Db>, Path(id): Path<String>) -> StatusCode {
    let mut trips = db.trips.write().await;
    let before = trips.len();
    trips.retain(|t| t.id != id);
    if trips.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// --- users ---

async fn list_users(State(db): State<Db>) -> Response {
    let users = db.users.read().await.clone();
    tracing::debug!(count = users.len(), "list users");
    list_response(db.shape, users)
}

async fn create_user(State(db): State<Db>, Json(input): Json<NewUser>) -> (StatusCode, Json<User>) {
    let stamp = now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        email: input.email,
        phone: input.phone,
        address: input.address,
        created_at: stamp.clone(),
        updated_at: stamp,
    };
    tracing::info!(id = %user.id, "user created");
    db.users.write().await.push(user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<User>, StatusCode> {
    let users = db.users.read().await;
    users.iter().find(|u| u.id == id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<NewUser>,
) -> Result<Json<User>, StatusCode> {
    let mut users = db.users.write().await;
    let user = users.iter_mut().find(|u| u.id == id).ok_or(StatusCode::NOT_FOUND)?;
    user.name = input.name;
    user.email = input.email;
    user.phone = input.phone;
    user.address = input.address;
    user.updated_at = now();
    Ok(Json(user.clone()))
}

async fn patch_user(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<UserPatch>,
) -> Result<Json<User>, StatusCode> {
    let mut users = db.users.write().await;
    let user = users.iter_mut().find(|u| u.id == id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(phone) = input.phone {
        user.phone = Some(phone);
    }
    if let Some(address) = input.address {
        user.address = Some(address);
    }
    user.updated_at = now();
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<String>) -> StatusCode {
    let mut users = db.users.write().await;
    let before = users.len();
    users.retain(|u| u.id != id);
    if users.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
