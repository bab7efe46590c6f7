//! Full lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every service and
//! holder operation over real HTTP through `UreqTransport`. Validates that
//! request building, transport, and response parsing agree with the
//! server's actual schema.

use mock_server::ListShape;
use voyatek_core::{
    ApiError, ApiService, ListViewModel, Phase, Trip, TripClient, TripDraft, TravelStyle,
    TripsViewModel, UreqTransport, User, UserPatch, UsersViewModel,
};

async fn start_server(shape: ListShape) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with(listener, shape));
    format!("http://{addr}")
}

fn service(base_url: &str) -> ApiService<UreqTransport> {
    ApiService::new(TripClient::new(base_url), UreqTransport::default())
}

fn planned_trip() -> Trip {
    TripDraft {
        destination: "Lagos, Nigeria".into(),
        start: chrono::NaiveDate::from_ymd_opt(2024, 4, 21),
        end: chrono::NaiveDate::from_ymd_opt(2024, 4, 23),
        title: "Weekend away".into(),
        travel_style: Some(TravelStyle::Couple),
        description: "Beach and food".into(),
    }
    .build()
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn trip_crud_lifecycle() {
    let base_url = start_server(ListShape::Bare).await;
    let api = service(&base_url);

    // Step 1: list, should be empty.
    assert!(api.fetch_trips().await.unwrap().is_empty());

    // Step 2: create.
    let created = api.create_trip(planned_trip()).await.unwrap();
    let id = created.id.clone().expect("server assigns an id");
    assert_eq!(created.destination, "Lagos, Nigeria");
    assert_eq!(created.description.as_deref(), Some("Beach and food"));
    assert_eq!(created.travel_style.as_deref(), Some("Couple"));
    assert!(created.created_at.is_some());
    assert_eq!(created.duration(), Some(3));

    // Step 3: get.
    let fetched = api.fetch_trip(&id).await.unwrap();
    assert_eq!(fetched, created);

    // Step 4: update.
    let mut edited = fetched.clone();
    edited.destination = "Abuja, Nigeria".into();
    let updated = api.update_trip(&id, &edited).await.unwrap();
    assert_eq!(updated.destination, "Abuja, Nigeria");
    assert_eq!(updated.created_at, created.created_at);

    // Step 5: list has the one trip.
    let trips = api.fetch_trips().await.unwrap();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].id.as_deref(), Some(id.as_str()));

    // Step 6: delete, then the trip is gone.
    api.delete_trip(&id).await.unwrap();
    assert_eq!(
        api.fetch_trip(&id).await.unwrap_err(),
        ApiError::HttpError { status: 404 }
    );
    assert_eq!(
        api.delete_trip(&id).await.unwrap_err(),
        ApiError::HttpError { status: 404 }
    );
    assert!(api.fetch_trips().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn user_crud_lifecycle() {
    let base_url = start_server(ListShape::Bare).await;
    let api = service(&base_url);

    let mut ada = User::new("Ada Obi", "ada@example.com");
    ada.phone = Some("+2348012345678".into());
    let created = api.create_user(ada).await.unwrap();
    let id = created.id.clone().unwrap();

    let patch = UserPatch {
        address: Some("1 Marina, Lagos".into()),
        ..UserPatch::default()
    };
    let patched = api.patch_user(&id, &patch).await.unwrap();
    assert_eq!(patched.address.as_deref(), Some("1 Marina, Lagos"));
    assert_eq!(patched.phone.as_deref(), Some("+2348012345678"));

    let mut renamed = patched.clone();
    renamed.name = "Ada Lovelace".into();
    let updated = api.update_user(&id, &renamed).await.unwrap();
    assert_eq!(updated.name, "Ada Lovelace");

    assert_eq!(api.fetch_user(&id).await.unwrap().name, "Ada Lovelace");
    assert_eq!(api.fetch_users().await.unwrap().len(), 1);

    api.delete_user(&id).await.unwrap();
    assert!(api.fetch_users().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn holders_against_enveloped_server() {
    let base_url = start_server(ListShape::Enveloped).await;

    let mut trips: TripsViewModel<UreqTransport> = ListViewModel::new(service(&base_url));
    trips.fetch_all().await.unwrap();
    assert_eq!(trips.phase(), Phase::Loaded);
    assert!(trips.items().is_empty());

    trips.create(planned_trip()).await.unwrap();
    trips.create(planned_trip()).await.unwrap();
    let newest = trips.items()[0].id.clone().unwrap();

    trips.refresh().await.unwrap();
    assert_eq!(trips.items().len(), 2);

    trips.delete(&newest).await.unwrap();
    assert_eq!(trips.items().len(), 1);

    let mut users: UsersViewModel<UreqTransport> = ListViewModel::new(service(&base_url));
    users.create(User::new("Kwame", "kwame@example.com")).await.unwrap();
    users.fetch_all().await.unwrap();
    assert_eq!(users.items().len(), 1);
    assert_eq!(users.items()[0].name, "Kwame");
}

#[tokio::test(flavor = "multi_thread")]
async fn single_shape_lists_first_record() {
    let base_url = start_server(ListShape::Single).await;
    let api = service(&base_url);

    assert!(api.fetch_users().await.unwrap().is_empty());

    api.create_user(User::new("Ada", "ada@example.com")).await.unwrap();
    api.create_user(User::new("Grace", "grace@example.com")).await.unwrap();

    let users = api.fetch_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Ada");
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut users: UsersViewModel<UreqTransport> =
        ListViewModel::new(service(&format!("http://{addr}")));
    let err = users.fetch_all().await.unwrap_err();

    assert!(matches!(err, ApiError::NetworkError(_)), "got {err:?}");
    assert_eq!(users.phase(), Phase::Failed);
}
