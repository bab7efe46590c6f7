//! C-ABI wrapper around `voyatek-core`.
//!
//! # Overview
//! Exposes the trip and user API through `extern "C"` functions so the
//! native app shell can build requests, run them on its own HTTP stack and
//! hand the responses back for status checking and normalization.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core client 1:1.
//!   Record inputs are snake_case JSON strings, checked against the core
//!   types before a request is built.
//! - A single `FfiResult` envelope with `FfiDataTag` + JSON `data` conveys
//!   success payloads and errors uniformly.
//! - The caller owns all returned pointers and must call the matching
//!   `voyatek_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voyatek_core::{
    duration_days, ApiError, ClientConfig, CountryCatalog, HttpRequest, HttpResponse, Trip,
    TripClient, User, UserPatch,
};

use types::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Borrow a C string. `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a nul-terminated string that outlives `'a`.
unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Decode a JSON argument into a core type.
///
/// # Safety
/// Same contract as `read_str`.
unsafe fn read_json<T: DeserializeOwned>(ptr: *const c_char, name: &str) -> Result<T, String> {
    let json =
        unsafe { read_str(ptr) }.ok_or_else(|| format!("{name} is null or not valid UTF-8"))?;
    serde_json::from_str(json).map_err(|e| format!("invalid {name}: {e}"))
}

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() || resp.body_len == 0 {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(resp.body, resp.body_len) }.to_vec()
    };
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Shared body of every `voyatek_build_*` function. Null on a null client,
/// a rejected argument, or a panic.
fn build_request(
    client: *const FfiClient,
    op: &str,
    build: impl FnOnce(&TripClient) -> Result<HttpRequest, String>,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match build(&client.inner) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(e) => {
                tracing::warn!(op, error = %e, "request not built");
                std::ptr::null_mut()
            }
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

enum ParseError {
    Api(ApiError),
    Input(String),
}

impl From<ApiError> for ParseError {
    fn from(e: ApiError) -> Self {
        ParseError::Api(e)
    }
}

/// Shared body of every `voyatek_parse_*` function.
fn parse_response<T: Serialize>(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
    op: &str,
    tag: FfiDataTag,
    parse: impl FnOnce(&TripClient, HttpResponse) -> Result<T, ParseError>,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = ffi_response_to_core(unsafe { &*response });
        match parse(&client.inner, resp) {
            Ok(_) if tag == FfiDataTag::None => FfiResult::ok_empty(),
            Ok(value) => FfiResult::ok_json(tag, &value),
            Err(ParseError::Api(e)) => FfiResult::from_error(e),
            Err(ParseError::Input(msg)) => FfiResult::invalid_input(msg),
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic(&format!("panic in {op}")))
}

fn id_arg<'a>(id: *const c_char) -> Result<&'a str, String> {
    unsafe { read_str(id) }.ok_or_else(|| "id is null or not valid UTF-8".to_string())
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`.
///
/// Returns null if `base_url` is null or not UTF-8. The caller must free the
/// returned pointer with `voyatek_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_client_new(base_url: *const c_char) -> *mut FfiClient {
    catch_unwind(|| match unsafe { read_str(base_url) } {
        Some(url) => Box::into_raw(Box::new(FfiClient {
            inner: TripClient::new(url),
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client from `voyatek.toml` and `VOYATEK__*` variables.
///
/// `config_path` may be null to use `voyatek.toml` in the working directory.
/// Also primes the shared country catalog from `countries.path`. Returns
/// null if the configuration does not load or validate.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_client_from_config(config_path: *const c_char) -> *mut FfiClient {
    catch_unwind(|| {
        let path = unsafe { read_str(config_path) }.map(Path::new);
        match ClientConfig::load_from(path) {
            Ok(config) => {
                CountryCatalog::shared(config.countries.path.as_deref());
                tracing::info!(base_url = %config.api.base_url, "client configured");
                Box::into_raw(Box::new(FfiClient {
                    inner: TripClient::new(&config.api.base_url),
                }))
            }
            Err(e) => {
                tracing::warn!(error = %e, "configuration rejected");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Install the tracing subscriber. `level` (e.g. `"debug"`) may be null to
/// use `logging.level` from the configuration; `RUST_LOG` wins when set.
/// Returns false if a subscriber is already installed.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_init_logging(level: *const c_char) -> bool {
    catch_unwind(|| {
        let level = match unsafe { read_str(level) } {
            Some(level) => level.to_string(),
            None => ClientConfig::load()
                .map(|c| c.logging.level)
                .unwrap_or_else(|_| "info".to_string()),
        };
        let Ok(filter) = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&level))
        else {
            return false;
        };
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Build request functions: trips
// ---------------------------------------------------------------------------

/// Returns null if `client` is null. Free with `voyatek_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_list_trips(client: *const FfiClient) -> *mut FfiHttpRequest {
    build_request(client, "list_trips", |c| {
        c.build_list_trips().map_err(|e| e.to_string())
    })
}

/// Returns null if `client` or `id` is null or `id` is empty.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_get_trip(
    client: *const FfiClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, "get_trip", |c| {
        c.build_get_trip(id_arg(id)?).map_err(|e| e.to_string())
    })
}

/// `trip_json` is a trip object in wire format; `id` and timestamps may be
/// omitted. Returns null if it does not decode.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_create_trip(
    client: *const FfiClient,
    trip_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, "create_trip", |c| {
        let trip: Trip = unsafe { read_json(trip_json, "trip") }?;
        c.build_create_trip(&trip).map_err(|e| e.to_string())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_update_trip(
    client: *const FfiClient,
    id: *const c_char,
    trip_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, "update_trip", |c| {
        let trip: Trip = unsafe { read_json(trip_json, "trip") }?;
        c.build_update_trip(id_arg(id)?, &trip).map_err(|e| e.to_string())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_delete_trip(
    client: *const FfiClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, "delete_trip", |c| {
        c.build_delete_trip(id_arg(id)?).map_err(|e| e.to_string())
    })
}

// ---------------------------------------------------------------------------
// Build request functions: users
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_list_users(client: *const FfiClient) -> *mut FfiHttpRequest {
    build_request(client, "list_users", |c| {
        c.build_list_users().map_err(|e| e.to_string())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_get_user(
    client: *const FfiClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, "get_user", |c| {
        c.build_get_user(id_arg(id)?).map_err(|e| e.to_string())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_create_user(
    client: *const FfiClient,
    user_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, "create_user", |c| {
        let user: User = unsafe { read_json(user_json, "user") }?;
        c.build_create_user(&user).map_err(|e| e.to_string())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_update_user(
    client: *const FfiClient,
    id: *const c_char,
    user_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, "update_user", |c| {
        let user: User = unsafe { read_json(user_json, "user") }?;
        c.build_update_user(id_arg(id)?, &user).map_err(|e| e.to_string())
    })
}

/// `patch_json` holds any subset of `name`, `email`, `phone`, `address`.
/// Returns null for an empty patch.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_patch_user(
    client: *const FfiClient,
    id: *const c_char,
    patch_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, "patch_user", |c| {
        let patch: UserPatch = unsafe { read_json(patch_json, "patch") }?;
        if patch.is_empty() {
            return Err("patch sets no fields".to_string());
        }
        c.build_patch_user(id_arg(id)?, &patch).map_err(|e| e.to_string())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_build_delete_user(
    client: *const FfiClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, "delete_user", |c| {
        c.build_delete_user(id_arg(id)?).map_err(|e| e.to_string())
    })
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// `data_tag = TripList` on success; `data` is a JSON array.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_list_trips(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_list_trips", FfiDataTag::TripList, |c, r| {
        Ok(c.parse_list_trips(r)?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_get_trip(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_get_trip", FfiDataTag::Trip, |c, r| {
        Ok(c.parse_get_trip(r)?)
    })
}

/// `submitted_json` is the trip that was sent; it becomes the result when
/// the server answers with an empty body. May be null, in which case an
/// empty body is a decoding error.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_create_trip(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
    submitted_json: *const c_char,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_create_trip", FfiDataTag::Trip, |c, r| {
        if submitted_json.is_null() {
            return Ok(c.parse_get_trip(r)?);
        }
        let submitted: Trip =
            unsafe { read_json(submitted_json, "submitted trip") }.map_err(ParseError::Input)?;
        Ok(c.parse_create_trip(r, submitted)?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_update_trip(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_update_trip", FfiDataTag::Trip, |c, r| {
        Ok(c.parse_update_trip(r)?)
    })
}

/// `data_tag = None` on success.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_delete_trip(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_delete_trip", FfiDataTag::None, |c, r| {
        Ok(c.parse_delete_trip(r)?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_list_users(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_list_users", FfiDataTag::UserList, |c, r| {
        Ok(c.parse_list_users(r)?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_get_user(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_get_user", FfiDataTag::User, |c, r| {
        Ok(c.parse_get_user(r)?)
    })
}

/// See `voyatek_parse_create_trip` for `submitted_json`.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_create_user(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
    submitted_json: *const c_char,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_create_user", FfiDataTag::User, |c, r| {
        if submitted_json.is_null() {
            return Ok(c.parse_get_user(r)?);
        }
        let submitted: User =
            unsafe { read_json(submitted_json, "submitted user") }.map_err(ParseError::Input)?;
        Ok(c.parse_create_user(r, submitted)?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_update_user(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_update_user", FfiDataTag::User, |c, r| {
        Ok(c.parse_update_user(r)?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_patch_user(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_patch_user", FfiDataTag::User, |c, r| {
        Ok(c.parse_patch_user(r)?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn voyatek_parse_delete_user(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_response(client, response, "voyatek_parse_delete_user", FfiDataTag::None, |c, r| {
        Ok(c.parse_delete_user(r)?)
    })
}

// ---------------------------------------------------------------------------
// Derived values and reference data
// ---------------------------------------------------------------------------

/// Trip length in days as `Trip::duration` counts it, or -1 when either
/// date is null or unparseable, or the trip ends before it starts.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_trip_duration(
    start_date: *const c_char,
    end_date: *const c_char,
) -> i64 {
    catch_unwind(|| {
        let start = unsafe { read_str(start_date) };
        let end = unsafe { read_str(end_date) };
        let (Some(start), Some(end)) = (start, end) else {
            return -1;
        };
        duration_days(start, end).unwrap_or(-1)
    })
    .unwrap_or(-1)
}

/// The country catalog as a JSON array of `{name, flag, code, dial_code}`.
/// Free with `voyatek_free_string`. Never null except on panic.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_countries_json() -> *mut c_char {
    catch_unwind(|| {
        let catalog = CountryCatalog::shared(None);
        serde_json::to_string(catalog.countries())
            .ok()
            .and_then(|json| CString::new(json).ok())
            .map_or(std::ptr::null_mut(), CString::into_raw)
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by any `voyatek_build_*` function. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free a result returned by any `voyatek_parse_*` function. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.data.is_null() {
            drop(unsafe { CString::from_raw(result.data) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn voyatek_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
