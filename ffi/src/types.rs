//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests mirror the core `HttpRequest` field by field. Parsed records
//! cross the boundary as canonical JSON (snake_case, the same shape the
//! backend uses) tagged by `FfiDataTag`, so hosts decode them with their
//! native JSON tooling instead of walking nested C structs.

use std::ffi::CString;
use std::os::raw::c_char;

use voyatek_core::{ApiError, HttpMethod, HttpRequest, TripClient};

/// Opaque handle to a `TripClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: TripClient,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `voyatek_build_*` functions. The host executes the request
/// and passes the response back through `voyatek_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: usize,
    /// Null when the request has no body.
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Move a core request onto the heap. Null if any string holds an
    /// interior nul byte.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let Ok(url) = CString::new(req.url) else {
            return std::ptr::null_mut();
        };
        let Ok(body) = req.body.map(CString::new).transpose() else {
            return std::ptr::null_mut();
        };
        let headers: Result<Vec<(CString, CString)>, _> = req
            .headers
            .into_iter()
            .map(|(k, v)| Ok::<_, std::ffi::NulError>((CString::new(k)?, CString::new(v)?)))
            .collect();
        let Ok(headers) = headers else {
            return std::ptr::null_mut();
        };

        let headers_len = headers.len();
        let headers = if headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: k.into_raw(),
                    value: v.into_raw(),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: url.into_raw(),
            headers,
            headers_len,
            body: body.map_or(std::ptr::null_mut(), CString::into_raw),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response as received by the host.
///
/// The host constructs this on its own stack and passes a pointer to a
/// `voyatek_parse_*` function. The FFI layer reads but does not free these
/// fields. `body` may be null when `body_len` is 0.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: usize,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    InvalidResponse = 2,
    Http = 3,
    Decoding = 4,
    Network = 5,
    Serialization = 6,
    Unknown = 7,
    Panic = 8,
    NullArg = 9,
    InvalidInput = 10,
}

impl From<&ApiError> for FfiErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::InvalidUrl(_) => FfiErrorCode::InvalidUrl,
            ApiError::InvalidResponse => FfiErrorCode::InvalidResponse,
            ApiError::HttpError { .. } => FfiErrorCode::Http,
            ApiError::DecodingError(_) => FfiErrorCode::Decoding,
            ApiError::NetworkError(_) => FfiErrorCode::Network,
            ApiError::SerializationError(_) => FfiErrorCode::Serialization,
            ApiError::Unknown => FfiErrorCode::Unknown,
        }
    }
}

/// What `FfiResult::data` holds.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Trip = 1,
    TripList = 2,
    User = 3,
    UserList = 4,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data` is a
/// JSON document whose kind is given by `data_tag` (null for `None`).
/// On failure `error_code` describes the category, `error_message` is the
/// display text for the user, `http_status` is set for `Http`, and `data` is
/// null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_char,
}

impl FfiResult {
    fn boxed(
        error_code: FfiErrorCode,
        message: Option<String>,
        http_status: u16,
        data_tag: FfiDataTag,
        data: Option<CString>,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: message.map_or(std::ptr::null_mut(), |m| {
                CString::new(m).unwrap_or_default().into_raw()
            }),
            http_status,
            data_tag,
            data: data.map_or(std::ptr::null_mut(), CString::into_raw),
        }))
    }

    /// Success carrying `value` serialized as JSON.
    pub(crate) fn ok_json<T: serde::Serialize>(tag: FfiDataTag, value: &T) -> *mut Self {
        let json = serde_json::to_string(value)
            .map_err(|e| e.to_string())
            .and_then(|json| CString::new(json).map_err(|e| e.to_string()));
        match json {
            Ok(json) => Self::boxed(FfiErrorCode::Ok, None, 0, tag, Some(json)),
            Err(e) => Self::from_error(ApiError::SerializationError(e)),
        }
    }

    /// Success with no payload (e.g. delete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, None, 0, FfiDataTag::None, None)
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        Self::boxed(
            FfiErrorCode::from(&err),
            Some(err.user_message()),
            err.status().unwrap_or(0),
            FfiDataTag::None,
            None,
        )
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            Some(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            None,
        )
    }

    pub(crate) fn invalid_input(msg: String) -> *mut Self {
        Self::boxed(FfiErrorCode::InvalidInput, Some(msg), 0, FfiDataTag::None, None)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            Some(msg.to_string()),
            0,
            FfiDataTag::None,
            None,
        )
    }
}
