//! Support for library configuration options

use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;

/// How long a request to the task API may take before it is reported as a network error.
/// Feel free to override it when initing this library.
pub static REQUEST_TIMEOUT: Lazy<Arc<Mutex<Duration>>> = Lazy::new(|| Arc::new(Mutex::new(Duration::from_secs(10))));

/// Name of the header that carries the CSRF token on mutating requests (Django's default is `X-CSRFToken`).
/// Feel free to override it when initing this library.
pub static CSRF_HEADER_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("X-CSRFToken".to_string())));

/// Returns the current request timeout
pub fn request_timeout() -> Duration {
    match REQUEST_TIMEOUT.lock() {
        Ok(timeout) => *timeout,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Returns the current CSRF header name
pub fn csrf_header_name() -> String {
    match CSRF_HEADER_NAME.lock() {
        Ok(name) => name.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
