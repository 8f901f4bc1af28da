//! Mapping between store errors and server function errors.
//!
//! The kind of a [`StoreError`] travels inside the server error message as a
//! bracketed code, so the browser can branch on it again.

use dioxus::prelude::ServerFnError;
use engivia_core::StoreError;

const NOT_FOUND: &str = "[not_found]";
const UNAUTHORIZED: &str = "[unauthorized]";
const INVALID: &str = "[invalid]";

/// Encode a store error as a server function error.
pub fn to_server_error(error: StoreError) -> ServerFnError {
    let message = match error {
        StoreError::NotFound(m) => format!("{NOT_FOUND} {m}"),
        StoreError::Unauthorized(m) => format!("{UNAUTHORIZED} {m}"),
        StoreError::Invalid(m) => format!("{INVALID} {m}"),
        StoreError::Backend(m) => m,
    };
    ServerFnError::new(message)
}

/// Decode a server function error back into a store error.
pub fn store_error(error: &ServerFnError) -> StoreError {
    let text = error.to_string();
    let detail = |code: &str| {
        text.split_once(code)
            .map(|(_, rest)| rest.trim().to_string())
            .unwrap_or_default()
    };
    if text.contains(NOT_FOUND) {
        StoreError::NotFound(detail(NOT_FOUND))
    } else if text.contains(UNAUTHORIZED) {
        StoreError::Unauthorized(detail(UNAUTHORIZED))
    } else if text.contains(INVALID) {
        StoreError::Invalid(detail(INVALID))
    } else {
        StoreError::Backend(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_survive_the_round_trip() {
        let not_found = store_error(&to_server_error(StoreError::NotFound(
            "Broadcast not found: 42".into(),
        )));
        assert!(matches!(not_found, StoreError::NotFound(m) if m.contains("Broadcast not found: 42")));

        let unauthorized = store_error(&to_server_error(StoreError::Unauthorized(
            "sign-in required".into(),
        )));
        assert!(matches!(unauthorized, StoreError::Unauthorized(_)));

        let invalid = store_error(&to_server_error(StoreError::Invalid(
            "タイトルを入力してください".into(),
        )));
        assert!(matches!(invalid, StoreError::Invalid(m) if m.contains("タイトル")));
    }

    #[test]
    fn other_errors_are_backend_errors() {
        let error = store_error(&ServerFnError::new("connection reset"));
        assert!(matches!(error, StoreError::Backend(m) if m.contains("connection reset")));
    }
}
