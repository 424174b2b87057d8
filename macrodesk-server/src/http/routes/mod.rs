//! Route handlers organized by resource

use serde::Serialize;

pub mod health;
pub mod macros;

/// `{"ok": true}` acknowledgement
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
