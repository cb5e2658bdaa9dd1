//! Route handlers for the REST API
//!
//! - `extract`: the conversion endpoint
//! - `system`: health, capabilities, OpenAPI

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

mod extract;
mod system;

pub use extract::*;
pub use system::*;

/// Query parameters for GET /
#[derive(Debug, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExtractQuery {
    /// Shareable shortcut link; the identifier is its last path segment
    pub shortcuturl: Option<String>,

    /// Output format: "json" (default) or "xml"
    #[serde(default = "default_fmt")]
    pub fmt: String,
}

fn default_fmt() -> String {
    "json".to_string()
}
