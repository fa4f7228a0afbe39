//! Query-string parameters shared by the catalogue listings

use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};

/// Parse a comma-separated list of numeric ids (`"1,2,3"`).
///
/// An absent or empty parameter yields `None`, which imposes no constraint.
/// Any element that is not an integer rejects the whole request.
pub fn parse_id_list(param: &str, raw: Option<&str>) -> AppResult<Option<Vec<i32>>> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        let id = part.parse::<i32>().map_err(|_| {
            AppError::field(param, format!("\"{}\" is not a valid integer id.", part))
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(Some(ids))
}

/// Parse the `assigned_only` flag: `1`/`true` enables it, `0`/`false`/absent disables it.
pub fn parse_flag(param: &str, raw: Option<&str>) -> AppResult<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => other
            .parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| AppError::field(param, "Must be a boolean or an integer.")),
    }
}

/// Query parameters of the Genre/Author/PublishingHouse listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttributeQuery {
    /// Only return entries referenced by at least one book (`1` or `0`)
    pub assigned_only: Option<String>,
}

impl AttributeQuery {
    pub fn assigned_only(&self) -> AppResult<bool> {
        parse_flag("assigned_only", self.assigned_only.as_deref())
    }
}
