use crate::utils::error::{GossipError, Result};
use std::fmt::Display;
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Display, reason: impl Into<String>) -> GossipError {
    GossipError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Unwraps a setting that has no default, e.g. `MODE`.
pub fn require<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| GossipError::MissingConfigError {
        field: field.to_string(),
    })
}

pub fn at_least<T: PartialOrd + Display + Copy>(field: &str, value: T, min: T) -> Result<()> {
    if value < min {
        return Err(invalid(field, value, format!("must be {} or more", min)));
    }
    Ok(())
}

pub fn not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "must not be blank"));
    }
    Ok(())
}

/// Accepts absolute `http`/`https` URLs with a host.
pub fn http_url(field: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw).map_err(|e| invalid(field, raw, format!("not a URL ({})", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            raw,
            format!("scheme '{}' is not http or https", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, raw, "URL has no host"));
    }
    Ok(())
}

/// A directory the process may create; rejects empty paths and NUL bytes.
pub fn usable_dir(field: &str, path: &Path) -> Result<()> {
    let shown = path.display();
    if path.as_os_str().is_empty() {
        return Err(invalid(field, shown, "directory path is empty"));
    }
    if path.to_string_lossy().contains('\0') {
        return Err(invalid(field, shown, "directory path contains a NUL byte"));
    }
    Ok(())
}
