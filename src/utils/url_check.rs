//! Destination URL checks and UTM forwarding
//!
//! Destinations are partner sites we redirect visitors to, so dangerous
//! schemes are rejected at write time rather than at redirect time.

use url::Url;

use crate::errors::{LedgerError, Result};

const BLOCKED_SCHEMES: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// Validate a destination URL: non-empty, http(s) only, parseable.
pub fn validate_destination(raw: &str) -> Result<()> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(LedgerError::validation("Destination URL cannot be empty"));
    }

    let lower = raw.to_lowercase();
    for scheme in BLOCKED_SCHEMES {
        if lower.starts_with(scheme) {
            return Err(LedgerError::validation(format!(
                "Blocked URL scheme: {}",
                scheme
            )));
        }
    }

    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(LedgerError::validation(
            "Destination URL must use http:// or https://",
        ));
    }

    Url::parse(raw)
        .map_err(|e| LedgerError::validation(format!("Invalid destination URL: {}", e)))?;

    Ok(())
}

/// Append a link's UTM parameters to its destination URL.
///
/// Parameters already present on the destination win. An unparsable
/// destination is returned untouched so the redirect still happens.
pub fn append_utm(
    destination: &str,
    source: Option<&str>,
    medium: Option<&str>,
    campaign: Option<&str>,
) -> String {
    if source.is_none() && medium.is_none() && campaign.is_none() {
        return destination.to_string();
    }

    let mut url = match Url::parse(destination) {
        Ok(url) => url,
        Err(_) => return destination.to_string(),
    };

    let existing: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in [
            ("utm_source", source),
            ("utm_medium", medium),
            ("utm_campaign", campaign),
        ] {
            if let Some(value) = value {
                if !existing.iter().any(|k| k == key) {
                    pairs.append_pair(key, value);
                }
            }
        }
    }

    url.to_string()
}
