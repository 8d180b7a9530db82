//! Trusted-worker directory helpers.
//!
//! Workers show up in three places: the worker table, people who signed in
//! through the auth provider, and the global trusted list. This module
//! normalises those identities, merges them by lower-cased email and turns
//! pasted free text into validated email candidates.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{AddTrustedWorkerInput, PersonBasicInfo};

#[allow(clippy::expect_used)]
static EMAIL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("static regex is valid")
});

#[allow(clippy::expect_used)]
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex is valid"));

#[allow(clippy::expect_used)]
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,;]+").expect("static regex is valid"));

/// Lower-cased, trimmed email used as the directory key.
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose shape check: something@something.something, no whitespace.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value.trim())
}

/// First two characters of the local part, upper-cased.
pub fn email_initials(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local.chars().take(2).collect::<String>().to_uppercase()
}

/// Trim and cap user-supplied initials, falling back to the name.
pub fn normalize_initials(raw: &str, fallback_name: &str) -> String {
    let trimmed: String = raw.trim().chars().take(2).collect();
    if trimmed.is_empty() {
        fallback_name.chars().take(2).collect::<String>().to_uppercase()
    } else {
        trimmed.to_uppercase()
    }
}

/// Normalise a directory entry.
///
/// The email is trimmed and lower-cased, a blank name falls back to the
/// email and missing initials fall back to the first two name characters.
pub fn to_person(id: &str, name: &str, email: &str, initials: Option<&str>) -> PersonBasicInfo {
    let email = email_key(email);
    let name = match name.trim() {
        "" => email.clone(),
        n => n.to_string(),
    };
    let initials = normalize_initials(initials.unwrap_or(""), &name);
    PersonBasicInfo {
        id: id.to_string(),
        name,
        email,
        initials,
    }
}

/// Pull email addresses out of pasted text.
///
/// Regex matches win; when nothing matches, the text is split on
/// whitespace, commas and semicolons, angle brackets are stripped and each
/// token is validated on its own. Results are lower-cased and deduplicated
/// in first-seen order.
pub fn extract_emails(input: &str) -> Vec<String> {
    let matches: Vec<&str> = EMAIL_TOKEN.find_iter(input).map(|m| m.as_str()).collect();
    let candidates: Vec<String> = if matches.is_empty() {
        SEPARATORS
            .split(input)
            .map(|token| {
                let token = token.trim();
                let token = token.strip_prefix('<').unwrap_or(token);
                token.strip_suffix('>').unwrap_or(token).to_string()
            })
            .filter(|token| !token.is_empty() && is_valid_email(token))
            .collect()
    } else {
        matches.into_iter().map(str::to_string).collect()
    };

    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .map(|email| email.to_lowercase())
        .filter(|email| seen.insert(email.clone()))
        .collect()
}

/// Build an add request for one email, preferring what the directory knows.
///
/// Returns `None` for strings that do not look like an email.
pub fn draft_from_email(
    email: &str,
    recommendations: &[PersonBasicInfo],
) -> Option<AddTrustedWorkerInput> {
    let normalized = email_key(email);
    if !is_valid_email(&normalized) {
        return None;
    }

    if let Some(known) = recommendations
        .iter()
        .find(|person| email_key(&person.email) == normalized)
    {
        let initials = if known.initials.is_empty() {
            email_initials(&known.email)
        } else {
            known.initials.clone()
        };
        return Some(AddTrustedWorkerInput {
            email: known.email.clone(),
            name: known.name.clone(),
            initials,
        });
    }

    Some(AddTrustedWorkerInput {
        initials: email_initials(&normalized),
        name: normalized.clone(),
        email: normalized,
    })
}

/// Turn pasted text into add requests, skipping emails already present.
pub fn drafts_from_text(
    text: &str,
    recommendations: &[PersonBasicInfo],
    existing_emails: &[String],
) -> Vec<AddTrustedWorkerInput> {
    let existing: std::collections::HashSet<String> =
        existing_emails.iter().map(|e| email_key(e)).collect();
    extract_emails(text)
        .iter()
        .filter(|email| !existing.contains(*email))
        .filter_map(|email| draft_from_email(email, recommendations))
        .collect()
}

/// Merge directory sources keyed by lower-cased email.
///
/// Sources are applied in order. A later entry with a known email replaces
/// the earlier one but keeps its position.
pub fn merge_directory<'a>(
    sources: impl IntoIterator<Item = &'a [PersonBasicInfo]>,
) -> Vec<PersonBasicInfo> {
    let mut merged: Vec<PersonBasicInfo> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for source in sources {
        for person in source {
            let key = email_key(&person.email);
            if let Some(&pos) = positions.get(&key) {
                merged[pos] = person.clone();
            } else {
                positions.insert(key, merged.len());
                merged.push(person.clone());
            }
        }
    }
    merged
}
