//! Response normalization
//!
//! The provider nests payloads differently per endpoint and even per
//! record. Detection is an ordered match over a closed set of shape
//! variants, probed structurally (never by endpoint identity alone); the
//! first shape that matches wins. An unrecognized shape normalizes to zero
//! records rather than an error so pagination and expansion keep
//! progressing.
//!
//! Missing or null fields fall through a prioritized list of alternate
//! names (e.g. a null flat `companyName` falls back to the nested
//! `company.name`) before being treated as genuinely absent.

use prospectarc_domain::{CompanyRecord, ContactRecord, SignalStrength};
use serde_json::Value;
use tracing::warn;

/// Flattened enrichment outcome: canonical records plus the inputs the
/// provider explicitly failed to match
#[derive(Debug, Clone, Default)]
pub struct EnrichOutcome {
    pub contacts: Vec<ContactRecord>,
    pub no_match: Vec<String>,
}

/// Closed set of enrich-response shapes, in probe priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnrichShape {
    /// `{ "result": [ { input, data: [contact], matchStatus } ] }`
    WrappedResult,
    /// `[ { input, data: [contact], matchStatus } ]` with no wrapping dict
    MatchEntryList,
    /// `[ contact, contact, ... ]`
    ContactList,
    /// A dict that is itself a single contact
    SingleContact,
    Unrecognized,
}

fn detect_enrich_shape(value: &Value) -> EnrichShape {
    match value {
        Value::Object(map) => {
            if map.get("result").is_some_and(Value::is_array) {
                EnrichShape::WrappedResult
            } else if ["personId", "id", "firstName", "lastName", "email"]
                .iter()
                .any(|k| map.contains_key(*k))
            {
                EnrichShape::SingleContact
            } else {
                EnrichShape::Unrecognized
            }
        }
        Value::Array(items) => {
            let is_match_entry = items.first().and_then(Value::as_object).is_some_and(|first| {
                first.contains_key("data")
                    || first.contains_key("matchStatus")
                    || first.contains_key("input")
            });
            if is_match_entry {
                EnrichShape::MatchEntryList
            } else {
                EnrichShape::ContactList
            }
        }
        _ => EnrichShape::Unrecognized,
    }
}

/// Normalize an enrich response of any documented shape
pub fn enrich_outcome(value: &Value) -> EnrichOutcome {
    let mut outcome = EnrichOutcome::default();

    match detect_enrich_shape(value) {
        EnrichShape::WrappedResult => {
            if let Some(entries) = value.get("result").and_then(Value::as_array) {
                for entry in entries {
                    fold_match_entry(entry, &mut outcome);
                }
            }
        }
        EnrichShape::MatchEntryList => {
            if let Some(entries) = value.as_array() {
                for entry in entries {
                    fold_match_entry(entry, &mut outcome);
                }
            }
        }
        EnrichShape::ContactList => {
            if let Some(items) = value.as_array() {
                outcome.contacts.extend(items.iter().filter_map(contact_from_value));
            }
        }
        EnrichShape::SingleContact => {
            outcome.contacts.extend(contact_from_value(value));
        }
        EnrichShape::Unrecognized => {
            warn!("unrecognized enrich response shape; treating as zero records");
        }
    }

    outcome
}

fn fold_match_entry(entry: &Value, outcome: &mut EnrichOutcome) {
    let contacts: Vec<ContactRecord> = entry
        .get("data")
        .and_then(Value::as_array)
        .map(|data| data.iter().filter_map(contact_from_value).collect())
        .unwrap_or_default();

    if contacts.is_empty() {
        outcome.no_match.push(describe_input(entry));
    } else {
        outcome.contacts.extend(contacts);
    }
}

fn describe_input(entry: &Value) -> String {
    string_at(entry, &["input.personId", "input.email", "input"])
        .unwrap_or_else(|| entry.to_string())
}

/// Extract contact records from one search-result page
///
/// Tolerates both a `data`-wrapped dict and a bare record list.
pub fn contacts_from_search(value: &Value) -> Vec<ContactRecord> {
    page_records(value).map_or_else(Vec::new, |items| {
        items.iter().filter_map(contact_from_value).collect()
    })
}

/// Extract company records from one search-result page (company or intent)
pub fn companies_from_search(value: &Value) -> Vec<CompanyRecord> {
    page_records(value).map_or_else(Vec::new, |items| {
        items.iter().filter_map(company_from_value).collect()
    })
}

fn page_records(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Object(map) => match map.get("data").and_then(Value::as_array) {
            Some(items) => Some(items),
            None => {
                warn!("unrecognized search page shape; treating as zero records");
                None
            }
        },
        Value::Array(items) => Some(items),
        _ => {
            warn!("unrecognized search page shape; treating as zero records");
            None
        }
    }
}

fn contact_from_value(value: &Value) -> Option<ContactRecord> {
    let person_id = string_at(value, &["personId", "id"])?;

    let signal_score = u32_at(value, &["signalScore"]);
    let signal_strength = string_at(value, &["signalStrength"])
        .and_then(|label| SignalStrength::from_label(&label))
        .or_else(|| signal_score.map(SignalStrength::from_score));

    Some(ContactRecord {
        person_id,
        first_name: string_at(value, &["firstName"]),
        last_name: string_at(value, &["lastName"]),
        title: string_at(value, &["jobTitle", "title"]),
        management_level: management_level_at(value),
        email: string_at(value, &["email", "emailAddress"]),
        phone: string_at(value, &["phone", "directPhoneNumber", "mobilePhoneNumber"]),
        company_id: string_at(value, &["companyId", "company.id"]),
        company_name: string_at(value, &["companyName", "company.name"]),
        city: string_at(value, &["city", "location.city"]),
        state: string_at(value, &["state", "location.state"]),
        zip: string_at(value, &["zipCode", "zip", "location.zip"]),
        accuracy_score: u32_at(value, &["contactAccuracyScore", "accuracyScore"]),
        signal_score,
        signal_strength,
        discovered_by: None,
    })
}

fn company_from_value(value: &Value) -> Option<CompanyRecord> {
    let company_id = string_at(value, &["companyId", "id"])?;

    let signal_score = u32_at(value, &["signalScore", "score"]);
    let signal_strength = string_at(value, &["signalStrength"])
        .and_then(|label| SignalStrength::from_label(&label))
        .or_else(|| signal_score.map(SignalStrength::from_score));

    Some(CompanyRecord {
        company_id,
        name: string_at(value, &["companyName", "name"]),
        zip: string_at(value, &["zipCode", "zip", "location.zip"]),
        sic_codes: string_list_at(value, &["sicCodes", "sicCode"]),
        employee_count: u32_at(value, &["employeeCount", "employees"]),
        signal_topic: string_at(value, &["topic"]),
        signal_score,
        signal_strength,
    })
}

/// Management level arrives as a string or a list of strings
fn management_level_at(value: &Value) -> Option<String> {
    match lookup(value, "managementLevel") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Array(items)) => {
            let labels: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if labels.is_empty() {
                None
            } else {
                Some(labels.join(", "))
            }
        }
        _ => None,
    }
}

/// Resolve a dotted path like `company.name` within a JSON value
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// First non-null string (or stringified number) among the candidate paths
fn string_at(value: &Value, paths: &[&str]) -> Option<String> {
    for path in paths {
        match lookup(value, path) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}

/// First non-null unsigned number (or numeric string) among the candidates
fn u32_at(value: &Value, paths: &[&str]) -> Option<u32> {
    for path in paths {
        match lookup(value, path) {
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_u64() {
                    return u32::try_from(v).ok();
                }
                // Fractional scores round down
                if let Some(v) = n.as_f64() {
                    return Some(v.max(0.0) as u32);
                }
            }
            Some(Value::String(s)) => {
                if let Ok(v) = s.parse::<u32>() {
                    return Some(v);
                }
            }
            _ => continue,
        }
    }
    None
}

/// List-valued field that may arrive as an array or a comma-joined string
fn string_list_at(value: &Value, paths: &[&str]) -> Vec<String> {
    for path in paths {
        match lookup(value, path) {
            Some(Value::Array(items)) => {
                let list: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect();
                if !list.is_empty() {
                    return list;
                }
            }
            Some(Value::String(s)) if !s.is_empty() => {
                return s.split(',').map(|part| part.trim().to_string()).collect();
            }
            _ => continue,
        }
    }
    Vec::new()
}
