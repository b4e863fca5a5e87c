//! Row extraction: one CSV row → an unvalidated concept candidate.
//!
//! Extraction never fails. Enum-valued fields are kept as raw strings so the
//! validator can report exactly which value was out of vocabulary.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use glossimport_shared::schema::{
    DATE_ACCEPTED, DEFINITION, EXAMPLE_FIELDS, IDENTIFIER, NOTE_FIELDS, SOURCE_CLAUSE,
    SOURCE_LINK, SOURCE_REF, TERM_GROUPS, TermGroup,
};
use glossimport_shared::{ABSTRACT_NAMESPACE, AuthoritativeSource, LOCALIZED_NAMESPACE, Row};

/// The "Date accepted" column after interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptedDate {
    /// A parsed date, or the processing time when the column was blank.
    Date(DateTime<Utc>),
    /// A non-blank value that is not an ISO-8601 date.
    Unparseable(String),
}

/// A designation as read from one term group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignationCandidate {
    pub text: String,
    pub kind: String,
    pub part_of_speech: Option<String>,
    pub grammatical_number: Option<String>,
    pub grammatical_gender: Option<String>,
    pub is_participle: bool,
    pub is_abbreviation: bool,
}

/// A concept as read from one row, not yet checked against the vocabularies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptCandidate {
    pub abstract_id: Uuid,
    pub localized_id: Uuid,
    pub identifier: String,
    pub date_accepted: AcceptedDate,
    pub definition: String,
    pub notes: Vec<String>,
    pub examples: Vec<String>,
    pub designations: Vec<DesignationCandidate>,
    pub authoritative_source: Option<AuthoritativeSource>,
}

/// Extract a candidate, using the current time for a blank "Date accepted".
pub fn extract(row: &Row) -> ConceptCandidate {
    extract_at(row, Utc::now())
}

/// Extract a candidate, using `now` for a blank "Date accepted".
pub fn extract_at(row: &Row, now: DateTime<Utc>) -> ConceptCandidate {
    let identifier = row.get(IDENTIFIER);

    ConceptCandidate {
        abstract_id: Uuid::new_v5(&ABSTRACT_NAMESPACE, identifier.as_bytes()),
        localized_id: Uuid::new_v5(&LOCALIZED_NAMESPACE, row.canonical_json().as_bytes()),
        identifier: identifier.to_string(),
        date_accepted: accepted_date(row.get(DATE_ACCEPTED), now),
        definition: row.get(DEFINITION).to_string(),
        notes: filled_slots(row, &NOTE_FIELDS),
        examples: filled_slots(row, &EXAMPLE_FIELDS),
        designations: TERM_GROUPS
            .iter()
            .filter_map(|group| designation(row, group))
            .collect(),
        authoritative_source: authoritative_source(row),
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Values of the given slots that are not blank, in slot order.
fn filled_slots(row: &Row, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .map(|field| row.get(field))
        .filter(|value| non_blank(value).is_some())
        .map(str::to_string)
        .collect()
}

/// One designation per term group with at least one non-blank sub-field.
fn designation(row: &Row, group: &TermGroup) -> Option<DesignationCandidate> {
    if group.fields().iter().all(|f| non_blank(row.get(f)).is_none()) {
        return None;
    }

    let optional = |field: &str| non_blank(row.get(field)).map(str::to_string);

    Some(DesignationCandidate {
        text: row.get(group.designation).to_string(),
        kind: row.get(group.kind).trim().to_string(),
        part_of_speech: optional(group.part_of_speech),
        grammatical_number: optional(group.grammatical_number),
        grammatical_gender: optional(group.grammatical_gender),
        is_participle: non_blank(row.get(group.participle_marker)).is_some(),
        is_abbreviation: non_blank(row.get(group.abbreviation_marker)).is_some(),
    })
}

fn authoritative_source(row: &Row) -> Option<AuthoritativeSource> {
    let source = AuthoritativeSource {
        r#ref: non_blank(row.get(SOURCE_REF)).map(str::to_string),
        clause: non_blank(row.get(SOURCE_CLAUSE)).map(str::to_string),
        link: non_blank(row.get(SOURCE_LINK)).map(str::to_string),
    };
    (source != AuthoritativeSource::default()).then_some(source)
}

fn accepted_date(value: &str, now: DateTime<Utc>) -> AcceptedDate {
    match non_blank(value) {
        None => AcceptedDate::Date(now),
        Some(text) => parse_iso_date(text)
            .map(AcceptedDate::Date)
            .unwrap_or_else(|| AcceptedDate::Unparseable(text.to_string())),
    }
}

/// Date-time layouts without an offset, read as UTC.
const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Accepts ISO-8601 calendar dates (`YYYY-MM-DD`, `YYYYMMDD`, `YYYY-MM`,
/// midnight UTC) and date-times at minute or finer precision, with a `Z`,
/// an offset, or no offset (UTC).
fn parse_iso_date(text: &str) -> Option<DateTime<Utc>> {
    if let Some(date) = parse_calendar_date(text) {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = text.strip_suffix('Z').unwrap_or(text);
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|dt| dt.and_utc())
}

/// Extended, basic and reduced-precision (year-month) calendar dates.
fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    let bytes = text.as_bytes();
    match bytes.len() {
        8 if bytes.iter().all(u8::is_ascii_digit) => NaiveDate::from_ymd_opt(
            text[..4].parse().ok()?,
            text[4..6].parse().ok()?,
            text[6..].parse().ok()?,
        ),
        7 if bytes[4] == b'-' => NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok(),
        _ => None,
    }
}
