//! Fixed column layout of a glossary CSV export.
//!
//! A source row always carries the same 33 fields, in this order. Repeated
//! term columns are described by [`TERM_GROUPS`] so callers iterate group
//! descriptors instead of hard-coding each group.

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const IDENTIFIER: &str = "Human-readable identifier";
pub const DATE_ACCEPTED: &str = "Date accepted";
pub const DEFINITION: &str = "Definition";

pub const NOTE_FIELDS: [&str; 3] = ["Note 1", "Note 2", "Note 3"];
pub const EXAMPLE_FIELDS: [&str; 3] = ["Example 1", "Example 2", "Example 3"];

pub const SOURCE_REF: &str = "Authoritative source reference";
pub const SOURCE_CLAUSE: &str = "Authoritative source clause";
pub const SOURCE_LINK: &str = "Authoritative source link";

/// Field names of one repeated "Term N" column family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermGroup {
    pub designation: &'static str,
    pub kind: &'static str,
    pub part_of_speech: &'static str,
    pub grammatical_number: &'static str,
    pub grammatical_gender: &'static str,
    pub participle_marker: &'static str,
    pub abbreviation_marker: &'static str,
}

impl TermGroup {
    /// All sub-field names of this group.
    pub fn fields(&self) -> [&'static str; 7] {
        [
            self.designation,
            self.kind,
            self.part_of_speech,
            self.grammatical_number,
            self.grammatical_gender,
            self.participle_marker,
            self.abbreviation_marker,
        ]
    }
}

macro_rules! term_group {
    ($n:literal) => {
        TermGroup {
            designation: concat!("Term ", $n, " designation"),
            kind: concat!("Term ", $n, " type"),
            part_of_speech: concat!("Term ", $n, " part of speech"),
            grammatical_number: concat!("Term ", $n, " grammatical number"),
            grammatical_gender: concat!("Term ", $n, " grammatical gender"),
            participle_marker: concat!("Term ", $n, " participle marker"),
            abbreviation_marker: concat!("Term ", $n, " abbreviation marker"),
        }
    };
}

/// Term groups in the order their designations are emitted.
pub const TERM_GROUPS: [TermGroup; 3] = [term_group!("1"), term_group!("2"), term_group!("3")];

/// Every column of the export, in file order.
pub const HEADERS: [&str; 33] = [
    IDENTIFIER,
    DATE_ACCEPTED,
    DEFINITION,
    NOTE_FIELDS[0],
    NOTE_FIELDS[1],
    NOTE_FIELDS[2],
    EXAMPLE_FIELDS[0],
    EXAMPLE_FIELDS[1],
    EXAMPLE_FIELDS[2],
    SOURCE_REF,
    SOURCE_CLAUSE,
    SOURCE_LINK,
    TERM_GROUPS[0].designation,
    TERM_GROUPS[0].kind,
    TERM_GROUPS[0].part_of_speech,
    TERM_GROUPS[0].grammatical_number,
    TERM_GROUPS[0].grammatical_gender,
    TERM_GROUPS[0].participle_marker,
    TERM_GROUPS[0].abbreviation_marker,
    TERM_GROUPS[1].designation,
    TERM_GROUPS[1].kind,
    TERM_GROUPS[1].part_of_speech,
    TERM_GROUPS[1].grammatical_number,
    TERM_GROUPS[1].grammatical_gender,
    TERM_GROUPS[1].participle_marker,
    TERM_GROUPS[1].abbreviation_marker,
    TERM_GROUPS[2].designation,
    TERM_GROUPS[2].kind,
    TERM_GROUPS[2].part_of_speech,
    TERM_GROUPS[2].grammatical_number,
    TERM_GROUPS[2].grammatical_gender,
    TERM_GROUPS[2].participle_marker,
    TERM_GROUPS[2].abbreviation_marker,
];

fn field_index(name: &str) -> Option<usize> {
    HEADERS.iter().position(|h| *h == name)
}

/// Whether `names` is exactly the expected field set: nothing missing,
/// nothing extra, nothing repeated.
pub fn matches_schema<'a>(names: impl IntoIterator<Item = &'a str>) -> bool {
    let mut seen = [false; HEADERS.len()];
    for name in names {
        match field_index(name) {
            Some(idx) if !seen[idx] => seen[idx] = true,
            _ => return false,
        }
    }
    seen.iter().all(|s| *s)
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One source row, holding a value for every schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    values: Vec<String>,
}

impl Row {
    /// A row with every field blank.
    pub fn blank() -> Self {
        Self {
            values: vec![String::new(); HEADERS.len()],
        }
    }

    /// Build a row from positional values. Returns `None` unless there is
    /// exactly one value per schema field.
    pub fn from_record<I, S>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        (values.len() == HEADERS.len()).then_some(Self { values })
    }

    /// Build a row from a name → value mapping. Returns `None` unless the
    /// field names satisfy [`matches_schema`].
    pub fn from_fields<I, K, V>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values: Vec<Option<String>> = vec![None; HEADERS.len()];
        for (name, value) in fields {
            let idx = field_index(name.as_ref())?;
            if values[idx].is_some() {
                return None;
            }
            values[idx] = Some(value.into());
        }
        values
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .map(|values| Self { values })
    }

    /// Value of a schema field. Unknown field names read as blank.
    pub fn get(&self, field: &str) -> &str {
        field_index(field).map_or("", |idx| self.values[idx].as_str())
    }

    /// Set a schema field. Returns `false` if `field` is not part of the schema.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match field_index(field) {
            Some(idx) => {
                self.values[idx] = value.into();
                true
            }
            None => false,
        }
    }

    /// `(field, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        HEADERS
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Compact JSON object of every field in schema order. This is the input
    /// to localized identifier derivation, so its format must stay stable.
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(self).expect("a map of string fields always serializes to JSON")
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(HEADERS.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
