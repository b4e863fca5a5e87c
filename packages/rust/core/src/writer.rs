//! Concept writer: one accepted concept → an abstract and a localized YAML record.
//!
//! Layout:
//! ```text
//! <universal_dir>/<abstract_id>.yaml     id, dateAccepted, related, status,
//!                                        data { identifier, localizedConcepts { <lang>: <localized_id> } }
//! <localized_dir>/<localized_id>.yaml    id, dateAccepted, status, related,
//!                                        data { definition, examples, notes, terms },
//!                                        authoritativeSource?
//! ```
//!
//! Both documents are staged as hidden temp files before either is renamed
//! into place. A failure between the two renames still leaves an abstract
//! record without its localized counterpart; nothing reconciles that.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use glossimport_shared::{
    AuthoritativeSource, Concept, Designation, DesignationType, GlossImportError,
    GrammaticalGender, GrammaticalNumber, PartOfSpeech, Result,
};

/// File extension of every record.
pub const RECORD_EXTENSION: &str = "yaml";

const STATUS_VALID: &str = "valid";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Language-neutral half of a concept.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractRecord<'a> {
    pub id: Uuid,
    #[serde(serialize_with = "serialize_date")]
    pub date_accepted: DateTime<Utc>,
    pub related: Vec<String>,
    pub status: &'static str,
    pub data: AbstractData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractData<'a> {
    pub identifier: &'a str,
    /// Language code → localized record ID.
    pub localized_concepts: BTreeMap<&'a str, Uuid>,
}

/// Language-specific half of a concept.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedRecord<'a> {
    pub id: Uuid,
    #[serde(serialize_with = "serialize_date")]
    pub date_accepted: DateTime<Utc>,
    pub status: &'static str,
    pub related: Vec<String>,
    pub data: LocalizedData<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authoritative_source: Option<Vec<&'a AuthoritativeSource>>,
}

#[derive(Debug, Serialize)]
pub struct LocalizedData<'a> {
    pub definition: &'a str,
    pub examples: &'a [String],
    pub notes: &'a [String],
    pub terms: Vec<Term<'a>>,
}

/// Whether a term is the primary designation of its concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NormativeStatus {
    Preferred,
    Admitted,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Term<'a> {
    pub designation: &'a str,
    #[serde(rename = "type")]
    pub kind: DesignationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<PartOfSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<GrammaticalGender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammatical_number: Option<GrammaticalNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_abbreviation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_participle: Option<bool>,
    #[serde(rename = "normative_status")]
    pub normative_status: NormativeStatus,
}

impl<'a> AbstractRecord<'a> {
    pub fn new(concept: &'a Concept, lang_code: &'a str) -> Self {
        Self {
            id: concept.abstract_id,
            date_accepted: concept.date_accepted,
            related: Vec::new(),
            status: STATUS_VALID,
            data: AbstractData {
                identifier: &concept.identifier,
                localized_concepts: BTreeMap::from([(lang_code, concept.localized_id)]),
            },
        }
    }
}

impl<'a> LocalizedRecord<'a> {
    pub fn new(concept: &'a Concept) -> Self {
        Self {
            id: concept.localized_id,
            date_accepted: concept.date_accepted,
            status: STATUS_VALID,
            related: Vec::new(),
            data: LocalizedData {
                definition: &concept.definition,
                examples: &concept.examples,
                notes: &concept.notes,
                terms: concept
                    .designations
                    .iter()
                    .enumerate()
                    .map(|(idx, d)| Term::new(d, idx))
                    .collect(),
            },
            authoritative_source: concept.authoritative_source.as_ref().map(|s| vec![s]),
        }
    }
}

impl<'a> Term<'a> {
    /// `position` is the designation's index; only the first is preferred.
    fn new(designation: &'a Designation, position: usize) -> Self {
        Self {
            designation: &designation.text,
            kind: designation.kind,
            part_of_speech: designation.part_of_speech,
            gender: designation.grammatical_gender,
            grammatical_number: designation.grammatical_number,
            is_abbreviation: designation.is_abbreviation.then_some(true),
            is_participle: designation.is_participle.then_some(true),
            normative_status: if position == 0 {
                NormativeStatus::Preferred
            } else {
                NormativeStatus::Admitted
            },
        }
    }
}

fn serialize_date<S: Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Path of the record named after `id` inside `dir`.
pub fn record_path(dir: &Path, id: Uuid) -> PathBuf {
    dir.join(format!("{id}.{RECORD_EXTENSION}"))
}

/// Write the abstract record into `universal_dir` and the localized record
/// into `localized_dir`. Both directories must already exist.
#[instrument(skip_all, fields(identifier = %concept.identifier, lang = lang_code))]
pub fn write_concept(
    concept: &Concept,
    universal_dir: &Path,
    localized_dir: &Path,
    lang_code: &str,
) -> Result<()> {
    let abstract_yaml = to_yaml(&AbstractRecord::new(concept, lang_code))?;
    let localized_yaml = to_yaml(&LocalizedRecord::new(concept))?;

    let abstract_path = record_path(universal_dir, concept.abstract_id);
    let localized_path = record_path(localized_dir, concept.localized_id);

    let abstract_temp = stage(&abstract_path, &abstract_yaml)?;
    let localized_temp = match stage(&localized_path, &localized_yaml) {
        Ok(temp) => temp,
        Err(e) => {
            let _ = std::fs::remove_file(&abstract_temp);
            return Err(e);
        }
    };

    if let Err(e) = commit(&abstract_temp, &abstract_path) {
        let _ = std::fs::remove_file(&abstract_temp);
        let _ = std::fs::remove_file(&localized_temp);
        return Err(e);
    }

    if let Err(e) = commit(&localized_temp, &localized_path) {
        let _ = std::fs::remove_file(&localized_temp);
        warn!(
            path = %abstract_path.display(),
            "abstract record written without its localized record"
        );
        return Err(e);
    }

    debug!(
        abstract_id = %concept.abstract_id,
        localized_id = %concept.localized_id,
        terms = concept.designations.len(),
        "wrote concept records"
    );
    Ok(())
}

fn to_yaml<T: Serialize>(record: &T) -> Result<String> {
    serde_yaml::to_string(record)
        .map_err(|e| GlossImportError::Serialization(format!("YAML serialization failed: {e}")))
}

/// Write `content` next to `target` under a hidden temp name.
fn stage(target: &Path, content: &str) -> Result<PathBuf> {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = target.with_file_name(format!(".{file_name}.tmp"));
    std::fs::write(&temp, content).map_err(|e| GlossImportError::write_failure(&temp, e))?;
    Ok(temp)
}

fn commit(temp: &Path, target: &Path) -> Result<()> {
    std::fs::rename(temp, target).map_err(|e| GlossImportError::write_failure(target, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use glossimport_shared::Row;
    use glossimport_shared::schema::{DATE_ACCEPTED, DEFINITION, IDENTIFIER};
    use serde_yaml::Value;

    use crate::extract::extract;
    use crate::validate::validate;

    fn temp_dirs() -> (PathBuf, PathBuf, PathBuf) {
        let root = std::env::temp_dir().join(format!("gi-writer-test-{}", Uuid::now_v7()));
        let universal = root.join("universal");
        let localized = root.join("eng");
        std::fs::create_dir_all(&universal).unwrap();
        std::fs::create_dir_all(&localized).unwrap();
        (root, universal, localized)
    }

    fn rate_concept() -> Concept {
        let mut row = Row::blank();
        row.set(IDENTIFIER, "rate");
        row.set(DEFINITION, "speed of change");
        row.set("Note 1", "");
        row.set("Term 1 designation", "rate");
        row.set("Term 1 type", "expression");
        row.set(DATE_ACCEPTED, "2020-01-01");
        validate(extract(&row)).expect("valid row")
    }

    fn designation(text: &str, kind: DesignationType) -> Designation {
        Designation {
            text: text.into(),
            kind,
            part_of_speech: None,
            grammatical_number: None,
            grammatical_gender: None,
            is_participle: false,
            is_abbreviation: false,
        }
    }

    fn read_yaml(path: &Path) -> Value {
        serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn rate_scenario_writes_linked_records() {
        let (root, universal, localized) = temp_dirs();
        let concept = rate_concept();

        write_concept(&concept, &universal, &localized, "eng").unwrap();

        assert_eq!(std::fs::read_dir(&universal).unwrap().count(), 1);
        assert_eq!(std::fs::read_dir(&localized).unwrap().count(), 1);

        let abstract_doc = read_yaml(&record_path(&universal, concept.abstract_id));
        let localized_doc = read_yaml(&record_path(&localized, concept.localized_id));

        assert_eq!(
            abstract_doc["id"].as_str(),
            Some(concept.abstract_id.to_string().as_str())
        );
        assert_eq!(abstract_doc["status"].as_str(), Some("valid"));
        assert_eq!(abstract_doc["related"], Value::Sequence(vec![]));
        assert_eq!(
            abstract_doc["dateAccepted"].as_str(),
            Some("2020-01-01T00:00:00.000Z")
        );
        assert_eq!(abstract_doc["data"]["identifier"].as_str(), Some("rate"));
        assert_eq!(
            abstract_doc["data"]["localizedConcepts"]["eng"],
            localized_doc["id"]
        );

        assert_eq!(
            localized_doc["data"]["definition"].as_str(),
            Some("speed of change")
        );
        assert_eq!(localized_doc["data"]["notes"], Value::Sequence(vec![]));
        assert_eq!(localized_doc["data"]["examples"], Value::Sequence(vec![]));
        let expected_terms: Value = serde_yaml::from_str(
            "- designation: rate\n  type: expression\n  normative_status: preferred\n",
        )
        .unwrap();
        assert_eq!(localized_doc["data"]["terms"], expected_terms);
        assert!(localized_doc.get("authoritativeSource").is_none());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn first_term_is_preferred_rest_admitted() {
        let mut concept = rate_concept();
        concept.designations = vec![
            designation("rate", DesignationType::Expression),
            designation("r", DesignationType::Symbol),
            designation("rate-", DesignationType::Prefix),
        ];

        let record = LocalizedRecord::new(&concept);
        let statuses: Vec<_> = record
            .data
            .terms
            .iter()
            .map(|t| (t.designation, t.normative_status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("rate", NormativeStatus::Preferred),
                ("r", NormativeStatus::Admitted),
                ("rate-", NormativeStatus::Admitted),
            ]
        );
    }

    #[test]
    fn term_projection_renames_gender_and_keeps_markers() {
        let mut concept = rate_concept();
        let d = &mut concept.designations[0];
        d.grammatical_gender = Some(GrammaticalGender::Feminine);
        d.grammatical_number = Some(GrammaticalNumber::Singular);
        d.part_of_speech = Some(PartOfSpeech::Noun);
        d.is_participle = true;

        let yaml = to_yaml(&LocalizedRecord::new(&concept)).unwrap();
        let doc: Value = serde_yaml::from_str(&yaml).unwrap();
        let term = &doc["data"]["terms"][0];
        assert_eq!(term["gender"].as_str(), Some("feminine"));
        assert_eq!(term["grammaticalNumber"].as_str(), Some("singular"));
        assert_eq!(term["partOfSpeech"].as_str(), Some("noun"));
        assert_eq!(term["isParticiple"].as_bool(), Some(true));
        assert!(term.get("isAbbreviation").is_none());
        assert!(term.get("grammaticalGender").is_none());
    }

    #[test]
    fn authoritative_source_is_a_single_element_list() {
        let mut concept = rate_concept();
        concept.authoritative_source = Some(AuthoritativeSource {
            r#ref: Some("ISO 80000-3:2019".into()),
            clause: Some("3-8.1".into()),
            link: None,
        });

        let yaml = to_yaml(&LocalizedRecord::new(&concept)).unwrap();
        let doc: Value = serde_yaml::from_str(&yaml).unwrap();
        let sources = doc["authoritativeSource"].as_sequence().expect("list");
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0]["ref"].as_str(), Some("ISO 80000-3:2019"));
        assert!(sources[0].get("link").is_none());
    }

    #[test]
    fn writing_twice_is_byte_identical() {
        let (root, universal, localized) = temp_dirs();
        let mut concept = rate_concept();
        concept.date_accepted = Utc.with_ymd_and_hms(2022, 3, 4, 5, 6, 7).unwrap();

        write_concept(&concept, &universal, &localized, "eng").unwrap();
        let first_abstract = std::fs::read(record_path(&universal, concept.abstract_id)).unwrap();
        let first_localized = std::fs::read(record_path(&localized, concept.localized_id)).unwrap();

        write_concept(&concept, &universal, &localized, "eng").unwrap();
        assert_eq!(
            std::fs::read(record_path(&universal, concept.abstract_id)).unwrap(),
            first_abstract
        );
        assert_eq!(
            std::fs::read(record_path(&localized, concept.localized_id)).unwrap(),
            first_localized
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (root, universal, localized) = temp_dirs();
        write_concept(&rate_concept(), &universal, &localized, "eng").unwrap();

        for dir in [&universal, &localized] {
            for entry in std::fs::read_dir(dir).unwrap() {
                let name = entry.unwrap().file_name().to_string_lossy().to_string();
                assert!(!name.starts_with('.'), "temp file left behind: {name}");
            }
        }

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_localized_dir_leaves_no_records() {
        let (root, universal, localized) = temp_dirs();
        std::fs::remove_dir_all(&localized).unwrap();

        let err = write_concept(&rate_concept(), &universal, &localized, "eng").unwrap_err();
        assert!(matches!(err, GlossImportError::WriteFailure { .. }));
        assert_eq!(std::fs::read_dir(&universal).unwrap().count(), 0);

        let _ = std::fs::remove_dir_all(&root);
    }
}
