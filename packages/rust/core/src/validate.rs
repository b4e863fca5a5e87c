//! Concept validation: candidate → accepted [`Concept`].
//!
//! Checks are row-local. Every violation in a candidate is reported, not
//! just the first one.

use std::str::FromStr;

use glossimport_shared::{
    Concept, Designation, DesignationType, GrammaticalGender, GrammaticalNumber, PartOfSpeech,
};

use crate::extract::{AcceptedDate, ConceptCandidate, DesignationCandidate};

/// A single reason a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("identifier is blank")]
    MissingIdentifier,

    #[error("definition is blank")]
    MissingDefinition,

    #[error("no designations")]
    NoDesignations,

    #[error("date accepted '{0}' is not an ISO-8601 date")]
    InvalidDate(String),

    #[error("term {term}: designation is blank")]
    BlankDesignation { term: usize },

    #[error("term {term}: {field} '{value}' is not one of [{allowed}]")]
    OutOfVocabulary {
        term: usize,
        field: &'static str,
        value: String,
        allowed: String,
    },
}

/// Join violations into one diagnostic line.
pub fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accept a candidate or list everything wrong with it.
pub fn validate(candidate: ConceptCandidate) -> Result<Concept, Vec<Violation>> {
    let mut violations = Vec::new();

    if candidate.identifier.trim().is_empty() {
        violations.push(Violation::MissingIdentifier);
    }
    if candidate.definition.trim().is_empty() {
        violations.push(Violation::MissingDefinition);
    }
    if candidate.designations.is_empty() {
        violations.push(Violation::NoDesignations);
    }

    let date_accepted = match candidate.date_accepted {
        AcceptedDate::Date(date) => Some(date),
        AcceptedDate::Unparseable(value) => {
            violations.push(Violation::InvalidDate(value));
            None
        }
    };

    let designations: Vec<Designation> = candidate
        .designations
        .iter()
        .enumerate()
        .filter_map(|(idx, d)| designation(idx + 1, d, &mut violations))
        .collect();

    match date_accepted {
        Some(date_accepted) if violations.is_empty() => Ok(Concept {
            abstract_id: candidate.abstract_id,
            localized_id: candidate.localized_id,
            identifier: candidate.identifier,
            date_accepted,
            definition: candidate.definition,
            notes: candidate.notes,
            examples: candidate.examples,
            designations,
            authoritative_source: candidate.authoritative_source,
        }),
        _ => Err(violations),
    }
}

fn designation(
    term: usize,
    candidate: &DesignationCandidate,
    violations: &mut Vec<Violation>,
) -> Option<Designation> {
    let before = violations.len();

    if candidate.text.trim().is_empty() {
        violations.push(Violation::BlankDesignation { term });
    }

    let kind = required::<DesignationType>(term, "type", &candidate.kind, violations);
    let part_of_speech = optional::<PartOfSpeech>(
        term,
        "part of speech",
        candidate.part_of_speech.as_deref(),
        violations,
    );
    let grammatical_number = optional::<GrammaticalNumber>(
        term,
        "grammatical number",
        candidate.grammatical_number.as_deref(),
        violations,
    );
    let grammatical_gender = optional::<GrammaticalGender>(
        term,
        "grammatical gender",
        candidate.grammatical_gender.as_deref(),
        violations,
    );

    if violations.len() > before {
        return None;
    }

    Some(Designation {
        text: candidate.text.clone(),
        kind: kind?,
        part_of_speech,
        grammatical_number,
        grammatical_gender,
        is_participle: candidate.is_participle,
        is_abbreviation: candidate.is_abbreviation,
    })
}

/// Implemented by the closed vocabularies so violations can list allowed values.
trait Vocabulary: FromStr + Copy + std::fmt::Display + 'static {
    fn all() -> &'static [Self];
}

macro_rules! impl_vocabulary {
    ($($ty:ty),+) => {
        $(impl Vocabulary for $ty {
            fn all() -> &'static [Self] {
                <$ty>::ALL
            }
        })+
    };
}

impl_vocabulary!(DesignationType, PartOfSpeech, GrammaticalNumber, GrammaticalGender);

fn out_of_vocabulary<T: Vocabulary>(term: usize, field: &'static str, value: &str) -> Violation {
    Violation::OutOfVocabulary {
        term,
        field,
        value: value.to_string(),
        allowed: T::all()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn required<T: Vocabulary>(
    term: usize,
    field: &'static str,
    value: &str,
    violations: &mut Vec<Violation>,
) -> Option<T> {
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            violations.push(out_of_vocabulary::<T>(term, field, value));
            None
        }
    }
}

fn optional<T: Vocabulary>(
    term: usize,
    field: &'static str,
    value: Option<&str>,
    violations: &mut Vec<Violation>,
) -> Option<T> {
    value.and_then(|v| required(term, field, v, violations))
}
