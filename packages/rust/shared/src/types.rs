//! Core domain types for imported glossary concepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for abstract concept identifiers (derived from the
/// human-readable identifier).
pub const ABSTRACT_NAMESPACE: Uuid = Uuid::from_u128(0x1271bc90_eee4_11eb_99fe_bdf91729b15a);

/// Namespace for localized concept identifiers (derived from the whole row).
pub const LOCALIZED_NAMESPACE: Uuid = Uuid::from_u128(0x544cb700_eee4_11eb_99fe_bdf91729b15a);

// ---------------------------------------------------------------------------
// Closed vocabularies
// ---------------------------------------------------------------------------

/// Generates a closed-vocabulary enum with exact lower-case parsing.
macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every accepted value, in canonical order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownTerm;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownTerm(other.to_string())),
                }
            }
        }
    };
}

/// A value outside one of the closed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownTerm(pub String);

vocabulary! {
    /// Kind of designation.
    DesignationType {
        Expression => "expression",
        Symbol => "symbol",
        Prefix => "prefix",
    }
}

vocabulary! {
    PartOfSpeech {
        Noun => "noun",
        Adjective => "adjective",
        Adverb => "adverb",
        Verb => "verb",
    }
}

vocabulary! {
    GrammaticalNumber {
        Plural => "plural",
        Singular => "singular",
        Mass => "mass",
    }
}

vocabulary! {
    GrammaticalGender {
        Common => "common",
        Feminine => "feminine",
        Masculine => "masculine",
        Neuter => "neuter",
    }
}

// ---------------------------------------------------------------------------
// Concept
// ---------------------------------------------------------------------------

/// One named form of a concept in a given language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Designation {
    /// The literal term. Never blank.
    pub text: String,
    pub kind: DesignationType,
    pub part_of_speech: Option<PartOfSpeech>,
    pub grammatical_number: Option<GrammaticalNumber>,
    pub grammatical_gender: Option<GrammaticalGender>,
    pub is_participle: bool,
    pub is_abbreviation: bool,
}

/// Where a definition comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoritativeSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A validated glossary entry, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    /// UUIDv5 of the human-readable identifier under [`ABSTRACT_NAMESPACE`].
    pub abstract_id: Uuid,
    /// UUIDv5 of the full source row under [`LOCALIZED_NAMESPACE`].
    pub localized_id: Uuid,
    pub identifier: String,
    pub date_accepted: DateTime<Utc>,
    pub definition: String,
    pub notes: Vec<String>,
    pub examples: Vec<String>,
    /// At least one entry; the first is the preferred term.
    pub designations: Vec<Designation>,
    pub authoritative_source: Option<AuthoritativeSource>,
}
