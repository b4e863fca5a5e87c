//! Glossary repository scaffolding.
//!
//! Creates the following layout:
//! ```text
//! <repo>/
//! ├── paneron.yaml
//! └── <dataset_id>/
//!     ├── panerondataset.yaml
//!     ├── register.yaml
//!     └── subregisters/
//!         ├── universal/
//!         └── <lang_code>/
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use glossimport_shared::{GlossImportError, ImportSettings, Result};

use crate::pipeline::ProgressReporter;

/// Extension that renders Glossarist datasets in Paneron.
pub const EXTENSION_ID: &str = "@riboseinc/paneron-extension-glossarist";
pub const EXTENSION_VERSION: &str = "1.0.0-dev6";

/// Directory name of the language-neutral subregister.
pub const UNIVERSAL_SUBREGISTER: &str = "universal";

/// Where the concept writer puts its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubregisterPaths {
    pub dataset: PathBuf,
    /// `subregisters/universal`
    pub universal: PathBuf,
    /// `subregisters/<lang_code>`
    pub localized: PathBuf,
}

// ---------------------------------------------------------------------------
// Metadata documents
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PaneronMeta<'a> {
    title: &'a str,
    datasets: BTreeMap<&'a str, bool>,
}

#[derive(Debug, Serialize)]
struct DatasetMeta<'a> {
    title: &'a str,
    #[serde(rename = "type")]
    kind: ExtensionRef,
}

#[derive(Debug, Serialize)]
struct ExtensionRef {
    id: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterMeta<'a> {
    name: &'a str,
    uniform_resource_identifier: String,
    stakeholders: Vec<Stakeholder<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Stakeholder<'a> {
    role: &'static str,
    name: &'a str,
    git_server_username: &'a str,
    parties: Vec<Party<'a>>,
}

#[derive(Debug, Serialize)]
struct Party<'a> {
    name: &'a str,
    contacts: Vec<Contact<'a>>,
}

#[derive(Debug, Serialize)]
struct Contact<'a> {
    label: &'static str,
    value: &'a str,
}

// ---------------------------------------------------------------------------
// Scaffolding
// ---------------------------------------------------------------------------

/// Write repository, dataset and register metadata and create the empty
/// subregister directories. Refuses to reuse an existing dataset directory.
#[instrument(skip_all, fields(repo = %settings.output_dir.display(), dataset = %settings.glossary_id))]
pub fn ensure_meta(
    settings: &ImportSettings,
    progress: &dyn ProgressReporter,
) -> Result<SubregisterPaths> {
    let repo = settings.output_dir.as_path();
    let dataset_id = settings.glossary_id.as_str();

    progress.on_output("Writing Paneron meta…");
    let dataset = write_paneron_meta(repo, dataset_id)?;

    progress.on_output("Writing dataset meta…");
    let paths = write_dataset_meta(&dataset, dataset_id, &settings.lang_code)?;

    progress.on_output("Writing register meta…");
    write_register_meta(&dataset, settings)?;

    info!(path = %dataset.display(), "dataset scaffolding complete");
    Ok(paths)
}

fn write_paneron_meta(repo: &Path, dataset_id: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(repo).map_err(|e| GlossImportError::io(repo, e))?;

    let meta = PaneronMeta {
        title: dataset_id,
        datasets: BTreeMap::from([(dataset_id, true)]),
    };
    write_yaml(&repo.join("paneron.yaml"), &meta)?;

    let dataset = repo.join(dataset_id);
    std::fs::create_dir(&dataset).map_err(|e| GlossImportError::io(&dataset, e))?;
    Ok(dataset)
}

fn write_dataset_meta(dataset: &Path, dataset_id: &str, lang_code: &str) -> Result<SubregisterPaths> {
    let meta = DatasetMeta {
        title: dataset_id,
        kind: ExtensionRef {
            id: EXTENSION_ID,
            version: EXTENSION_VERSION,
        },
    };
    write_yaml(&dataset.join("panerondataset.yaml"), &meta)?;

    let subregisters = dataset.join("subregisters");
    let universal = subregisters.join(UNIVERSAL_SUBREGISTER);
    let localized = subregisters.join(lang_code);
    for dir in [&subregisters, &universal, &localized] {
        std::fs::create_dir(dir).map_err(|e| GlossImportError::io(dir, e))?;
    }
    debug!(path = %subregisters.display(), "subregister directories created");

    Ok(SubregisterPaths {
        dataset: dataset.to_path_buf(),
        universal,
        localized,
    })
}

fn write_register_meta(dataset: &Path, settings: &ImportSettings) -> Result<()> {
    let register = &settings.register;
    let meta = RegisterMeta {
        name: &settings.glossary_id,
        uniform_resource_identifier: settings.register_uri(),
        stakeholders: vec![Stakeholder {
            role: "manager",
            name: &register.manager_name,
            git_server_username: &register.git_server_username,
            parties: vec![Party {
                name: "",
                contacts: vec![Contact {
                    label: "email",
                    value: &register.contact_email,
                }],
            }],
        }],
    };
    write_yaml(&dataset.join("register.yaml"), &meta)
}

/// Write a YAML document.
fn write_yaml<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(data)
        .map_err(|e| GlossImportError::Serialization(format!("YAML serialization failed: {e}")))?;
    std::fs::write(path, yaml).map_err(|e| GlossImportError::io(path, e))?;
    debug!(path = %path.display(), "wrote YAML file");
    Ok(())
}
