//! End-to-end `import` pipeline: CSV → scaffold → parse → write records.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{info, instrument, warn};

use glossimport_shared::{Concept, GlossImportError, ImportSettings, Result};

use crate::parser::{ParseOptions, count_rows, parse_csv};
use crate::scaffold::ensure_meta;
use crate::writer::write_concept;

/// Directory of abstract concept records inside the universal subregister.
pub const CONCEPT_DIR: &str = "concept";

/// Directory of localized concept records inside a language subregister.
pub const LOCALIZED_CONCEPT_DIR: &str = "localized-concept";

/// Result of the `import_glossary` pipeline.
#[derive(Debug)]
pub struct ImportResult {
    /// The created dataset directory.
    pub dataset_path: PathBuf,
    /// Number of concepts written (two records each).
    pub concepts_written: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress sink for reporting pipeline status. Both calls are
/// fire-and-forget and may happen any number of times.
pub trait ProgressReporter: Send + Sync {
    /// A human-readable status line.
    fn on_output(&self, message: &str);
    /// Coarse progress: `completed` of `total` rows done.
    fn on_progress(&self, total: usize, completed: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn on_output(&self, _message: &str) {}
    fn on_progress(&self, _total: usize, _completed: usize) {}
}

/// Run the full `import` pipeline.
///
/// 1. Scaffold repository, dataset and register metadata
/// 2. Count rows for progress reporting
/// 3. Create the concept directories
/// 4. Stream concepts and write both records for each, in row order
///
/// `cancel` is checked before each row is read; once set, the run stops
/// with [`GlossImportError::Cancelled`].
#[instrument(skip_all, fields(csv = %settings.input_csv.display(), dataset = %settings.glossary_id))]
pub fn import_glossary(
    settings: &ImportSettings,
    progress: &dyn ProgressReporter,
    cancel: &AtomicBool,
) -> Result<ImportResult> {
    let start = Instant::now();
    let options = ParseOptions {
        has_header_row: settings.header_row,
    };

    info!(lang = %settings.lang_code, "starting import pipeline");

    let paths = ensure_meta(settings, progress)?;

    let total = count_rows(&settings.input_csv, options)?;
    info!(rows = total, "counted source rows");

    let universal_dir = paths.universal.join(CONCEPT_DIR);
    let localized_dir = paths.localized.join(LOCALIZED_CONCEPT_DIR);
    for dir in [&universal_dir, &localized_dir] {
        std::fs::create_dir(dir).map_err(|e| GlossImportError::io(dir, e))?;
    }

    let concepts = parse_csv(&settings.input_csv, options)?;
    let dirs = ConceptDirs {
        universal: &universal_dir,
        localized: &localized_dir,
        lang_code: &settings.lang_code,
    };
    let written = write_concepts(concepts, &dirs, total, progress, cancel)?;

    let result = ImportResult {
        dataset_path: paths.dataset,
        concepts_written: written,
        elapsed: start.elapsed(),
    };

    info!(
        concepts = result.concepts_written,
        elapsed_ms = result.elapsed.as_millis(),
        "import pipeline complete"
    );

    Ok(result)
}

/// Target directories of one import run.
struct ConceptDirs<'a> {
    universal: &'a Path,
    localized: &'a Path,
    lang_code: &'a str,
}

/// Write concepts in order until the source ends, a row fails, or `cancel`
/// is set. The flag is checked before the next concept is pulled.
fn write_concepts(
    mut concepts: impl Iterator<Item = Result<Concept>>,
    dirs: &ConceptDirs<'_>,
    total: usize,
    progress: &dyn ProgressReporter,
    cancel: &AtomicBool,
) -> Result<usize> {
    let mut written = 0usize;
    loop {
        if cancel.load(Ordering::Relaxed) {
            warn!(completed = written, "import cancelled");
            return Err(GlossImportError::Cancelled { completed: written });
        }
        let Some(concept) = concepts.next() else {
            return Ok(written);
        };

        let concept = concept?;
        let ordinal = written + 1;
        progress.on_output(&format!("parsed concept {ordinal}"));

        write_concept(&concept, dirs.universal, dirs.localized, dirs.lang_code)?;
        written = ordinal;

        progress.on_output(&format!("wrote YAML for concept {ordinal}"));
        progress.on_progress(total, written);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use glossimport_shared::AppConfig;

    /// Records every call for assertions.
    #[derive(Default)]
    struct RecordingProgress {
        output: Mutex<Vec<String>>,
        progress: Mutex<Vec<(usize, usize)>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn on_output(&self, message: &str) {
            self.output.lock().unwrap().push(message.to_string());
        }
        fn on_progress(&self, total: usize, completed: usize) {
            self.progress.lock().unwrap().push((total, completed));
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gi-pipeline-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn settings(csv: &Path, out: &Path) -> ImportSettings {
        let mut settings = ImportSettings::new(csv, "demo", &AppConfig::default());
        settings.output_dir = out.to_path_buf();
        settings.domain_name = "glossary.example.com".into();
        settings.header_row = true;
        settings
    }

    fn fixture() -> &'static Path {
        Path::new("../../../fixtures/csv/glossary.fixture.csv")
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn imports_fixture() {
        let out = temp_dir();
        let progress = RecordingProgress::default();

        let result =
            import_glossary(&settings(fixture(), &out), &progress, &AtomicBool::new(false)).unwrap();

        assert_eq!(result.concepts_written, 3);
        assert_eq!(result.dataset_path, out.join("demo"));

        let subregisters = out.join("demo/subregisters");
        assert_eq!(file_count(&subregisters.join("universal/concept")), 3);
        assert_eq!(file_count(&subregisters.join("eng/localized-concept")), 3);

        assert_eq!(
            *progress.progress.lock().unwrap(),
            vec![(3, 1), (3, 2), (3, 3)]
        );
        let output = progress.output.lock().unwrap();
        assert_eq!(output[0], "Writing Paneron meta…");
        assert!(output.contains(&"parsed concept 2".to_string()));
        assert_eq!(output.last().map(String::as_str), Some("wrote YAML for concept 3"));

        let _ = std::fs::remove_dir_all(&out);
    }

    #[test]
    fn every_abstract_record_links_its_localized_record() {
        let out = temp_dir();
        import_glossary(&settings(fixture(), &out), &SilentProgress, &AtomicBool::new(false))
            .unwrap();

        let subregisters = out.join("demo/subregisters");
        let localized_dir = subregisters.join("eng/localized-concept");
        for entry in std::fs::read_dir(subregisters.join("universal/concept")).unwrap() {
            let doc: serde_yaml::Value =
                serde_yaml::from_str(&std::fs::read_to_string(entry.unwrap().path()).unwrap())
                    .unwrap();
            let localized_id = doc["data"]["localizedConcepts"]["eng"].as_str().unwrap();
            assert!(localized_dir.join(format!("{localized_id}.yaml")).exists());
        }

        let _ = std::fs::remove_dir_all(&out);
    }

    #[test]
    fn invalid_row_aborts_after_earlier_rows_are_written() {
        let out = temp_dir();
        let csv = out.join("broken.csv");
        let mut content = std::fs::read_to_string(fixture()).unwrap();
        content.push_str("orphan,2020-01-01,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,\n");
        std::fs::write(&csv, content).unwrap();

        let err = import_glossary(&settings(&csv, &out), &SilentProgress, &AtomicBool::new(false))
            .unwrap_err();
        assert_eq!(err.row(), Some(4));
        assert!(matches!(err, GlossImportError::InvalidConcept { .. }));

        let concepts = out.join("demo/subregisters/universal/concept");
        assert_eq!(file_count(&concepts), 3);

        let _ = std::fs::remove_dir_all(&out);
    }

    /// Requests cancellation as soon as the first concept is reported done.
    struct CancelAfterFirst<'a> {
        cancel: &'a AtomicBool,
    }

    impl ProgressReporter for CancelAfterFirst<'_> {
        fn on_output(&self, _message: &str) {}
        fn on_progress(&self, _total: usize, _completed: usize) {
            self.cancel.store(true, Ordering::Relaxed);
        }
    }

    #[test]
    fn cancellation_does_not_read_another_row() {
        let out = temp_dir();
        let universal = out.join("universal");
        let localized = out.join("eng");
        std::fs::create_dir_all(&universal).unwrap();
        std::fs::create_dir_all(&localized).unwrap();

        let concepts: Vec<Concept> = parse_csv(fixture(), ParseOptions { has_header_row: true })
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let pulled = std::cell::Cell::new(0usize);
        let source = concepts.into_iter().map(Ok).inspect(|_| pulled.set(pulled.get() + 1));

        let cancel = AtomicBool::new(false);
        let dirs = ConceptDirs {
            universal: &universal,
            localized: &localized,
            lang_code: "eng",
        };
        let err = write_concepts(source, &dirs, 3, &CancelAfterFirst { cancel: &cancel }, &cancel)
            .unwrap_err();

        assert!(matches!(err, GlossImportError::Cancelled { completed: 1 }));
        assert_eq!(pulled.get(), 1);
        assert_eq!(file_count(&universal), 1);
        assert_eq!(file_count(&localized), 1);

        let _ = std::fs::remove_dir_all(&out);
    }

    #[test]
    fn cancellation_stops_before_the_next_row() {
        let out = temp_dir();
        let cancel = AtomicBool::new(true);

        let err = import_glossary(&settings(fixture(), &out), &SilentProgress, &cancel).unwrap_err();
        assert!(matches!(err, GlossImportError::Cancelled { completed: 0 }));
        assert_eq!(file_count(&out.join("demo/subregisters/universal/concept")), 0);

        let _ = std::fs::remove_dir_all(&out);
    }
}
