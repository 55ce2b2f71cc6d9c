//! Batch generation over a directory of cluster XML files.
//!
//! Each file is parsed, resolved and generated on its own; a failure is
//! logged and counted without stopping the batch. Once every file has been
//! processed the join artifacts are written from the sorted manifest.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use mattergen_schema::naming::module_ident;
use mattergen_schema::{ClusterIr, parse_cluster};

use crate::config::CodegenConfig;
use crate::error::CodegenError;
use crate::generator::{Generator, Skipped, check_tokens};
use crate::rust::DispatchGenerator;
use crate::rust::dispatch::{ATTRIBUTE_JSON_MODULE, ATTRIBUTE_NAMES_MODULE};

/// Module declaration file name.
const MOD_FILE: &str = "mod.rs";

/// One successfully generated cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Numeric cluster id.
    pub cluster_id: u32,
    /// Cluster name from the XML.
    pub cluster_name: String,
    /// Generated module name.
    pub module_name: String,
    /// Input file name.
    pub source_file: String,
    /// Whether the cluster declares attributes.
    pub has_attributes: bool,
}

/// Generated source for one cluster.
#[derive(Debug, Clone)]
pub struct GeneratedModule {
    /// Manifest record.
    pub entry: ManifestEntry,
    /// Module source.
    pub code: String,
    /// Definitions dropped because their generated name was taken.
    pub skipped: Vec<Skipped>,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Files generated successfully.
    pub processed: usize,
    /// `(file, error)` for every file that was skipped.
    pub failed: Vec<(String, String)>,
    /// Generated clusters sorted by `(cluster_id, module_name)`.
    pub manifest: Vec<ManifestEntry>,
    /// `(file, definition)` for every definition dropped on a name clash.
    pub skipped: Vec<(String, Skipped)>,
    /// Directory the files were written to.
    pub output_dir: PathBuf,
}

impl BatchReport {
    /// Returns true if at least one file was generated.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.processed > 0
    }
}

/// Drives generation for a directory of cluster files.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: CodegenConfig,
}

impl Orchestrator {
    /// Creates an orchestrator with the given configuration.
    #[must_use]
    pub fn new(config: CodegenConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Lists the `*.xml` files of `input_dir`, sorted by name.
    ///
    /// # Errors
    /// Returns `CodegenError::InvalidDirectory` if `input_dir` is not a
    /// directory, or an IO error if it cannot be read.
    pub fn input_files(&self, input_dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        if !input_dir.is_dir() {
            return Err(CodegenError::invalid_directory(input_dir));
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(input_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "xml") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Generates the module for one cluster document without touching the
    /// filesystem.
    ///
    /// # Errors
    /// Returns `CodegenError` if the XML does not parse or the generated
    /// module does not tokenize.
    pub fn generate_cluster(&self, file_name: &str, xml: &str) -> Result<GeneratedModule, CodegenError> {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        let module_name = module_ident(stem);

        let cluster = parse_cluster(xml)?;
        let ir = ClusterIr::from_cluster(&cluster);
        let (code, skipped) = Generator::new(&ir, &self.config)
            .with_source(file_name)
            .generate_with_skipped();
        check_tokens(&module_name, &code)?;

        Ok(GeneratedModule {
            entry: ManifestEntry {
                cluster_id: ir.cluster.id,
                cluster_name: ir.cluster.name.clone(),
                module_name,
                source_file: file_name.to_string(),
                has_attributes: ir.cluster.has_attributes(),
            },
            code,
            skipped,
        })
    }

    /// Generates every cluster in `input_dir` into `output_dir`.
    ///
    /// Per-file failures are recorded in the report. Join artifacts are
    /// written when at least one file succeeds.
    ///
    /// # Errors
    /// Returns `CodegenError` if either directory is unusable or a join
    /// artifact cannot be written.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport, CodegenError> {
        let files = self.input_files(input_dir)?;
        fs::create_dir_all(output_dir)?;
        if !output_dir.is_dir() {
            return Err(CodegenError::invalid_directory(output_dir));
        }

        let mut report = BatchReport {
            output_dir: output_dir.to_path_buf(),
            ..BatchReport::default()
        };
        let mut claimed: HashMap<String, String> = [ATTRIBUTE_JSON_MODULE, ATTRIBUTE_NAMES_MODULE]
            .into_iter()
            .map(|m| (m.to_string(), "<generated dispatcher>".to_string()))
            .collect();

        for path in &files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match self.process_file(path, &file_name, output_dir, &mut claimed) {
                Ok((entry, skipped)) => {
                    report
                        .skipped
                        .extend(skipped.into_iter().map(|s| (file_name.clone(), s)));
                    tracing::info!(
                        "generated {} ({:#06x}) from {file_name}",
                        entry.module_name,
                        entry.cluster_id
                    );
                    report.processed += 1;
                    report.manifest.push(entry);
                }
                Err(e) => {
                    tracing::warn!("skipping {file_name}: {e}");
                    report.failed.push((file_name, e.to_string()));
                }
            }
        }

        report.manifest.sort_by(|a, b| {
            a.cluster_id
                .cmp(&b.cluster_id)
                .then_with(|| a.module_name.cmp(&b.module_name))
        });

        if report.succeeded() {
            self.write_join_artifacts(&report.manifest, output_dir)?;
        }

        tracing::info!(
            "{} generated, {} failed, output in {}",
            report.processed,
            report.failed.len(),
            output_dir.display()
        );
        Ok(report)
    }

    fn process_file(
        &self,
        path: &Path,
        file_name: &str,
        output_dir: &Path,
        claimed: &mut HashMap<String, String>,
    ) -> Result<(ManifestEntry, Vec<Skipped>), CodegenError> {
        let xml = fs::read_to_string(path)?;
        let module = self.generate_cluster(file_name, &xml)?;

        let module_name = &module.entry.module_name;
        if let Some(first) = claimed.get(module_name) {
            return Err(CodegenError::ModuleCollision {
                module: module_name.clone(),
                first: first.clone(),
                second: file_name.to_string(),
            });
        }

        fs::write(output_dir.join(format!("{module_name}.rs")), &module.code)?;
        claimed.insert(module_name.clone(), file_name.to_string());
        Ok((module.entry, module.skipped))
    }

    fn write_join_artifacts(&self, manifest: &[ManifestEntry], output_dir: &Path) -> Result<(), CodegenError> {
        let dispatch = DispatchGenerator::new(manifest, &self.config);
        fs::write(
            output_dir.join(format!("{ATTRIBUTE_JSON_MODULE}.rs")),
            dispatch.attribute_json(),
        )?;
        fs::write(
            output_dir.join(format!("{ATTRIBUTE_NAMES_MODULE}.rs")),
            dispatch.attribute_names(),
        )?;
        if self.config.mod_file {
            fs::write(output_dir.join(MOD_FILE), dispatch.mod_file())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ON_OFF: &str = r#"<cluster id="0x0006" name="On/Off">
  <attributes>
    <attribute id="0x0000" name="OnOff" type="bool"/>
  </attributes>
</cluster>"#;

    const IDENTIFY: &str = r#"<cluster id="0x0003" name="Identify">
  <commands>
    <command id="0x00" name="Identify" direction="commandToServer">
      <field id="0" name="IdentifyTime" type="uint16"/>
    </command>
  </commands>
</cluster>"#;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("write input");
    }

    #[test]
    fn test_generate_cluster() {
        let orchestrator = Orchestrator::default();
        let module = orchestrator
            .generate_cluster("OnOff.xml", ON_OFF)
            .expect("generate");
        assert_eq!(module.entry.module_name, "on_off");
        assert_eq!(module.entry.cluster_id, 6);
        assert!(module.entry.has_attributes);
        assert!(module.code.contains("pub fn decode_on_off("));
        assert!(module.skipped.is_empty());
    }

    #[test]
    fn test_run_writes_modules_and_join_artifacts() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        write(input.path(), "OnOff.xml", ON_OFF);
        write(input.path(), "Identify.xml", IDENTIFY);
        write(input.path(), "notes.txt", "ignored");

        let report = Orchestrator::default()
            .run(input.path(), output.path())
            .expect("run");

        assert_eq!(report.processed, 2);
        assert!(report.failed.is_empty());
        let ids: Vec<u32> = report.manifest.iter().map(|e| e.cluster_id).collect();
        assert_eq!(ids, vec![3, 6]);

        for file in ["on_off.rs", "identify.rs", "attribute_json.rs", "attribute_names.rs", "mod.rs"] {
            assert!(output.path().join(file).is_file(), "{file} missing");
        }
        let json = fs::read_to_string(output.path().join("attribute_json.rs")).expect("read");
        assert!(json.contains("0x0006 => super::on_off::decode_attribute_json("));
        assert!(!json.contains("identify"));
    }

    #[test]
    fn test_bad_file_does_not_abort_batch() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        write(input.path(), "OnOff.xml", ON_OFF);
        write(input.path(), "Broken.xml", "<cluster id=\"1\"><attributes></cluster>");
        write(input.path(), "Missing.xml", "");

        let report = Orchestrator::default()
            .run(input.path(), output.path())
            .expect("run");

        assert_eq!(report.processed, 1);
        assert_eq!(report.failed.len(), 2);
        assert!(report.succeeded());
        assert!(output.path().join("on_off.rs").is_file());
    }

    #[test]
    fn test_skipped_definitions_reported() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        write(
            input.path(),
            "Widget.xml",
            r#"<cluster id="0x0042" name="Widget">
  <dataTypes>
    <struct name="Widget"><field id="0" name="Size" type="uint8"/></struct>
    <struct name="WidgetStruct"><field id="0" name="Color" type="uint8"/></struct>
  </dataTypes>
</cluster>"#,
        );
        write(input.path(), "OnOff.xml", ON_OFF);

        let report = Orchestrator::default()
            .run(input.path(), output.path())
            .expect("run");

        assert_eq!(report.processed, 2);
        assert_eq!(report.skipped.len(), 1);
        let (file, skipped) = &report.skipped[0];
        assert_eq!(file, "Widget.xml");
        assert_eq!(skipped.kind, "struct");
        assert_eq!(skipped.source, "WidgetStruct");
        assert_eq!(skipped.name, "Widget");
    }

    #[test]
    fn test_module_collision() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        write(input.path(), "On-Off.xml", ON_OFF);
        write(input.path(), "OnOff.xml", ON_OFF);

        let report = Orchestrator::default()
            .run(input.path(), output.path())
            .expect("run");

        assert_eq!(report.processed, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "OnOff.xml");
        assert!(report.failed[0].1.contains("collides"));
    }

    #[test]
    fn test_join_artifact_name_reserved() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        write(input.path(), "AttributeJson.xml", ON_OFF);

        let report = Orchestrator::default()
            .run(input.path(), output.path())
            .expect("run");
        assert_eq!(report.processed, 0);
        assert!(!output.path().join("mod.rs").exists());
    }

    #[test]
    fn test_no_mod_file() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        write(input.path(), "OnOff.xml", ON_OFF);

        let config = CodegenConfig::new().mod_file(false);
        Orchestrator::new(config)
            .run(input.path(), output.path())
            .expect("run");
        assert!(!output.path().join("mod.rs").exists());
        assert!(output.path().join("attribute_names.rs").is_file());
    }

    #[test]
    fn test_invalid_input_directory() {
        let output = TempDir::new().expect("output dir");
        let missing = output.path().join("does-not-exist");
        let err = Orchestrator::default()
            .run(&missing, output.path())
            .expect_err("missing input");
        assert!(matches!(err, CodegenError::InvalidDirectory { .. }));
    }
}
