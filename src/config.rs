use crate::codegen::{ComponentSettings, GenerationOptions, ShapePolicy};
use crate::validation::is_java_identifier;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT_DIR: &str = "generated-sources";
const DEFAULT_COMPONENT_MODEL_MARKER: &str = "spring";
const DEFAULT_COMPONENT_ANNOTATION: &str = "org.springframework.stereotype.Component";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub snapshot: PathBuf,
    pub output_dir: PathBuf,
    pub metadata_header: bool,
    pub consistency_check: bool,
    pub constructor_shape_policy: ShapePolicy,
    pub component_model_marker: String,
    pub component_annotation: String,
    pub fail_on_conflict: bool,
    pub dry_run: bool,
}

impl GeneratorConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            snapshot: cli_snapshot,
            output_dir: cli_output_dir,
            no_metadata_header: cli_no_metadata_header,
            no_consistency_check: cli_no_consistency_check,
            constructor_shape_policy: cli_shape_policy,
            component_model_marker: cli_component_model_marker,
            component_annotation: cli_component_annotation,
            fail_on_conflict: cli_fail_on_conflict,
            dry_run: cli_dry_run,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            snapshot: file_snapshot,
            output_dir: file_output_dir,
            metadata_header: file_metadata_header,
            consistency_check: file_consistency_check,
            constructor_shape_policy: file_shape_policy,
            component_model_marker: file_component_model_marker,
            component_annotation: file_component_annotation,
            fail_on_conflict: file_fail_on_conflict,
            dry_run: file_dry_run,
        } = file_config;

        let snapshot = cli_snapshot.or(file_snapshot).context(
            "no marker snapshot configured; pass --snapshot or set `snapshot` in the config file",
        )?;

        let output_dir = cli_output_dir
            .or(file_output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        // Flags can only switch features off (or on, for the opt-in ones).
        let metadata_header = !cli_no_metadata_header && file_metadata_header.unwrap_or(true);
        let consistency_check =
            !cli_no_consistency_check && file_consistency_check.unwrap_or(true);
        let fail_on_conflict = cli_fail_on_conflict || file_fail_on_conflict.unwrap_or(false);
        let dry_run = cli_dry_run || file_dry_run.unwrap_or(false);

        let constructor_shape_policy = cli_shape_policy.or(file_shape_policy).unwrap_or_default();

        let component_model_marker = cli_component_model_marker
            .or(file_component_model_marker)
            .map(|marker| marker.trim().to_string())
            .unwrap_or_else(|| DEFAULT_COMPONENT_MODEL_MARKER.to_string());

        let component_annotation = cli_component_annotation
            .or(file_component_annotation)
            .map(|annotation| annotation.trim().trim_start_matches('@').to_string())
            .unwrap_or_else(|| DEFAULT_COMPONENT_ANNOTATION.to_string());

        Ok(Self {
            snapshot,
            output_dir,
            metadata_header,
            consistency_check,
            constructor_shape_policy,
            component_model_marker,
            component_annotation,
            fail_on_conflict,
            dry_run,
        })
    }

    /// Fail-fast checks run before any generation.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.output_dir.as_os_str().is_empty(),
            "output directory must not be empty"
        );
        anyhow::ensure!(
            !self.component_model_marker.is_empty(),
            "component model marker must not be empty"
        );
        anyhow::ensure!(
            !self.component_annotation.is_empty()
                && self.component_annotation.split('.').all(is_java_identifier),
            "component annotation {:?} is not a valid type name",
            self.component_annotation
        );
        anyhow::ensure!(
            self.snapshot.is_file(),
            "marker snapshot {:?} does not exist or is not a file",
            self.snapshot
        );
        if self.output_dir.exists() {
            anyhow::ensure!(
                self.output_dir.is_dir(),
                "output directory {:?} is not a directory",
                self.output_dir
            );
        }
        Ok(())
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            metadata_header: self.metadata_header,
            consistency_check: self.consistency_check,
            shape_policy: self.constructor_shape_policy,
            component: ComponentSettings {
                model_marker: self.component_model_marker.clone(),
                annotation: self.component_annotation.clone(),
            },
        }
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "throwgen",
    about = "Generate exception types and throwing implementation stubs from marked interfaces",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "THROWGEN_SNAPSHOT",
        value_name = "FILE",
        help = "Marker snapshot describing the marked declarations (YAML or JSON)"
    )]
    pub snapshot: Option<PathBuf>,

    #[arg(
        long,
        env = "THROWGEN_OUTPUT_DIR",
        value_name = "DIR",
        help = "Directory receiving generated sources"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "Omit the @Generated metadata header")]
    pub no_metadata_header: bool,

    #[arg(long, help = "Do not require one component model per interface")]
    pub no_consistency_check: bool,

    #[arg(
        long,
        env = "THROWGEN_CONSTRUCTOR_SHAPE_POLICY",
        value_enum,
        value_name = "POLICY",
        help = "How to treat arguments that no Standard exception constructor accepts"
    )]
    pub constructor_shape_policy: Option<ShapePolicy>,

    #[arg(
        long,
        env = "THROWGEN_COMPONENT_MODEL",
        value_name = "MODEL",
        help = "Component model that marks implementations as components"
    )]
    pub component_model_marker: Option<String>,

    #[arg(
        long,
        env = "THROWGEN_COMPONENT_ANNOTATION",
        value_name = "TYPE",
        help = "Qualified annotation placed on component implementations"
    )]
    pub component_annotation: Option<String>,

    #[arg(long, help = "Exit with an error when any group or artifact was skipped")]
    pub fail_on_conflict: bool,

    #[arg(long, help = "Render and report without writing files")]
    pub dry_run: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    snapshot: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    metadata_header: Option<bool>,
    consistency_check: Option<bool>,
    constructor_shape_policy: Option<ShapePolicy>,
    component_model_marker: Option<String>,
    component_annotation: Option<String>,
    fail_on_conflict: Option<bool>,
    dry_run: Option<bool>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(snapshot: &str) -> CliArgs {
        CliArgs {
            snapshot: Some(PathBuf::from(snapshot)),
            ..CliArgs::default()
        }
    }

    #[test]
    fn defaults_apply_without_file() {
        let config = GeneratorConfig::from_args(args("markers.yaml")).unwrap();
        assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(config.metadata_header);
        assert!(config.consistency_check);
        assert_eq!(config.constructor_shape_policy, ShapePolicy::Strict);
        assert_eq!(config.component_annotation, DEFAULT_COMPONENT_ANNOTATION);
        assert!(!config.fail_on_conflict);
        assert!(!config.dry_run);
    }

    #[test]
    fn snapshot_is_required() {
        let err = GeneratorConfig::from_args(CliArgs::default()).unwrap_err();
        assert!(err.to_string().contains("no marker snapshot configured"));
    }

    #[test]
    fn component_annotation_must_be_a_type_name() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("markers.yaml");
        fs::write(&snapshot, "declarations: []\n").unwrap();

        let mut config = GeneratorConfig::from_args(args(snapshot.to_str().unwrap())).unwrap();
        assert!(config.validate().is_ok());

        config.component_annotation = "org.example.not-valid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn options_follow_config() {
        let mut cli = args("markers.yaml");
        cli.no_metadata_header = true;
        cli.constructor_shape_policy = Some(ShapePolicy::Warn);
        cli.component_annotation = Some("@javax.inject.Named".to_string());

        let options = GeneratorConfig::from_args(cli).unwrap().generation_options();
        assert!(!options.metadata_header);
        assert_eq!(options.shape_policy, ShapePolicy::Warn);
        assert_eq!(options.component.annotation, "javax.inject.Named");
    }
}
