//! Starting config and manifest files for first-time setup
//!
//! Templates are embedded in the binary and rendered with TinyTemplate. A file that already exists
//! is never overwritten: it's reported with a notice and left as it is.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::pipeline::PipelineKind;
use crate::WorkingDirectory;

static CONFIG_RUN: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/config-run.yaml"));
static CONFIG_READSTORE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/config-readstore.yaml"));
static MANIFEST_RUN: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/manifest-run.tsv"));
static MANIFEST_READSTORE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/manifest-readstore.tsv"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Generated {
    Created(PathBuf),
    /// Already present, left untouched
    Existing(PathBuf),
}

/// Rendering context shared by all templates
#[derive(Serialize)]
struct TemplateContext {
    run_command: &'static str,
    time_now: String,
}

/// Write the config and manifest templates for `kind` into `wd`
pub fn generate(kind: PipelineKind, wd: &WorkingDirectory) -> Result<Vec<Generated>> {
    let (config, manifest) = match kind {
        PipelineKind::Alignment => (CONFIG_RUN, MANIFEST_RUN),
        PipelineKind::Readstore => (CONFIG_READSTORE, MANIFEST_READSTORE),
    };
    let context = TemplateContext { run_command: kind.run_command(), time_now: Utc::now().to_rfc2822() };

    let config_path = wd.path.join(kind.default_config());
    let manifest_path = wd.path.join(kind.default_manifest());
    Ok(vec![
        generate_file(&config_path, "config file", config, &context)?,
        generate_file(&manifest_path, "manifest", manifest, &context)?,
    ])
}

fn generate_file(path: &Path, what: &str, template: &str, context: &TemplateContext) -> Result<Generated> {
    if path.exists() {
        println!("NOTICE using existing {what} {}", path.display());
        return Ok(Generated::Existing(path.to_path_buf()));
    }

    let content = render(template, context)?;
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            println!("NOTICE using existing {what} {}", path.display());
            return Ok(Generated::Existing(path.to_path_buf()));
        }
        Err(err) => return Err(err).with_context(|| format!("Can't create {what} {}", path.display())),
    };
    file.write_all(content.as_bytes())
        .with_context(|| format!("Can't write {what} {}", path.display()))?;

    info!("Wrote {what} {}", path.display());
    Ok(Generated::Created(path.to_path_buf()))
}

fn render(template: &str, context: &TemplateContext) -> Result<String> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("template", template)?;
    Ok(tt.render("template", context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::config::Config;
    use crate::manifest::read::parse_records;
    use crate::sample::{AlignmentSample, ReadstoreSample};

    fn context() -> TemplateContext {
        TemplateContext { run_command: "run", time_now: "now".to_string() }
    }

    #[test]
    fn rendered_configs_parse() {
        for template in [CONFIG_RUN, CONFIG_READSTORE] {
            let text = render(template, &context()).unwrap();
            assert!(text.contains("signalalign run JOB_STORE"));
            assert!(Config::from_yaml(&text).unwrap().get_bool("debug").unwrap());
        }
    }

    #[test]
    fn rendered_manifests_hold_no_samples() {
        let run = render(MANIFEST_RUN, &context()).unwrap();
        assert!(parse_records::<AlignmentSample>(&run).unwrap().is_empty());
        let readstore = render(MANIFEST_READSTORE, &context()).unwrap();
        assert!(parse_records::<ReadstoreSample>(&readstore).unwrap().is_empty());
    }

    #[test]
    fn generate_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let wd = WorkingDirectory { path: dir.path().to_path_buf() };

        let generated = generate(PipelineKind::Readstore, &wd).unwrap();
        assert_eq!(generated, vec![
            Generated::Created(dir.path().join("config-signalAlign-readstore.yaml")),
            Generated::Created(dir.path().join("manifest-signalAlign-readstore.tsv")),
        ]);
    }

    #[test]
    fn existing_files_are_left_alone() {
        let dir = TempDir::new().unwrap();
        let wd = WorkingDirectory { path: dir.path().to_path_buf() };
        let config_path = dir.path().join("config-signalAlign.yaml");
        fs::write(&config_path, "debug: false\n").unwrap();

        let generated = generate(PipelineKind::Alignment, &wd).unwrap();
        assert_eq!(generated[0], Generated::Existing(config_path.clone()));
        assert_eq!(generated[1], Generated::Created(dir.path().join("manifest-signalAlign.tsv")));
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "debug: false\n");
    }
}
