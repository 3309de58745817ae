use std::path::PathBuf;

use anyhow::bail;
use entigen_config::EntigenConfig;
use entigen_parser::{group_by_schema, parse_file, process_schema};
use serde::Serialize;
use tracing::warn;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CheckArgs;
use crate::commands::sources::collect_java_files;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SchemaReport {
    pub name: String,
    pub entities: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub files: Vec<FileReport>,
    pub schemas: Vec<SchemaReport>,
    pub failed: usize,
}

/// Handle `entigen check`. Exits non-zero when any file or schema fails.
pub fn handle(args: &CheckArgs, config: &EntigenConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let files = collect_java_files(&args.paths)?;
    let report = build_report(&files, config);
    output(&report, flags.format)?;
    if report.failed > 0 {
        bail!("{} problem(s) found", report.failed);
    }
    Ok(())
}

/// Parse every file, keeping going past failures, then post-process the
/// schemas formed by the files that parsed.
pub fn build_report(files: &[PathBuf], config: &EntigenConfig) -> CheckReport {
    let mut entities = Vec::new();
    let mut file_reports = Vec::with_capacity(files.len());

    for path in files {
        let mut report = FileReport {
            path: path.display().to_string(),
            entity: None,
            error: None,
        };
        match parse_file(path, config) {
            Ok(Some(entity)) => {
                report.entity = Some(entity.name.clone());
                entities.push(entity);
            }
            Ok(None) => {}
            Err(error) => {
                warn!(path = %path.display(), %error, "check failed");
                report.error = Some(error.to_string());
            }
        }
        file_reports.push(report);
    }

    let mut schema_reports = Vec::new();
    for mut schema in group_by_schema(entities) {
        let error = process_schema(&mut schema.entities).err().map(|e| {
            warn!(schema = %schema.name, error = %e, "schema check failed");
            e.to_string()
        });
        schema_reports.push(SchemaReport {
            name: schema.name,
            entities: schema.entities.len(),
            error,
        });
    }

    let failed = file_reports.iter().filter(|r| r.error.is_some()).count()
        + schema_reports.iter().filter(|r| r.error.is_some()).count();
    CheckReport {
        files: file_reports,
        schemas: schema_reports,
        failed,
    }
}
