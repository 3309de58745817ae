use std::path::Path;

use anyhow::Context;
use entigen_core::hash::{normalize, structural_hash};
use entigen_merge::GeneratedCode;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::HashArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct HashReport {
    pub file: String,
    pub hash: i32,
    pub normalized_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamped: Option<String>,
}

/// Handle `entigen hash`.
pub fn handle(args: &HashArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = hash_file(&args.file, args.stamp)?;
    output(&report, flags.format)
}

pub fn hash_file(path: &Path, stamp: bool) -> anyhow::Result<HashReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(HashReport {
        file: path.display().to_string(),
        hash: structural_hash(&text),
        normalized_length: normalize(&text).chars().count(),
        stamped: stamp.then(|| GeneratedCode::stamp(text.trim_end()).text),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn formatting_does_not_change_the_reported_hash() {
        let dir = TempDir::new().expect("tempdir");
        let compact = dir.path().join("compact.java");
        let spread = dir.path().join("spread.java");
        std::fs::write(&compact, "public Note() { }").expect("write");
        std::fs::write(&spread, "/** Default. */\npublic Note() {\n}\n").expect("write");

        let a = hash_file(&compact, false).expect("readable");
        let b = hash_file(&spread, true).expect("readable");
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.normalized_length, "publicNote(){}".len());
        assert!(a.stamped.is_none());
        assert_eq!(
            b.stamped.as_deref(),
            Some(format!("/** Default. */\n@Generated(hash = {})\npublic Note() {{\n}}", b.hash).as_str())
        );
    }
}
