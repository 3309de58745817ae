use std::path::PathBuf;

use anyhow::{Context, bail};
use entigen_parser::parser::is_java_file;
use ignore::WalkBuilder;

/// Expand the given paths into a sorted list of `.java` files.
///
/// Directories are walked recursively, honouring `.gitignore`; plain files
/// are taken as given.
pub fn collect_java_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut builder = WalkBuilder::new(path);
            builder.hidden(false);
            for entry in builder.build() {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", path.display()))?;
                let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                if is_file && is_java_file(&entry.path().to_string_lossy()) {
                    files.push(entry.into_path());
                }
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("no such file or directory: {}", path.display());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn directories_are_walked_for_java_files() {
        let dir = TempDir::new().expect("tempdir");
        let nested = dir.path().join("com/example");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(nested.join("Order.java"), "class Order {}").expect("write");
        fs::write(nested.join("README.md"), "").expect("write");
        let loose = dir.path().join("Loose.java");
        fs::write(&loose, "class Loose {}").expect("write");

        let files = collect_java_files(&[dir.path().to_path_buf(), loose.clone()])
            .expect("should walk");
        assert_eq!(files, vec![loose, nested.join("Order.java")]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        assert!(collect_java_files(&[dir.path().join("nope")]).is_err());
    }
}
