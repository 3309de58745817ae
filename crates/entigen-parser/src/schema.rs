//! File-level driver: read sources, parse entities, group them by schema.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use entigen_config::EntigenConfig;
use entigen_core::{CoreError, Entity, Schema};
use tracing::{debug, info};

use crate::parser::is_java_file;
use crate::relations::process_schema;
use crate::visitor::parse_entity;

/// Simple names of the `.java` files next to `path`, sorted.
///
/// # Errors
/// Returns `CoreError::Io` when the directory cannot be listed.
pub fn sibling_class_names(path: &Path) -> Result<Vec<String>, CoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry_path = entry?.path();
        if !entry_path.is_file() || !is_java_file(&entry_path.to_string_lossy()) {
            continue;
        }
        if let Some(stem) = entry_path.file_stem() {
            names.push(stem.to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Read and parse one file.
///
/// # Errors
/// Returns `CoreError::Io` for unreadable files and any visitor error.
pub fn parse_file(path: &Path, config: &EntigenConfig) -> Result<Option<Entity>, CoreError> {
    let source = fs::read_to_string(path)?;
    let siblings = sibling_class_names(path)?;
    let entity = parse_entity(&source, path, &siblings, &config.parser, &config.annotations)?;
    if entity.is_none() {
        debug!(path = %path.display(), "no entity declared, skipping");
    }
    Ok(entity)
}

/// Parse every file, group the entities by schema, and post-process each
/// schema's relations. Schemas come back sorted by name.
///
/// # Errors
/// Returns the first error of any file or schema.
pub fn parse_files<P: AsRef<Path>>(paths: &[P], config: &EntigenConfig) -> Result<Vec<Schema>, CoreError> {
    let mut entities = Vec::new();
    for path in paths {
        if let Some(entity) = parse_file(path.as_ref(), config)? {
            entities.push(entity);
        }
    }

    let mut schemas = group_by_schema(entities);
    for schema in &mut schemas {
        process_schema(&mut schema.entities)?;
        info!(schema = %schema.name, entities = schema.entities.len(), "schema processed");
    }
    Ok(schemas)
}

/// Group entities by `schema_name`, keeping file order within a schema.
#[must_use]
pub fn group_by_schema(entities: Vec<Entity>) -> Vec<Schema> {
    let mut grouped: BTreeMap<String, Vec<Entity>> = BTreeMap::new();
    for entity in entities {
        grouped.entry(entity.schema_name.clone()).or_default().push(entity);
    }
    grouped
        .into_iter()
        .map(|(name, entities)| Schema { name, entities })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, name: &str, source: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, source).expect("should write fixture");
        path
    }

    #[test]
    fn siblings_are_java_stems_of_the_same_directory() {
        let dir = TempDir::new().expect("tempdir");
        let order = write(&dir, "Order.java", "class Order {}");
        write(&dir, "Customer.java", "class Customer {}");
        write(&dir, "notes.txt", "");

        assert_eq!(
            sibling_class_names(&order).expect("listable"),
            vec!["Customer".to_string(), "Order".to_string()]
        );
    }

    #[test]
    fn files_are_grouped_and_relations_processed() {
        let dir = TempDir::new().expect("tempdir");
        let order = write(
            &dir,
            "Order.java",
            "package shop;\n\
             import io.objectbox.annotation.*;\n\
             @Entity class Order { @Id long id; @Relation Customer customer; }",
        );
        let customer = write(
            &dir,
            "Customer.java",
            "package shop;\n\
             import io.objectbox.annotation.*;\n\
             @Entity class Customer { @Id long id; }",
        );
        let audit = write(
            &dir,
            "Audit.java",
            "package shop;\n\
             import io.objectbox.annotation.*;\n\
             @Entity(schema = \"audit\") class Audit { @Id long id; }",
        );
        let helper = write(&dir, "Helper.java", "package shop; class Helper {}");

        let schemas = parse_files(&[order, customer, audit, helper], &EntigenConfig::default())
            .expect("should parse");
        let names: Vec<_> = schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["audit", "default"]);

        let default = &schemas[1];
        assert_eq!(default.entities.len(), 2);
        let order = default.entity("Order").expect("Order");
        assert!(order.property("customerId").is_some());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("Missing.java");
        let error = parse_file(&missing, &EntigenConfig::default()).expect_err("missing");
        assert!(matches!(error, CoreError::Io(_)));
    }
}
