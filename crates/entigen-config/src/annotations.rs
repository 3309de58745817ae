//! Where the entity annotations and relation handle types live.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Built-in not-null spellings besides `<package>.NotNull`.
const PLATFORM_NOT_NULL: &[&str] = &[
    "androidx.annotation.NonNull",
    "android.support.annotation.NonNull",
    "org.jetbrains.annotations.NotNull",
    "javax.annotation.Nonnull",
    "lombok.NonNull",
];

fn default_package() -> String {
    "io.objectbox.annotation".to_string()
}

fn default_relation_package() -> String {
    "io.objectbox.relation".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnnotationConfig {
    /// Package of `@Entity`, `@Id`, `@Generated`, ...
    #[serde(default = "default_package")]
    pub package: String,

    /// Package of the `ToOne` / `ToMany` relation handle types.
    #[serde(default = "default_relation_package")]
    pub relation_package: String,

    /// Additional qualified not-null annotation names.
    #[serde(default)]
    pub extra_not_null: Vec<String>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            package: default_package(),
            relation_package: default_relation_package(),
            extra_not_null: Vec::new(),
        }
    }
}

impl AnnotationConfig {
    /// Qualified name of one of the entity annotations.
    #[must_use]
    pub fn qualified(&self, simple_name: &str) -> String {
        format!("{}.{simple_name}", self.package)
    }

    /// Qualified name of a relation handle type (`ToOne`, `ToMany`).
    #[must_use]
    pub fn handle(&self, simple_name: &str) -> String {
        format!("{}.{simple_name}", self.relation_package)
    }

    /// Every qualified annotation name that marks a field not-null.
    #[must_use]
    pub fn not_null_annotations(&self) -> Vec<String> {
        std::iter::once(self.qualified("NotNull"))
            .chain(PLATFORM_NOT_NULL.iter().map(ToString::to_string))
            .chain(self.extra_not_null.iter().cloned())
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("annotations.package", &self.package),
            ("annotations.relation_package", &self.relation_package),
        ] {
            if !is_package_name(value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("'{value}' is not a Java package name"),
                });
            }
        }
        Ok(())
    }
}

fn is_package_name(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_null_list_includes_own_and_platform_spellings() {
        let config = AnnotationConfig {
            extra_not_null: vec!["com.acme.Required".to_string()],
            ..AnnotationConfig::default()
        };
        let names = config.not_null_annotations();
        assert_eq!(names[0], "io.objectbox.annotation.NotNull");
        assert!(names.contains(&"androidx.annotation.NonNull".to_string()));
        assert!(names.contains(&"com.acme.Required".to_string()));
    }

    #[test]
    fn rejects_malformed_packages() {
        let config = AnnotationConfig {
            package: "io..objectbox".to_string(),
            ..AnnotationConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(AnnotationConfig::default().validate().is_ok());
    }
}
