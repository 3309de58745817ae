//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed files and env vars.

use entigen_config::{EntigenConfig, IndentChar};
use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;

#[test]
fn loads_format_section_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[format]
indent_char = "tab"
line_width = 100
"#,
        )?;

        let config: EntigenConfig = Figment::from(Serialized::defaults(EntigenConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.format.indent_char, IndentChar::Tab);
        assert_eq!(config.format.line_width, 100);
        assert_eq!(config.format.indent_size, 4);
        Ok(())
    });
}

#[test]
fn loads_annotation_section_from_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".entigen")?;
        jail.create_file(
            ".entigen/config.toml",
            r#"
[annotations]
package = "com.acme.persist"
extra_not_null = ["com.acme.Required"]

[parser]
tolerate_syntax_errors = false
"#,
        )?;

        let config = EntigenConfig::load().expect("config loads");
        assert_eq!(config.annotations.package, "com.acme.persist");
        assert_eq!(config.annotations.qualified("Entity"), "com.acme.persist.Entity");
        assert!(!config.parser.tolerate_syntax_errors);
        assert_eq!(config.parser.default_schema, "default");
        Ok(())
    });
}

#[test]
fn explicit_file_is_validated() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[format]
indent_size = 12
"#,
        )?;

        let result = EntigenConfig::load_from(std::path::Path::new("custom.toml"));
        assert!(result.is_err());
        Ok(())
    });
}
