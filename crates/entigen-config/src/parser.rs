//! Parser behaviour.

use serde::{Deserialize, Serialize};

fn default_schema() -> String {
    "default".to_string()
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParserConfig {
    /// Keep going when the syntax tree contains error nodes.
    ///
    /// Unresolved external type references never fail a parse; this only
    /// governs genuine syntax errors.
    #[serde(default = "default_true")]
    pub tolerate_syntax_errors: bool,

    /// Schema for entities whose `@Entity` names none.
    #[serde(default = "default_schema")]
    pub default_schema: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            tolerate_syntax_errors: default_true(),
            default_schema: default_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ParserConfig::default();
        assert!(config.tolerate_syntax_errors);
        assert_eq!(config.default_schema, "default");
    }
}
