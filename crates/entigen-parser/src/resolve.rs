//! Resolution of type references as written in source to qualified types.
//!
//! There is no classpath: a reference is resolved purely from the file's
//! imports, its package, the enclosing type and the names of sibling classes
//! in the same directory. Resolution is a pure function of those inputs.

use entigen_core::VariableType;
use thiserror::Error;

use crate::syntax::Import;

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "short", "char", "int", "long", "float", "double", "void",
];

/// Simple names resolved without an import. Membership is fixed.
const BUILT_INS: &[(&str, &str)] = &[
    ("String", "java.lang.String"),
    ("Object", "java.lang.Object"),
    ("Boolean", "java.lang.Boolean"),
    ("Byte", "java.lang.Byte"),
    ("Short", "java.lang.Short"),
    ("Character", "java.lang.Character"),
    ("Integer", "java.lang.Integer"),
    ("Long", "java.lang.Long"),
    ("Float", "java.lang.Float"),
    ("Double", "java.lang.Double"),
    ("Number", "java.lang.Number"),
    ("Date", "java.util.Date"),
    ("List", "java.util.List"),
    ("ArrayList", "java.util.ArrayList"),
    ("Map", "java.util.Map"),
    ("HashMap", "java.util.HashMap"),
    ("Set", "java.util.Set"),
    ("HashSet", "java.util.HashSet"),
    ("Collection", "java.util.Collection"),
];

/// Two or more wildcard imports could supply the identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{identifier}' is ambiguous between wildcard imports {}", candidates.join(", "))]
pub struct AmbiguousImport {
    pub identifier: String,
    /// Wildcard packages, sorted.
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TypeResolver {
    package: String,
    concrete: Vec<String>,
    wildcards: Vec<String>,
    enclosing: Option<String>,
    nested: Vec<String>,
    siblings: Vec<String>,
}

impl TypeResolver {
    /// Static imports are ignored.
    #[must_use]
    pub fn new(
        package: impl Into<String>,
        imports: &[Import],
        enclosing: Option<&str>,
        siblings: &[String],
    ) -> Self {
        let mut wildcards: Vec<String> = imports
            .iter()
            .filter(|i| !i.is_static && i.is_wildcard)
            .map(|i| i.path.clone())
            .collect();
        wildcards.sort();
        wildcards.dedup();

        Self {
            package: package.into(),
            concrete: imports
                .iter()
                .filter(|i| !i.is_static && !i.is_wildcard)
                .map(|i| i.path.clone())
                .collect(),
            wildcards,
            enclosing: enclosing.map(ToString::to_string),
            nested: Vec::new(),
            siblings: siblings.to_vec(),
        }
    }

    /// Types declared inside the enclosing type, resolved as `pkg.Enclosing.Name`.
    #[must_use]
    pub fn with_nested<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nested.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Resolve a full type reference: primitives, arrays, varargs and generics.
    ///
    /// # Errors
    /// Returns `AmbiguousImport` when any simple name inside the reference
    /// could come from more than one wildcard import.
    pub fn resolve(&self, text: &str) -> Result<VariableType, AmbiguousImport> {
        let text = text.trim();

        if let Some(element) = text.strip_suffix("...") {
            return self.array_of(element, text);
        }
        if let Some(element) = text.strip_suffix("[]") {
            return self.array_of(element, text);
        }

        let (base, arguments) = match split_generic(text) {
            Some((base, inner)) => (base, self.resolve_arguments(inner)?),
            None => (text, Vec::new()),
        };

        if PRIMITIVES.contains(&base) {
            return Ok(VariableType::primitive(base));
        }

        let qualified = self.resolve_name(base)?;
        Ok(VariableType::object(qualified, text, arguments))
    }

    /// Resolve a possibly dotted name without generic arguments.
    ///
    /// # Errors
    /// Returns `AmbiguousImport` under the same rule as [`Self::resolve`].
    pub fn resolve_name(&self, name: &str) -> Result<String, AmbiguousImport> {
        let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        match name.split_once('.') {
            Some((first, _)) if first.starts_with(|c: char| c.is_lowercase()) => Ok(name),
            Some((first, rest)) => Ok(format!("{}.{rest}", self.resolve_simple(first)?)),
            None => self.resolve_simple(&name),
        }
    }

    fn resolve_simple(&self, name: &str) -> Result<String, AmbiguousImport> {
        if let Some(import) = self
            .concrete
            .iter()
            .find(|path| path.rsplit('.').next() == Some(name))
        {
            return Ok(import.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            if enclosing == name {
                return Ok(self.qualify(enclosing));
            }
            if self.nested.iter().any(|n| n == name) {
                return Ok(format!("{}.{name}", self.qualify(enclosing)));
            }
        }

        if self.siblings.iter().any(|s| s == name) {
            return Ok(self.qualify(name));
        }

        if let Some((_, qualified)) = BUILT_INS.iter().find(|(simple, _)| *simple == name) {
            return Ok((*qualified).to_string());
        }

        match self.wildcards.as_slice() {
            [] => Ok(self.qualify(name)),
            [package] => Ok(format!("{package}.{name}")),
            several => Err(AmbiguousImport {
                identifier: name.to_string(),
                candidates: several.to_vec(),
            }),
        }
    }

    fn qualify(&self, name: &str) -> String {
        if self.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.package)
        }
    }

    fn array_of(&self, element: &str, spelling: &str) -> Result<VariableType, AmbiguousImport> {
        let element = self.resolve(element)?;
        Ok(VariableType::object(
            format!("{}[]", element.qualified_name),
            spelling,
            element.type_arguments,
        ))
    }

    fn resolve_arguments(&self, inner: &str) -> Result<Vec<VariableType>, AmbiguousImport> {
        split_top_level(inner)
            .into_iter()
            .map(|argument| self.resolve_argument(argument))
            .collect()
    }

    fn resolve_argument(&self, argument: &str) -> Result<VariableType, AmbiguousImport> {
        let argument = argument.trim();
        let Some(rest) = argument.strip_prefix('?') else {
            return self.resolve(argument);
        };

        let rest = rest.trim_start();
        for keyword in ["extends", "super"] {
            if let Some(bound) = rest.strip_prefix(keyword) {
                let bound = self.resolve(bound)?;
                return Ok(VariableType::object(
                    format!("? {keyword} {}", bound.qualified_name),
                    argument,
                    vec![bound],
                ));
            }
        }
        Ok(VariableType::object("?", argument, Vec::new()))
    }
}

/// Split `Map<K, V>` into `("Map", "K, V")`.
fn split_generic(text: &str) -> Option<(&str, &str)> {
    let open = text.find('<')?;
    let close = text.rfind('>')?;
    (close > open).then(|| (text[..open].trim(), &text[open + 1..close]))
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}
