//! Declaration identity used to pair candidates with existing members.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclKind {
    Field,
    Constructor,
    Method,
}

impl DeclKind {
    /// Kinds whose last declaration may anchor an insertion of `self`, most
    /// specific first.
    #[must_use]
    pub const fn anchor_order(self) -> &'static [Self] {
        match self {
            Self::Field => &[Self::Field],
            Self::Constructor => &[Self::Constructor, Self::Field],
            Self::Method => &[Self::Method, Self::Constructor, Self::Field],
        }
    }
}

/// Kind, name and ordered parameter types. Fields have no parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub kind: DeclKind,
    pub name: String,
    pub parameters: Vec<String>,
}

impl Signature {
    #[must_use]
    pub fn field(name: &str) -> Self {
        Self {
            kind: DeclKind::Field,
            name: name.to_string(),
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn constructor<S: AsRef<str>>(parameters: &[S]) -> Self {
        Self {
            kind: DeclKind::Constructor,
            name: "<init>".to_string(),
            parameters: parameters.iter().map(|p| p.as_ref().to_string()).collect(),
        }
    }

    #[must_use]
    pub fn method<S: AsRef<str>>(name: &str, parameters: &[S]) -> Self {
        Self {
            kind: DeclKind::Method,
            name: name.to_string(),
            parameters: parameters.iter().map(|p| p.as_ref().to_string()).collect(),
        }
    }

    /// Same kind, name and arity, with every parameter type equal either as
    /// written or with package qualifiers stripped.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| types_match(a, b))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DeclKind::Field => write!(f, "{}", self.name),
            DeclKind::Constructor | DeclKind::Method => {
                write!(f, "{}({})", self.name, self.parameters.join(", "))
            }
        }
    }
}

/// Compare two type texts by normalised or simple form.
#[must_use]
pub fn types_match(a: &str, b: &str) -> bool {
    let (a, b) = (normalize_type(a), normalize_type(b));
    a == b || simple_type(&a) == simple_type(&b)
}

/// Drop whitespace and spell varargs as an array.
#[must_use]
pub fn normalize_type(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact.replace("...", "[]")
}

/// Strip package qualifiers from every name in a type text:
/// `java.util.List<com.shop.Item>` becomes `List<Item>`.
#[must_use]
pub fn simple_type(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut token = String::new();
    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' || c == '$' || c == '.' {
            token.push(c);
        } else {
            out.push_str(last_segment(&token));
            token.clear();
            out.push(c);
        }
    }
    out.push_str(last_segment(&token));
    out
}

fn last_segment(token: &str) -> &str {
    token.rsplit('.').next().unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("java.util.List<com.shop.Item>", "List<Item>")]
    #[case("Map<String, java.lang.Long>", "Map<String,Long>")]
    #[case("com.shop.Order.Status[]", "Status[]")]
    #[case("long", "long")]
    fn simple_forms(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(simple_type(&normalize_type(text)), expected);
    }

    #[rstest]
    #[case("String", "java.lang.String", true)]
    #[case("List<Item>", "java.util.List<com.shop.Item>", true)]
    #[case("String...", "String[]", true)]
    #[case("long", "Long", false)]
    #[case("List<Item>", "List<Order>", false)]
    fn type_matching(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
        assert_eq!(types_match(a, b), expected);
    }

    #[test]
    fn signatures_match_on_kind_name_and_parameters() {
        let written = Signature::method("setCustomer", &["com.shop.Customer"]);
        assert!(written.matches(&Signature::method("setCustomer", &["Customer"])));
        assert!(!written.matches(&Signature::method("setCustomer", &["Customer", "long"])));
        assert!(!written.matches(&Signature::method("setBuyer", &["Customer"])));

        let empty: [&str; 0] = [];
        assert!(!Signature::constructor(&empty).matches(&Signature::method("<init>", &empty)));
        assert!(Signature::field("id").matches(&Signature::field("id")));
    }

    #[test]
    fn display() {
        assert_eq!(
            Signature::method("set", &["long", "String"]).to_string(),
            "set(long, String)"
        );
        assert_eq!(Signature::field("id").to_string(), "id");
    }

    #[test]
    fn anchor_order_falls_back_to_earlier_kinds() {
        assert_eq!(
            DeclKind::Method.anchor_order(),
            &[DeclKind::Method, DeclKind::Constructor, DeclKind::Field]
        );
        assert_eq!(DeclKind::Field.anchor_order(), &[DeclKind::Field]);
    }
}
