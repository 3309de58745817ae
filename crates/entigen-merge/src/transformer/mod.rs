//! Reconciles generated declarations with one type of an existing file.
//!
//! A [`MergeSession`] parses the source once, indexes the members of the
//! target type by [`Signature`], and records every decision as edits on its
//! own [`RewriteSession`]. Nothing is rendered until
//! [`MergeSession::write_to_string`], which also deletes generated members
//! that were not refreshed during the pass.
//!
//! Candidates without a `@Generated` or `@Keep` marker are stamped before
//! they are compared or written, so a second pass with the same candidates
//! changes nothing.


use std::collections::VecDeque;
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

use entigen_config::FormatterConfig;
use entigen_core::hash::is_structurally_equal;
use entigen_core::{CoreError, Location, ProvenanceHint};
use entigen_parser::syntax::{
    AnnotationArguments, CompilationUnit, Declaration, ElementValue, Modifiers, Span, TypeDecl,
};
use tracing::{debug, info};

use crate::format::CodeFormatter;
use crate::rewrite::{RewriteSession, blank_line_before, whole_lines};
use crate::signature::{DeclKind, Signature};
use crate::template::GeneratedCode;

const KEEP: &str = "Keep";
const GENERATED: &str = "Generated";

/// What a `define_*` call decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// No member with this signature existed; the candidate will be written.
    /// A new constructor may land in the slot of a stale generated
    /// constructor of the same arity class.
    Inserted,
    /// A generated member differed and was replaced in place.
    Replaced,
    /// A generated member already matched the candidate.
    Unchanged,
    /// The matching member is marked `@Keep`.
    Kept,
    /// The whole type is marked `@Keep`.
    Skipped,
}

/// A non-fatal note produced while merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: Location,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

#[derive(Debug, Clone)]
struct Member {
    signature: Signature,
    hint: ProvenanceHint,
    /// Declaration plus javadoc.
    extent: Range<usize>,
    line: u32,
    refreshed: bool,
    /// Formatted candidate replacing this member at write time.
    replacement: Option<String>,
}

#[derive(Debug, Clone)]
struct PendingInsert {
    signature: Signature,
    text: String,
}

/// Merge state for one type of one source file.
pub struct MergeSession<'a> {
    type_name: String,
    path: PathBuf,
    unit: CompilationUnit,
    body: Span,
    depth: usize,
    keep_type: bool,
    members: Vec<Member>,
    rewrite: RewriteSession,
    config: FormatterConfig,
    formatter: &'a dyn CodeFormatter,
    pending: Vec<PendingInsert>,
    imports: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl fmt::Debug for MergeSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeSession")
            .field("type_name", &self.type_name)
            .field("members", &self.members.len())
            .field("pending", &self.pending.len())
            .field("keep_type", &self.keep_type)
            .finish_non_exhaustive()
    }
}

impl<'a> MergeSession<'a> {
    /// Parse `source` and index the members of `type_name`, which may be a
    /// nested type.
    ///
    /// # Errors
    /// Returns `TypeNotFound` when no type of that simple name is declared.
    pub fn new(
        source: &str,
        type_name: &str,
        config: &FormatterConfig,
        formatter: &'a dyn CodeFormatter,
    ) -> Result<Self, CoreError> {
        let unit = CompilationUnit::parse(source);
        let (decl, depth) =
            locate(&unit.types, type_name).ok_or_else(|| CoreError::TypeNotFound {
                type_name: type_name.to_string(),
            })?;

        let keep_type = has_marker(&decl.modifiers, KEEP);
        let members = index_members(decl);
        let body = decl.body;
        if keep_type {
            debug!(type_name, "type is marked @Keep, merge disabled");
        }

        Ok(Self {
            type_name: type_name.to_string(),
            path: PathBuf::from(format!("{type_name}.java")),
            unit,
            body,
            depth,
            keep_type,
            members,
            rewrite: RewriteSession::new(source),
            config: *config,
            formatter,
            pending: Vec::new(),
            imports: Vec::new(),
            diagnostics: Vec::new(),
        })
    }

    /// Name the file in parse errors reported by [`Self::write_to_string`].
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// A field sharing a generated declaration with others (`int a, b;`) is
    /// split out into its own declaration.
    ///
    /// # Errors
    /// Returns `UnmarkedConflict` when an unmarked field of that name exists
    /// and `DuplicateDefinition` when the field was already defined.
    pub fn define_field(
        &mut self,
        name: &str,
        type_text: &str,
        code: &str,
    ) -> Result<MergeAction, CoreError> {
        debug!(type_name = %self.type_name, field = name, ty = type_text, "define field");
        self.define(Signature::field(name), code)
    }

    /// Constructors are matched by parameter types. One without a match is
    /// written at [`Self::write_to_string`] into the slot of a generated
    /// constructor of the same arity class (no-arg vs. with arguments) that
    /// nothing refreshed, if there is one.
    ///
    /// # Errors
    /// Returns `UnmarkedConflict` when an unmarked constructor matches and
    /// `DuplicateDefinition` when the signature was already defined.
    pub fn define_constructor<S: AsRef<str>>(
        &mut self,
        parameter_types: &[S],
        code: &str,
    ) -> Result<MergeAction, CoreError> {
        self.define(Signature::constructor(parameter_types), code)
    }

    /// # Errors
    /// Returns `UnmarkedConflict` when an unmarked method matches and
    /// `DuplicateDefinition` when the signature was already defined.
    pub fn define_method<S: AsRef<str>>(
        &mut self,
        name: &str,
        parameter_types: &[S],
        code: &str,
    ) -> Result<MergeAction, CoreError> {
        self.define(Signature::method(name, parameter_types), code)
    }

    /// Import `qualified` unless an existing import, the file's own package,
    /// or `java.lang` already covers it. Returns whether an import is added.
    pub fn ensure_import(&mut self, qualified: &str) -> bool {
        if self.keep_type {
            return false;
        }
        let Some((package, _)) = qualified.rsplit_once('.') else {
            return false;
        };

        let covered = package == "java.lang"
            || package == self.unit.package_name()
            || self.unit.imports.iter().any(|import| {
                !import.is_static
                    && if import.is_wildcard {
                        import.path == package
                    } else {
                        import.path == qualified
                    }
            })
            || self.imports.iter().any(|added| added == qualified);
        if covered {
            return false;
        }

        debug!(type_name = %self.type_name, import = qualified, "adding import");
        self.imports.push(qualified.to_string());
        true
    }

    /// Delete stale generated members, apply pending edits and render.
    ///
    /// Returns `None` when the result is byte-identical to the input.
    ///
    /// # Errors
    /// Returns `ParseFailed` when the merged text has more syntax errors than
    /// the original, which means a candidate was not valid Java, and
    /// `ConflictingEdits` when two edits would rewrite the same text.
    pub fn write_to_string(mut self) -> Result<Option<String>, CoreError> {
        if self.keep_type {
            return Ok(None);
        }

        let mut stale = self.stale_members();
        self.take_over_constructors(&mut stale);
        self.emit_imports();
        self.emit_replacements();
        self.emit_removals(&stale);
        self.emit_inserts(&stale);

        let rendered = self.rewrite.render().map_err(|overlap| CoreError::ConflictingEdits {
            type_name: self.type_name.clone(),
            message: overlap.to_string(),
        })?;
        if rendered == self.rewrite.source() {
            debug!(type_name = %self.type_name, "merge produced no change");
            return Ok(None);
        }

        let errors = CompilationUnit::parse(&rendered).syntax_errors;
        if errors > self.unit.syntax_errors {
            return Err(CoreError::ParseFailed {
                path: self.path,
                message: format!(
                    "merged source has {errors} syntax errors, the original had {}",
                    self.unit.syntax_errors
                ),
            });
        }

        info!(
            type_name = %self.type_name,
            removed = stale.iter().filter(|s| **s).count(),
            "merged generated code"
        );
        Ok(Some(rendered))
    }

    fn define(&mut self, signature: Signature, code: &str) -> Result<MergeAction, CoreError> {
        if self.keep_type {
            return Ok(self.skip(&signature));
        }
        let found = self.find(&signature);
        self.apply(found, signature, code)
    }

    fn skip(&self, signature: &Signature) -> MergeAction {
        debug!(type_name = %self.type_name, member = %signature, "skipped, type is kept");
        MergeAction::Skipped
    }

    fn find(&self, signature: &Signature) -> Option<usize> {
        self.members
            .iter()
            .position(|m| m.signature.matches(signature))
    }

    fn apply(
        &mut self,
        found: Option<usize>,
        signature: Signature,
        code: &str,
    ) -> Result<MergeAction, CoreError> {
        let code = GeneratedCode::ensure_stamped(code);
        let Some(index) = found else {
            if self.pending.iter().any(|p| p.signature.matches(&signature)) {
                return Err(CoreError::DuplicateDefinition {
                    location: Location::member(&self.type_name, signature.to_string(), None),
                });
            }
            debug!(type_name = %self.type_name, member = %signature, "inserting");
            let text = self.formatter.format(&code, self.depth, &self.config);
            self.pending.push(PendingInsert { signature, text });
            return Ok(MergeAction::Inserted);
        };

        let member = &self.members[index];
        let location = Location::member(
            &self.type_name,
            member.signature.to_string(),
            Some(member.line),
        );
        if member.refreshed {
            return Err(CoreError::DuplicateDefinition { location });
        }
        match member.hint {
            ProvenanceHint::Keep => {
                debug!(%location, "kept, marked @Keep");
                self.diagnostics.push(Diagnostic {
                    location,
                    message: "marked @Keep, generated version skipped".to_string(),
                });
                Ok(MergeAction::Kept)
            }
            ProvenanceHint::None => Err(CoreError::UnmarkedConflict { location }),
            ProvenanceHint::Generated(_) => {
                let extent = member.extent.clone();
                let shared = self.members.iter().filter(|m| m.extent == extent).count() > 1;
                self.members[index].refreshed = true;
                if !shared && is_structurally_equal(&self.rewrite.source()[extent], &code) {
                    debug!(%location, "generated code unchanged");
                    return Ok(MergeAction::Unchanged);
                }
                debug!(%location, "replacing generated code");
                let formatted = self.formatter.format(&code, self.depth, &self.config);
                self.members[index].replacement = Some(formatted);
                Ok(MergeAction::Replaced)
            }
        }
    }

    /// Generated members nobody refreshed, by member index. Members sharing
    /// a declaration (`int a, b;`) are stale only together; once one of them
    /// is refreshed the declaration is rewritten instead.
    fn stale_members(&self) -> Vec<bool> {
        self.members
            .iter()
            .map(|member| {
                member.hint.is_generated()
                    && !self
                        .members
                        .iter()
                        .any(|other| other.extent == member.extent && other.refreshed)
            })
            .collect()
    }

    /// Give each constructor without an exact match the slot of the stale
    /// generated constructor of its arity class closest in parameter count.
    /// Runs after every exact match is known, so no refreshed slot is taken.
    fn take_over_constructors(&mut self, stale: &mut [bool]) {
        let pending = std::mem::take(&mut self.pending);
        for insert in pending {
            let slot = if insert.signature.kind == DeclKind::Constructor {
                let arity = insert.signature.parameters.len();
                self.members
                    .iter()
                    .enumerate()
                    .filter(|(i, m)| {
                        stale[*i]
                            && m.signature.kind == DeclKind::Constructor
                            && m.signature.parameters.is_empty() == (arity == 0)
                    })
                    .min_by_key(|(_, m)| m.signature.parameters.len().abs_diff(arity))
                    .map(|(i, _)| i)
            } else {
                None
            };

            match slot {
                Some(index) => {
                    info!(
                        type_name = %self.type_name,
                        old = %self.members[index].signature,
                        new = %insert.signature,
                        "taking over stale generated constructor"
                    );
                    stale[index] = false;
                    self.members[index].refreshed = true;
                    self.members[index].replacement = Some(insert.text);
                }
                None => self.pending.push(insert),
            }
        }
    }

    /// One edit per declaration. A shared field declaration is rewritten as
    /// one declaration per refreshed declarator; the others go with it.
    fn emit_replacements(&mut self) {
        let mut edits: Vec<(Range<usize>, String)> = Vec::new();
        for member in &self.members {
            if member.replacement.is_none() || edits.iter().any(|(r, _)| *r == member.extent) {
                continue;
            }
            let group: Vec<&Member> = self
                .members
                .iter()
                .filter(|m| m.extent == member.extent)
                .collect();
            let texts: Vec<&str> = group.iter().filter_map(|m| m.replacement.as_deref()).collect();
            if group.len() > texts.len() {
                info!(
                    type_name = %self.type_name,
                    dropped = group.len() - texts.len(),
                    "splitting generated declaration, dropping unrefreshed declarators"
                );
            }
            edits.push((member.extent.clone(), texts.join("\n").trim_start().to_string()));
        }

        for (extent, text) in edits {
            self.rewrite.replace(extent, text);
        }
    }

    fn emit_imports(&mut self) {
        if self.imports.is_empty() {
            return;
        }
        let block = self
            .imports
            .iter()
            .map(|q| format!("import {q};"))
            .collect::<Vec<_>>()
            .join("\n");

        if let Some(last) = self.unit.imports.last() {
            self.rewrite.insert(last.span.end, format!("\n{block}"));
        } else if let Some(package) = self.unit.package_span {
            self.rewrite.insert(package.end, format!("\n\n{block}"));
        } else {
            self.rewrite.insert(0, format!("{block}\n\n"));
        }
    }

    fn emit_removals(&mut self, stale: &[bool]) {
        let mut removed: Vec<Range<usize>> = Vec::new();
        for (member, _) in self.members.iter().zip(stale).filter(|(_, s)| **s) {
            if removed.contains(&member.extent) {
                continue;
            }
            removed.push(member.extent.clone());
            info!(
                type_name = %self.type_name,
                member = %member.signature,
                "removing stale generated code"
            );
        }

        for extent in removed {
            let source = self.rewrite.source();
            let mut range = whole_lines(source, extent);
            if let Some(blank) = blank_line_before(source, range.start) {
                range.start = blank;
            }
            self.rewrite.remove(range);
        }
    }

    fn emit_inserts(&mut self, stale: &[bool]) {
        let pending = std::mem::take(&mut self.pending);
        let mut at_start = Vec::new();
        let mut at_end = Vec::new();
        let body_has_content = !self.body_content().is_empty();

        for insert in pending {
            let kind = insert.signature.kind;
            match self.anchor(kind, stale) {
                Some((offset, anchor_kind)) => {
                    let gap = if anchor_kind == DeclKind::Field && kind == DeclKind::Field {
                        "\n"
                    } else {
                        "\n\n"
                    };
                    self.rewrite.insert(offset, format!("{gap}{}", insert.text));
                }
                None if kind == DeclKind::Field && body_has_content => at_start.push(insert.text),
                None => at_end.push(insert.text),
            }
        }

        if !at_start.is_empty() {
            self.rewrite
                .insert(self.body.start + 1, format!("\n{}\n", at_start.join("\n")));
        }
        if !at_end.is_empty() {
            let (offset, text) = self.body_end_insertion(&at_end.join("\n\n"));
            self.rewrite.insert(offset, text);
        }
    }

    /// End of the last surviving member of the first kind in `kind`'s anchor
    /// order that has one.
    fn anchor(&self, kind: DeclKind, stale: &[bool]) -> Option<(usize, DeclKind)> {
        kind.anchor_order().iter().find_map(|candidate| {
            self.members
                .iter()
                .zip(stale)
                .filter(|(m, s)| m.signature.kind == *candidate && !**s)
                .map(|(m, _)| m.extent.end)
                .max()
                .map(|end| (end, *candidate))
        })
    }

    fn body_end_insertion(&self, block: &str) -> (usize, String) {
        let source = self.rewrite.source();
        let close = self.body.end.saturating_sub(1);
        let line_start = source[..close].rfind('\n').map_or(0, |i| i + 1);
        let content = self.body_content();

        if line_start > self.body.start && source[line_start..close].trim().is_empty() {
            let lead = if content.is_empty() { "" } else { "\n" };
            (line_start, format!("{lead}{block}\n"))
        } else {
            let closing_indent = self.config.indent(self.depth.saturating_sub(1));
            (close, format!("\n{block}\n{closing_indent}"))
        }
    }

    /// Text between the body braces, trimmed.
    fn body_content(&self) -> &str {
        self.rewrite
            .source()
            .get(self.body.start + 1..self.body.end.saturating_sub(1))
            .unwrap_or_default()
            .trim()
    }
}

/// Breadth-first search for a type by simple name: top-level types win over
/// nested ones. Returns the member depth of its body.
fn locate<'u>(types: &'u [TypeDecl], name: &str) -> Option<(&'u TypeDecl, usize)> {
    let mut queue: VecDeque<(&TypeDecl, usize)> = types.iter().map(|t| (t, 1)).collect();
    while let Some((decl, depth)) = queue.pop_front() {
        if decl.name == name {
            return Some((decl, depth));
        }
        for member in &decl.members {
            if let Declaration::NestedType(nested) = member {
                queue.push_back((nested, depth + 1));
            }
        }
    }
    None
}

fn index_members(decl: &TypeDecl) -> Vec<Member> {
    let mut members = Vec::new();
    for declaration in &decl.members {
        let hint = provenance(declaration.modifiers());
        let extent = declaration.extent();
        let line = declaration.span().line;
        let mut push = |signature| {
            members.push(Member {
                signature,
                hint,
                extent: extent.clone(),
                line,
                refreshed: false,
                replacement: None,
            });
        };

        match declaration {
            Declaration::Field(field) => {
                for declarator in &field.declarators {
                    push(Signature::field(&declarator.name));
                }
            }
            Declaration::Constructor(ctor) => {
                let types: Vec<&str> = ctor.parameters.iter().map(|p| p.type_text.as_str()).collect();
                push(Signature::constructor(&types));
            }
            Declaration::Method(method) => {
                let types: Vec<&str> =
                    method.parameters.iter().map(|p| p.type_text.as_str()).collect();
                push(Signature::method(&method.name, &types));
            }
            Declaration::NestedType(_) => {}
        }
    }
    members
}

fn has_marker(modifiers: &Modifiers, simple_name: &str) -> bool {
    modifiers
        .annotations
        .iter()
        .any(|a| a.simple_name() == simple_name)
}

/// Provenance by simple annotation name. `@Keep` wins over `@Generated`.
fn provenance(modifiers: &Modifiers) -> ProvenanceHint {
    if has_marker(modifiers, KEEP) {
        return ProvenanceHint::Keep;
    }
    modifiers
        .annotations
        .iter()
        .find(|a| a.simple_name() == GENERATED)
        .map_or(ProvenanceHint::None, |generated| {
            let hash = match &generated.arguments {
                AnnotationArguments::Normal(pairs) => pairs
                    .iter()
                    .find(|(key, _)| key == "hash")
                    .and_then(|(_, value)| match value {
                        ElementValue::Integer(n) => i32::try_from(*n).ok(),
                        _ => None,
                    }),
                AnnotationArguments::Marker | AnnotationArguments::Single(_) => None,
            };
            ProvenanceHint::Generated(hash)
        })
}
