//! Import bookkeeping for one rule pass over one file
//!
//! Rules request imports while they rewrite code and call
//! [`ImportEditor::finish`] with their edits once the primary pass is done.
//! Removals only happen for names that no longer occur in the rewritten
//! text; additions are skipped when the name is already visible.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;
use sdkmig_core::ast::CompilationUnit;
use sdkmig_core::{logging, Edit, Span};

use crate::naming::simple_name;
use crate::sdk_types::package_of;

pub struct ImportEditor<'a> {
    unit: &'a CompilationUnit,
    source: &'a str,
    to_add: BTreeSet<String>,
    to_remove: Vec<(String, bool)>,
    present: HashSet<String>,
}

impl<'a> ImportEditor<'a> {
    pub fn new(unit: &'a CompilationUnit, source: &'a str) -> Self {
        Self {
            unit,
            source,
            to_add: BTreeSet::new(),
            to_remove: Vec::new(),
            present: HashSet::new(),
        }
    }

    /// Import `fqn` unless it is already visible
    pub fn maybe_add_import(&mut self, fqn: &str) {
        self.to_add.insert(fqn.to_string());
    }

    /// Remove the import of `fqn` if its simple name is no longer used
    pub fn maybe_remove_import(&mut self, fqn: &str) {
        self.to_remove.push((fqn.to_string(), false));
    }

    /// Remove the import of `fqn` even if the name still occurs (e.g. in a comment)
    pub fn remove_import(&mut self, fqn: &str) {
        self.to_remove.push((fqn.to_string(), true));
    }

    /// Record an import (or `pkg.*` wildcard) that an edit already introduces
    pub fn mark_present(&mut self, fqn: &str) {
        self.present.insert(fqn.to_string());
    }

    /// Turn the pending requests into edits, given the rule's own edits
    pub fn finish(self, edits: &[Edit]) -> Vec<Edit> {
        let mut result = Vec::new();
        let mut removed: HashSet<&str> = HashSet::new();

        for (fqn, forced) in &self.to_remove {
            for import in &self.unit.imports {
                if import.is_wildcard || import.path != *fqn || removed.contains(import.path.as_str()) {
                    continue;
                }
                if edits.iter().any(|e| touches(e.span, import.span)) {
                    continue;
                }
                if !forced && self.is_used(simple_name(fqn), edits) {
                    continue;
                }
                removed.insert(import.path.as_str());
                result.push(Edit::delete(
                    self.with_trailing_newline(import.span),
                    format!("Remove import {}", fqn),
                ));
            }
        }

        let additions = self.additions(&removed);
        if additions.is_empty() {
            return result;
        }

        let message = |fqn: &str| format!("Add import {}", fqn);
        if let Some(last) = self.unit.imports.iter().max_by_key(|i| i.span.end) {
            if removed.contains(last.path.as_str()) && !last.is_wildcard {
                // The anchor itself goes away: land before it
                for fqn in &additions {
                    result.push(Edit::insert(last.span.start, format!("import {};\n", fqn), message(fqn)));
                }
            } else {
                for fqn in &additions {
                    result.push(Edit::insert(last.span.end, format!("\nimport {};", fqn), message(fqn)));
                }
            }
        } else if let Some(package) = &self.unit.package {
            for (i, fqn) in additions.iter().enumerate() {
                let sep = if i == 0 { "\n\n" } else { "\n" };
                result.push(Edit::insert(package.span.end, format!("{}import {};", sep, fqn), message(fqn)));
            }
        } else {
            let offset = self.unit.types.first().map(|t| t.span.start).unwrap_or(0);
            for (i, fqn) in additions.iter().enumerate() {
                let trailer = if i + 1 == additions.len() { "\n\n" } else { "\n" };
                result.push(Edit::insert(offset, format!("import {};{}", fqn, trailer), message(fqn)));
            }
        }
        result
    }

    fn additions(&self, removed: &HashSet<&str>) -> Vec<String> {
        let package = self.unit.package.as_ref().map(|p| p.name.as_str());
        let mut taken: HashSet<String> = self
            .unit
            .imports
            .iter()
            .filter(|i| !i.is_static && !i.is_wildcard && !removed.contains(i.path.as_str()))
            .map(|i| i.simple_name().to_string())
            .collect();
        taken.extend(self.unit.types.iter().map(|t| t.name.name.clone()));

        let mut additions = Vec::new();
        for fqn in &self.to_add {
            let pkg = package_of(fqn);
            let name = simple_name(fqn);
            let already = self.present.contains(fqn)
                || self.present.contains(&format!("{}.*", pkg))
                || self
                    .unit
                    .imports
                    .iter()
                    .any(|i| !i.is_static && (i.path == *fqn || (i.is_wildcard && i.path == pkg)));
            if already || pkg == "java.lang" || Some(pkg) == package {
                continue;
            }
            if taken.contains(name) {
                logging::log(&format!(
                    "Not importing {} because {} is already taken in this file",
                    fqn, name
                ));
                continue;
            }
            taken.insert(name.to_string());
            additions.push(fqn.clone());
        }
        additions
    }

    /// Whether `name` still occurs outside import declarations once `edits` apply
    fn is_used(&self, name: &str, edits: &[Edit]) -> bool {
        let Ok(regex) = Regex::new(&format!(r"\b{}\b", regex::escape(name))) else {
            return true;
        };
        if edits.iter().any(|e| regex.is_match(&e.replacement)) {
            return true;
        }
        let used = regex.find_iter(self.source).any(|m| {
            let at = Span::new(m.start(), m.end());
            !self.unit.imports.iter().any(|i| i.span.contains(at))
                && !edits.iter().any(|e| !e.span.is_empty() && e.span.contains(at))
        });
        used
    }

    fn with_trailing_newline(&self, span: Span) -> Span {
        let rest = &self.source[span.end..];
        let extra = if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') {
            1
        } else {
            0
        };
        Span::new(span.start, span.end + extra)
    }
}

fn touches(edit: Span, import: Span) -> bool {
    if edit.is_empty() {
        import.start < edit.start && edit.start < import.end
    } else {
        edit.overlaps(import)
    }
}
