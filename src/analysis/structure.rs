//! Structural facts extracted from a source text.
//!
//! Extraction is a single pass over [`SourceLine`]s per language; this module
//! holds the result types and the block-span helpers shared by all of them.

use serde::{Deserialize, Serialize};

use super::lines::SourceLine;

/// A function or method found in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// First line (1-indexed).
    pub line: usize,
    /// Last line of the body (1-indexed, inclusive).
    pub end_line: usize,
    pub parameters: usize,
    /// Heuristic complexity of the body alone.
    pub complexity: u32,
    pub is_async: bool,
}

impl FunctionInfo {
    /// Span in lines, signature included.
    pub fn length(&self) -> usize {
        self.end_line.saturating_sub(self.line) + 1
    }
}

/// A class (or struct with methods) found in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub line: usize,
    pub end_line: usize,
    pub method_count: usize,
}

/// Everything structure extraction yields for one source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStructure {
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    /// Imported module names in order of appearance (may repeat).
    pub imports: Vec<String>,
    pub exports: Vec<String>,
}

impl CodeStructure {
    /// Mean function span in lines, 0 without functions.
    pub fn average_function_length(&self) -> f64 {
        if self.functions.is_empty() {
            return 0.0;
        }
        let total: usize = self.functions.iter().map(FunctionInfo::length).sum();
        total as f64 / self.functions.len() as f64
    }

    /// Imports deduplicated, first occurrence wins.
    pub fn unique_imports(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.imports
            .iter()
            .filter(|m| seen.insert(m.as_str()))
            .cloned()
            .collect()
    }

    /// Credit each function to the innermost class whose span contains it.
    ///
    /// Functions nested in another function of that class are helpers, not
    /// methods, and are not credited.
    pub fn assign_methods(&mut self) {
        for class in &mut self.classes {
            class.method_count = 0;
        }
        for func in &self.functions {
            let owner = self
                .classes
                .iter()
                .enumerate()
                .filter(|(_, c)| func.line > c.line && func.line <= c.end_line)
                .min_by_key(|(_, c)| c.end_line - c.line)
                .map(|(i, _)| i);
            let Some(i) = owner else {
                continue;
            };
            let class_line = self.classes[i].line;
            let nested = self.functions.iter().any(|outer| {
                outer.line > class_line && outer.line < func.line && func.line <= outer.end_line
            });
            if !nested {
                self.classes[i].method_count += 1;
            }
        }
    }
}

/// Index of the line closing the brace block that opens at or after `start`.
///
/// A declaration that ends in `;` before any `{` (abstract or interface
/// method, prototype) spans only its own lines.
pub fn brace_block_end(lines: &[SourceLine<'_>], start: usize) -> usize {
    let mut depth: i32 = 0;
    let mut opened = false;

    for (idx, line) in lines.iter().enumerate().skip(start) {
        for ch in line.code.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        if opened && depth <= 0 {
            return idx;
        }
        if !opened {
            let code = line.code.trim_end();
            if code.ends_with(';') {
                return idx;
            }
            // Signature never opened a block; treat as a one-liner.
            if idx >= start + 8 {
                return start;
            }
        }
    }

    lines.len().saturating_sub(1).max(start)
}

/// Index of the last line indented deeper than the line at `start`.
///
/// Blank lines inside the block do not terminate it.
pub fn indent_block_end(lines: &[SourceLine<'_>], start: usize) -> usize {
    let Some(head) = lines.get(start) else {
        return start;
    };
    let base = head.indent();
    let mut end = start;

    for (idx, line) in lines.iter().enumerate().skip(start + 1) {
        if line.is_blank {
            continue;
        }
        if line.indent() <= base {
            break;
        }
        end = idx;
    }

    end
}

/// Raw text of lines `start..=end`, joined with newlines.
pub fn block_text(lines: &[SourceLine<'_>], start: usize, end: usize) -> String {
    lines
        .get(start..=end.min(lines.len().saturating_sub(1)))
        .unwrap_or_default()
        .iter()
        .map(|l| l.raw)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Count comma-separated parameters between the first `(` and its match.
///
/// Names listed in `ignore` (`self`, `cls`) are not counted.
pub fn count_parameters(signature: &str, ignore: &[&str]) -> usize {
    let Some(open) = signature.find('(') else {
        return 0;
    };

    let mut depth = 0i32;
    let mut params = Vec::new();
    let mut current = String::new();

    for ch in signature[open..].chars() {
        match ch {
            '(' | '[' | '{' | '<' => {
                depth += 1;
                if depth > 1 {
                    current.push(ch);
                }
            }
            ')' | ']' | '}' | '>' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                current.push(ch);
            }
            ',' if depth == 1 => {
                params.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    params.push(current);

    params
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .filter(|p| {
            let name = p
                .split(|c: char| c == ':' || c == '=' || c.is_whitespace())
                .next()
                .unwrap_or("");
            !ignore.contains(&name)
        })
        .count()
}
