//! Line-oriented view of a source text.
//!
//! Every heuristic in the crate works on [`SourceLine`]s: the raw text plus a
//! "code" rendition where string literal contents are blanked out and
//! trailing comments are removed, so keyword and pattern matches do not fire
//! inside strings or comments.

/// Comment delimiters for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    /// Prefixes that start a comment running to end of line.
    pub line: &'static [&'static str],
    /// Block comment (start, end) pairs.
    pub block: &'static [(&'static str, &'static str)],
}

impl CommentSyntax {
    /// `//` and `/* */` (C, Java, JavaScript, Go, ...).
    pub const C_STYLE: CommentSyntax = CommentSyntax {
        line: &["//"],
        block: &[("/*", "*/")],
    };

    /// `#` comments with triple-quoted docstrings.
    pub const PYTHON: CommentSyntax = CommentSyntax {
        line: &["#"],
        block: &[("\"\"\"", "\"\"\""), ("'''", "'''")],
    };

    /// C-style plus shell-style `#`.
    pub const PHP: CommentSyntax = CommentSyntax {
        line: &["//", "#"],
        block: &[("/*", "*/")],
    };
}

/// One line of source with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Line number (1-indexed).
    pub number: usize,
    pub raw: &'a str,
    /// Raw text with string contents blanked and comments removed.
    pub code: String,
    pub is_comment: bool,
    pub is_blank: bool,
}

impl SourceLine<'_> {
    /// Whether the line carries executable code.
    pub fn is_code(&self) -> bool {
        !self.is_blank && !self.is_comment
    }

    /// Leading whitespace width, tabs counted as four columns.
    pub fn indent(&self) -> usize {
        indentation(self.raw)
    }
}

/// Leading whitespace width, tabs counted as four columns.
pub fn indentation(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Split `code` into classified lines.
pub fn scan(code: &str, syntax: CommentSyntax) -> Vec<SourceLine<'_>> {
    let mut lines = Vec::new();
    let mut open_block: Option<&'static str> = None;

    for (idx, raw) in code.lines().enumerate() {
        let number = idx + 1;
        let trimmed = raw.trim();

        if let Some(end) = open_block {
            if trimmed.contains(end) {
                open_block = None;
            }
            lines.push(SourceLine {
                number,
                raw,
                code: String::new(),
                is_comment: !trimmed.is_empty(),
                is_blank: trimmed.is_empty(),
            });
            continue;
        }

        if trimmed.is_empty() {
            lines.push(SourceLine {
                number,
                raw,
                code: String::new(),
                is_comment: false,
                is_blank: true,
            });
            continue;
        }

        if syntax.line.iter().any(|p| trimmed.starts_with(p)) {
            lines.push(SourceLine {
                number,
                raw,
                code: String::new(),
                is_comment: true,
                is_blank: false,
            });
            continue;
        }

        if let Some((start, end)) = syntax.block.iter().find(|(s, _)| trimmed.starts_with(s)) {
            let rest = &trimmed[start.len()..];
            match rest.find(end) {
                Some(pos) => {
                    // Block closes on this line; anything after it is code.
                    let tail = rest[pos + end.len()..].trim();
                    let (code, opens) = code_text(tail, syntax);
                    open_block = opens;
                    let is_comment = code.trim().is_empty();
                    lines.push(SourceLine {
                        number,
                        raw,
                        code,
                        is_comment,
                        is_blank: false,
                    });
                }
                None => {
                    open_block = Some(end);
                    lines.push(SourceLine {
                        number,
                        raw,
                        code: String::new(),
                        is_comment: true,
                        is_blank: false,
                    });
                }
            }
            continue;
        }

        let (code, opens) = code_text(raw, syntax);
        open_block = opens;
        lines.push(SourceLine {
            number,
            raw,
            code,
            is_comment: false,
            is_blank: false,
        });
    }

    lines
}

/// Blank out string contents and drop trailing comments from one line.
///
/// Returns the code text and, when a block comment opens without closing,
/// the delimiter that will close it.
pub fn code_text(line: &str, syntax: CommentSyntax) -> (String, Option<&'static str>) {
    let mut out = String::with_capacity(line.len());
    let mut string_char: Option<char> = None;
    let mut escaped = false;
    let mut skip_until = 0usize;

    for (i, ch) in line.char_indices() {
        if i < skip_until {
            continue;
        }

        if let Some(quote) = string_char {
            if escaped {
                escaped = false;
                out.push(' ');
                continue;
            }
            if ch == '\\' {
                escaped = true;
                out.push(' ');
                continue;
            }
            if ch == quote {
                string_char = None;
                out.push(ch);
            } else {
                out.push(' ');
            }
            continue;
        }

        if ch == '"' || ch == '\'' || ch == '`' {
            string_char = Some(ch);
            out.push(ch);
            continue;
        }

        let rest = &line[i..];
        if syntax.line.iter().any(|p| rest.starts_with(p)) {
            return (out, None);
        }

        // Mid-line block comments only for languages whose block delimiters
        // differ; Python triple quotes mid-line are strings.
        if let Some((start, end)) = syntax
            .block
            .iter()
            .find(|(s, e)| s != e && rest.starts_with(s))
        {
            match rest[start.len()..].find(end) {
                Some(pos) => {
                    skip_until = i + start.len() + pos + end.len();
                    out.push(' ');
                    continue;
                }
                None => return (out, Some(end)),
            }
        }

        out.push(ch);
    }

    (out, None)
}

/// Line and comment counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
}

impl LineStats {
    pub fn from_lines(lines: &[SourceLine<'_>]) -> Self {
        let mut stats = LineStats::default();
        for line in lines {
            if line.is_blank {
                stats.blank_lines += 1;
            } else if line.is_comment {
                stats.comment_lines += 1;
            } else {
                stats.code_lines += 1;
            }
        }
        stats
    }

    /// Comment lines as a share of non-blank lines, 0 for empty input.
    pub fn comment_percentage(&self) -> f64 {
        let total = self.code_lines + self.comment_lines;
        if total == 0 {
            return 0.0;
        }
        self.comment_lines as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_c_style() {
        let src = "int a = 1; // note\n/* block\n   still */\n\n// whole\nint b = \"//x\";\n";
        let lines = scan(src, CommentSyntax::C_STYLE);
        assert_eq!(lines.len(), 6);
        assert!(lines[0].is_code());
        assert_eq!(lines[0].code.trim(), "int a = 1;");
        assert!(lines[1].is_comment);
        assert!(lines[2].is_comment);
        assert!(lines[3].is_blank);
        assert!(lines[4].is_comment);
        assert_eq!(lines[5].code, "int b = \"   \";");

        let stats = LineStats::from_lines(&lines);
        assert_eq!(stats.code_lines, 2);
        assert_eq!(stats.comment_lines, 3);
        assert_eq!(stats.blank_lines, 1);
    }

    #[test]
    fn test_scan_python_docstrings() {
        let src = "def f():\n    \"\"\"Doc\n    more\n    \"\"\"\n    return 1  # trailing\n    '''one line'''\n";
        let lines = scan(src, CommentSyntax::PYTHON);
        assert!(lines[0].is_code());
        assert!(lines[1].is_comment);
        assert!(lines[2].is_comment);
        assert!(lines[3].is_comment);
        assert_eq!(lines[4].code.trim(), "return 1");
        assert!(lines[5].is_comment);
    }

    #[test]
    fn test_mid_line_block_comment() {
        let (code, opens) = code_text("a = 1; /* x */ b = 2;", CommentSyntax::C_STYLE);
        assert!(opens.is_none());
        assert!(code.contains("b = 2;"));
        assert!(!code.contains('x'));

        let (code, opens) = code_text("a = 1; /* open", CommentSyntax::C_STYLE);
        assert_eq!(opens, Some("*/"));
        assert_eq!(code.trim(), "a = 1;");
    }

    #[test]
    fn test_comment_percentage_empty() {
        assert_eq!(LineStats::default().comment_percentage(), 0.0);
    }

    #[test]
    fn test_indentation() {
        assert_eq!(indentation("    x"), 4);
        assert_eq!(indentation("\tx"), 4);
        assert_eq!(indentation("x"), 0);
    }
}
