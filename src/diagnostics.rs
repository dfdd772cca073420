use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

/// Source region. Byte offsets are 0-based, lines and columns 1-based.
///
/// The tokenizer drives a span like a pair of cursors: the end cursor
/// advances byte by byte, and `update` snaps the start cursor to the end
/// once a token has been emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_pos: usize,
    pub end_pos: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start_pos: 0,
            end_pos: 0,
            start_line: 1,
            end_line: 1,
            start_col: 1,
            end_col: 1,
        }
    }
}

impl Span {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_end_pos(&mut self) {
        self.end_pos += 1;
    }

    pub fn inc_end_line(&mut self) {
        self.end_line += 1;
    }

    pub fn inc_end_col(&mut self) {
        self.end_col += 1;
    }

    pub fn set_end_col(&mut self, col: usize) {
        self.end_col = col;
    }

    /// Snap the start cursor to the end cursor. The next token then
    /// begins exactly where the previous one stopped.
    pub fn update(&mut self) {
        self.start_pos = self.end_pos;
        self.start_line = self.end_line;
        self.start_col = self.end_col;
    }

    pub fn len(&self) -> usize {
        self.end_pos - self.start_pos
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Combine two spans into one covering both.
    pub fn merge(&self, other: &Span) -> Span {
        let (start, end) = if self.start_pos <= other.start_pos {
            (self, other)
        } else {
            (other, self)
        };
        Span {
            start_pos: start.start_pos,
            start_line: start.start_line,
            start_col: start.start_col,
            end_pos: start.end_pos.max(end.end_pos),
            end_line: start.end_line.max(end.end_line),
            end_col: if start.end_pos >= end.end_pos {
                start.end_col
            } else {
                end.end_col
            },
        }
    }
}

/// A user-facing error pinned to a source location. Carries its own copy
/// of the path and source text so it can be rendered long after the
/// compilation state that produced it is gone.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub path: PathBuf,
    pub span: Span,
    pub source: String,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, path: &Path, span: Span, source: &str) -> Self {
        Self {
            message: message.into(),
            path: path.to_path_buf(),
            span,
            source: source.to_string(),
        }
    }

    /// Render to stderr. Colored only when stderr is a terminal.
    pub fn render(&self) {
        let mut err = std::io::stderr();
        let color = err.is_terminal();
        let _ = self.render_to(&mut err, color);
    }

    pub fn render_to(&self, out: &mut dyn Write, color: bool) -> std::io::Result<()> {
        let red_bold = if color { "\x1b[1;31m" } else { "" };
        let yellow = if color { "\x1b[33m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let line = self.span.start_line;
        let col = self.span.start_col;
        let line_text = self.line_text(line);
        let num = line.to_string();
        let gutter = " ".repeat(num.len());

        writeln!(out, "{red_bold}error{reset}: {}", self.message)?;
        writeln!(
            out,
            "{yellow}  --> {}:{}:{}{reset}",
            self.path.display(),
            line,
            col
        )?;
        writeln!(out, " {gutter} |")?;
        writeln!(out, " {num} | {line_text}")?;
        writeln!(out, " {gutter} | {}{red_bold}^{reset}", " ".repeat(col - 1))?;
        Ok(())
    }

    /// The full text of a 1-based source line, without its newline.
    fn line_text(&self, line: usize) -> &str {
        let bytes = self.source.as_bytes();
        let mut start = 0;
        let mut current = 1;
        while current < line {
            match bytes[start..].iter().position(|&b| b == b'\n') {
                Some(off) => {
                    start += off + 1;
                    current += 1;
                }
                None => return "",
            }
        }
        let rest = &self.source[start..];
        match rest.find('\n') {
            Some(end) => &rest[..end],
            None => rest,
        }
    }
}

/// Sort by position, then render every accumulated diagnostic.
pub fn render_all(diags: &[Diagnostic]) {
    let mut sorted: Vec<&Diagnostic> = diags.iter().collect();
    sorted.sort_by_key(|d| (d.path.clone(), d.span.start_pos));
    for d in sorted {
        d.render();
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_update_moves_start_to_end() {
        let mut span = Span::new();
        span.inc_end_pos();
        span.inc_end_pos();
        span.inc_end_col();
        span.inc_end_col();
        assert_eq!(span.len(), 2);
        span.update();
        assert_eq!(span.len(), 0);
        assert_eq!(span.start_pos, 2);
        assert_eq!(span.start_col, 3);
    }

    #[test]
    fn span_merge_covers_both() {
        let a = Span {
            start_pos: 0,
            end_pos: 3,
            start_line: 1,
            end_line: 1,
            start_col: 1,
            end_col: 4,
        };
        let b = Span {
            start_pos: 8,
            end_pos: 12,
            start_line: 2,
            end_line: 2,
            start_col: 2,
            end_col: 6,
        };
        let merged = a.merge(&b);
        assert_eq!(merged.start_pos, 0);
        assert_eq!(merged.end_pos, 12);
        assert_eq!(merged.start_line, 1);
        assert_eq!(merged.end_col, 6);
        assert_eq!(merged, b.merge(&a));
    }

    #[test]
    fn renders_caret_under_column() {
        let source = "let x = 10\nlet y = oops\n";
        let span = Span {
            start_pos: 19,
            end_pos: 23,
            start_line: 2,
            end_line: 2,
            start_col: 9,
            end_col: 13,
        };
        let d = Diagnostic::new("unknown thing", Path::new("demo.dal"), span, source);
        let mut buf = Vec::new();
        d.render_to(&mut buf, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("error: unknown thing"));
        assert!(text.contains("--> demo.dal:2:9"));
        assert!(text.contains("2 | let y = oops"));
        let caret_line = text.lines().last().unwrap();
        assert_eq!(
            caret_line.find('^').unwrap(),
            caret_line.find('|').unwrap() + 10
        );
    }
}
