//! Line classification.
//!
//! Splits one raw line into directive keyword, argument tokens and trailing
//! comment, and tracks the two stream-level controls: `SKIP` (toggle) and
//! `STOP` (end of processing). Name-hint comments are captured here and held
//! until a geometry-producing directive takes them.

/// Comment prefix carrying an explicit name hint.
const NAME_HINT_MARKER: &str = "# name_hint:";

/// Debug comment prefixes whose text also serves as a name hint.
const DEBUG_HINT_MARKERS: &[&str] = &["# 1", "# 2", "# 3", "# 4"];

/// A line split into code and comment, with `\#` already unescaped in the code.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitLine {
    pub keyword: Option<String>,
    pub tokens: Vec<String>,
    pub comment: Option<String>,
}

/// Split at the first unescaped `#`.
pub fn split_line(line: &str) -> SplitLine {
    let mut code = String::with_capacity(line.len());
    let mut comment = None;

    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some((_, '#'))) => {
                chars.next();
                code.push('#');
            }
            '#' => {
                comment = Some(line[i..].trim_end().to_string());
                break;
            }
            _ => code.push(c),
        }
    }

    let mut parts = code.split_whitespace().map(str::to_string);
    let keyword = parts.next();
    SplitLine {
        keyword,
        tokens: parts.collect(),
        comment,
    }
}

/// Extract a name hint from a comment, if it carries one.
pub fn name_hint(comment: &str) -> Option<String> {
    if let Some(rest) = comment.strip_prefix(NAME_HINT_MARKER) {
        return Some(rest.trim().to_string());
    }
    if DEBUG_HINT_MARKERS.iter().any(|m| comment.starts_with(m)) {
        return Some(comment[2..].trim().to_string());
    }
    None
}

/// What the caller should do with a line.
#[derive(Clone, Debug, PartialEq)]
pub enum LineClass {
    /// Blank or comment-only.
    Empty,
    /// `SKIP` toggled, or the line is inside a skipped region.
    Skipped,
    /// `STOP`: no further lines are processed.
    Stop,
    /// A directive to dispatch.
    Directive { keyword: String, tokens: Vec<String> },
}

/// Stateful classifier for one stream.
#[derive(Debug, Default)]
pub struct LineClassifier {
    skipping: bool,
    pending_hint: Option<String>,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one line. Name hints are captured even inside skipped regions.
    pub fn classify(&mut self, line: &str) -> LineClass {
        let split = split_line(line.trim());

        if let Some(hint) = split.comment.as_deref().and_then(name_hint) {
            self.pending_hint = Some(hint);
        }

        let keyword = match split.keyword {
            Some(keyword) => keyword,
            None => return LineClass::Empty,
        };

        match keyword.as_str() {
            "SKIP" => {
                self.skipping = !self.skipping;
                LineClass::Skipped
            }
            "STOP" => LineClass::Stop,
            _ if self.skipping => LineClass::Skipped,
            _ => LineClass::Directive {
                keyword,
                tokens: split.tokens,
            },
        }
    }

    pub fn is_skipping(&self) -> bool {
        self.skipping
    }

    /// Take the pending name hint, clearing it.
    pub fn take_name_hint(&mut self) -> Option<String> {
        self.pending_hint.take().filter(|h| !h.is_empty())
    }
}
