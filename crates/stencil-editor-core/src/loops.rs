//! Loop directive detection and placeholder text.
//!
//! Templates are never parsed back into a syntax tree. Loop blocks are found
//! by pattern over canonical text, one parent at a time, so blocks for the
//! same parent are assumed not to nest.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

/// A `{% for P in P %}...{% endfor %}` block, in canonical char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopBlock {
    /// Start of the opening directive.
    pub start: usize,
    /// End of the closing directive.
    pub end: usize,
    /// Just after the opening directive.
    pub body_start: usize,
    /// Just before the closing directive.
    pub body_end: usize,
    pub body: String,
}

impl LoopBlock {
    /// Whether `offset` falls in the body, widened by `tolerance` on each side.
    pub fn contains(&self, offset: usize, tolerance: usize) -> bool {
        offset.saturating_add(tolerance) >= self.body_start
            && offset <= self.body_end.saturating_add(tolerance)
    }

    pub fn body_range(&self) -> Range<usize> {
        self.body_start..self.body_end
    }
}

/// `{{ name }}`
pub fn placeholder(name: &str) -> String {
    format!("{{{{ {name} }}}}")
}

/// `{{ parent.name }}`
pub fn nested_placeholder(parent: &str, name: &str) -> String {
    format!("{{{{ {parent}.{name} }}}}")
}

pub fn loop_open(parent: &str) -> String {
    format!("{{% for {parent} in {parent} %}}")
}

pub const LOOP_CLOSE: &str = "{% endfor %}";

/// The three lines of a freshly synthesized loop block.
pub fn loop_lines(parent: &str, name: &str, indent: &str) -> [String; 3] {
    [
        loop_open(parent),
        format!("{indent}{}", nested_placeholder(parent, name)),
        LOOP_CLOSE.to_owned(),
    ]
}

fn loop_pattern(parent: &str) -> Result<Regex, regex::Error> {
    let p = regex::escape(parent);
    RegexBuilder::new(&format!(
        r"\{{%\s*for\s+{p}\s+in\s+{p}\s*%\}}(.*?)\{{%\s*endfor\s*%\}}"
    ))
    .dot_matches_new_line(true)
    .build()
}

fn placeholder_pattern(parent: &str, name: &str) -> Result<Regex, regex::Error> {
    let p = regex::escape(parent);
    let a = regex::escape(name);
    RegexBuilder::new(&format!(r"\{{\{{\s*{p}\.{a}\s*\}}\}}"))
        .case_insensitive(true)
        .build()
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// All loop blocks for `parent`, in document order.
pub fn find_loop_blocks(text: &str, parent: &str) -> Vec<LoopBlock> {
    let re = match loop_pattern(parent) {
        Ok(re) => re,
        Err(e) => {
            tracing::error!(target: "stencil::loops", parent, error = %e, "bad loop pattern");
            return Vec::new();
        }
    };

    re.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = caps.get(1)?;
            Some(LoopBlock {
                start: char_offset(text, whole.start()),
                end: char_offset(text, whole.end()),
                body_start: char_offset(text, body.start()),
                body_end: char_offset(text, body.end()),
                body: body.as_str().to_owned(),
            })
        })
        .collect()
}

/// Char range of the first `{{ parent.name }}` in `body`, ignoring case and
/// inner whitespace.
pub fn find_placeholder(body: &str, parent: &str, name: &str) -> Option<Range<usize>> {
    let re = match placeholder_pattern(parent, name) {
        Ok(re) => re,
        Err(e) => {
            tracing::error!(
                target: "stencil::loops",
                parent,
                name,
                error = %e,
                "bad placeholder pattern"
            );
            return None;
        }
    };
    let m = re.find(body)?;
    Some(char_offset(body, m.start())..char_offset(body, m.end()))
}
