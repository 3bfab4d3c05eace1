//! Inline bold spans

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));

/// A styled run of text inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "style", content = "text", rename_all = "lowercase")]
pub enum Run {
    Text(String),
    Bold(String),
}

impl Run {
    pub fn text(&self) -> &str {
        match self {
            Run::Text(t) | Run::Bold(t) => t,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Run::Bold(_))
    }
}

/// Split a line into plain and bold runs
///
/// Matching is non-greedy, so `**a** and **b**` yields two bold runs and a
/// lone `**` stays literal.
pub fn parse_inline(line: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in BOLD_RE.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            runs.push(Run::Text(line[last..whole.start()].to_string()));
        }
        runs.push(Run::Bold(inner.as_str().to_string()));
        last = whole.end();
    }

    if last < line.len() {
        runs.push(Run::Text(line[last..].to_string()));
    }
    runs
}

/// Concatenate runs back into unstyled text
pub fn runs_text(runs: &[Run]) -> String {
    runs.iter().map(Run::text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_single_run() {
        assert_eq!(parse_inline("just text"), vec![Run::Text("just text".to_string())]);
    }

    #[test]
    fn test_bold_spans_are_split_out() {
        assert_eq!(
            parse_inline("The **mitochondria** is the **powerhouse**."),
            vec![
                Run::Text("The ".to_string()),
                Run::Bold("mitochondria".to_string()),
                Run::Text(" is the ".to_string()),
                Run::Bold("powerhouse".to_string()),
                Run::Text(".".to_string()),
            ]
        );
    }

    #[test]
    fn test_unmatched_marker_stays_literal() {
        assert_eq!(
            parse_inline("**bold** and **dangling"),
            vec![
                Run::Bold("bold".to_string()),
                Run::Text(" and **dangling".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_line_has_no_runs() {
        assert!(parse_inline("").is_empty());
    }
}
