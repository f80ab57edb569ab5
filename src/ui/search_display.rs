//! Terminal rendering for `file-search-server search`

use colored::Colorize;

use super::theme::{BoxChars, Theme};
use crate::core::search::{MatchLine, SearchResult};

/// Print matches framed with a header and footer
pub fn display_results(result: &SearchResult) {
    let term_width = terminal_width();

    print_header(&result.keyword, result.total_matches, term_width);

    if result.matches.is_empty() {
        println!(
            "{} {}",
            BoxChars::V_LINE.color(Theme::BORDER),
            "No matches found".color(Theme::ERROR).italic()
        );
    }

    let gutter = result
        .matches
        .last()
        .map(|m| m.line_number.to_string().len())
        .unwrap_or(1);

    for m in &result.matches {
        print_match(m, &result.keyword, result.case_sensitive, gutter, term_width);
    }

    print_footer(result, term_width);
}

/// Print an error payload message
pub fn display_error(message: &str) {
    eprintln!("{} {}", BoxChars::CROSS_MARK.color(Theme::ERROR).bold(), message);
}

fn print_header(keyword: &str, count: usize, width: usize) {
    println!();
    println!(
        "{}{}{}",
        BoxChars::TL_CORNER.color(Theme::BORDER_ACCENT),
        BoxChars::H_LINE
            .repeat(width.saturating_sub(2))
            .color(Theme::BORDER),
        BoxChars::TR_CORNER.color(Theme::BORDER_ACCENT)
    );

    let noun = if count == 1 { "match" } else { "matches" };
    println!(
        "{} {} {}  {}",
        BoxChars::V_LINE.color(Theme::BORDER_ACCENT),
        format!("{} SEARCH", BoxChars::DIAMOND).color(Theme::ACCENT).bold(),
        format!("\"{}\"", truncate_chars(keyword, 40)).color(Theme::KEYWORD),
        format!("{} {}", count, noun).color(Theme::SUBTLE)
    );

    println!(
        "{}{}{}",
        BoxChars::T_RIGHT.color(Theme::BORDER_ACCENT),
        BoxChars::H_LINE
            .repeat(width.saturating_sub(2))
            .color(Theme::BORDER),
        BoxChars::T_LEFT.color(Theme::BORDER_ACCENT)
    );
}

fn print_match(m: &MatchLine, keyword: &str, case_sensitive: bool, gutter: usize, width: usize) {
    let budget = width.saturating_sub(gutter + 6);
    let content = truncate_chars(&m.content, budget);

    println!(
        "{} {} {} {}",
        BoxChars::V_LINE.color(Theme::BORDER),
        format!("{:>gutter$}", m.line_number).color(Theme::SUBTLE),
        BoxChars::L_V_LINE.color(Theme::BORDER),
        highlight_keyword(content, keyword, case_sensitive)
    );
}

fn print_footer(result: &SearchResult, width: usize) {
    println!(
        "{}{}{}",
        BoxChars::BL_CORNER.color(Theme::BORDER_ACCENT),
        BoxChars::H_LINE
            .repeat(width.saturating_sub(2))
            .color(Theme::BORDER),
        BoxChars::BR_CORNER.color(Theme::BORDER_ACCENT)
    );

    let mode = if result.case_sensitive {
        "case-sensitive"
    } else {
        "case-insensitive"
    };
    println!(
        " {} {} {} {}",
        BoxChars::CHECK.color(Theme::OK),
        result.file_path.color(Theme::SUBTLE),
        BoxChars::BULLET.color(Theme::SUBTLE),
        mode.color(Theme::SUBTLE)
    );
    println!();
}

/// Byte ranges of `keyword` in `line`.
///
/// Insensitive ranges are only computed for ASCII text, where lowercasing
/// keeps byte offsets stable.
fn keyword_ranges(line: &str, keyword: &str, case_sensitive: bool) -> Vec<(usize, usize)> {
    if keyword.is_empty() {
        return Vec::new();
    }

    let ranges = |haystack: &str, needle: &str| -> Vec<(usize, usize)> {
        haystack
            .match_indices(needle)
            .map(|(start, s)| (start, start + s.len()))
            .collect()
    };

    if case_sensitive {
        ranges(line, keyword)
    } else if line.is_ascii() && keyword.is_ascii() {
        ranges(&line.to_ascii_lowercase(), &keyword.to_ascii_lowercase())
    } else {
        Vec::new()
    }
}

fn highlight_keyword(line: &str, keyword: &str, case_sensitive: bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;

    for (start, end) in keyword_ranges(line, keyword, case_sensitive) {
        out.push_str(&line[cursor..start]);
        out.push_str(&line[start..end].color(Theme::KEYWORD).bold().to_string());
        cursor = end;
    }
    out.push_str(&line[cursor..]);
    out
}

/// Get terminal width, default to 80
fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
        .max(40)
}

/// Cut to at most `max_chars` characters, on a char boundary
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_ranges_case_sensitive() {
        assert_eq!(keyword_ranges("abc abc", "bc", true), vec![(1, 3), (5, 7)]);
        assert!(keyword_ranges("ABC", "bc", true).is_empty());
    }

    #[test]
    fn test_keyword_ranges_case_insensitive_ascii() {
        assert_eq!(keyword_ranges("Hello HELLO", "hello", false), vec![(0, 5), (6, 11)]);
    }

    #[test]
    fn test_keyword_ranges_skip_non_ascii_folding() {
        assert!(keyword_ranges("İstanbul", "i", false).is_empty());
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 40), "short");
    }

    #[test]
    fn test_highlight_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(highlight_keyword("Hello World", "world", false), "Hello World");
    }
}
