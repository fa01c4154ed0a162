use lazy_static::lazy_static;
use regex::Regex;

/// Longest executive summary kept, in characters.
pub const MAX_SUMMARY_CHARS: usize = 600;

lazy_static! {
    static ref HEADER_LINE: Regex = Regex::new(r"^#{1,6}\s").unwrap();
    static ref SECTION_TITLE_LINE: Regex = Regex::new(
        r"(?i)^\*{0,2}(Executive Summary|Key Developments|Industry Impact|Trends to Watch|Weekly.*Report)\*{0,2}\s*$"
    )
    .unwrap();
    static ref IMAGE_LINE: Regex = Regex::new(r"^!\[").unwrap();
    static ref NUMBERED_BOLD_LINE: Regex = Regex::new(r"^\d+\.\s+\*\*").unwrap();
    static ref SOURCE_LINE: Regex = Regex::new(r"^\*Source:").unwrap();
    static ref BLANK_RUN: Regex = Regex::new(r"\n{3,}").unwrap();
}

fn is_boilerplate(line: &str) -> bool {
    HEADER_LINE.is_match(line)
        || SECTION_TITLE_LINE.is_match(line)
        || IMAGE_LINE.is_match(line)
        || NUMBERED_BOLD_LINE.is_match(line)
        || SOURCE_LINE.is_match(line)
}

/// Reduce model output to a single plain paragraph usable as an executive summary.
///
/// Header, section-title, image, numbered-highlight and source lines are
/// dropped, then only the first paragraph is kept. A paragraph longer than
/// [`MAX_SUMMARY_CHARS`] is cut back to its last sentence boundary.
pub fn clean_summary(summary: &str) -> String {
    let kept = summary
        .split('\n')
        .filter(|line| !is_boilerplate(line))
        .collect::<Vec<_>>()
        .join("\n");

    let collapsed = BLANK_RUN.replace_all(&kept, "\n\n");
    let result = collapsed.trim();

    match result.split("\n\n").map(str::trim).find(|p| !p.is_empty()) {
        Some(first) if first.chars().count() > MAX_SUMMARY_CHARS => {
            let head: String = first.chars().take(MAX_SUMMARY_CHARS).collect();
            let sentence = head.rsplit_once('.').map(|(before, _)| before).unwrap_or(&head);
            format!("{}.", sentence)
        }
        Some(first) => first.to_string(),
        None => result.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_headers_and_keeps_first_paragraph() {
        let raw = "## Key Developments\n\nThis week...\n\n\n\nMore text";
        assert_eq!(clean_summary(raw), "This week...");
    }

    #[test]
    fn test_strips_boilerplate_lines() {
        let raw = "**Executive Summary**\n\
                   ![chart](https://example.com/chart.png)\n\
                   1. **GPT-5**: released\n\
                   *Source: Example*\n\
                   Weekly AI News Report\n\
                   AI labs shipped [new models](https://example.com) this week.\n\
                   Regulators took note.";
        assert_eq!(
            clean_summary(raw),
            "AI labs shipped [new models](https://example.com) this week.\nRegulators took note."
        );
    }

    #[test]
    fn test_section_titles_match_case_insensitively() {
        assert_eq!(clean_summary("TRENDS TO WATCH\nActual content."), "Actual content.");
        assert_eq!(clean_summary("industry impact  \nActual content."), "Actual content.");
    }

    #[test]
    fn test_long_paragraph_is_cut_at_sentence_boundary() {
        let sentence = "This sentence is exactly forty-nine characters. ";
        let raw = sentence.repeat(20);
        let cleaned = clean_summary(&raw);

        assert!(cleaned.chars().count() <= MAX_SUMMARY_CHARS + 1);
        assert!(cleaned.ends_with("characters."));
        assert!(raw.starts_with(&cleaned[..cleaned.len() - 1]));
    }

    #[test]
    fn test_long_paragraph_without_period() {
        let raw = "x".repeat(700);
        let cleaned = clean_summary(&raw);
        assert_eq!(cleaned, format!("{}.", "x".repeat(600)));
    }

    #[test]
    fn test_only_boilerplate_yields_empty() {
        assert_eq!(clean_summary("# Title\n## Executive Summary\n\n"), "");
        assert_eq!(clean_summary(""), "");
    }
}
