//! Structured view of a summary written as "discussion" blocks:
//!
//! ```text
//! discussion
//! title: Weekend trip
//! Everyone agreed on Saturday.
//! engagement: high
//! discussion started by Dana
//! 10:42
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Discussion {
    pub title: String,
    pub content: String,
    pub engagement: String,
    pub started_by: String,
    pub time: String,
}

const STARTED_BY: &str = "discussion started by";

fn is_block_header(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    lower.starts_with("discussion") && !lower.starts_with(STARTED_BY)
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> &'a str {
    let trimmed = line.trim();
    match trimmed.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => trimmed[prefix.len()..].trim(),
        _ => trimmed,
    }
}

/// Split summary text into discussions. Blocks with fewer than five
/// non-empty lines are skipped.
pub fn parse_discussions(text: &str) -> Vec<Discussion> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in text.lines() {
        if is_block_header(line) {
            blocks.push(Vec::new());
        } else if let Some(current) = blocks.last_mut() {
            if !line.trim().is_empty() {
                current.push(line);
            }
        }
    }

    blocks
        .into_iter()
        .filter_map(|lines| {
            if lines.len() < 5 {
                tracing::debug!(lines = lines.len(), "Skipping incomplete discussion block");
                return None;
            }
            Some(Discussion {
                title: strip_prefix_ci(lines[0], "title:").to_string(),
                content: lines[1].trim().to_string(),
                engagement: strip_prefix_ci(lines[2], "engagement:").to_string(),
                started_by: strip_prefix_ci(lines[3], STARTED_BY).to_string(),
                time: lines[4].trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_blocks() {
        let text = "Here is the summary.\n\
                    discussion\n\
                    title: Weekend trip\n\
                    Everyone agreed on Saturday.\n\
                    engagement: high\n\
                    discussion started by Dana\n\
                    10:42\n\
                    \n\
                    Discussion 2\n\
                    Title: Budget\n\
                    Costs split evenly.\n\
                    Engagement: low\n\
                    Discussion started by Sam\n\
                    18:05\n";
        let d = parse_discussions(text);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].title, "Weekend trip");
        assert_eq!(d[0].started_by, "Dana");
        assert_eq!(d[0].time, "10:42");
        assert_eq!(d[1].title, "Budget");
        assert_eq!(d[1].engagement, "low");
        assert_eq!(d[1].started_by, "Sam");
    }

    #[test]
    fn test_skips_short_blocks_and_free_text() {
        assert!(parse_discussions("Just a plain paragraph.").is_empty());
        let text = "discussion\ntitle: Only a title\n";
        assert!(parse_discussions(text).is_empty());
    }
}
