const TITLE_PREFIX: &str = "Plan_";
const TITLE_IDEA_CHARS: usize = 20;

/// Sanitize user input for embedding in a single-line heading.
/// Replaces newlines (which would break heading structure) with spaces.
pub(crate) fn sanitize_heading(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Document title: `Plan_` followed by the first characters of the idea.
pub(crate) fn display_title(idea: &str) -> String {
    let prefix: String = idea.trim().chars().take(TITLE_IDEA_CHARS).collect();
    format!("{TITLE_PREFIX}{}", sanitize_heading(prefix.trim_end()))
}
