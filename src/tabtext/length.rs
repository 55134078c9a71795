use serde::Serialize;

/// Song length category derived from the number of non-empty content lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SongLength {
    #[serde(rename = "SHORT")]
    Short,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LONG")]
    Long,
}

impl SongLength {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SongLength::Short => "SHORT",
            SongLength::Medium => "MEDIUM",
            SongLength::Long => "LONG",
        }
    }

    /// CSS class used by front ends to style the length badge.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            SongLength::Short => "length-SHORT",
            SongLength::Medium => "length-MEDIUM",
            SongLength::Long => "length-LONG",
        }
    }
}

/// Classifies tab content by counting lines whose trimmed form is non-empty.
#[must_use]
pub fn classify_length(content: &str) -> SongLength {
    let lines = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count();

    if lines > 100 {
        SongLength::Long
    } else if lines > 50 {
        SongLength::Medium
    } else {
        SongLength::Short
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_with_lines(n: usize) -> String {
        (0..n)
            .map(|i| format!("e|--{i}--|"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_single_line_is_short() {
        assert_eq!(classify_length("e|--0--|"), SongLength::Short);
    }

    #[test]
    fn test_boundary_fifty_is_short() {
        assert_eq!(classify_length(&content_with_lines(50)), SongLength::Short);
    }

    #[test]
    fn test_boundary_fifty_one_is_medium() {
        assert_eq!(classify_length(&content_with_lines(51)), SongLength::Medium);
    }

    #[test]
    fn test_boundary_one_hundred_is_medium() {
        assert_eq!(classify_length(&content_with_lines(100)), SongLength::Medium);
    }

    #[test]
    fn test_one_hundred_one_is_long() {
        assert_eq!(classify_length(&content_with_lines(101)), SongLength::Long);
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let mut content = content_with_lines(50);
        content.push_str("\n\n   \n\t\n");
        assert_eq!(classify_length(&content), SongLength::Short);
    }

    #[test]
    fn test_empty_content_is_short() {
        assert_eq!(classify_length(""), SongLength::Short);
    }

    #[test]
    fn test_labels_and_classes() {
        assert_eq!(SongLength::Short.label(), "SHORT");
        assert_eq!(SongLength::Medium.css_class(), "length-MEDIUM");
        assert_eq!(SongLength::Long.css_class(), "length-LONG");
    }
}
