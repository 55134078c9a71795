/// Converts raw tab text into HTML markup with lightweight highlighting.
///
/// Every input character is either wrapped in a known-safe span or
/// HTML-escaped, so the output can be embedded directly. One left-to-right
/// pass, checking multi-digit fret runs before single digits so a two-digit
/// fret is never split into two spans. Bar separators get an auto-incrementing
/// measure number scoped to the invocation.
#[must_use]
pub fn highlight_tab(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n");
    let mut out = String::with_capacity(normalized.len() * 2);
    let mut measure = 0u32;

    let mut chars = normalized.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '0'..='9' => {
                let mut run = String::new();
                run.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() {
                        run.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if run.len() > 1 {
                    out.push_str("<span class=\"tab-num multi\">");
                } else {
                    out.push_str("<span class=\"tab-num\">");
                }
                out.push_str(&run);
                out.push_str("</span>");
            }
            '^' | '>' | '~' | 'b' | 'p' | 'h' => {
                out.push_str("<span class=\"tab-accent\">");
                push_escaped(&mut out, c);
                out.push_str("</span>");
            }
            '|' => {
                measure += 1;
                out.push_str("<span class=\"tab-bar\">|</span>");
                out.push_str("<span class=\"measure-num\">");
                out.push_str(&measure.to_string());
                out.push_str("</span>");
            }
            _ => push_escaped(&mut out, c),
        }
    }

    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_digit_run_is_one_span() {
        assert_eq!(
            highlight_tab("12"),
            "<span class=\"tab-num multi\">12</span>"
        );
    }

    #[test]
    fn test_single_digits_around_bar() {
        assert_eq!(
            highlight_tab("1|2"),
            concat!(
                "<span class=\"tab-num\">1</span>",
                "<span class=\"tab-bar\">|</span>",
                "<span class=\"measure-num\">1</span>",
                "<span class=\"tab-num\">2</span>",
            )
        );
    }

    #[test]
    fn test_measure_counter_increments() {
        let html = highlight_tab("|--|--|");
        assert!(html.contains("<span class=\"measure-num\">1</span>"));
        assert!(html.contains("<span class=\"measure-num\">2</span>"));
        assert!(html.contains("<span class=\"measure-num\">3</span>"));
    }

    #[test]
    fn test_measure_counter_resets_per_invocation() {
        let first = highlight_tab("|");
        let second = highlight_tab("|");
        assert_eq!(first, second);
        assert!(first.contains("<span class=\"measure-num\">1</span>"));
    }

    #[test]
    fn test_accents_are_wrapped() {
        assert_eq!(
            highlight_tab("^"),
            "<span class=\"tab-accent\">^</span>"
        );
        assert_eq!(
            highlight_tab(">"),
            "<span class=\"tab-accent\">&gt;</span>"
        );
        assert_eq!(
            highlight_tab("h"),
            "<span class=\"tab-accent\">h</span>"
        );
    }

    #[test]
    fn test_markup_is_escaped() {
        // '>' doubles as an accent symbol, so it comes back wrapped but
        // still escaped.
        let html = highlight_tab("<em>&");
        assert!(!html.contains("<em"));
        assert!(html.contains("&lt;em"));
        assert!(html.contains("<span class=\"tab-accent\">&gt;</span>"));
        assert!(html.contains("&amp;"));
    }

    #[test]
    fn test_crlf_is_normalized() {
        let html = highlight_tab("e|--\r\nB|--");
        assert!(!html.contains('\r'));
        assert!(html.contains('\n'));
    }

    #[test]
    fn test_long_fret_run_not_split() {
        let html = highlight_tab("e|--15--12--|");
        assert!(html.contains("<span class=\"tab-num multi\">15</span>"));
        assert!(html.contains("<span class=\"tab-num multi\">12</span>"));
    }
}
