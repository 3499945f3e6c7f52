/// Cleans raw transcript text before extraction.
///
/// Line breaks become single spaces (CRLF counts as one break). Anything
/// other than ASCII letters, ASCII digits, `,` `.` `!` `?` and space is
/// dropped.
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn normalize(raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    out.push(' ');
                }
                '\n' => out.push(' '),
                c if is_allowed(c) => out.push(c),
                _ => {}
            }
        }
        out
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ',' | '.' | '!' | '?' | ' ')
}
