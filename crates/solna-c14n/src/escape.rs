#![forbid(unsafe_code)]

//! Entity escaping for canonical output.
//!
//! Escapes are written straight into the output buffer. The replacement set
//! depends on where the string lands:
//!
//! | char  | text     | attribute | PI data  |
//! |-------|----------|-----------|----------|
//! | `&`   | `&amp;`  | `&amp;`   |          |
//! | `<`   | `&lt;`   | `&lt;`    |          |
//! | `>`   | `&gt;`   |           |          |
//! | `"`   |          | `&quot;`  |          |
//! | `\t`  |          | `&#x9;`   |          |
//! | `\n`  |          | `&#xA;`   |          |
//! | `\r`  | `&#xD;`  | `&#xD;`   | `&#xD;`  |

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Text,
    Attribute,
    ProcessingInstruction,
}

fn replacement(ctx: Context, byte: u8) -> Option<&'static [u8]> {
    use Context::*;
    match (ctx, byte) {
        (Text | Attribute, b'&') => Some(b"&amp;"),
        (Text | Attribute, b'<') => Some(b"&lt;"),
        (Text, b'>') => Some(b"&gt;"),
        (Attribute, b'"') => Some(b"&quot;"),
        (Attribute, b'\t') => Some(b"&#x9;"),
        (Attribute, b'\n') => Some(b"&#xA;"),
        (_, b'\r') => Some(b"&#xD;"),
        _ => None,
    }
}

/// Append `s` to `out`, escaped for `ctx`.
///
/// All replaced characters are ASCII, so scanning bytes never splits a
/// multi-byte UTF-8 sequence.
pub fn escape_into(out: &mut Vec<u8>, s: &str, ctx: Context) {
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if let Some(rep) = replacement(ctx, b) {
            out.extend_from_slice(&bytes[start..i]);
            out.extend_from_slice(rep);
            start = i + 1;
        }
    }
    out.extend_from_slice(&bytes[start..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn esc(s: &str, ctx: Context) -> String {
        let mut out = Vec::new();
        escape_into(&mut out, s, ctx);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_escaping() {
        assert_eq!(esc("plain", Context::Text), "plain");
        assert_eq!(esc("a&b<c>d", Context::Text), "a&amp;b&lt;c&gt;d");
        assert_eq!(esc("tab\tcr\rend", Context::Text), "tab\tcr&#xD;end");
    }

    #[test]
    fn attribute_escaping_keeps_gt() {
        assert_eq!(esc("a>b", Context::Attribute), "a>b");
        assert_eq!(esc("a&b\"c", Context::Attribute), "a&amp;b&quot;c");
        assert_eq!(esc("a\tb\nc\rd", Context::Attribute), "a&#x9;b&#xA;c&#xD;d");
    }

    #[test]
    fn multibyte_text_is_untouched() {
        assert_eq!(esc("Åsa & Örjan", Context::Text), "Åsa &amp; Örjan");
        assert_eq!(esc("a<b\r", Context::ProcessingInstruction), "a<b&#xD;");
    }
}
