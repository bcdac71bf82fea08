//! TEXT value escaping and content line folding (RFC 5545 3.3.11, 3.1).

/// Escape a free-text value for use in a TEXT property.
///
/// Backslashes are escaped first so the backslashes introduced by the
/// other substitutions are not escaped again.
pub fn escape_text(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace(';', r"\;")
        .replace(',', r"\,")
        .replace('\n', r"\n")
        .replace('\r', r"\r")
}

/// Maximum octets per content line, excluding the CRLF.
const MAX_LINE_OCTETS: usize = 75;

/// Fold a content line into CRLF-terminated physical lines of at most
/// 75 octets. Continuation lines start with a single space, and a UTF-8
/// sequence is never split.
pub fn fold_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut used = 0;

    for ch in line.chars() {
        let len = ch.len_utf8();
        if used + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            used = 1;
        }
        out.push(ch);
        used += len;
    }

    out.push_str("\r\n");
    out
}
