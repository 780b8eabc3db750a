//! Positions of `<script>` start tags in HTML text
//!
//! kuchiki does not record source locations, so script positions are
//! recovered with a light scan of the text. The scan understands comments,
//! quoted attribute values and raw-text element bodies, which is enough to
//! find every script start tag the parser would see, in order.

/// Line (1-based) and column (0-based, UTF-16 units) of a text position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub line: u32,
    pub column: u32,
}

/// Elements whose body is raw text up to the matching end tag
const RAW_TEXT_ELEMENTS: [&str; 9] = [
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes", "noscript",
];

/// Position just after the `>` of every `<script>` start tag, in source order
#[must_use]
pub fn script_content_starts(html: &str) -> Vec<TextPosition> {
    let mut offsets = Vec::new();
    let bytes = html.as_bytes();
    let mut i = 0;

    while let Some(found) = html[i..].find('<') {
        i += found;
        let rest = &html[i..];

        if rest.starts_with("<!--") {
            i = match rest[4..].find("-->") {
                Some(end) => i + 4 + end + 3,
                None => html.len(),
            };
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") || rest.starts_with("</") {
            i = match rest.find('>') {
                Some(end) => i + end + 1,
                None => html.len(),
            };
            continue;
        }

        let name_len = rest[1..]
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
            .count();
        if name_len == 0 || !bytes[i + 1].is_ascii_alphabetic() {
            i += 1;
            continue;
        }
        let name = rest[1..=name_len].to_ascii_lowercase();

        let tag_end = find_tag_end(html, i + 1 + name_len);

        if name == "script" {
            offsets.push(tag_end);
        }

        // A trailing `/` does not close raw-text elements in HTML.
        i = if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            find_end_tag(html, tag_end, &name)
        } else {
            tag_end
        };
        if i >= html.len() {
            break;
        }
    }

    offsets
        .into_iter()
        .map(|offset| position_at(html, offset))
        .collect()
}

/// Byte offset just past the `>` closing a start tag, honouring quoted values
fn find_tag_end(html: &str, from: usize) -> usize {
    let bytes = html.as_bytes();
    let mut j = from;
    while j < bytes.len() {
        match bytes[j] {
            quote @ (b'"' | b'\'') if is_after_equals(bytes, j) => {
                j = match html[j + 1..].find(quote as char) {
                    Some(end) => j + 1 + end + 1,
                    None => bytes.len(),
                };
                continue;
            }
            b'>' => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

/// True if the quote at `j` opens an attribute value (`=` then optional spaces)
fn is_after_equals(bytes: &[u8], j: usize) -> bool {
    let mut k = j;
    while k > 0 {
        k -= 1;
        match bytes[k] {
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => continue,
            b'=' => return true,
            _ => return false,
        }
    }
    false
}

/// Byte offset of the `</name` that closes a raw-text element body
fn find_end_tag(html: &str, from: usize, name: &str) -> usize {
    let lowered = html[from..].to_ascii_lowercase();
    let needle = format!("</{name}");
    match lowered.find(&needle) {
        Some(end) => from + end,
        None => html.len(),
    }
}

/// Line/column of a byte offset; `\r\n`, `\r` and `\n` each end a line
#[must_use]
pub fn position_at(text: &str, offset: usize) -> TextPosition {
    let mut line = 1;
    let mut column = 0;
    let mut chars = text[..offset].chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                column = 0;
            }
            '\n' => {
                line += 1;
                column = 0;
            }
            other => column += other.len_utf16() as u32,
        }
    }
    TextPosition { line, column }
}
