//! # JSON-with-comments support
//!
//! Workflow files are JSON documents that may carry `//` line comments and
//! `/* ... */` block comments. Comments are blanked out in place (replaced by
//! spaces, newlines kept) so that line and column numbers reported by
//! `serde_json` still point at the original text.

/// Remove `//` and `/* */` comments from JSON text.
///
/// Comment markers inside string literals are left untouched, including
/// strings with escaped quotes.
///
/// # Example
/// ```rust
/// use asc_util::jsonc::strip_json_comments;
///
/// let text = "{\"run\": \"curl https://example.com\" // fetch\n}";
/// let value: serde_json::Value = serde_json::from_str(&strip_json_comments(text)).unwrap();
/// assert_eq!(value["run"], "curl https://example.com");
/// ```
pub fn strip_json_comments(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut output = Vec::with_capacity(bytes.len());
    let mut index = 0usize;

    while index < bytes.len() {
        let byte = bytes[index];

        if byte == b'"' {
            let end = skip_string(bytes, index);
            output.extend_from_slice(&bytes[index..end]);
            index = end;
            continue;
        }

        if byte == b'/' && index + 1 < bytes.len() {
            match bytes[index + 1] {
                b'/' => {
                    let end = skip_line_comment(bytes, index);
                    blank_out(&bytes[index..end], &mut output);
                    index = end;
                    continue;
                }
                b'*' => {
                    let end = skip_block_comment(bytes, index);
                    blank_out(&bytes[index..end], &mut output);
                    index = end;
                    continue;
                }
                _ => {}
            }
        }

        output.push(byte);
        index += 1;
    }

    // Only ASCII bytes were substituted, so the output is still valid UTF-8.
    String::from_utf8(output).unwrap_or_else(|error| String::from_utf8_lossy(error.as_bytes()).into_owned())
}

/// Returns the index just past the closing quote of the string starting at `start_index`.
fn skip_string(bytes: &[u8], start_index: usize) -> usize {
    let mut index = start_index + 1;
    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 2,
            b'"' => return index + 1,
            _ => index += 1,
        }
    }
    bytes.len()
}

/// Returns the index of the newline terminating the comment (or end of input).
fn skip_line_comment(bytes: &[u8], start_index: usize) -> usize {
    let mut index = start_index + 2;
    while index < bytes.len() && bytes[index] != b'\n' {
        index += 1;
    }
    index
}

/// Returns the index just past `*/`, or end of input for an unterminated comment.
fn skip_block_comment(bytes: &[u8], start_index: usize) -> usize {
    let mut index = start_index + 2;
    while index + 1 < bytes.len() {
        if bytes[index] == b'*' && bytes[index + 1] == b'/' {
            return index + 2;
        }
        index += 1;
    }
    bytes.len()
}

fn blank_out(comment: &[u8], output: &mut Vec<u8>) {
    output.extend(comment.iter().map(|byte| match byte {
        b'\n' | b'\r' => *byte,
        _ => b' ',
    }));
}
