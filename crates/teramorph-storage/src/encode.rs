//! RFC 4180 record encoding.
//!
//! Fields containing a comma, a double quote, or a line break are wrapped
//! in double quotes with inner quotes doubled. Records end with `\n`.

/// UTF-8 byte-order mark. Spreadsheet apps use it to pick the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Append one encoded record (including the trailing newline) to `out`.
pub fn encode_record<S: AsRef<str>>(fields: &[S], out: &mut Vec<u8>) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        encode_field(field.as_ref(), out);
    }
    out.push(b'\n');
}

fn encode_field(field: &str, out: &mut Vec<u8>) {
    if !field.contains([',', '"', '\r', '\n']) {
        out.extend_from_slice(field.as_bytes());
        return;
    }

    out.push(b'"');
    for (i, part) in field.split('"').enumerate() {
        if i > 0 {
            out.extend_from_slice(b"\"\"");
        }
        out.extend_from_slice(part.as_bytes());
    }
    out.push(b'"');
}
