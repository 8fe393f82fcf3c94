//! CSV assembly helpers for admin data exports.
//!
//! Exports are opened in spreadsheet tools that guess the encoding, so every
//! document starts with a UTF-8 BOM. Without it, Chinese names come out as
//! mojibake in Excel.

/// UTF-8 byte order mark, prepended to every CSV document.
pub const UTF8_BOM: char = '\u{FEFF}';

/// Escapes a single CSV field.
///
/// Fields containing commas, quotes, or line breaks are wrapped in double
/// quotes with embedded quotes doubled. Everything else passes through as-is.
pub fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Appends one row of already-stringified fields to `out`, escaping each.
pub fn write_row(out: &mut String, fields: &[String]) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        out.push_str(&escape_field(field));
        first = false;
    }
    out.push('\n');
}

/// Appends a header row of column names to `out`.
pub fn write_header(out: &mut String, columns: &[&str]) {
    out.push_str(&columns.join(","));
    out.push('\n');
}
