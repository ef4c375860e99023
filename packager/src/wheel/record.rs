//! The RECORD index written as the last member of every wheel.
//!
//! Each line is `path,sha256=<urlsafe base64, unpadded>,<size>`. RECORD
//! lists itself with empty hash and size fields.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Return the RECORD hash field for `data`.
///
/// # Examples
///
/// ```
/// use dbc_wheels::wheel::record::record_hash;
///
/// assert_eq!(
///     record_hash(b""),
///     "sha256=47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU"
/// );
/// ```
#[must_use]
pub fn record_hash(data: &[u8]) -> String {
    format!("sha256={}", URL_SAFE_NO_PAD.encode(Sha256::digest(data)))
}

/// Render RECORD for `entries`, ending with the self-reference at
/// `record_path`.
#[must_use]
pub fn render_record<'a, I>(entries: I, record_path: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut out = String::new();
    for (path, data) in entries {
        out.push_str(&csv_field(path));
        out.push(',');
        out.push_str(&record_hash(data));
        out.push(',');
        out.push_str(&data.len().to_string());
        out.push('\n');
    }
    out.push_str(&csv_field(record_path));
    out.push_str(",,\n");
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
