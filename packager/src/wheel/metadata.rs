//! Email-style header blocks used by wheel metadata files.
//!
//! METADATA, WHEEL and `entry_points.txt` share one rendering: one
//! `Name: value` line per value, a blank line, then the optional body.
//! List-valued headers repeat the header name once per value.

use crate::config::PackageConfig;
use crate::wheel::naming::WheelName;

/// Core metadata specification version written to METADATA.
pub const METADATA_VERSION: &str = "2.4";

/// Wheel format version written to WHEEL.
pub const WHEEL_VERSION: &str = "1.0";

/// The value of a metadata header.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Rendered as a single header line.
    Single(String),
    /// Rendered as one header line per value.
    List(Vec<String>),
}

/// One metadata header.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Header {
    /// Header name, e.g. `Summary`.
    pub name: String,
    /// Header value or values.
    pub value: HeaderValue,
}

impl Header {
    /// Create a single-valued header.
    #[must_use]
    pub fn single(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_owned(),
            value: HeaderValue::Single(value.into()),
        }
    }

    /// Create a list-valued header.
    #[must_use]
    pub fn list(name: &str, values: Vec<String>) -> Self {
        Self {
            name: name.to_owned(),
            value: HeaderValue::List(values),
        }
    }

    fn values(&self) -> &[String] {
        match &self.value {
            HeaderValue::Single(value) => std::slice::from_ref(value),
            HeaderValue::List(values) => values,
        }
    }
}

/// Render `headers` followed by an optional body.
///
/// Embedded newlines in values are folded onto continuation lines.
///
/// # Examples
///
/// ```
/// use dbc_wheels::wheel::metadata::{Header, render_message};
///
/// let text = render_message(
///     &[
///         Header::single("Name", "dbc"),
///         Header::list("License-File", vec!["LICENSE".into(), "NOTICE".into()]),
///     ],
///     Some("# dbc\n"),
/// );
/// assert_eq!(text, "Name: dbc\nLicense-File: LICENSE\nLicense-File: NOTICE\n\n# dbc\n");
/// ```
#[must_use]
pub fn render_message(headers: &[Header], body: Option<&str>) -> String {
    let mut out = String::new();
    for header in headers {
        for value in header.values() {
            out.push_str(&header.name);
            out.push_str(": ");
            out.push_str(&value.replace('\n', "\n        "));
            out.push('\n');
        }
    }
    out.push('\n');
    if let Some(body) = body {
        out.push_str(body);
    }
    out
}

/// Build the METADATA headers for a wheel, caller extras last.
#[must_use]
pub fn metadata_headers(config: &PackageConfig, name: &WheelName) -> Vec<Header> {
    let mut headers = vec![
        Header::single("Metadata-Version", METADATA_VERSION),
        Header::single("Name", name.name()),
        Header::single("Version", name.version()),
        Header::single("Summary", config.summary.as_str()),
        Header::single(
            "Description-Content-Type",
            config.description_content_type.as_str(),
        ),
        Header::single("License-Expression", config.license_expression.as_str()),
        Header::list("License-File", config.required_licenses.clone()),
        Header::single("Requires-Python", config.requires_python.as_str()),
    ];
    headers.extend(config.extra_metadata.iter().cloned());
    headers
}

/// Build the WHEEL headers, one `Tag` line per expanded platform.
#[must_use]
pub fn wheel_headers(name: &WheelName) -> Vec<Header> {
    vec![
        Header::single("Wheel-Version", WHEEL_VERSION),
        Header::single(
            "Generator",
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        ),
        Header::single("Root-Is-Purelib", "false"),
        Header::list("Tag", name.expanded_tags()),
    ]
}

/// Render the console-script declaration pointing at the launcher's
/// dummy entry function.
///
/// # Examples
///
/// ```
/// use dbc_wheels::wheel::metadata::entry_points;
///
/// assert_eq!(
///     entry_points("dbc", "dbc"),
///     "\n[console_scripts]\ndbc = dbc.__main__:dummy\n"
/// );
/// ```
#[must_use]
pub fn entry_points(script: &str, package: &str) -> String {
    render_message(
        &[],
        Some(&format!(
            "[console_scripts]\n{script} = {package}.__main__:dummy\n"
        )),
    )
}
