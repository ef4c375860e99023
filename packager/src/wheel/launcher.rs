//! The generated `__main__.py` that hands control to the bundled binary.
//!
//! Importing the module runs the binary with the interpreter's arguments.
//! POSIX platforms replace the interpreter process; Windows has no
//! equivalent of `execv` that preserves the console, so the launcher waits
//! on a child process and exits with its status. The strategy is fixed when
//! the wheel is generated, from its platform tag.

use crate::platform::PlatformTag;

/// How the launcher transfers control to the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherStrategy {
    /// Replace the Python process with the binary.
    Exec,
    /// Run the binary as a child and forward its exit status.
    Subprocess,
}

impl LauncherStrategy {
    /// Choose the strategy for wheels tagged `tag`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbc_wheels::platform::PlatformTag;
    /// use dbc_wheels::wheel::launcher::LauncherStrategy;
    ///
    /// assert_eq!(
    ///     LauncherStrategy::for_platform(&PlatformTag::new("win_arm64")),
    ///     LauncherStrategy::Subprocess
    /// );
    /// assert_eq!(
    ///     LauncherStrategy::for_platform(&PlatformTag::new("macosx_12_0_arm64")),
    ///     LauncherStrategy::Exec
    /// );
    /// ```
    #[must_use]
    pub fn for_platform(tag: &PlatformTag) -> Self {
        if tag.is_windows() {
            Self::Subprocess
        } else {
            Self::Exec
        }
    }
}

/// Name of the no-op function the console script points at.
pub const ENTRY_FUNCTION: &str = "dummy";

/// Render the launcher for a binary stored next to it as `binary`.
///
/// The binary path is embedded as an escaped Python string literal, so
/// the returned source is always ASCII.
#[must_use]
pub fn render_launcher(binary: &str, strategy: LauncherStrategy) -> String {
    let literal = python_string_literal(binary);
    let mut source = String::new();
    match strategy {
        LauncherStrategy::Exec => {
            source.push_str("import os\nimport sys\n\n");
            push_argv(&mut source, &literal);
            source.push_str("os.execv(argv[0], argv)\n");
        }
        LauncherStrategy::Subprocess => {
            source.push_str("import os\nimport subprocess\nimport sys\n\n");
            push_argv(&mut source, &literal);
            source.push_str("sys.exit(subprocess.call(argv))\n");
        }
    }
    source.push_str("\n\n");
    source.push_str(&format!("def {ENTRY_FUNCTION}():\n"));
    source.push_str("    \"\"\"Console-script target; the binary runs when this module is imported.\"\"\"\n");
    source
}

fn push_argv(source: &mut String, literal: &str) {
    source.push_str(&format!(
        "argv = [os.path.join(os.path.dirname(os.path.abspath(__file__)), {literal}), *sys.argv[1:]]\n"
    ));
}

/// Quote `value` as a double-quoted Python string literal using only ASCII.
///
/// # Examples
///
/// ```
/// use dbc_wheels::wheel::launcher::python_string_literal;
///
/// assert_eq!(python_string_literal("dbc.exe"), "\"dbc.exe\"");
/// assert_eq!(python_string_literal("a\"b\\c"), "\"a\\\"b\\\\c\"");
/// assert_eq!(python_string_literal("é"), "\"\\u00e9\"");
/// ```
#[must_use]
pub fn python_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' '..='~' => out.push(c),
            c if u32::from(c) <= 0xFFFF => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => {
                out.push_str(&format!("\\U{:08x}", u32::from(c)));
            }
        }
    }
    out.push('"');
    out
}
