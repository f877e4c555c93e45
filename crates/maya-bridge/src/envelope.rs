//! Execution envelope for the remote Python interpreter
//!
//! The envelope is the Python program actually sent to Maya. The caller's
//! fragment travels as a string literal and is compiled and run against the
//! session's globals, exactly like code typed into the Script Editor: star
//! imports and `global` statements work, and definitions persist between
//! calls. Only the capture state (output buffer, exception, helpers) lives in
//! a generated function. The program prints a single line:
//!
//! ```text
//! MCP_JSON_START:{"stdout": "...", "result": ...}:MCP_JSON_END
//! ```
//!
//! Lifecycle on the remote side: the undo chunk opens, the out-variable is
//! seeded with `None`, stdout is redirected into a fresh buffer, the fragment
//! runs, any exception (syntax errors included) is appended to the buffer
//! behind the error marker, the undo chunk closes in a `finally`, the
//! out-variable is popped from the globals, and the result envelope is
//! printed exactly once.

use crate::framing::SENTINEL_STEM;
use maya_bridge_core::{BridgeError, Result};

/// [`SENTINEL_STEM`] with its trailing underscore spelled as a `\u005f`
/// escape. Python string literals and JSON both decode it back to the stem.
const ESCAPED_STEM: &str = "MCP_JSON\\u005f";

/// Names the envelope itself relies on in the session globals; an
/// out-variable must not shadow them.
const RESERVED_NAMES: &[&str] = &["_bridge_call", "_bridge_emit", "cmds"];

/// Knobs for the generated envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeOptions {
    /// Statement(s) that bind `cmds` in the remote interpreter
    pub host_import: String,
    /// Wrap the fragment in `cmds.undoInfo(openChunk/closeChunk)`
    pub undo_chunk: bool,
    /// Variable a fragment assigns to return structured data
    pub result_variable: String,
    /// Prefix written to stdout when the fragment raises
    pub error_marker: String,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self {
            host_import: "import maya.cmds as cmds".to_string(),
            undo_chunk: true,
            // Existing tool fragments assign this name
            result_variable: "_mcp_results".to_string(),
            error_marker: "REMOTE_ERROR:".to_string(),
        }
    }
}

impl EnvelopeOptions {
    /// Options without the undo chunk (read-only queries)
    pub fn without_undo() -> Self {
        Self {
            undo_chunk: false,
            ..Default::default()
        }
    }

    /// Reject an out-variable that is not a plain identifier
    pub fn validate(&self) -> Result<()> {
        let name = self.result_variable.as_str();
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first == '_' || first.is_ascii_alphabetic())
                    && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
            }
            None => false,
        };

        if !valid {
            return Err(BridgeError::ConfigError(format!(
                "result variable {:?} is not a Python identifier",
                name
            )));
        }
        if RESERVED_NAMES.contains(&name) {
            return Err(BridgeError::ConfigError(format!(
                "result variable {:?} collides with an envelope name",
                name
            )));
        }

        Ok(())
    }
}

/// Strip the indentation shared by every non-blank line and drop blank lines
/// at both ends.
///
/// Whitespace-only lines become empty and do not take part in the margin, so
/// an indented multi-line literal pasted from Rust source comes out flush left.
pub fn normalize_fragment(code: &str) -> String {
    let margin = code
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .reduce(common_prefix)
        .unwrap_or("");

    let mut lines: Vec<&str> = code
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                &line[margin.len()..]
            }
        })
        .collect();

    while lines.first().is_some_and(|line| line.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

fn leading_whitespace(line: &str) -> &str {
    let rest = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - rest.len()]
}

fn common_prefix<'a>(a: &'a str, b: &'a str) -> &'a str {
    let shared = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..shared]
}

/// Render `s` as a Python string literal.
///
/// JSON string escapes are a subset of Python's, so the JSON encoding is a
/// valid literal that evaluates back to `s`. Use it when interpolating
/// caller-supplied values into fragments.
pub fn quote_python_str(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// Forward-slash a Windows path for Maya commands
pub fn to_host_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Build the full program for one fragment
pub fn render(fragment: &str, options: &EnvelopeOptions) -> String {
    // Neither the fragment literal nor the scaffolding spells out the stem
    // next to a sentinel, so an interpreter echoing this request never shows
    // a complete sentinel. Inside the literal the escape decodes back.
    let source = quote_python_str(&normalize_fragment(fragment))
        .replace(SENTINEL_STEM, ESCAPED_STEM);
    let var = quote_python_str(&options.result_variable);
    let marker = quote_python_str(&options.error_marker);
    let stem = quote_python_str(SENTINEL_STEM);
    let escaped_stem = quote_python_str(ESCAPED_STEM);

    let mut lines: Vec<String> = Vec::with_capacity(32);
    lines.push(options.host_import.clone());

    lines.push("def _bridge_call(_bridge_source, _bridge_var):".to_string());
    lines.push("    import contextlib, io, traceback".to_string());
    lines.push("    _bridge_scope = globals()".to_string());
    if options.undo_chunk {
        lines.push("    cmds.undoInfo(openChunk=True)".to_string());
    }
    lines.push("    _bridge_output = io.StringIO()".to_string());
    lines.push("    _bridge_scope[_bridge_var] = None".to_string());
    lines.push("    try:".to_string());
    lines.push("        with contextlib.redirect_stdout(_bridge_output):".to_string());
    lines.push(
        "            exec(compile(_bridge_source, '<fragment>', 'exec'), _bridge_scope)"
            .to_string(),
    );
    lines.push("    except Exception as _bridge_exc:".to_string());
    lines.push(format!(
        "        _bridge_output.write({} + ' {{}}\\n{{}}'.format(_bridge_exc, traceback.format_exc()))",
        marker
    ));
    if options.undo_chunk {
        lines.push("    finally:".to_string());
        lines.push("        cmds.undoInfo(closeChunk=True)".to_string());
    }
    lines.push(
        "    return {'stdout': _bridge_output.getvalue(), 'result': _bridge_scope.pop(_bridge_var, None)}"
            .to_string(),
    );

    lines.push("def _bridge_emit(final):".to_string());
    lines.push("    import json".to_string());
    lines.push("    try:".to_string());
    lines.push("        payload = json.dumps(final, default=str)".to_string());
    lines.push("    except Exception as exc:".to_string());
    lines.push(format!(
        "        final = {{'stdout': final['stdout'] + {} + ' result is not serializable: {{}}\\n'.format(exc), 'result': None}}",
        marker
    ));
    lines.push("        payload = json.dumps(final, default=str)".to_string());
    lines.push(format!("    stem = {}", stem));
    lines.push(format!("    payload = payload.replace(stem, {})", escaped_stem));
    lines.push("    print(stem + 'START:' + payload + ':' + stem + 'END')".to_string());

    lines.push(format!("_bridge_emit(_bridge_call({}, {}))", source, var));
    lines.push("del _bridge_call, _bridge_emit".to_string());

    lines.join("\n") + "\n"
}
