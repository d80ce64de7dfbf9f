//! Validation and formatting of emitted tokens.

use std::io::Write;
use std::process::{Command, Stdio};

use proc_macro2::TokenStream;
use tracing::debug;

use crate::error::{CodegenError, Result};

/// First line of every generated file. Used to recognize files this tool
/// wrote when cleaning an output directory.
pub const GENERATED_MARKER: &str = "// @generated by datatier";

/// Parses `tokens` as a Rust file and renders it as source text.
///
/// With `format` set the text is piped through `rustfmt`; if `rustfmt` is
/// missing or fails, the unformatted token text is used instead. The header
/// line is prepended in both cases.
///
/// # Errors
///
/// Returns [`CodegenError::InvalidSource`] if the tokens are not a valid
/// Rust source file.
pub fn render_source(tokens: TokenStream, file_name: &str, header: &str, format: bool) -> Result<String> {
    syn::parse2::<syn::File>(tokens.clone()).map_err(|e| CodegenError::InvalidSource {
        file: file_name.to_string(),
        message: e.to_string(),
    })?;

    let text = tokens.to_string();
    let body = if format {
        rustfmt(&text).unwrap_or(text)
    } else {
        text
    };
    Ok(format!("{header}\n\n{}\n", body.trim_end()))
}

fn rustfmt(code: &str) -> Option<String> {
    let mut child = match Command::new("rustfmt")
        .args(["--edition", "2024", "--emit", "stdout"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            debug!(error = %e, "rustfmt unavailable, keeping unformatted source");
            return None;
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(code.as_bytes()) {
            debug!(error = %e, "failed to write to rustfmt");
            return None;
        }
    }

    let output = child.wait_with_output().ok()?;
    if !output.status.success() {
        debug!(
            stderr = %String::from_utf8_lossy(&output.stderr),
            "rustfmt failed, keeping unformatted source"
        );
        return None;
    }
    String::from_utf8(output.stdout).ok()
}
