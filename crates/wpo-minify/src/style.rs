//! Style sheet minification.
//!
//! Delegates to [`lightningcss`]; any failure is reported so the caller can
//! keep the unminified artifact.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

use crate::{MinifyError, Result};

/// Minifies a style sheet.
pub fn minify_style(input: &str) -> Result<String> {
    let mut style_sheet = StyleSheet::parse(input, ParserOptions::default())
        .map_err(|e| MinifyError::StyleParse(e.to_string()))?;

    style_sheet
        .minify(MinifyOptions::default())
        .map_err(|e| MinifyError::StyleMinify(e.to_string()))?;

    let printed = style_sheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| MinifyError::StylePrint(e.to_string()))?;

    Ok(printed.code)
}
