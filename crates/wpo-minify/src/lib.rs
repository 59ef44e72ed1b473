//! Source minification for merged artifacts.
//!
//! Scripts go through a single-pass lexical state machine that strips
//! insignificant whitespace and comments while leaving string literals,
//! regular-expression literals and `/*@ ... */` conditional comments intact.
//! Style sheets are handed to `lightningcss`.

mod error;
mod script;
mod style;

pub use error::MinifyError;
pub use script::{minify_script, minify_script_str, ScriptMinifier};
pub use style::minify_style;

use wpo_types::ResourceKind;

/// Result type for minification.
pub type Result<T> = std::result::Result<T, MinifyError>;

/// Minifies `input` as a resource of the given kind.
pub fn minify(kind: ResourceKind, input: &str) -> Result<String> {
    match kind {
        ResourceKind::Script => Ok(minify_script_str(input)),
        ResourceKind::Style => minify_style(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_dispatches_by_kind() {
        let js = minify(ResourceKind::Script, "var a = 1;  // one\n").unwrap();
        assert_eq!(js, "var a =1;");

        let css = minify(ResourceKind::Style, ".a {\n  color: red;\n}\n").unwrap();
        assert!(css.starts_with(".a{"));
    }
}
