// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Identifier mangling for JavaScript code generation.
//!
//! Encapsulates how source-language names map onto valid JavaScript:
//!
//! - Method names become property accessors prefixed with `$`. Names made
//!   of plain word characters use dot form (`.$name`); anything carrying
//!   operator punctuation uses bracket form (`['$name=']`).
//! - Locals and parameters that collide with a JavaScript reserved word get
//!   a single `$` suffix (`let` → `let$`).
//! - Instance variables become plain properties, bracket-quoted when the
//!   bare name is reserved.
//!
//! The accessor strings returned here include their own punctuation so call
//! sites concatenate them directly after a receiver expression.

use ecow::{eco_format, EcoString};

/// JavaScript reserved words (including future reserved words) that must
/// never appear in identifier position in generated code.
pub const RESERVED: &[&str] = &[
    "break",
    "case",
    "catch",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "finally",
    "for",
    "function",
    "if",
    "in",
    "instanceof",
    "new",
    "return",
    "switch",
    "this",
    "throw",
    "try",
    "typeof",
    "var",
    "let",
    "void",
    "while",
    "with",
    "class",
    "enum",
    "export",
    "extends",
    "import",
    "super",
    "true",
    "false",
    "native",
    "const",
    "static",
];

/// Returns `true` if the name is a JavaScript reserved word.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Converts a method name to its JavaScript property accessor.
///
/// # Examples
///
/// ```
/// use opal_core::codegen::javascript::mangle::mid_to_jsid;
///
/// assert_eq!(mid_to_jsid("foo"), ".$foo");
/// assert_eq!(mid_to_jsid("=="), "['$==']");
/// assert_eq!(mid_to_jsid("name="), "['$name=']");
/// assert_eq!(mid_to_jsid("empty?"), "['$empty?']");
/// ```
#[must_use]
pub fn mid_to_jsid(name: &str) -> EcoString {
    if name
        .chars()
        .any(|c| matches!(c, '=' | '+' | '-' | '*' | '/' | '!' | '?' | '<' | '>' | '&' | '|' | '^' | '%' | '~' | '['))
    {
        eco_format!("['${name}']")
    } else {
        eco_format!(".${name}")
    }
}

/// Converts a local variable or parameter name to a safe JavaScript
/// identifier, suffixing reserved words with `$`.
#[must_use]
pub fn lvar_to_js(name: &str) -> EcoString {
    if is_reserved(name) {
        eco_format!("{name}$")
    } else {
        name.into()
    }
}

/// Converts an instance variable name (without its `@` sigil) to a
/// property accessor usable directly after a receiver.
///
/// ```
/// use opal_core::codegen::javascript::mangle::ivar_accessor;
///
/// assert_eq!(ivar_accessor("count"), ".count");
/// assert_eq!(ivar_accessor("class"), "['class']");
/// ```
#[must_use]
pub fn ivar_accessor(name: &str) -> EcoString {
    if is_reserved(name) {
        eco_format!("['{name}']")
    } else {
        eco_format!(".{name}")
    }
}

/// Renders a hash key for a JavaScript object literal.
///
/// Plain identifier names stay bare (`{a: 1}`); anything else — operator
/// characters, a leading digit, a reserved word — falls back to the
/// quoted string form.
///
/// ```
/// use opal_core::codegen::javascript::mangle::js_object_key;
///
/// assert_eq!(js_object_key("a"), "a");
/// assert_eq!(js_object_key("a-b"), "\"a-b\"");
/// assert_eq!(js_object_key("class"), "\"class\"");
/// ```
#[must_use]
pub fn js_object_key(name: &str) -> EcoString {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if valid && !is_reserved(name) {
        name.into()
    } else {
        inspect_string(name)
    }
}

/// Renders a string as a double-quoted JavaScript string literal.
///
/// Escapes backslashes, quotes, and control characters; anything else is
/// passed through unchanged so the output stays readable.
#[must_use]
pub fn inspect_string(value: &str) -> EcoString {
    let mut out = EcoString::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&eco_format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_method_names_use_dot_form() {
        assert_eq!(mid_to_jsid("foo"), ".$foo");
        assert_eq!(mid_to_jsid("foo_bar"), ".$foo_bar");
    }

    #[test]
    fn punctuated_method_names_use_bracket_form() {
        assert_eq!(mid_to_jsid("=="), "['$==']");
        assert_eq!(mid_to_jsid("[]"), "['$[]']");
        assert_eq!(mid_to_jsid("[]="), "['$[]=']");
        assert_eq!(mid_to_jsid("name="), "['$name=']");
        assert_eq!(mid_to_jsid("<=>"), "['$<=>']");
        assert_eq!(mid_to_jsid("include?"), "['$include?']");
        assert_eq!(mid_to_jsid("save!"), "['$save!']");
        assert_eq!(mid_to_jsid("=~"), "['$=~']");
    }

    #[test]
    fn reserved_locals_get_dollar_suffix() {
        assert_eq!(lvar_to_js("let"), "let$");
        assert_eq!(lvar_to_js("class"), "class$");
        assert_eq!(lvar_to_js("count"), "count");
    }

    #[test]
    fn ivar_accessors() {
        assert_eq!(ivar_accessor("name"), ".name");
        assert_eq!(ivar_accessor("new"), "['new']");
    }

    #[test]
    fn object_keys_stay_bare_when_identifiers() {
        assert_eq!(js_object_key("a"), "a");
        assert_eq!(js_object_key("foo_bar"), "foo_bar");
        assert_eq!(js_object_key("$slot"), "$slot");
        assert_eq!(js_object_key("_x9"), "_x9");
    }

    #[test]
    fn object_keys_quote_everything_else() {
        assert_eq!(js_object_key("a-b"), "\"a-b\"");
        assert_eq!(js_object_key("9lives"), "\"9lives\"");
        assert_eq!(js_object_key(""), "\"\"");
        assert_eq!(js_object_key("let"), "\"let\"");
        assert_eq!(js_object_key("key?"), "\"key?\"");
    }

    #[test]
    fn inspect_escapes() {
        assert_eq!(inspect_string("hi"), "\"hi\"");
        assert_eq!(inspect_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(inspect_string("line\n"), "\"line\\n\"");
        assert_eq!(inspect_string("back\\slash"), "\"back\\\\slash\"");
        assert_eq!(inspect_string("\u{1}"), "\"\\u0001\"");
    }
}
