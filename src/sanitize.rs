#![deny(missing_docs)]

//! # Identifier Sanitizer
//!
//! Pure mapping of raw API names to valid, collision-free C# identifiers.
//!
//! Sanitization is deterministic and idempotent: sanitizing an already-valid
//! identifier is a no-op, and `sanitize(sanitize(x)) == sanitize(x)` for all
//! inputs. Reserved words are escaped rather than rejected; escaping is
//! role-aware because C# offers the `@` verbatim prefix for any identifier
//! position but a trailing underscore reads better on methods and types.

/// The identifier position being sanitized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierRole {
    /// A method parameter (escaped with the `@` verbatim prefix).
    Parameter,
    /// A client method name (escaped with a trailing underscore).
    Method,
    /// A type name (escaped with a trailing underscore).
    Type,
}

/// C# reserved keywords (C# 12). Contextual keywords (`async`, `var`, ...)
/// are legal identifiers and deliberately absent.
const RESERVED: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked", "class",
    "const", "continue", "decimal", "default", "delegate", "do", "double", "else", "enum", "event",
    "explicit", "extern", "false", "finally", "fixed", "float", "for", "foreach", "goto", "if",
    "implicit", "in", "int", "interface", "internal", "is", "lock", "long", "namespace", "new",
    "null", "object", "operator", "out", "override", "params", "private", "protected", "public",
    "readonly", "ref", "return", "sbyte", "sealed", "short", "sizeof", "stackalloc", "static",
    "string", "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong",
    "unchecked", "unsafe", "ushort", "using", "virtual", "void", "volatile", "while",
];

/// Sanitizes a raw name into a valid C# identifier for the given role.
///
/// Rules, applied in order:
/// 1. Empty input maps to a role placeholder.
/// 2. A leading `@` (a previously escaped identifier) is preserved and the
///    remainder is only character-normalized, keeping the function idempotent.
/// 3. Characters outside `[A-Za-z0-9_]` become `_`; a leading digit gains a
///    `_` prefix.
/// 4. Exact reserved-word matches are escaped: parameters get the `@` prefix,
///    methods and types a trailing `_`.
pub fn sanitize(raw: &str, role: IdentifierRole) -> String {
    if raw.is_empty() {
        return placeholder(role).to_string();
    }

    let (verbatim, body) = match raw.strip_prefix('@') {
        Some(rest) if !rest.is_empty() => (true, rest),
        _ => (false, raw),
    };

    let mut cleaned = String::with_capacity(body.len());
    for c in body.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            cleaned.push(c);
        } else {
            cleaned.push('_');
        }
    }

    if cleaned.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        cleaned.insert(0, '_');
    }

    if verbatim {
        // Already escaped; the @ prefix neutralizes reserved words.
        return format!("@{}", cleaned);
    }

    if RESERVED.contains(&cleaned.as_str()) {
        return match role {
            IdentifierRole::Parameter => format!("@{}", cleaned),
            IdentifierRole::Method | IdentifierRole::Type => format!("{}_", cleaned),
        };
    }

    cleaned
}

fn placeholder(role: IdentifierRole) -> &'static str {
    match role {
        IdentifierRole::Parameter => "parameter",
        IdentifierRole::Method => "Method",
        IdentifierRole::Type => "Type",
    }
}
