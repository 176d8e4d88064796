//! Guards applied to raw declarations before a record is built.

use crate::error::MalformedInput;
use crate::model::Parameter;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static JAVA_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "null", "_",
];

/// True when `value` is a plain Java identifier and not a reserved word.
pub fn is_java_identifier(value: &str) -> bool {
    JAVA_IDENTIFIER.is_match(value) && !JAVA_KEYWORDS.contains(&value)
}

/// Rejects empty or whitespace-only values.
pub fn validate_non_empty<'a>(
    declaration: &str,
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, MalformedInput> {
    if value.trim().is_empty() {
        Err(MalformedInput::EmptyField {
            declaration: declaration.to_string(),
            field,
        })
    } else {
        Ok(value)
    }
}

/// Validates a simple (unqualified) Java identifier.
pub fn validate_identifier<'a>(
    declaration: &str,
    kind: &'static str,
    value: &'a str,
) -> Result<&'a str, MalformedInput> {
    validate_non_empty(declaration, kind, value)?;
    if is_java_identifier(value) {
        Ok(value)
    } else {
        Err(MalformedInput::InvalidName {
            declaration: declaration.to_string(),
            kind,
            value: value.to_string(),
        })
    }
}

/// Validates a package name. The empty string denotes the default package.
pub fn validate_package_name<'a>(
    declaration: &str,
    value: &'a str,
) -> Result<&'a str, MalformedInput> {
    if value.is_empty() || value.split('.').all(is_java_identifier) {
        Ok(value)
    } else {
        Err(MalformedInput::InvalidName {
            declaration: declaration.to_string(),
            kind: "package name",
            value: value.to_string(),
        })
    }
}

/// Validates a simple or dot-qualified type name such as `OrderNotFound`
/// or `com.acme.errors.OrderNotFound`.
pub fn validate_qualified_name<'a>(
    declaration: &str,
    kind: &'static str,
    value: &'a str,
) -> Result<&'a str, MalformedInput> {
    validate_non_empty(declaration, kind, value)?;
    if value.split('.').all(is_java_identifier) {
        Ok(value)
    } else {
        Err(MalformedInput::InvalidName {
            declaration: declaration.to_string(),
            kind,
            value: value.to_string(),
        })
    }
}

/// Parameter types are rendered type text (`List<? extends Foo>`, `int[]`)
/// and are only checked for presence; names must be unique identifiers.
pub fn validate_parameters(
    declaration: &str,
    parameters: &[Parameter],
) -> Result<(), MalformedInput> {
    let mut seen = HashSet::new();
    for parameter in parameters {
        validate_non_empty(declaration, "parameter type", &parameter.type_name)?;
        validate_identifier(declaration, "parameter name", &parameter.name)?;
        if !seen.insert(parameter.name.as_str()) {
            return Err(MalformedInput::DuplicateParameter {
                declaration: declaration.to_string(),
                name: parameter.name.clone(),
            });
        }
    }
    Ok(())
}
