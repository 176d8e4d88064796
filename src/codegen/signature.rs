//! Parameter list composition.
//!
//! Works on structured `(type, name)` pairs only. Rendered text is never
//! split back into types and names, so types such as `Map<String, ? extends Foo>`
//! survive intact.

use crate::model::Parameter;
use serde::Serialize;

/// Separator between entries of both lists.
pub const SEPARATOR: &str = ",";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComposedSignature {
    /// `type name` pairs, in declared order
    pub decl_list: String,
    /// Parameter names, in declared order
    pub arg_list: String,
}

/// Composes the declaration and forwarding lists of a method.
///
/// Zero parameters yields two empty strings.
pub fn compose(parameters: &[Parameter]) -> ComposedSignature {
    let decl_list = parameters
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    let arg_list = parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(SEPARATOR);

    ComposedSignature {
        decl_list,
        arg_list,
    }
}
