//! Input validation for marker snapshots.
//!
//! Every check returns [`MalformedInput`](crate::error::MalformedInput) naming
//! the offending declaration, so the driver can skip exactly that record.

pub mod input_guards;

pub use input_guards::{
    is_java_identifier, validate_identifier, validate_non_empty, validate_package_name,
    validate_parameters, validate_qualified_name,
};
