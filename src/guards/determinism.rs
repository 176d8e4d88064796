//! Determinism guard.
//!
//! Fingerprints the inputs of a run and hashes each artifact with its
//! generation timestamp masked, so two runs over the same inputs can be
//! compared byte for byte.

use crate::model::{ExceptionSpec, SymbolRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

static GENERATED_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"date = "[^"]*""#).expect("date pattern is valid"));

pub struct DeterminismGuard;

impl DeterminismGuard {
    /// SHA-256 over every spec and record, in discovery order.
    pub fn fingerprint(specs: &[ExceptionSpec], records: &[SymbolRecord]) -> String {
        let mut hasher = Sha256::new();

        for spec in specs {
            hasher.update(b"exception\0");
            hasher.update(spec.package.as_bytes());
            hasher.update(b"\0");
            hasher.update(spec.name.as_bytes());
            hasher.update(b"\0");
            hasher.update(spec.mode.to_string().as_bytes());
            hasher.update(b"\n");
        }

        for record in records {
            hasher.update(b"method\0");
            for field in [
                record.owner_package(),
                record.owner_interface(),
                record.method_name(),
                record.return_type(),
                record.exception_type_name(),
                record.component_model(),
            ] {
                hasher.update(field.as_bytes());
                hasher.update(b"\0");
            }
            for parameter in record.parameters() {
                hasher.update(parameter.type_name.as_bytes());
                hasher.update(b" ");
                hasher.update(parameter.name.as_bytes());
                hasher.update(b"\0");
            }
            hasher.update(b"\n");
        }

        format!("{:x}", hasher.finalize())
    }

    /// SHA-256 of an artifact body with the header timestamp masked.
    pub fn content_hash(body: &str) -> String {
        let masked = Self::mask_timestamp(body);
        let mut hasher = Sha256::new();
        hasher.update(masked.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn mask_timestamp(body: &str) -> String {
        GENERATED_DATE
            .replace_all(body, r#"date = "<masked>""#)
            .into_owned()
    }
}
