//! Discovery of marked declarations.
//!
//! The host toolchain resolves its symbol table; this crate only sees the
//! result through [`DeclarationSource`]. [`SnapshotSource`] serves a
//! resolved snapshot loaded from YAML or JSON.

use crate::error::{DiscoveryError, MalformedInput};
use crate::model::{Marker, MarkerKind, Parameter, qualify};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum::Display;

/// Kind of the declaration a marker is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ElementKind {
    Interface,
    Class,
    Enum,
    Record,
    Annotation,
    Method,
    Constructor,
    Field,
}

/// A marked declaration as resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeclaration {
    pub element: ElementKind,
    #[serde(default)]
    pub package: String,
    /// Enclosing type, for members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    pub marker: Marker,
}

impl RawDeclaration {
    /// `package.Type` for types, `package.Type#member` for members.
    pub fn display_name(&self) -> String {
        match &self.enclosing {
            Some(owner) => format!("{}#{}", qualify(&self.package, owner), self.name),
            None => qualify(&self.package, &self.name),
        }
    }

    fn is_type(&self) -> bool {
        matches!(
            self.element,
            ElementKind::Interface
                | ElementKind::Class
                | ElementKind::Enum
                | ElementKind::Record
                | ElementKind::Annotation
        )
    }
}

/// Package and enclosing type of a declaration. For a type declaration the
/// enclosing type is the type itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwningScope {
    pub package_name: String,
    pub enclosing_type_name: String,
}

/// Narrow view of the host's symbol table.
pub trait DeclarationSource {
    /// All declarations carrying a marker of `kind`, in a stable order.
    fn discover(&self, kind: MarkerKind) -> Result<Vec<RawDeclaration>, DiscoveryError>;

    /// Owning package and type of `declaration`.
    fn resolve_owning_scope(
        &self,
        declaration: &RawDeclaration,
    ) -> Result<OwningScope, MalformedInput> {
        let enclosing = if declaration.is_type() {
            Some(declaration.name.clone())
        } else {
            declaration.enclosing.clone()
        };
        match enclosing {
            Some(enclosing_type_name) if !enclosing_type_name.trim().is_empty() => {
                Ok(OwningScope {
                    package_name: declaration.package.clone(),
                    enclosing_type_name,
                })
            }
            _ => Err(MalformedInput::UnresolvedScope {
                declaration: declaration.display_name(),
            }),
        }
    }
}

/// Serialized form of a resolved symbol table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSnapshot {
    #[serde(default)]
    pub declarations: Vec<RawDeclaration>,
}

/// [`DeclarationSource`] backed by an in-memory [`MarkerSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    snapshot: MarkerSnapshot,
}

impl SnapshotSource {
    pub fn new(declarations: Vec<RawDeclaration>) -> Self {
        Self {
            snapshot: MarkerSnapshot { declarations },
        }
    }

    /// Loads a snapshot, choosing the format from the file extension.
    pub fn load(path: &Path) -> Result<Self, DiscoveryError> {
        let contents = fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|os| os.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let origin = path.display().to_string();

        let snapshot = match ext.as_str() {
            "yaml" | "yml" => parse_yaml(&contents, &origin)?,
            "json" => parse_json(&contents, &origin)?,
            _ => {
                return Err(DiscoveryError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        tracing::debug!(
            path = %origin,
            declarations = snapshot.declarations.len(),
            "loaded marker snapshot"
        );
        Ok(Self { snapshot })
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, DiscoveryError> {
        Ok(Self {
            snapshot: parse_yaml(contents, "<yaml>")?,
        })
    }

    pub fn from_json_str(contents: &str) -> Result<Self, DiscoveryError> {
        Ok(Self {
            snapshot: parse_json(contents, "<json>")?,
        })
    }

    pub fn snapshot(&self) -> &MarkerSnapshot {
        &self.snapshot
    }
}

impl DeclarationSource for SnapshotSource {
    fn discover(&self, kind: MarkerKind) -> Result<Vec<RawDeclaration>, DiscoveryError> {
        Ok(self
            .snapshot
            .declarations
            .iter()
            .filter(|declaration| declaration.marker.kind() == kind)
            .cloned()
            .collect())
    }
}

fn parse_yaml(contents: &str, origin: &str) -> Result<MarkerSnapshot, DiscoveryError> {
    if contents.trim().is_empty() {
        return Ok(MarkerSnapshot::default());
    }
    serde_yaml::from_str(contents).map_err(|err| DiscoveryError::Parse {
        origin: origin.to_string(),
        message: err.to_string(),
    })
}

fn parse_json(contents: &str, origin: &str) -> Result<MarkerSnapshot, DiscoveryError> {
    serde_json::from_str(contents).map_err(|err| DiscoveryError::Parse {
        origin: origin.to_string(),
        message: err.to_string(),
    })
}
