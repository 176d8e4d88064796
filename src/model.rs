//! Value types flowing through the generation pipeline.
//!
//! ```text
//! RawDeclaration ─▶ SymbolRecord ─▶ Group ─▶ ValidatedGroup ─▶ GeneratedArtifact
//!        └────────▶ ExceptionSpec ───────────────────────────▶ GeneratedArtifact
//! ```

use crate::discovery::{OwningScope, RawDeclaration};
use crate::error::MalformedInput;
use crate::validation::{
    validate_identifier, validate_non_empty, validate_package_name, validate_parameters,
    validate_qualified_name,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Component model used when a method marker does not set one.
pub const DEFAULT_COMPONENT_MODEL: &str = "default";

/// Suffix appended to an interface name to name its implementation.
pub const IMPLEMENTATION_SUFFIX: &str = "Impl";

fn default_component_model() -> String {
    DEFAULT_COMPONENT_MODEL.to_string()
}

// =============================================================================
// Markers
// =============================================================================

/// Marker carried by an interface: the exception types to generate next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMarker {
    pub exception_names: Vec<String>,
    #[serde(default)]
    pub custom_parameter_order: bool,
}

/// Marker carried by an interface method: the exception its stub throws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMarker {
    pub exception_type: String,
    #[serde(default = "default_component_model")]
    pub component_model: String,
}

impl MethodMarker {
    pub fn new(exception_type: impl Into<String>) -> Self {
        Self {
            exception_type: exception_type.into(),
            component_model: default_component_model(),
        }
    }

    pub fn with_component_model(mut self, component_model: impl Into<String>) -> Self {
        self.component_model = component_model.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Marker {
    ExceptionMaker(TypeMarker),
    ExceptionRunner(MethodMarker),
}

impl Marker {
    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::ExceptionMaker(_) => MarkerKind::Type,
            Marker::ExceptionRunner(_) => MarkerKind::Method,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MarkerKind {
    Type,
    Method,
}

// =============================================================================
// Symbol records and groups
// =============================================================================

/// One declared parameter, kept as a structured `(type, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
}

impl Parameter {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

/// Resolved, immutable fact about one marked method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolRecord {
    owner_package: String,
    owner_interface: String,
    method_name: String,
    return_type: String,
    parameters: Vec<Parameter>,
    exception_type_name: String,
    component_model: String,
}

impl SymbolRecord {
    /// Builds a record from a method declaration and its resolved owner.
    pub fn from_declaration(
        declaration: &RawDeclaration,
        scope: &OwningScope,
        marker: &MethodMarker,
    ) -> Result<Self, MalformedInput> {
        let display = declaration.display_name();
        validate_package_name(&display, &scope.package_name)?;
        validate_identifier(&display, "interface name", &scope.enclosing_type_name)?;
        validate_identifier(&display, "method name", &declaration.name)?;
        let return_type = declaration.return_type.as_deref().unwrap_or_default();
        validate_non_empty(&display, "return type", return_type)?;
        validate_parameters(&display, &declaration.parameters)?;
        validate_qualified_name(&display, "exception type", &marker.exception_type)?;

        let component_model = if marker.component_model.trim().is_empty() {
            default_component_model()
        } else {
            marker.component_model.trim().to_string()
        };

        Ok(Self {
            owner_package: scope.package_name.clone(),
            owner_interface: scope.enclosing_type_name.clone(),
            method_name: declaration.name.clone(),
            return_type: return_type.trim().to_string(),
            parameters: declaration.parameters.clone(),
            exception_type_name: marker.exception_type.clone(),
            component_model,
        })
    }

    pub fn owner_package(&self) -> &str {
        &self.owner_package
    }

    pub fn owner_interface(&self) -> &str {
        &self.owner_interface
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn exception_type_name(&self) -> &str {
        &self.exception_type_name
    }

    pub fn component_model(&self) -> &str {
        &self.component_model
    }

    /// Package and simple name of the thrown exception. Simple names resolve
    /// against the owning package.
    pub fn exception_target(&self) -> (&str, &str) {
        match self.exception_type_name.rsplit_once('.') {
            Some((package, name)) => (package, name),
            None => (self.owner_package.as_str(), self.exception_type_name.as_str()),
        }
    }

    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            package: self.owner_package.clone(),
            interface: self.owner_interface.clone(),
        }
    }
}

/// Partition key of the grouper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    pub package: String,
    pub interface: String,
}

impl GroupKey {
    pub fn qualified_interface(&self) -> String {
        qualify(&self.package, &self.interface)
    }
}

/// All records sharing one `(package, interface)`. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    key: GroupKey,
    records: Vec<SymbolRecord>,
}

impl Group {
    /// Only the grouper creates groups; it never produces an empty one.
    pub(crate) fn new(key: GroupKey, records: Vec<SymbolRecord>) -> Self {
        debug_assert!(!records.is_empty(), "groups are never empty");
        debug_assert!(records.iter().all(|r| r.group_key() == key));
        Self { key, records }
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn package(&self) -> &str {
        &self.key.package
    }

    pub fn interface(&self) -> &str {
        &self.key.interface
    }

    pub fn records(&self) -> &[SymbolRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Simple name of the implementation artifact.
    pub fn implementation_name(&self) -> String {
        format!("{}{}", self.key.interface, IMPLEMENTATION_SUFFIX)
    }
}

// =============================================================================
// Exception specs
// =============================================================================

/// Parameter shape of a generated exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExceptionMode {
    /// `(message)` and `(message, Object[] params)` constructors
    Standard,
    /// One `(Object... params)` constructor
    Variadic,
}

impl ExceptionMode {
    pub fn from_custom_parameter_order(custom: bool) -> Self {
        if custom {
            ExceptionMode::Variadic
        } else {
            ExceptionMode::Standard
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionSpec {
    pub name: String,
    pub mode: ExceptionMode,
    /// Package of the interface that declared it; also the target package.
    pub package: String,
    /// Interface that declared it, for diagnostics.
    pub origin_interface: String,
}

impl ExceptionSpec {
    /// Expands an interface marker into one spec per exception name.
    pub fn from_marker(
        declaration: &RawDeclaration,
        scope: &OwningScope,
        marker: &TypeMarker,
    ) -> Result<Vec<Self>, MalformedInput> {
        let display = declaration.display_name();
        validate_package_name(&display, &scope.package_name)?;
        validate_identifier(&display, "interface name", &scope.enclosing_type_name)?;
        if marker.exception_names.is_empty() {
            return Err(MalformedInput::EmptyField {
                declaration: display,
                field: "exception_names",
            });
        }

        let mode = ExceptionMode::from_custom_parameter_order(marker.custom_parameter_order);
        marker
            .exception_names
            .iter()
            .map(|name| -> Result<Self, MalformedInput> {
                validate_identifier(&display, "exception name", name)?;
                Ok(Self {
                    name: name.clone(),
                    mode,
                    package: scope.package_name.clone(),
                    origin_interface: scope.enclosing_type_name.clone(),
                })
            })
            .collect()
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.package, &self.name)
    }
}

/// Every exception spec discovered in a run, keyed by `(package, name)`.
/// The first declaration of a name wins.
#[derive(Debug, Clone, Default)]
pub struct ExceptionCatalog {
    modes: IndexMap<(String, String), ExceptionMode>,
}

impl ExceptionCatalog {
    pub fn from_specs<'a>(specs: impl IntoIterator<Item = &'a ExceptionSpec>) -> Self {
        let mut modes = IndexMap::new();
        for spec in specs {
            modes
                .entry((spec.package.clone(), spec.name.clone()))
                .or_insert(spec.mode);
        }
        Self { modes }
    }

    pub fn mode_of(&self, package: &str, name: &str) -> Option<ExceptionMode> {
        self.modes
            .get(&(package.to_string(), name.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

// =============================================================================
// Generated artifacts
// =============================================================================

/// One generated compilation unit and where it goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub target_package: String,
    pub target_name: String,
    pub body: String,
}

impl GeneratedArtifact {
    pub fn qualified_name(&self) -> String {
        qualify(&self.target_package, &self.target_name)
    }
}

/// `package.Name`, or just `Name` in the default package.
/// Component models compare case-insensitively, with full Unicode folding.
pub fn same_component_model(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::ElementKind;
    use assert_matches::assert_matches;

    fn method(name: &str, params: Vec<Parameter>) -> RawDeclaration {
        RawDeclaration {
            element: ElementKind::Method,
            package: "billing".into(),
            enclosing: Some("Orders".into()),
            name: name.into(),
            return_type: Some("Order".into()),
            parameters: params,
            marker: Marker::ExceptionRunner(MethodMarker::new("OrderNotFound")),
        }
    }

    fn scope() -> OwningScope {
        OwningScope {
            package_name: "billing".into(),
            enclosing_type_name: "Orders".into(),
        }
    }

    #[test]
    fn record_keeps_declared_data() {
        let decl = method("find", vec![Parameter::new("String", "id")]);
        let marker = MethodMarker::new("OrderNotFound").with_component_model("spring");
        let record = SymbolRecord::from_declaration(&decl, &scope(), &marker).unwrap();

        assert_eq!(record.owner_package(), "billing");
        assert_eq!(record.owner_interface(), "Orders");
        assert_eq!(record.method_name(), "find");
        assert_eq!(record.return_type(), "Order");
        assert_eq!(record.parameters(), &[Parameter::new("String", "id")]);
        assert_eq!(record.component_model(), "spring");
        assert_eq!(record.exception_target(), ("billing", "OrderNotFound"));
    }

    #[test]
    fn blank_component_model_falls_back_to_default() {
        let decl = method("find", vec![]);
        let marker = MethodMarker::new("OrderNotFound").with_component_model("  ");
        let record = SymbolRecord::from_declaration(&decl, &scope(), &marker).unwrap();
        assert_eq!(record.component_model(), DEFAULT_COMPONENT_MODEL);
    }

    #[test]
    fn qualified_exception_resolves_its_own_package() {
        let decl = method("find", vec![]);
        let marker = MethodMarker::new("com.acme.errors.Missing");
        let record = SymbolRecord::from_declaration(&decl, &scope(), &marker).unwrap();
        assert_eq!(record.exception_target(), ("com.acme.errors", "Missing"));
    }

    #[test]
    fn record_requires_return_type() {
        let mut decl = method("find", vec![]);
        decl.return_type = None;
        let marker = MethodMarker::new("OrderNotFound");
        assert_matches!(
            SymbolRecord::from_declaration(&decl, &scope(), &marker),
            Err(MalformedInput::EmptyField { field: "return type", .. })
        );
    }

    #[test]
    fn type_marker_expands_into_specs() {
        let decl = RawDeclaration {
            element: ElementKind::Interface,
            package: "billing".into(),
            enclosing: None,
            name: "Orders".into(),
            return_type: None,
            parameters: vec![],
            marker: Marker::ExceptionMaker(TypeMarker {
                exception_names: vec!["OrderNotFound".into(), "OrderLocked".into()],
                custom_parameter_order: true,
            }),
        };
        let Marker::ExceptionMaker(marker) = &decl.marker else {
            unreachable!()
        };
        let specs = ExceptionSpec::from_marker(&decl, &scope(), marker).unwrap();
        assert_eq!(specs.len(), 2);
        assert!(specs.iter().all(|s| s.mode == ExceptionMode::Variadic));
        assert_eq!(specs[1].qualified_name(), "billing.OrderLocked");
    }

    #[test]
    fn empty_exception_list_is_malformed() {
        let decl = RawDeclaration {
            element: ElementKind::Interface,
            package: "billing".into(),
            enclosing: None,
            name: "Orders".into(),
            return_type: None,
            parameters: vec![],
            marker: Marker::ExceptionMaker(TypeMarker {
                exception_names: vec![],
                custom_parameter_order: false,
            }),
        };
        let marker = TypeMarker {
            exception_names: vec![],
            custom_parameter_order: false,
        };
        assert_matches!(
            ExceptionSpec::from_marker(&decl, &scope(), &marker),
            Err(MalformedInput::EmptyField { field: "exception_names", .. })
        );
    }

    #[test]
    fn catalog_keeps_first_declaration() {
        let first = ExceptionSpec {
            name: "Missing".into(),
            mode: ExceptionMode::Standard,
            package: "billing".into(),
            origin_interface: "Orders".into(),
        };
        let second = ExceptionSpec {
            mode: ExceptionMode::Variadic,
            origin_interface: "Invoices".into(),
            ..first.clone()
        };
        let catalog = ExceptionCatalog::from_specs([&first, &second]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.mode_of("billing", "Missing"),
            Some(ExceptionMode::Standard)
        );
        assert_eq!(catalog.mode_of("other", "Missing"), None);
    }

    #[test]
    fn marker_snapshot_shape() {
        let yaml = "type: exception_runner\nexception_type: OrderNotFound\n";
        let marker: Marker = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(marker.kind(), MarkerKind::Method);
        assert_matches!(
            marker,
            Marker::ExceptionRunner(MethodMarker { component_model, .. }) if component_model == "default"
        );
    }

    #[test]
    fn component_models_compare_without_case() {
        assert!(same_component_model("spring", "SPRING"));
        assert!(same_component_model("Frühling", "FRÜHLING"));
        assert!(!same_component_model("spring", "default"));
    }

    #[test]
    fn default_package_is_unqualified() {
        assert_eq!(qualify("", "Orders"), "Orders");
        assert_eq!(qualify("billing", "Orders"), "billing.Orders");
    }
}
