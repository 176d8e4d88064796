//! Implementation stub emitter.
//!
//! One `<Interface>Impl` per validated group. Each marked method throws its
//! configured exception, forwarding every declared parameter in order.

use crate::codegen::consistency::ValidatedGroup;
use crate::codegen::signature::compose;
use crate::codegen::templates::{IMPLEMENTATION, MetadataHeader, TemplateRegistry};
use crate::error::RenderError;
use crate::model::{GeneratedArtifact, qualify, same_component_model};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tera::Context;

/// When and how implementations are registered as components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSettings {
    /// Component model (case-insensitive) that triggers the annotation
    pub model_marker: String,
    /// Qualified annotation type
    pub annotation: String,
}

impl Default for ComponentSettings {
    fn default() -> Self {
        Self {
            model_marker: "spring".to_string(),
            annotation: "org.springframework.stereotype.Component".to_string(),
        }
    }
}

impl ComponentSettings {
    fn applies_to(&self, component_model: &str) -> bool {
        same_component_model(component_model, &self.model_marker)
    }

    fn simple_name(&self) -> &str {
        self.annotation
            .rsplit_once('.')
            .map_or(self.annotation.as_str(), |(_, name)| name)
    }

    fn import(&self) -> Option<&str> {
        self.annotation.contains('.').then_some(self.annotation.as_str())
    }
}

#[derive(Debug, Serialize)]
struct MethodView {
    return_type: String,
    name: String,
    decl_list: String,
    exception: String,
    arg_list: String,
}

pub struct ImplementationEmitter<'a> {
    templates: &'a TemplateRegistry,
    header: Option<&'a MetadataHeader>,
    component: &'a ComponentSettings,
}

impl<'a> ImplementationEmitter<'a> {
    pub fn new(
        templates: &'a TemplateRegistry,
        header: Option<&'a MetadataHeader>,
        component: &'a ComponentSettings,
    ) -> Self {
        Self {
            templates,
            header,
            component,
        }
    }

    pub fn render(&self, validated: &ValidatedGroup) -> Result<GeneratedArtifact, RenderError> {
        let group = validated.group();
        let package = group.package();

        let class_name = group.implementation_name();
        let component = self
            .component
            .applies_to(validated.component_model())
            .then(|| self.component.simple_name());

        // Names already bound in the compilation unit.
        let mut taken: IndexSet<&str> = IndexSet::from([group.interface(), class_name.as_str()]);
        taken.extend(component);

        // Simple names thrown by more than one package, or shadowing a taken
        // name, are thrown qualified.
        let mut packages_by_name: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        for record in group.records() {
            let (exception_package, name) = record.exception_target();
            packages_by_name
                .entry(name)
                .or_default()
                .insert(exception_package);
        }

        let mut imports: IndexSet<String> = IndexSet::new();
        let mut methods = Vec::with_capacity(group.len());
        for record in group.records() {
            let (exception_package, name) = record.exception_target();
            let ambiguous = taken.contains(name)
                || packages_by_name.get(name).is_some_and(|p| p.len() > 1);
            let exception = if ambiguous {
                qualify(exception_package, name)
            } else {
                if !exception_package.is_empty() {
                    imports.insert(qualify(exception_package, name));
                }
                name.to_string()
            };

            let signature = compose(record.parameters());
            methods.push(MethodView {
                return_type: record.return_type().to_string(),
                name: record.method_name().to_string(),
                decl_list: signature.decl_list,
                exception,
                arg_list: signature.arg_list,
            });
        }

        if let (Some(_), Some(import)) = (component, self.component.import()) {
            imports.insert(import.to_string());
        }

        let generated = self
            .header
            .map(|header| header.annotation(package))
            .unwrap_or_default();

        let mut context = Context::new();
        context.insert("package", package);
        context.insert("imports", &imports.into_iter().collect::<Vec<_>>());
        context.insert("generated", &generated);
        context.insert("component", component.unwrap_or_default());
        context.insert("class_name", &class_name);
        context.insert("interface_name", group.interface());
        context.insert("methods", &methods);

        Ok(GeneratedArtifact {
            target_package: package.to_string(),
            target_name: class_name,
            body: self.templates.render(IMPLEMENTATION, &context)?,
        })
    }
}
