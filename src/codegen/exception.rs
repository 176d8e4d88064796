//! Exception type emitter.

use crate::codegen::templates::{
    MetadataHeader, STANDARD_EXCEPTION, TemplateRegistry, VARIADIC_EXCEPTION,
};
use crate::error::RenderError;
use crate::model::{ExceptionMode, ExceptionSpec, GeneratedArtifact};
use tera::Context;

pub struct ExceptionTypeEmitter<'a> {
    templates: &'a TemplateRegistry,
    header: Option<&'a MetadataHeader>,
}

impl<'a> ExceptionTypeEmitter<'a> {
    pub fn new(templates: &'a TemplateRegistry, header: Option<&'a MetadataHeader>) -> Self {
        Self { templates, header }
    }

    /// Renders `spec` as a compilation unit in `target_package`.
    ///
    /// Only Standard exceptions carry the metadata header.
    pub fn render(
        &self,
        spec: &ExceptionSpec,
        target_package: &str,
    ) -> Result<GeneratedArtifact, RenderError> {
        let mut context = Context::new();
        context.insert("package", target_package);
        context.insert("name", &spec.name);

        let template = match spec.mode {
            ExceptionMode::Standard => {
                let generated = self
                    .header
                    .map(|header| header.annotation(&spec.package))
                    .unwrap_or_default();
                context.insert("generated", &generated);
                STANDARD_EXCEPTION
            }
            ExceptionMode::Variadic => VARIADIC_EXCEPTION,
        };

        Ok(GeneratedArtifact {
            target_package: target_package.to_string(),
            target_name: spec.name.clone(),
            body: self.templates.render(template, &context)?,
        })
    }
}
