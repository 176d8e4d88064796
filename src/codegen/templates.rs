//! Built-in Tera templates shared by both emitters.
//!
//! Templates are compiled once per run. Every rendered body ends with exactly
//! one newline.

use crate::error::RenderError;
use chrono::{Local, NaiveDateTime};
use tera::{Context, Tera};

pub const STANDARD_EXCEPTION: &str = "exception_standard.java";
pub const VARIADIC_EXCEPTION: &str = "exception_variadic.java";
pub const IMPLEMENTATION: &str = "implementation.java";

/// Name written into the metadata header.
pub const GENERATOR_NAME: &str = "throwgen";

/// Seconds precision, day first.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const STANDARD_EXCEPTION_TEMPLATE: &str = r#"{% if package %}package {{ package }};

{% endif %}{% if generated %}{{ generated }}
{% endif %}public class {{ name }} extends RuntimeException {

    private final Object[] params;

    public {{ name }}(String message) {
        super(message);
        this.params = null;
    }

    public {{ name }}(String message, Object[] params) {
        super(message);
        this.params = params;
    }

    public Object[] getParams() {
        return params;
    }
}
"#;

const VARIADIC_EXCEPTION_TEMPLATE: &str = r#"{% if package %}package {{ package }};

{% endif %}public class {{ name }} extends RuntimeException {

    private final Object[] params;

    public {{ name }}(Object... params) {
        this.params = params;
    }

    public Object[] getParams() {
        return params;
    }
}
"#;

const IMPLEMENTATION_TEMPLATE: &str = r#"{% if package %}package {{ package }};

{% endif %}{% for entry in imports %}import {{ entry }};
{% endfor %}{% if imports %}
{% endif %}{% if generated %}{{ generated }}
{% endif %}{% if component %}@{{ component }}
{% endif %}public class {{ class_name }} implements {{ interface_name }} {
{% for method in methods %}
    @Override
    public {{ method.return_type }} {{ method.name }}({{ method.decl_list }}) {
        throw new {{ method.exception }}({{ method.arg_list }});
    }
{% endfor %}
}
"#;

pub struct TemplateRegistry {
    tera: Tera,
}

impl TemplateRegistry {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        // Java source, not markup
        tera.autoescape_on(vec![]);

        for (name, source) in [
            (STANDARD_EXCEPTION, STANDARD_EXCEPTION_TEMPLATE),
            (VARIADIC_EXCEPTION, VARIADIC_EXCEPTION_TEMPLATE),
            (IMPLEMENTATION, IMPLEMENTATION_TEMPLATE),
        ] {
            tera.add_raw_template(name, source)
                .map_err(|source| RenderError::Register { name, source })?;
        }

        Ok(Self { tera })
    }

    pub fn render(&self, name: &'static str, context: &Context) -> Result<String, RenderError> {
        let rendered = self
            .tera
            .render(name, context)
            .map_err(|source| RenderError::Render { name, source })?;
        Ok(format!("{}\n", rendered.trim_end()))
    }
}

/// Informational `@Generated` annotation. Never affects behavior of the
/// generated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataHeader {
    generator: String,
    version: String,
    timestamp: String,
}

impl MetadataHeader {
    /// Header stamped with the current local time.
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub fn at(timestamp: NaiveDateTime) -> Self {
        Self {
            generator: GENERATOR_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Annotation line for an artifact originating from `package`.
    pub fn annotation(&self, package: &str) -> String {
        format!(
            r#"@javax.annotation.processing.Generated(value = "{}", date = "{}", comments = "version {}; package {}")"#,
            self.generator, self.timestamp, self.version, package
        )
    }
}
