#![allow(dead_code)]

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use similar::{ChangeTag, TextDiff};
use throwgen::codegen::{GenerationDriver, GenerationOptions, MetadataHeader, RunReport};
use throwgen::diagnostics::CollectingReporter;
use throwgen::discovery::{ElementKind, RawDeclaration, SnapshotSource};
use throwgen::model::{Marker, MethodMarker, Parameter, TypeMarker};
use throwgen::sink::MemorySink;

static GENERATED_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"date = "\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2}""#).unwrap());
static GENERATOR_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"version [^;]+;").unwrap());

pub const ORDERS_SNAPSHOT: &str = r#"
declarations:
  - element: interface
    package: billing
    name: Orders
    marker: { type: exception_maker, exception_names: [OrderNotFound] }
  - element: method
    package: billing
    enclosing: Orders
    name: find
    return_type: Order
    parameters: [{ type: String, name: id }]
    marker: { type: exception_runner, exception_type: OrderNotFound, component_model: spring }
"#;

pub fn interface(package: &str, name: &str, exceptions: &[&str], custom: bool) -> RawDeclaration {
    RawDeclaration {
        element: ElementKind::Interface,
        package: package.to_string(),
        enclosing: None,
        name: name.to_string(),
        return_type: None,
        parameters: Vec::new(),
        marker: Marker::ExceptionMaker(TypeMarker {
            exception_names: exceptions.iter().map(|e| e.to_string()).collect(),
            custom_parameter_order: custom,
        }),
    }
}

pub fn method(
    package: &str,
    interface: &str,
    name: &str,
    return_type: &str,
    parameters: &[(&str, &str)],
    exception: &str,
    component_model: &str,
) -> RawDeclaration {
    RawDeclaration {
        element: ElementKind::Method,
        package: package.to_string(),
        enclosing: Some(interface.to_string()),
        name: name.to_string(),
        return_type: Some(return_type.to_string()),
        parameters: parameters
            .iter()
            .map(|(type_name, name)| Parameter::new(*type_name, *name))
            .collect(),
        marker: Marker::ExceptionRunner(
            MethodMarker::new(exception).with_component_model(component_model),
        ),
    }
}

pub fn without_header() -> GenerationOptions {
    GenerationOptions {
        metadata_header: false,
        ..GenerationOptions::default()
    }
}

pub fn header_at(day: u32, hour: u32, minute: u32, second: u32) -> MetadataHeader {
    let at = NaiveDate::from_ymd_opt(2026, 6, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .unwrap();
    MetadataHeader::at(at)
}

pub struct Outcome {
    pub report: RunReport,
    pub sink: MemorySink,
    pub diagnostics: CollectingReporter,
}

pub fn run_declarations(declarations: Vec<RawDeclaration>, options: GenerationOptions) -> Outcome {
    run_source(&SnapshotSource::new(declarations), options, None)
}

pub fn run_source(
    source: &SnapshotSource,
    options: GenerationOptions,
    header: Option<MetadataHeader>,
) -> Outcome {
    let mut sink = MemorySink::new();
    let mut diagnostics = CollectingReporter::new();
    let mut driver = GenerationDriver::new(source, &mut sink, &mut diagnostics, options);
    if let Some(header) = header {
        driver = driver.with_metadata_header(header);
    }
    let report = driver.run().unwrap();
    Outcome {
        report,
        sink,
        diagnostics,
    }
}

/// Replaces the generation timestamp and crate version with placeholders.
pub fn mask(body: &str) -> String {
    let masked = GENERATED_DATE.replace_all(body, r#"date = "<masked>""#);
    GENERATOR_VERSION
        .replace_all(&masked, "version <version>;")
        .into_owned()
}

/// Panics with a line diff when `actual` differs from `expected`.
pub fn assert_text_eq(expected: &str, actual: &str) {
    if expected == actual {
        return;
    }
    let diff = TextDiff::from_lines(expected, actual);
    let mut rendered = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        rendered.push_str(sign);
        rendered.push_str(change.value());
        if change.missing_newline() {
            rendered.push('\n');
        }
    }
    panic!("generated text differs from golden file:\n{rendered}");
}
