// Template engine for generating Markdown output

use crate::error::Result;
use crate::model::{Entity, FileFailure, ImportRecord, ModelStats, RepositoryModel};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

const DOCS_TEMPLATE: &str = "docs.md";

/// Template engine wrapping Tera with custom filters and templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_template(DOCS_TEMPLATE, include_str!("../../templates/docs.md.tera"))?;

        tera.register_filter("pluralize", pluralize);
        tera.register_filter("first_line", first_line);

        Ok(Self { tera })
    }

    /// Render a custom template with context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// A rendered diagram and its heading
#[derive(Debug, Clone, Serialize)]
pub struct DiagramSection {
    pub title: String,
    pub mermaid: String,
}

#[derive(Serialize)]
struct FileView<'a> {
    path: String,
    language: &'static str,
    types: &'a [Entity],
    functions: &'a [Entity],
    imports: &'a [ImportRecord],
}

#[derive(Serialize)]
struct FailureView<'a> {
    path: String,
    error: &'a str,
}

impl<'a> From<&'a FileFailure> for FailureView<'a> {
    fn from(failure: &'a FileFailure) -> Self {
        Self {
            path: failure.path.display().to_string(),
            error: &failure.error,
        }
    }
}

/// Renders a repository model as a single Markdown document
pub struct MarkdownGenerator {
    engine: TemplateEngine,
    project_name: String,
    description: Option<String>,
}

impl MarkdownGenerator {
    pub fn new(project_name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
            project_name: project_name.into(),
            description: None,
        })
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Render the document. Empty diagrams are left out.
    pub fn generate(&self, model: &RepositoryModel, diagram: Option<DiagramSection>) -> Result<String> {
        let files: Vec<FileView> = model
            .files()
            .map(|(path, result)| FileView {
                path: path.display().to_string(),
                language: result.language.display_name(),
                types: &result.types,
                functions: &result.functions,
                imports: &result.imports,
            })
            .collect();
        let failures: Vec<FailureView> = model.failures().iter().map(FailureView::from).collect();
        let stats: ModelStats = model.stats();

        let mut context = Context::new();
        context.insert("project_name", &self.project_name);
        context.insert("description", &self.description);
        context.insert("stats", &stats);
        context.insert("failures", &failures);
        context.insert("files", &files);
        context.insert("diagram", &diagram.filter(|d| !d.mermaid.is_empty()));

        self.engine.render(DOCS_TEMPLATE, &context)
    }
}

/// Pluralize a word based on count
fn pluralize(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(0);
    let singular = args
        .get("singular")
        .and_then(|v| v.as_str())
        .unwrap_or("item");
    let default_plural = format!("{}s", singular);
    let plural = args
        .get("plural")
        .and_then(|v| v.as_str())
        .unwrap_or(&default_plural);

    if count == 1 {
        Ok(Value::String(format!("{} {}", count, singular)))
    } else {
        Ok(Value::String(format!("{} {}", count, plural)))
    }
}

/// First non-blank line, trimmed
fn first_line(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value.as_str().unwrap_or("");
    let line = s.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    Ok(Value::String(line.to_string()))
}
