//! Handlebars rendering with transcript helpers:
//! - truncate: Cut a string to at most N characters
//! - eq: Block helper rendering its body when both params are equal
//! - upper: Uppercase a string

use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, HelperResult, Output,
    RenderContext, Renderable,
};
use serde_json::Value;

use crate::templates::TemplatesFile;
use crate::RenderError;

/// Compiled renderer with registered helpers
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
    templates: TemplatesFile,
}

impl TemplateRenderer {
    /// Compile every template in `templates`.
    pub fn new(templates: TemplatesFile) -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        // Output is plain text or Markdown, never HTML.
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("truncate", Box::new(truncate));
        handlebars.register_helper("upper", Box::new(upper));
        handlebars.register_helper("eq", Box::new(EqHelper));

        for (name, template) in &templates.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| RenderError::Template(format!("{}: {}", name, e)))?;
        }

        Ok(TemplateRenderer { handlebars, templates })
    }

    /// Renderer over the built-in template set.
    pub fn builtin() -> Result<Self, RenderError> {
        Self::new(TemplatesFile::builtin()?)
    }

    /// Render a named template with data
    pub fn render(&self, template_name: &str, data: &Value) -> Result<String, RenderError> {
        if !self.handlebars.has_template(template_name) {
            return Err(RenderError::UnknownTemplate(template_name.to_string()));
        }
        self.handlebars
            .render(template_name, data)
            .map_err(|e| RenderError::Render(e.to_string()))
    }

    /// Render a template string directly
    pub fn render_string(&self, template: &str, data: &Value) -> Result<String, RenderError> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| RenderError::Render(e.to_string()))
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.list_templates()
    }
}

// ============================================================================
// Custom Helpers
// ============================================================================

handlebars_helper!(upper: |text: str| text.to_uppercase());

handlebars_helper!(truncate: |text: str, max: u64| {
    let max = max as usize;
    if text.chars().count() > max {
        text.chars().take(max).collect::<String>()
    } else {
        text.to_string()
    }
});

/// Equality block helper: `{{#eq a "b"}}yes{{else}}no{{/eq}}`
struct EqHelper;

impl HelperDef for EqHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let equal = match (h.param(0), h.param(1)) {
            (Some(l), Some(r)) => l.value() == r.value(),
            _ => false,
        };

        let branch = if equal { h.template() } else { h.inverse() };
        if let Some(template) = branch {
            template.render(r, ctx, rc, out)?;
        }
        Ok(())
    }
}
