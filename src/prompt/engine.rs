use tera::Tera;

/// Tera-backed renderer for inline prompt templates.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    /// Create an engine with no templates registered.
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    /// Create an engine pre-loaded with `(name, source)` pairs.
    pub fn with_templates(templates: &[(&str, &str)]) -> anyhow::Result<Self> {
        let mut engine = Self::new();
        engine.tera.add_raw_templates(templates.iter().copied())?;
        Ok(engine)
    }

    /// Register a template from a string, replacing any template of the same name.
    pub fn add_template(&mut self, name: &str, content: &str) -> anyhow::Result<()> {
        self.tera.add_raw_template(name, content)?;
        Ok(())
    }

    /// Render a named template with the given context.
    pub fn render(&self, template_name: &str, context: &tera::Context) -> anyhow::Result<String> {
        let rendered = self.tera.render(template_name, context)?;
        Ok(rendered)
    }
}

impl Default for TeraEngine {
    fn default() -> Self {
        Self::new()
    }
}
