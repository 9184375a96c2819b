//! Page templates, compiled into the binary.

use minijinja::Environment;
use serde::Serialize;

use crate::errors::AppError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("list_items.html", include_str!("../../templates/list_items.html")),
    ("list.html", include_str!("../../templates/list.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("detail.html", include_str!("../../templates/detail.html")),
    ("not_found.html", include_str!("../../templates/not_found.html")),
];

/// Loaded template environment. `.html` names are autoescaped.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, AppError> {
        Ok(self.env.get_template(name)?.render(context)?)
    }
}
