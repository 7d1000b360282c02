//! Email template rendering with Handlebars

use eyre::{eyre, Result};
use handlebars::Handlebars;
use serde_json::Value;

pub const JOB_DIGEST_TEMPLATE: &str = "job-digest";
pub const RESUME_STATUS_TEMPLATE: &str = "resume-status";

/// Rendered template result
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_html: String,
}

/// Handlebars-based template engine with the built-in email templates
/// registered at construction.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        let templates = [
            (
                JOB_DIGEST_TEMPLATE,
                "New jobs matching your skills",
                include_str!("../templates/job-digest.hbs"),
            ),
            (
                RESUME_STATUS_TEMPLATE,
                "Your application for {{job_name}} is {{status}}",
                include_str!("../templates/resume-status.hbs"),
            ),
        ];

        for (name, subject, body) in templates {
            handlebars
                .register_template_string(&format!("{}_subject", name), subject)
                .map_err(|e| eyre!("Failed to register subject template: {}", e))?;
            handlebars
                .register_template_string(&format!("{}_html", name), body)
                .map_err(|e| eyre!("Failed to register HTML template: {}", e))?;
        }

        Ok(Self { handlebars })
    }

    /// Render a template by name
    pub fn render(&self, name: &str, data: &Value) -> Result<RenderedTemplate> {
        let subject = self
            .handlebars
            .render(&format!("{}_subject", name), data)
            .map_err(|e| eyre!("Failed to render subject: {}", e))?;

        let body_html = self
            .handlebars
            .render(&format!("{}_html", name), data)
            .map_err(|e| eyre!("Failed to render HTML: {}", e))?;

        Ok(RenderedTemplate { subject, body_html })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_resume_status() {
        let engine = TemplateEngine::new().unwrap();

        let data = serde_json::json!({
            "name": "Ada",
            "job_name": "Backend Engineer",
            "company_name": "Acme",
            "status": "APPROVED"
        });

        let rendered = engine.render(RESUME_STATUS_TEMPLATE, &data).unwrap();
        assert_eq!(
            rendered.subject,
            "Your application for Backend Engineer is APPROVED"
        );
        assert!(rendered.body_html.contains("Acme"));
        assert!(rendered.body_html.contains("APPROVED"));
    }

    #[test]
    fn test_render_job_digest_lists_jobs() {
        let engine = TemplateEngine::new().unwrap();

        let data = serde_json::json!({
            "name": "Ada",
            "jobs": [
                {
                    "name": "Backend Engineer",
                    "company_name": "Acme",
                    "location": "Hanoi",
                    "salary": 2000.0,
                    "skills": ["Rust", "MySQL"]
                },
                {
                    "name": "Platform Engineer",
                    "skills": ["Go"]
                }
            ]
        });

        let rendered = engine.render(JOB_DIGEST_TEMPLATE, &data).unwrap();
        assert!(rendered.body_html.contains("Backend Engineer"));
        assert!(rendered.body_html.contains("Platform Engineer"));
        assert!(rendered.body_html.contains("Rust, MySQL"));
    }

    #[test]
    fn test_render_unknown_template_fails() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.render("no-such-template", &serde_json::json!({})).is_err());
    }
}
