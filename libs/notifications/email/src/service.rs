use async_trait::async_trait;
use domain_jobs::Job;
use domain_resumes::{Resume, ResumeNotifier};
use domain_subscribers::Subscriber;
use eyre::Result;
use std::sync::Arc;

use crate::models::Email;
use crate::provider::EmailProvider;
use crate::templates::{TemplateEngine, JOB_DIGEST_TEMPLATE, RESUME_STATUS_TEMPLATE};

/// Renders and sends the transactional emails of the platform.
pub struct NotificationService {
    provider: Arc<dyn EmailProvider>,
    templates: TemplateEngine,
}

impl NotificationService {
    pub fn new(provider: Arc<dyn EmailProvider>) -> Result<Self> {
        Ok(Self {
            provider,
            templates: TemplateEngine::new()?,
        })
    }

    fn digest_data(subscriber: &Subscriber, jobs: &[Job]) -> serde_json::Value {
        let jobs: Vec<serde_json::Value> = jobs
            .iter()
            .map(|job| {
                serde_json::json!({
                    "name": job.name,
                    "company_name": job.company.as_ref().map(|c| c.name.clone()),
                    "location": job.location,
                    "salary": job.salary,
                    "skills": job.skills.iter().map(|s| s.name.clone()).collect::<Vec<_>>(),
                })
            })
            .collect();

        serde_json::json!({
            "name": subscriber.name,
            "jobs": jobs,
        })
    }

    /// Send a digest of matching job postings to one subscriber.
    /// Subscribers with no matching jobs are skipped.
    pub async fn send_job_digest(&self, subscriber: &Subscriber, jobs: &[Job]) -> Result<()> {
        if jobs.is_empty() {
            return Ok(());
        }

        let rendered = self
            .templates
            .render(JOB_DIGEST_TEMPLATE, &Self::digest_data(subscriber, jobs))?;

        let email = Email::new(&subscriber.email, rendered.subject).with_html(rendered.body_html);
        self.provider.send(&email).await?;
        Ok(())
    }

    /// Notify a candidate that their application status changed.
    pub async fn send_resume_status(&self, resume: &Resume) -> Result<()> {
        let data = serde_json::json!({
            "name": resume.user.name,
            "job_name": resume.job.name,
            "company_name": resume.company_name,
            "status": resume.status,
        });
        let rendered = self.templates.render(RESUME_STATUS_TEMPLATE, &data)?;

        let email = Email::new(&resume.email, rendered.subject).with_html(rendered.body_html);
        self.provider.send(&email).await?;
        Ok(())
    }
}

#[async_trait]
impl ResumeNotifier for NotificationService {
    async fn resume_status_changed(&self, resume: &Resume) {
        if let Err(e) = self.send_resume_status(resume).await {
            tracing::warn!(
                resume_id = resume.id,
                to = %resume.email,
                error = %e,
                "Failed to send resume status notification"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockEmailProvider;
    use domain_resumes::{JobRef, OwnerRef, ResumeStatus};
    use domain_subscribers::SkillRef;

    fn subscriber() -> Subscriber {
        Subscriber {
            id: 1,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            skills: vec![SkillRef {
                id: 1,
                name: "Rust".to_string(),
            }],
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: None,
            updated_by: None,
        }
    }

    fn job() -> Job {
        Job {
            id: 10,
            name: "Backend Engineer".to_string(),
            location: Some("Hanoi".to_string()),
            salary: Some(2000.0),
            quantity: Some(2),
            level: None,
            description: None,
            start_date: None,
            end_date: None,
            active: true,
            company: None,
            skills: Vec::new(),
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: None,
            updated_by: None,
        }
    }

    fn approved_resume() -> Resume {
        Resume {
            id: 1,
            email: "ada@example.com".to_string(),
            url: "https://cv.example.com/ada.pdf".to_string(),
            status: ResumeStatus::Approved,
            user: OwnerRef {
                id: 1,
                name: "Ada".to_string(),
            },
            job: JobRef {
                id: 10,
                name: "Backend Engineer".to_string(),
            },
            company_name: Some("Acme".to_string()),
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: None,
            updated_by: None,
        }
    }

    #[tokio::test]
    async fn test_digest_sends_to_subscriber() {
        let provider = Arc::new(MockEmailProvider::new());
        let service = NotificationService::new(provider.clone()).unwrap();

        service
            .send_job_digest(&subscriber(), &[job()])
            .await
            .unwrap();

        assert!(provider.was_sent_to("ada@example.com").await);
        let sent = provider.sent_emails().await;
        assert!(sent[0].body_html.as_deref().unwrap().contains("Backend Engineer"));
    }

    #[tokio::test]
    async fn test_digest_skips_when_no_jobs_match() {
        let provider = Arc::new(MockEmailProvider::new());
        let service = NotificationService::new(provider.clone()).unwrap();

        service.send_job_digest(&subscriber(), &[]).await.unwrap();

        assert_eq!(provider.sent_count().await, 0);
    }

    #[tokio::test]
    async fn test_resume_status_notification() {
        let provider = Arc::new(MockEmailProvider::new());
        let service = NotificationService::new(provider.clone()).unwrap();

        service.resume_status_changed(&approved_resume()).await;

        let sent = provider.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains("APPROVED"));
    }

    #[tokio::test]
    async fn test_resume_notifier_swallows_provider_errors() {
        let provider = Arc::new(MockEmailProvider::failing("SMTP down"));
        let service = NotificationService::new(provider).unwrap();

        // Must not panic or propagate
        service.resume_status_changed(&approved_resume()).await;
    }
}
