use common::demo_analysis::Match;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Sending to coordinator: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Coordinator responded with {0}")]
    Status(reqwest::StatusCode),
}

/// Tells the coordinator how a job went, `None` meaning it failed.
///
/// Either way the coordinator hands out the next job afterwards.
#[async_trait::async_trait]
pub trait Reporter: Send + Sync {
    async fn report(&self, result: Option<&Match>) -> Result<(), ReportError>;
}

pub struct MasterClient {
    http: reqwest::Client,
    base_url: String,
    password: String,
    address: String,
}

#[derive(Debug, serde::Serialize)]
struct Registration<'s> {
    password: &'s str,
    address: &'s str,
}

#[derive(Debug, serde::Serialize)]
struct DemoReport<'s> {
    password: &'s str,
    address: &'s str,
    #[serde(rename = "match")]
    result: Option<&'s Match>,
}

impl MasterClient {
    pub fn new<U, P, A>(base_url: U, password: P, address: A) -> Self
    where
        U: Into<String>,
        P: Into<String>,
        A: Into<String>,
    {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            password: password.into(),
            address: address.into(),
        }
    }

    async fn post<B>(&self, path: &str, body: &B) -> Result<(), ReportError>
    where
        B: serde::Serialize,
    {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReportError::Status(response.status()));
        }

        Ok(())
    }

    /// Announces this worker so the coordinator starts handing out jobs.
    #[tracing::instrument(skip(self))]
    pub async fn register(&self) -> Result<(), ReportError> {
        tracing::info!("Registering worker");

        self.post(
            "/api/demoworker/worker",
            &Registration {
                password: &self.password,
                address: &self.address,
            },
        )
        .await?;

        tracing::info!("Worker registered");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Reporter for MasterClient {
    #[tracing::instrument(skip_all, fields(success = result.is_some()))]
    async fn report(&self, result: Option<&Match>) -> Result<(), ReportError> {
        self.post(
            "/api/demoworker/demo",
            &DemoReport {
                password: &self.password,
                address: &self.address,
                result,
            },
        )
        .await?;

        tracing::info!("Match sent to the coordinator");
        Ok(())
    }
}
