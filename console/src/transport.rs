//! Executes the core's `HttpRequest` values over the network.

use todo_query::{HttpOutcome, HttpRequest, HttpResponse};

/// Blocking ureq agent, run off the event loop via `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct Transport {
    agent: ureq::Agent,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    /// Error statuses come back as data so the core can read their bodies.
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn execute(&self, req: HttpRequest) -> HttpOutcome {
        let mut builder = self.agent.post(&req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder
            .send(req.body.as_bytes())
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| e.to_string())?;
        Ok(HttpResponse::new(status, body))
    }

    pub async fn send(&self, req: HttpRequest) -> HttpOutcome {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.execute(req))
            .await
            .unwrap_or_else(|e| Err(e.to_string()))
    }
}
