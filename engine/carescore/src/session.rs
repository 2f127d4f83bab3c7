//! Line-oriented request session over one long-lived service

use crate::{CareScoreService, ImmuneBatchRequest, ImmuneRequest, NutritionRequest};
use serde::{Deserialize, Serialize};

/// One JSON request line, keyed by operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRequest {
    Immune(ImmuneRequest),
    Batch(ImmuneBatchRequest),
    Nutrition(NutritionRequest),
}

pub struct Session<'a> {
    service: &'a CareScoreService,
}

impl<'a> Session<'a> {
    pub fn new(service: &'a CareScoreService) -> Self {
        Self { service }
    }

    fn handle_command(&self, command: &str) -> (Vec<String>, bool) {
        match command {
            ":help" => (
                vec![
                    "commands: :help, :status, :reload, :quit".to_string(),
                    r#"requests: {"immune": ...}, {"batch": ...}, {"nutrition": ...}"#.to_string(),
                ],
                false,
            ),
            ":q" | ":quit" | ":exit" => (Vec::new(), true),
            ":status" => (vec![render(&self.service.health())], false),
            ":reload" => (vec![render(&self.service.reload())], false),
            other => (vec![format!("error: unknown command '{other}'")], false),
        }
    }

    /// Answer one input line; the flag is true when the session should end
    pub fn handle_line(&self, line: &str) -> (Vec<String>, bool) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return (Vec::new(), false);
        }
        if trimmed.starts_with(':') {
            return self.handle_command(trimmed);
        }

        let request: SessionRequest = match serde_json::from_str(trimmed) {
            Ok(req) => req,
            Err(e) => return (vec![format!("error: invalid request: {e}")], false),
        };
        let response = match request {
            SessionRequest::Immune(req) => {
                render(&self.service.predict_immune(req.resident_id, &req.features))
            }
            SessionRequest::Batch(batch) => render(&self.service.predict_immune_batch(&batch)),
            SessionRequest::Nutrition(req) => {
                render(&self.service.simulate_nutrition(&req.patient, &req.intervention))
            }
        };
        (vec![response], false)
    }
}

fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| format!("error: failed to serialize response: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carescore_store::{ArtifactSnapshot, ArtifactStore, StoreConfig};
    use std::sync::Arc;

    fn service() -> CareScoreService {
        CareScoreService::new(Arc::new(ArtifactStore::with_snapshot(
            StoreConfig::new("."),
            ArtifactSnapshot::default(),
        )))
    }

    #[test]
    fn help_and_quit() {
        let svc = service();
        let session = Session::new(&svc);
        let (out, exit) = session.handle_line(":help");
        assert!(!exit);
        assert!(out[0].starts_with("commands:"));
        assert!(session.handle_line(":quit").1);
    }

    #[test]
    fn blank_line_is_ignored() {
        let svc = service();
        assert_eq!(Session::new(&svc).handle_line("   "), (Vec::new(), false));
    }

    #[test]
    fn immune_request_line() {
        let svc = service();
        let (out, exit) =
            Session::new(&svc).handle_line(r#"{"immune": {"resident_id": "A7", "features": {"age": 65}}}"#);
        assert!(!exit);
        let value: serde_json::Value = serde_json::from_str(&out[0]).unwrap();
        assert_eq!(value["resident_id"], "A7");
        assert_eq!(value["source"], "fallback");
        assert_eq!(value["risk_probability"], 0.12);
    }

    #[test]
    fn malformed_line_reports_error() {
        let svc = service();
        let (out, exit) = Session::new(&svc).handle_line(r#"{"triage": {}}"#);
        assert!(!exit);
        assert!(out[0].starts_with("error: invalid request"));
    }

    #[test]
    fn unknown_command() {
        let svc = service();
        let (out, _) = Session::new(&svc).handle_line(":vars");
        assert_eq!(out, vec!["error: unknown command ':vars'"]);
    }
}
