/// Audit event logging for triage runs
///
/// Provides a structured trail of what each scoring run saw and decided:
/// run lifecycle, rejected claims, evaluator faults, and policy fallbacks.
/// Events go to the standard logger and, when available, to a JSONL audit
/// file. The audit stream is operational telemetry only; the scoring report
/// itself stays free of run-scoped identifiers so output is reproducible.
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::SystemTime;

/// Audit event severity levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditSeverity {
    High,
    Medium,
    Low,
}

/// Types of triage events we track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditEventType {
    RunStart,
    RunEnd,
    ClaimRejected,
    EvaluatorFault,
    PolicyFallback,
}

impl AuditEventType {
    pub fn default_severity(&self) -> AuditSeverity {
        match self {
            AuditEventType::RunStart => AuditSeverity::Low,
            AuditEventType::RunEnd => AuditSeverity::Low,
            AuditEventType::ClaimRejected => AuditSeverity::Medium,
            AuditEventType::EvaluatorFault => AuditSeverity::High,
            AuditEventType::PolicyFallback => AuditSeverity::Medium,
        }
    }
}

/// Individual audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub severity: AuditSeverity,
    pub timestamp: SystemTime,
    pub details: String,
    pub run_id: Option<String>,
    pub claim_id: Option<String>,
    pub policy: Option<String>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, details: String) -> Self {
        let severity = event_type.default_severity();
        Self {
            event_type,
            severity,
            timestamp: SystemTime::now(),
            details,
            run_id: None,
            claim_id: None,
            policy: None,
        }
    }

    pub fn with_run_id(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }

    pub fn with_claim_id(mut self, claim_id: &str) -> Self {
        self.claim_id = Some(claim_id.to_string());
        self
    }

    pub fn with_policy(mut self, policy: &str) -> Self {
        self.policy = Some(policy.to_string());
        self
    }
}

/// Audit logger handling both structured logging and the JSONL trail
pub struct AuditLogger {
    audit_file: Arc<Mutex<File>>,
    audit_path: PathBuf,
}

impl AuditLogger {
    pub fn new(audit_path: Option<PathBuf>) -> std::io::Result<Self> {
        let audit_path = audit_path
            .unwrap_or_else(|| std::env::temp_dir().join("triagebox").join("audit.jsonl"));

        if let Some(parent) = audit_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let audit_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&audit_path)?;

        Ok(Self {
            audit_file: Arc::new(Mutex::new(audit_file)),
            audit_path,
        })
    }

    pub fn log_event(&self, event: AuditEvent) {
        let log_entry = serde_json::json!({
            "timestamp": event.timestamp
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            "event_type": event.event_type,
            "severity": event.severity,
            "details": event.details,
            "run_id": event.run_id,
            "claim_id": event.claim_id,
            "policy": event.policy,
        });

        match event.severity {
            AuditSeverity::High => {
                error!("AUDIT: {:?} - {}", event.event_type, event.details);
            }
            AuditSeverity::Medium => {
                warn!("AUDIT: {:?} - {}", event.event_type, event.details);
            }
            AuditSeverity::Low => {
                info!("AUDIT: {:?} - {}", event.event_type, event.details);
            }
        }

        if let Ok(mut file) = self.audit_file.lock() {
            if let Err(e) = writeln!(file, "{}", log_entry) {
                error!("Failed to write to audit log: {}", e);
            }
        } else {
            error!("Failed to acquire lock on audit file");
        }
    }

    pub fn audit_path(&self) -> &PathBuf {
        &self.audit_path
    }
}

/// Global audit logger instance
static AUDIT_LOGGER: OnceLock<AuditLogger> = OnceLock::new();

/// Initialize the global audit logger.
///
/// Degrades gracefully: if no audit file can be opened the process keeps
/// running with logger-only events rather than refusing to score.
pub fn init_audit_logger(audit_path: Option<PathBuf>) {
    match AuditLogger::new(audit_path) {
        Ok(logger) => {
            if AUDIT_LOGGER.set(logger).is_err() {
                warn!("Audit logger already initialized");
            }
        }
        Err(e) => {
            warn!(
                "Audit file unavailable, continuing with log-only audit events: {}",
                e
            );
        }
    }
}

/// Log an audit event using the global logger, falling back to the standard
/// logger when no file-backed logger was initialized.
pub fn log_audit_event(event: AuditEvent) {
    if let Some(logger) = AUDIT_LOGGER.get() {
        logger.log_event(event);
    } else {
        match event.severity {
            AuditSeverity::High => error!("AUDIT: {:?} - {}", event.event_type, event.details),
            AuditSeverity::Medium => warn!("AUDIT: {:?} - {}", event.event_type, event.details),
            AuditSeverity::Low => info!("AUDIT: {:?} - {}", event.event_type, event.details),
        }
    }
}

/// Log the start of a scoring run
pub fn run_start(run_id: &str, policy: &str, claim_count: usize) {
    let event = AuditEvent::new(
        AuditEventType::RunStart,
        format!("scoring {} claims", claim_count),
    )
    .with_run_id(run_id)
    .with_policy(policy);
    log_audit_event(event);
}

/// Log the end of a scoring run with bucket counts
pub fn run_end(run_id: &str, policy: &str, scored: usize, unscoreable: usize, high: usize, medium: usize) {
    let event = AuditEvent::new(
        AuditEventType::RunEnd,
        format!(
            "scored={} unscoreable={} high={} medium={}",
            scored, unscoreable, high, medium
        ),
    )
    .with_run_id(run_id)
    .with_policy(policy);
    log_audit_event(event);
}

/// Log a claim excluded for a schema violation
pub fn claim_rejected(run_id: &str, claim_id: Option<&str>, detail: &str) {
    let mut event = AuditEvent::new(
        AuditEventType::ClaimRejected,
        format!("claim excluded from scoring: {}", detail),
    )
    .with_run_id(run_id);
    if let Some(id) = claim_id {
        event = event.with_claim_id(id);
    }
    log_audit_event(event);
}

/// Log an evaluator fault recorded as an abstention
pub fn evaluator_fault(claim_id: &str, code: crate::config::types::HeuristicCode, detail: &str) {
    let event = AuditEvent::new(
        AuditEventType::EvaluatorFault,
        format!("{} evaluator faulted: {}", code, detail),
    )
    .with_claim_id(claim_id);
    log_audit_event(event);
}

/// Log a soft fallback from an unrecognized policy name
pub fn policy_fallback(requested: &str, fallback: &str) {
    let event = AuditEvent::new(
        AuditEventType::PolicyFallback,
        format!("unrecognized policy '{}', using '{}'", requested, fallback),
    )
    .with_policy(fallback);
    log_audit_event(event);
}
