use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn quiz_session_started(questions: usize) {
    metrics::counter!("quiz_sessions_started_total").increment(1);
    metrics::histogram!("quiz_session_questions").record(questions as f64);
}

pub(crate) fn quiz_submission(outcome: &'static str) {
    metrics::counter!("quiz_submissions_total", "outcome" => outcome).increment(1);
}
