//! Per-request timing metrics.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use shop_core::RequestId;

/// Metrics for a single request, logged once when the response completes.
#[derive(Debug, Clone, Serialize)]
pub struct RequestMetrics {
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_shell_us: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_first_section_us: Option<u64>,
    pub total_duration_us: u64,
    pub sections: BTreeMap<String, SectionMetrics>,
    pub dependencies: Vec<DependencyMetrics>,
    pub bytes_sent: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionMetrics {
    /// Time from request start to section sent (microseconds).
    pub sent_us: u64,
    pub bytes: usize,
    pub used_fallback: bool,
}

/// Metrics for one backend call.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyMetrics {
    pub tag: String,
    pub url: String,
    pub duration_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Collector for request metrics.
#[derive(Debug)]
pub struct MetricsCollector {
    request_id: RequestId,
    route: Option<String>,
    start: Instant,
    shell_sent: Option<Instant>,
    first_section_sent: Option<Instant>,
    sections: BTreeMap<String, SectionMetrics>,
    dependencies: Vec<DependencyMetrics>,
    bytes_sent: usize,
}

impl MetricsCollector {
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            route: None,
            start: Instant::now(),
            shell_sent: None,
            first_section_sent: None,
            sections: BTreeMap::new(),
            dependencies: Vec::new(),
            bytes_sent: 0,
        }
    }

    pub fn set_route(&mut self, route: impl Into<String>) {
        self.route = Some(route.into());
    }

    pub fn record_shell_sent(&mut self, bytes: usize) {
        self.shell_sent = Some(Instant::now());
        self.bytes_sent += bytes;
    }

    pub fn record_section_sent(&mut self, name: &str, bytes: usize, used_fallback: bool) {
        let now = Instant::now();
        if self.first_section_sent.is_none() {
            self.first_section_sent = Some(now);
        }
        self.bytes_sent += bytes;
        self.sections.insert(
            name.to_string(),
            SectionMetrics {
                sent_us: now.duration_since(self.start).as_micros() as u64,
                bytes,
                used_fallback,
            },
        );
    }

    /// Record a backend call.
    pub fn record_dependency(
        &mut self,
        tag: &str,
        url: &str,
        duration: Duration,
        status_code: Option<u16>,
        error: Option<String>,
    ) {
        self.dependencies.push(DependencyMetrics {
            tag: tag.to_string(),
            url: url.to_string(),
            duration_us: duration.as_micros() as u64,
            status_code,
            success: error.is_none(),
            error,
        });
    }

    pub fn fallback_count(&self) -> usize {
        self.sections.values().filter(|s| s.used_fallback).count()
    }

    pub fn failed_dependencies(&self) -> usize {
        self.dependencies.iter().filter(|d| !d.success).count()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finalize and return the metrics.
    pub fn finalize(self, status_code: Option<u16>) -> RequestMetrics {
        let start = self.start;
        let micros = |t: Instant| t.duration_since(start).as_micros() as u64;

        RequestMetrics {
            request_id: self.request_id.to_string(),
            route: self.route,
            time_to_shell_us: self.shell_sent.map(micros),
            time_to_first_section_us: self.first_section_sent.map(micros),
            total_duration_us: start.elapsed().as_micros() as u64,
            sections: self.sections,
            dependencies: self.dependencies,
            bytes_sent: self.bytes_sent,
            status_code,
        }
    }
}

impl RequestMetrics {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// One-line human summary.
    pub fn to_summary(&self) -> String {
        let ms = |us: u64| us as f64 / 1000.0;
        let mut parts = vec![format!("total={:.2}ms", ms(self.total_duration_us))];
        if let Some(tts) = self.time_to_shell_us {
            parts.push(format!("shell={:.2}ms", ms(tts)));
        }
        parts.push(format!("sections={}", self.sections.len()));
        let failed = self.dependencies.iter().filter(|d| !d.success).count();
        parts.push(format!("backend={}/{}", self.dependencies.len() - failed, self.dependencies.len()));
        parts.push(format!("bytes={}", self.bytes_sent));
        parts.join(" ")
    }
}
