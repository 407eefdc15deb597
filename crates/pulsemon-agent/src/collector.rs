use pulsemon_common::types::SamplePayload;
use sysinfo::System;

/// Collects global CPU and memory utilization via sysinfo.
///
/// CPU usage is computed from the delta between two refreshes, so the first
/// reading after construction is meaningless; callers should discard one
/// collection before reporting.
pub struct SampleCollector {
    system: System,
}

impl SampleCollector {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        system.refresh_memory();
        Self { system }
    }

    pub fn collect(&mut self) -> SamplePayload {
        self.system.refresh_cpu_all();
        self.system.refresh_memory();

        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let memory_usage = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        SamplePayload {
            cpu_usage: (self.system.global_cpu_usage() as f64).clamp(0.0, 100.0),
            memory_usage: memory_usage.clamp(0.0, 100.0),
            memory_total: total as i64,
            memory_used: used as i64,
            // Server clock stamps the sample on arrival
            timestamp: None,
        }
    }
}

impl Default for SampleCollector {
    fn default() -> Self {
        Self::new()
    }
}
