// Source trait for dashboard snapshots
use crate::domain::telemetry::DashboardSnapshot;

pub trait SnapshotSource: Send {
    /// Produce one complete reading. Survivor detections are left empty when
    /// `include_survivors` is false.
    fn generate(&mut self, include_survivors: bool) -> DashboardSnapshot;
}
