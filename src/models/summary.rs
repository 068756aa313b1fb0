use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WorkItemType;

/// Attempt counters for one work item type.
///
/// `total` counts every attempted creation; each attempt lands in exactly one
/// of `created` or `failed`. Nodes skipped because an ancestor failed are not
/// attempted and therefore not counted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindCounts {
    pub total: usize,
    pub created: usize,
    pub failed: usize,
}

impl KindCounts {
    pub fn record_created(&mut self) {
        self.total += 1;
        self.created += 1;
    }

    pub fn record_failed(&mut self) {
        self.total += 1;
        self.failed += 1;
    }
}

impl std::ops::Add for KindCounts {
    type Output = KindCounts;

    fn add(self, other: KindCounts) -> KindCounts {
        KindCounts {
            total: self.total + other.total,
            created: self.created + other.created,
            failed: self.failed + other.failed,
        }
    }
}

/// Aggregate outcome of one synchronization run.
///
/// Constructed empty when a run starts, updated as each node is processed,
/// and finalized once at completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub run_id: Uuid,
    pub epics: KindCounts,
    pub features: KindCounts,
    pub user_stories: KindCounts,
    /// Sum of the three kinds; filled in by [`SyncSummary::finalize`].
    pub totals: KindCounts,
    /// Work items removed by the overwrite pre-phase. Absent when overwrite did not run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<usize>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SyncSummary {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            epics: KindCounts::default(),
            features: KindCounts::default(),
            user_stories: KindCounts::default(),
            totals: KindCounts::default(),
            deleted: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn counts_mut(&mut self, kind: WorkItemType) -> &mut KindCounts {
        match kind {
            WorkItemType::Epic => &mut self.epics,
            WorkItemType::Feature => &mut self.features,
            WorkItemType::UserStory => &mut self.user_stories,
        }
    }

    pub fn finalize(&mut self) {
        self.totals = self.epics + self.features + self.user_stories;
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_sums_all_kinds() {
        let mut summary = SyncSummary::new(Uuid::new_v4());
        summary.counts_mut(WorkItemType::Epic).record_created();
        summary.counts_mut(WorkItemType::Epic).record_failed();
        summary.counts_mut(WorkItemType::Feature).record_created();
        summary.counts_mut(WorkItemType::UserStory).record_created();

        summary.finalize();

        assert_eq!(
            summary.totals,
            KindCounts {
                total: 4,
                created: 3,
                failed: 1
            }
        );
        assert!(summary.completed_at.is_some());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let summary = SyncSummary::new(Uuid::new_v4());
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("userStories").is_some());
        assert!(json.get("deleted").is_none());
    }
}
