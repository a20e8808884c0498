//! Task context and per-task learning statistics

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Weight of the newest sample in the moving averages
const EMA_ALPHA: f64 = 0.2;

/// What the automation is currently doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Combat,
    Navigation,
    Inventory,
    Banking,
    Dialogue,
    Skilling,
    Trading,
    #[default]
    General,
}

impl TaskType {
    pub const ALL: [TaskType; 8] = [
        TaskType::Combat,
        TaskType::Navigation,
        TaskType::Inventory,
        TaskType::Banking,
        TaskType::Dialogue,
        TaskType::Skilling,
        TaskType::Trading,
        TaskType::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Combat => "combat",
            TaskType::Navigation => "navigation",
            TaskType::Inventory => "inventory",
            TaskType::Banking => "banking",
            TaskType::Dialogue => "dialogue",
            TaskType::Skilling => "skilling",
            TaskType::Trading => "trading",
            TaskType::General => "general",
        }
    }

    /// Item-management tasks take more deliberation
    pub fn is_item_management(self) -> bool {
        matches!(self, TaskType::Banking | TaskType::Inventory)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moving averages for one task type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskStats {
    /// Seconds spent per task run
    pub avg_duration: f64,
    pub avg_action_count: f64,
    pub runs: u32,
}

/// Exponential moving averages keyed by task type
#[derive(Debug, Clone, Default)]
pub struct TaskLedger {
    stats: BTreeMap<TaskType, TaskStats>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished task run into the averages
    ///
    /// The first run seeds the averages directly.
    pub fn record(&mut self, task: TaskType, duration_secs: f64, action_count: usize) {
        let count = action_count as f64;
        self.stats
            .entry(task)
            .and_modify(|s| {
                s.avg_duration = (1.0 - EMA_ALPHA) * s.avg_duration + EMA_ALPHA * duration_secs;
                s.avg_action_count = (1.0 - EMA_ALPHA) * s.avg_action_count + EMA_ALPHA * count;
                s.runs += 1;
            })
            .or_insert(TaskStats {
                avg_duration: duration_secs,
                avg_action_count: count,
                runs: 1,
            });

        log::debug!(
            "Recorded task stats for {}: {:.2}s, {} actions",
            task,
            duration_secs,
            action_count
        );
    }

    pub fn get(&self, task: TaskType) -> Option<&TaskStats> {
        self.stats.get(&task)
    }

    /// Average duration per task name
    pub fn durations(&self) -> BTreeMap<String, f64> {
        self.stats
            .iter()
            .map(|(task, s)| (task.to_string(), s.avg_duration))
            .collect()
    }

    /// Average action count per task name
    pub fn action_counts(&self) -> BTreeMap<String, f64> {
        self.stats
            .iter()
            .map(|(task, s)| (task.to_string(), s.avg_action_count))
            .collect()
    }

    pub fn clear(&mut self) {
        self.stats.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_seeds_average() {
        let mut ledger = TaskLedger::new();
        ledger.record(TaskType::Banking, 30.0, 12);

        let stats = ledger.get(TaskType::Banking).unwrap();
        assert_eq!(stats.avg_duration, 30.0);
        assert_eq!(stats.avg_action_count, 12.0);
        assert_eq!(stats.runs, 1);
    }

    #[test]
    fn test_moving_average_weights_new_sample() {
        let mut ledger = TaskLedger::new();
        ledger.record(TaskType::Combat, 10.0, 10);
        ledger.record(TaskType::Combat, 20.0, 20);

        let stats = ledger.get(TaskType::Combat).unwrap();
        assert!((stats.avg_duration - 12.0).abs() < 1e-9);
        assert!((stats.avg_action_count - 12.0).abs() < 1e-9);
        assert_eq!(stats.runs, 2);
    }

    #[test]
    fn test_keys_use_task_names() {
        let mut ledger = TaskLedger::new();
        ledger.record(TaskType::Dialogue, 4.0, 2);

        let durations = ledger.durations();
        assert_eq!(durations.get("dialogue"), Some(&4.0));
        assert!(ledger.action_counts().contains_key("dialogue"));
    }

    #[test]
    fn test_task_type_serde_names() {
        let json = serde_json::to_string(&TaskType::Skilling).unwrap();
        assert_eq!(json, "\"skilling\"");
        let parsed: TaskType = serde_json::from_str("\"banking\"").unwrap();
        assert_eq!(parsed, TaskType::Banking);
        assert!(TaskType::Inventory.is_item_management());
        assert!(!TaskType::Combat.is_item_management());
        assert_eq!(TaskType::ALL.len(), 8);
    }
}
