use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    pub course_id: i64,
    pub number: i32,
    pub name: String,
    pub hours: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub module_id: i64,
    pub name: String,
    pub completion_status: i32,
    pub importance: i32,
}

impl Topic {
    pub fn is_complete(&self) -> bool {
        self.completion_status >= Completion::MAX
    }

    pub fn completion_label(&self) -> &'static str {
        match self.completion_status {
            0 => "Not started",
            100 => "Done",
            1..=99 => "In progress",
            _ => "Unknown",
        }
    }

    pub fn importance_label(&self) -> &'static str {
        Importance::label_for(self.importance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleWithTopics {
    pub module: Module,
    pub topics: Vec<Topic>,
}

impl ModuleWithTopics {
    /// Mean completion of the module's topics, 0 when it has none.
    pub fn completion(&self) -> f64 {
        if self.topics.is_empty() {
            return 0.0;
        }
        let total: i32 = self.topics.iter().map(|t| t.completion_status).sum();
        total as f64 / self.topics.len() as f64
    }
}

/// A course with its full module/topic hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOutline {
    pub course: Course,
    pub modules: Vec<ModuleWithTopics>,
}

impl CourseOutline {
    pub fn topic_count(&self) -> usize {
        self.modules.iter().map(|m| m.topics.len()).sum()
    }

    pub fn completion(&self) -> f64 {
        let topics: Vec<&Topic> = self.modules.iter().flat_map(|m| m.topics.iter()).collect();
        if topics.is_empty() {
            return 0.0;
        }
        let total: i32 = topics.iter().map(|t| t.completion_status).sum();
        total as f64 / topics.len() as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub course: Course,
    pub module_count: i64,
    pub topic_count: i64,
    pub avg_completion: f64,
}

/// Topic completion as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion(i32);

impl Completion {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 100;

    pub fn new(value: i32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidCompletion(value))
        }
    }

    /// Moves by `delta`, clamping to the valid range.
    pub fn step(current: i32, delta: i32) -> Self {
        Self(current.saturating_add(delta).clamp(Self::MIN, Self::MAX))
    }

    pub fn done() -> Self {
        Self(Self::MAX)
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

/// Topic importance rank, 0 meaning unrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Importance(i32);

impl Importance {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 5;

    pub fn new(value: i32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidImportance(value))
        }
    }

    pub fn step(current: i32, delta: i32) -> Self {
        Self(current.saturating_add(delta).clamp(Self::MIN, Self::MAX))
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }

    pub fn label_for(value: i32) -> &'static str {
        match value {
            0 => "Unrated",
            1 => "Minor",
            2 => "Low",
            3 => "Medium",
            4 => "High",
            5 => "Critical",
            _ => "Unknown",
        }
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
