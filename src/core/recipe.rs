//! Recipe and step definitions plus the flat step wire format.
//!
//! Recipes are read-only values shared between every session that selected
//! them. Field names follow the camelCase wire format clients already speak.

use serde::{Deserialize, Serialize};

/// Wait requirement attached to a blockable step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRequirement {
    /// Human-readable duration such as `"15分钟"` or `"1h 30m"`.
    pub duration: String,
}

/// A single instruction inside a recipe.
///
/// # Example
///
/// ```rust
/// use cookflow::core::Step;
///
/// let step = Step::blockable(2, "Simmer with the lid on", "40 minutes");
/// assert!(step.is_blockable);
/// assert_eq!(step.duration(), Some("40 minutes"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// 1-based ordinal position as written in the recipe.
    pub step_number: u32,
    pub description: String,
    #[serde(default)]
    pub time_requirement: Option<TimeRequirement>,
    #[serde(default)]
    pub target_condition: Option<String>,
    #[serde(default)]
    pub heat_level: Option<String>,
    #[serde(default)]
    pub is_blockable: bool,
}

impl Step {
    /// Create an ordinary step that is served as soon as it is polled.
    pub fn normal(step_number: u32, description: impl Into<String>) -> Self {
        Self {
            step_number,
            description: description.into(),
            time_requirement: None,
            target_condition: None,
            heat_level: None,
            is_blockable: false,
        }
    }

    /// Create a step that must be started and then waits for `duration`.
    pub fn blockable(
        step_number: u32,
        description: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            time_requirement: Some(TimeRequirement {
                duration: duration.into(),
            }),
            is_blockable: true,
            ..Self::normal(step_number, description)
        }
    }

    /// Duration descriptor, if the step carries one.
    pub fn duration(&self) -> Option<&str> {
        self.time_requirement.as_ref().map(|t| t.duration.as_str())
    }
}

/// An ordered list of steps for one dish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub dish_name: String,
    pub steps: Vec<Step>,
}

impl Recipe {
    pub fn new(dish_name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            dish_name: dish_name.into(),
            steps,
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }
}

/// A step as sent to clients: `dishName` merged with every step field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub dish_name: String,
    #[serde(flatten)]
    pub step: Step,
}

impl StepView {
    pub fn new(recipe: &Recipe, step: &Step) -> Self {
        Self {
            dish_name: recipe.dish_name.clone(),
            step: step.clone(),
        }
    }

    /// Serialize to the flat JSON object clients consume.
    pub fn to_json(&self) -> String {
        // Plain strings, bools and integers cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
