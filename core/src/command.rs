use crate::types::{Field, LARGE_STEP, SMALL_STEP};
use serde::{Deserialize, Serialize};

/// Every mutation a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum CityCommand {
    Adjust { field: Field, delta: i64 },
    Undo,
    /// `confirmed` carries the answer of the caller's confirmation prompt.
    Reset { confirmed: bool },
}

impl CityCommand {
    pub fn name(&self) -> &'static str {
        match self {
            CityCommand::Adjust { .. } => "adjust",
            CityCommand::Undo          => "undo",
            CityCommand::Reset { .. }  => "reset",
        }
    }

    /// The eight button bindings, keyed by their short input code.
    ///
    /// Lowercase is the small step, uppercase the large one.
    pub fn from_shortcut(code: &str) -> Option<Self> {
        let (field, magnitude, sign) = match code {
            "c+" => (Field::Capacity,   SMALL_STEP,  1),
            "c-" => (Field::Capacity,   SMALL_STEP, -1),
            "C+" => (Field::Capacity,   LARGE_STEP,  1),
            "C-" => (Field::Capacity,   LARGE_STEP, -1),
            "p+" => (Field::Population, SMALL_STEP,  1),
            "p-" => (Field::Population, SMALL_STEP, -1),
            "P+" => (Field::Population, LARGE_STEP,  1),
            "P-" => (Field::Population, LARGE_STEP, -1),
            "u"  => return Some(CityCommand::Undo),
            _ => return None,
        };
        Some(CityCommand::Adjust { field, delta: magnitude * sign })
    }
}
