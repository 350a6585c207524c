//! Default inner boardroom and emotional-state routing.

use serde::Serialize;
use serde_json::{Map, Value};

/// One advisor seat.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BoardMember {
    pub name: &'static str,
    pub tone: &'static str,
    pub domain: &'static str,
    pub function: &'static str,
}

/// Seats given to every new profile, in display order.
pub const DEFAULT_BOARDROOM: [(&str, BoardMember); 5] = [
    (
        "Oracle",
        BoardMember {
            name: "Michelle Obama",
            tone: "Wise, compassionate, prophetic",
            domain: "Legacy, values, spiritual alignment",
            function: "Keeps Everest vision in focus",
        },
    ),
    (
        "Rhythm",
        BoardMember {
            name: "Martha Stewart",
            tone: "Tactical, calm, efficient",
            domain: "Planning, systems, operations",
            function: "Maintains flow + execution cadence",
        },
    ),
    (
        "Surgeon",
        BoardMember {
            name: "Cody Sanchez",
            tone: "Intense, truth-extracting, raw",
            domain: "Identity, belief systems, inner game",
            function: "Cuts through fear, ego, confusion",
        },
    ),
    (
        "Sage",
        BoardMember {
            name: "James Baldwin",
            tone: "Razor-sharp, literary, morally unflinching",
            domain: "Truth, narrative power, cultural critique",
            function: "Exposes deep truths and sharpens your message",
        },
    ),
    (
        "Warrior",
        BoardMember {
            name: "Malcolm X",
            tone: "Fierce, assertive, justice-driven",
            domain: "Power, protection, momentum",
            function: "Defends your energy + drives bold moves",
        },
    ),
];

/// Which seat answers when the user reports a state.
pub const DEFAULT_STATE_MAP: [(&str, &str); 5] = [
    ("tired", "Oracle"),
    ("overwhelmed", "Rhythm"),
    ("doubtful", "Surgeon"),
    ("scattered", "Sage"),
    ("angry", "Warrior"),
];

pub const DEFAULT_AUTO_TEMPLATE_BEHAVIOR: &str =
    "Always offer frameworks, tools, and trackable actions when skill gaps are detected.";

pub fn default_inner_boardroom() -> Value {
    let seats: Map<String, Value> = DEFAULT_BOARDROOM
        .iter()
        .map(|(seat, member)| {
            let member = serde_json::to_value(member).unwrap_or(Value::Null);
            (seat.to_string(), member)
        })
        .collect();
    Value::Object(seats)
}

pub fn default_state_map() -> Value {
    let states: Map<String, Value> = DEFAULT_STATE_MAP
        .iter()
        .map(|(state, seat)| (state.to_string(), Value::String(seat.to_string())))
        .collect();
    Value::Object(states)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_map_points_at_existing_seats() {
        let boardroom = default_inner_boardroom();
        for (_, seat) in DEFAULT_STATE_MAP {
            assert!(boardroom.get(seat).is_some(), "missing seat {seat}");
        }
    }

    #[test]
    fn test_boardroom_shape() {
        let boardroom = default_inner_boardroom();
        assert_eq!(boardroom.as_object().unwrap().len(), 5);
        assert_eq!(boardroom["Warrior"]["name"], "Malcolm X");
        assert_eq!(boardroom["Rhythm"]["function"], "Maintains flow + execution cadence");
        assert_eq!(default_state_map()["tired"], "Oracle");
    }
}
