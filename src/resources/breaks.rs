use serde::{Deserialize, Serialize};

use super::{school_rule, Collection, Invariant, Related, Resource, MINUTES_PER_DAY};
use crate::error::ApiError;
use crate::validation::FieldRule;

/// Pause inside a schedule's shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Break {
    #[serde(rename = "school_id")]
    pub school_id: String,
    #[serde(rename = "schedule_id")]
    pub schedule_id: String,
    pub break_start: i64,
    pub number_minutes: i64,
}

impl Resource for Break {
    const COLLECTION: Collection = Collection::Breaks;

    fn rules() -> Vec<FieldRule> {
        vec![
            school_rule(),
            FieldRule::body("schedule_id").string().object_id(),
            FieldRule::body("breakStart").integer().min(0).max(MINUTES_PER_DAY - 1),
            FieldRule::body("numberMinutes").integer().min(1).max(MINUTES_PER_DAY),
        ]
    }

    fn invariants() -> Vec<Invariant<Self>> {
        vec![
            Invariant::References { field: "school_id", target: Collection::Schools, populate: None },
            Invariant::References { field: "schedule_id", target: Collection::Schedules, populate: None },
            Invariant::Check(fits_in_shift),
        ]
    }

    fn school_id(&self) -> Option<&str> {
        Some(&self.school_id)
    }
}

/// The break must start inside the shift and leave room for at least one
/// class unit before and after it
fn fits_in_shift(brk: &Break, related: &Related) -> Result<(), ApiError> {
    let day_start = related.int("schedule_id", "dayStart")?;
    let day_end = day_start + related.int("schedule_id", "shiftNumberMinutes")?;
    let class_unit = related.int("schedule_id", "classUnitMinutes")?;

    if brk.break_start < day_start {
        return Err(ApiError::bad_request(format!(
            "breakStart cannot be before the schedule's dayStart ({})",
            day_start
        )));
    }
    if brk.break_start - day_start < class_unit
        || day_end - (brk.break_start + brk.number_minutes) < class_unit
    {
        return Err(ApiError::bad_request(format!(
            "Break must leave at least one {} minute class unit before and after it within the shift",
            class_unit
        )));
    }
    Ok(())
}
