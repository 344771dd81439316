use serde::{Deserialize, Serialize};

use super::{name_rule, school_rule, tenant_name_key, Collection, Invariant, Related, Resource, Scope, MINUTES_PER_DAY};
use crate::error::ApiError;
use crate::validation::FieldRule;

/// Daily shift window in minutes from midnight, split into class units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(rename = "school_id")]
    pub school_id: String,
    pub name: String,
    pub day_start: i64,
    pub shift_number_minutes: i64,
    pub class_unit_minutes: i64,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl Schedule {
    /// First minute after the shift
    pub fn day_end(&self) -> i64 {
        self.day_start + self.shift_number_minutes
    }
}

impl Resource for Schedule {
    const COLLECTION: Collection = Collection::Schedules;

    fn rules() -> Vec<FieldRule> {
        vec![
            school_rule(),
            name_rule(),
            FieldRule::body("dayStart").integer().min(0).max(MINUTES_PER_DAY - 1),
            FieldRule::body("shiftNumberMinutes").integer().min(1).max(MINUTES_PER_DAY),
            FieldRule::body("classUnitMinutes").integer().min(1).max(MINUTES_PER_DAY),
            FieldRule::body("monday").boolean(),
            FieldRule::body("tuesday").boolean(),
            FieldRule::body("wednesday").boolean(),
            FieldRule::body("thursday").boolean(),
            FieldRule::body("friday").boolean(),
            FieldRule::body("saturday").boolean(),
            FieldRule::body("sunday").boolean(),
        ]
    }

    fn invariants() -> Vec<Invariant<Self>> {
        vec![
            Invariant::Unique { field: "name", scope: Scope::Tenant },
            Invariant::References { field: "school_id", target: Collection::Schools, populate: None },
            Invariant::Check(shift_fits_in_day),
        ]
    }

    fn school_id(&self) -> Option<&str> {
        Some(&self.school_id)
    }

    fn unique_key(&self) -> Option<String> {
        Some(tenant_name_key(&self.school_id, &self.name))
    }
}

fn shift_fits_in_day(schedule: &Schedule, _: &Related) -> Result<(), ApiError> {
    if schedule.day_end() > MINUTES_PER_DAY {
        return Err(ApiError::bad_request(format!(
            "dayStart plus shiftNumberMinutes cannot exceed {} minutes",
            MINUTES_PER_DAY
        )));
    }
    if schedule.class_unit_minutes > schedule.shift_number_minutes {
        return Err(ApiError::bad_request("Shift must fit at least one class unit"));
    }
    Ok(())
}
