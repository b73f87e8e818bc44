use serde::{Deserialize, Serialize};

use crate::trip::Leg;
use crate::{CoreError, CoreResult};

pub const LEG_SEPARATOR: &str = "::";
const FIELD_SEPARATOR: char = '|';

/// Opaque per-leg parameters handed to the marketplace at listing time.
///
/// The marketplace sends them back untouched on block/extend/confirm/unblock so the
/// vendor requests can be rebuilt without fetching inventory again.
/// * `clParam1`: `origin|destination`
/// * `clParam2`: `company|route|hour|additionalFare`
/// * `clParam3`: `departure|fare`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegParams {
    #[serde(rename = "clParam1")]
    pub cl_param1: String,
    #[serde(rename = "clParam2")]
    pub cl_param2: String,
    #[serde(rename = "clParam3")]
    pub cl_param3: String,
}

/// Everything needed to address one leg in a vendor request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegRequest {
    pub origin: String,
    pub destination: String,
    pub company: String,
    pub route_code: String,
    pub hour_code: String,
    pub additional_fare: bool,
    pub departure: String,
    pub fare: i64,
}

impl From<&Leg> for LegRequest {
    fn from(leg: &Leg) -> Self {
        Self {
            origin: leg.origin.clone(),
            destination: leg.destination.clone(),
            company: leg.company.clone(),
            route_code: leg.route_code.clone(),
            hour_code: leg.hour_code.clone(),
            additional_fare: leg.additional_fare,
            departure: leg.departure.clone(),
            fare: leg.fare,
        }
    }
}

impl LegParams {
    pub fn from_legs(legs: &[Leg]) -> Self {
        Self {
            cl_param1: join_legs(legs, |leg| format!("{}|{}", leg.origin, leg.destination)),
            cl_param2: join_legs(legs, |leg| {
                format!(
                    "{}|{}|{}|{}",
                    leg.company,
                    leg.route_code,
                    leg.hour_code,
                    if leg.additional_fare { 1 } else { 0 }
                )
            }),
            cl_param3: join_legs(legs, |leg| format!("{}|{}", leg.departure, leg.fare)),
        }
    }

    pub fn decode(&self) -> CoreResult<Vec<LegRequest>> {
        let places = split_legs("clParam1", &self.cl_param1, 2)?;
        let services = split_legs("clParam2", &self.cl_param2, 4)?;
        let schedules = split_legs("clParam3", &self.cl_param3, 2)?;

        if places.len() != services.len() || places.len() != schedules.len() {
            return Err(CoreError::ValidationError(format!(
                "leg parameters disagree on leg count: {}/{}/{}",
                places.len(),
                services.len(),
                schedules.len()
            )));
        }

        places
            .into_iter()
            .zip(services)
            .zip(schedules)
            .map(|((place, service), schedule)| {
                let additional_fare = match service[3].as_str() {
                    "1" => true,
                    "0" => false,
                    other => {
                        return Err(CoreError::ValidationError(format!(
                            "invalid additional fare flag '{}'",
                            other
                        )))
                    }
                };
                let fare = schedule[1].parse::<i64>().map_err(|_| {
                    CoreError::ValidationError(format!("invalid fare '{}'", schedule[1]))
                })?;

                Ok(LegRequest {
                    origin: place[0].clone(),
                    destination: place[1].clone(),
                    company: service[0].clone(),
                    route_code: service[1].clone(),
                    hour_code: service[2].clone(),
                    additional_fare,
                    departure: schedule[0].clone(),
                    fare,
                })
            })
            .collect()
    }
}

fn join_legs(legs: &[Leg], field: impl Fn(&Leg) -> String) -> String {
    legs.iter().map(field).collect::<Vec<_>>().join(LEG_SEPARATOR)
}

fn split_legs(name: &str, raw: &str, fields: usize) -> CoreResult<Vec<Vec<String>>> {
    if raw.trim().is_empty() {
        return Err(CoreError::ValidationError(format!("{} is empty", name)));
    }

    raw.split(LEG_SEPARATOR)
        .map(|leg| {
            let parts: Vec<String> = leg.split(FIELD_SEPARATOR).map(str::to_string).collect();
            if parts.len() != fields {
                return Err(CoreError::ValidationError(format!(
                    "{} leg '{}' has {} fields, expected {}",
                    name,
                    leg,
                    parts.len(),
                    fields
                )));
            }
            Ok(parts)
        })
        .collect()
}
