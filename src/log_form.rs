// src/log_form.rs
use crate::config::Units;
use crate::error::ValidationError;
use crate::plan::WorkoutLog;

const MILE_TO_KM: f64 = 1.60934;

/// Raw values of the log form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogForm {
    pub distance: String,
    pub duration: String,
    pub pace: String,
    pub avg_heart_rate: String,
    pub external_link: String,
    /// Unit the distance was entered in.
    pub units: Units,
}

impl LogForm {
    /// Pre-fills the form from an existing log, for editing.
    pub fn from_log(log: &WorkoutLog, units: Units) -> Self {
        let distance = match units {
            Units::Metric => log.distance,
            Units::Imperial => log.distance / MILE_TO_KM,
        };
        Self {
            distance: format!("{distance}"),
            duration: log.duration.clone(),
            pace: log.pace.clone(),
            avg_heart_rate: log.avg_heart_rate.map(|hr| hr.to_string()).unwrap_or_default(),
            external_link: log.external_link.clone().unwrap_or_default(),
            units,
        }
    }

    /// The form as opened for a day: pre-filled when the day is already logged.
    pub fn for_day(existing: Option<&WorkoutLog>, units: Units) -> Self {
        existing.map_or_else(
            || Self {
                units,
                ..Self::default()
            },
            |log| Self::from_log(log, units),
        )
    }

    /// Checks every field and converts the distance to kilometres.
    /// # Errors
    /// Returns `ValidationError` for the first missing or malformed field.
    pub fn validate(&self) -> Result<WorkoutLog, ValidationError> {
        let distance = required("Distance", &self.distance)?;
        let distance: f64 = distance.parse().map_err(|_| ValidationError::InvalidField {
            field: "distance",
            reason: format!("'{distance}' is not a number"),
        })?;
        if !distance.is_finite() || distance < 0.0 {
            return Err(ValidationError::InvalidField {
                field: "distance",
                reason: "must be zero or more".to_string(),
            });
        }
        let distance_km = match self.units {
            Units::Metric => distance,
            Units::Imperial => distance * MILE_TO_KM,
        };

        let duration = required("Time", &self.duration)?;
        if !is_clock_duration(duration) {
            return Err(ValidationError::InvalidField {
                field: "time",
                reason: format!("'{duration}' is not in HH:MM:SS form"),
            });
        }

        let pace = required("Pace", &self.pace)?;

        let avg_heart_rate = match self.avg_heart_rate.trim() {
            "" => None,
            hr => match hr.parse::<u32>() {
                Ok(bpm) if bpm > 0 => Some(bpm),
                _ => {
                    return Err(ValidationError::InvalidField {
                        field: "heart rate",
                        reason: format!("'{hr}' is not a positive whole number"),
                    })
                }
            },
        };

        let external_link = match self.external_link.trim() {
            "" => None,
            link if is_web_url(link) => Some(link.to_string()),
            link => {
                return Err(ValidationError::InvalidField {
                    field: "link",
                    reason: format!("'{link}' is not an http(s) URL"),
                })
            }
        };

        Ok(WorkoutLog {
            distance: distance_km,
            duration: duration.to_string(),
            pace: pace.to_string(),
            avg_heart_rate,
            external_link,
        })
    }
}

fn required<'a>(name: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(name))
    } else {
        Ok(trimmed)
    }
}

/// `H:MM:SS` or `HH:MM:SS`, minutes and seconds below 60.
fn is_clock_duration(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    let &[hours, minutes, seconds] = parts.as_slice() else {
        return false;
    };
    let two_digits_below_60 =
        |p: &str| p.len() == 2 && p.parse::<u8>().map_or(false, |v| v < 60);
    !hours.is_empty()
        && hours.len() <= 3
        && hours.bytes().all(|b| b.is_ascii_digit())
        && two_digits_below_60(minutes)
        && two_digits_below_60(seconds)
}

fn is_web_url(s: &str) -> bool {
    ["https://", "http://"].iter().any(|scheme| {
        s.len() > scheme.len()
            && s.get(..scheme.len()).map_or(false, |p| p.eq_ignore_ascii_case(scheme))
            && !s.contains(char::is_whitespace)
    })
}
