//! Age conventions used for rating
//!
//! Three actuarial conventions are supported:
//! - **Age Last Birthday**: completed years, increments exactly on the birthday
//! - **Age Next Birthday**: Age Last Birthday + 1, including on the birthday itself
//! - **Age Nearest Birthday**: Age Last Birthday, rounded up once the applicant is
//!   at least halfway through the current birthday-year
//!
//! All conventions assume `now >= date_of_birth`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// True when `now` falls on the anniversary of `date_of_birth` (any year)
pub fn is_birthday(date_of_birth: NaiveDate, now: NaiveDate) -> bool {
    date_of_birth.month() == now.month() && date_of_birth.day() == now.day()
}

/// True when this year's birthday is strictly behind `now`
///
/// False on the birthday itself.
pub fn birthday_passed(date_of_birth: NaiveDate, now: NaiveDate) -> bool {
    now.month() > date_of_birth.month()
        || (now.month() == date_of_birth.month() && now.day() > date_of_birth.day())
}

/// Completed years between `date_of_birth` and `now`
pub fn actual_age(date_of_birth: NaiveDate, now: NaiveDate) -> u32 {
    let mut age = now.year() - date_of_birth.year();
    if !(is_birthday(date_of_birth, now) || birthday_passed(date_of_birth, now)) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Anniversary of `date_of_birth` in `year`
///
/// A Feb 29 birthday falls on Mar 1 in non-leap years, the day `actual_age` increments.
fn anniversary(date_of_birth: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, date_of_birth.month(), date_of_birth.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// Convention for converting a birth date into a rating age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgeBasis {
    #[default]
    LastBirthday,
    NextBirthday,
    NearestBirthday,
}

impl AgeBasis {
    /// Integer age at `now` under this convention
    pub fn age(&self, date_of_birth: NaiveDate, now: NaiveDate) -> u32 {
        match self {
            AgeBasis::LastBirthday => actual_age(date_of_birth, now),
            AgeBasis::NextBirthday => actual_age(date_of_birth, now) + 1,
            AgeBasis::NearestBirthday => nearest_birthday_age(date_of_birth, now),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBasis::LastBirthday => "alb",
            AgeBasis::NextBirthday => "anb",
            AgeBasis::NearestBirthday => "nearest",
        }
    }
}

impl fmt::Display for AgeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alb" | "last" => Ok(AgeBasis::LastBirthday),
            "anb" | "next" => Ok(AgeBasis::NextBirthday),
            "nearest" => Ok(AgeBasis::NearestBirthday),
            other => Err(format!("Unknown age basis: {}", other)),
        }
    }
}

/// Fraction of the current birthday-year elapsed at `now`, in [0, 1)
///
/// Uses exact day counts, so the window is 365 or 366 days.
pub fn birthday_year_fraction(date_of_birth: NaiveDate, now: NaiveDate) -> f64 {
    let last_year = if birthday_passed(date_of_birth, now) || is_birthday(date_of_birth, now) {
        now.year()
    } else {
        now.year() - 1
    };

    let (Some(last_birthday), Some(next_birthday)) = (
        anniversary(date_of_birth, last_year),
        anniversary(date_of_birth, last_year + 1),
    ) else {
        return 0.0;
    };

    let days_in_year = (next_birthday - last_birthday).num_days() as f64;
    let days_elapsed = (now - last_birthday).num_days() as f64;
    days_elapsed / days_in_year
}

fn nearest_birthday_age(date_of_birth: NaiveDate, now: NaiveDate) -> u32 {
    let age = actual_age(date_of_birth, now);
    if is_birthday(date_of_birth, now) {
        return age;
    }

    if birthday_year_fraction(date_of_birth, now) >= 0.5 {
        age + 1
    } else {
        age
    }
}
