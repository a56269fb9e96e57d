// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::fail;

/// Feedback attached to a review log.
///
/// `Manual` marks an edit that did not come from the learner (forgetting a
/// card, or correcting its schedule) and can never be scheduled.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Rating {
    Manual,
    Again,
    Hard,
    Good,
    Easy,
}

/// The schedulable ratings.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    pub fn as_str(&self) -> &'static str {
        Rating::from(*self).as_str()
    }
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Manual => "manual",
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            Rating::Manual => 0,
            Rating::Again => 1,
            Rating::Hard => 2,
            Rating::Good => 3,
            Rating::Easy => 4,
        }
    }
}

impl From<Grade> for Rating {
    fn from(g: Grade) -> Rating {
        match g {
            Grade::Again => Rating::Again,
            Grade::Hard => Rating::Hard,
            Grade::Good => Rating::Good,
            Grade::Easy => Rating::Easy,
        }
    }
}

impl TryFrom<Rating> for Grade {
    type Error = ErrorReport;

    fn try_from(value: Rating) -> Result<Self, Self::Error> {
        match value {
            Rating::Manual => fail(ErrorKind::InvalidRating, "cannot review a manual rating"),
            Rating::Again => Ok(Grade::Again),
            Rating::Hard => Ok(Grade::Hard),
            Rating::Good => Ok(Grade::Good),
            Rating::Easy => Ok(Grade::Easy),
        }
    }
}

impl From<Grade> for f64 {
    fn from(g: Grade) -> f64 {
        match g {
            Grade::Again => 1.0,
            Grade::Hard => 2.0,
            Grade::Good => 3.0,
            Grade::Easy => 4.0,
        }
    }
}

impl TryFrom<String> for Rating {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "manual" => Ok(Rating::Manual),
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            _ => fail(
                ErrorKind::InvalidParameter,
                format!("invalid rating string: {value}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;
    use crate::error::Fallible;
    use crate::types::card::State;

    #[test]
    fn test_rating_string_roundtrip() -> Fallible<()> {
        let ratings = [
            Rating::Manual,
            Rating::Again,
            Rating::Hard,
            Rating::Good,
            Rating::Easy,
        ];
        for rating in ratings {
            assert_eq!(rating, Rating::try_from(rating.as_str().to_string())?);
        }
        Ok(())
    }

    /// Test the serialization format of Rating.
    #[test]
    fn test_rating_serialization_format() -> Fallible<()> {
        let ratings = [Rating::Manual, Rating::Again, Rating::Easy];
        let expected = ["Manual", "Again", "Easy"];
        for (rating, expected) in zip(ratings, expected) {
            let serialized = serde_json::to_string(&rating)?;
            assert_eq!(serialized, format!("\"{}\"", expected));
        }
        Ok(())
    }

    #[test]
    fn test_grade_strings() {
        let names: Vec<&'static str> = Grade::ALL.iter().map(Grade::as_str).collect();
        assert_eq!(names, ["again", "hard", "good", "easy"]);
        assert_eq!(State::Relearning.as_str(), "relearning");
    }

    #[test]
    fn test_invalid_rating_string() {
        let invalid_strings = ["", "forgot"];
        for s in invalid_strings {
            assert!(Rating::try_from(s.to_string()).is_err());
        }
    }

    #[test]
    fn test_manual_is_not_a_grade() {
        let err = Grade::try_from(Rating::Manual).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRating);
        for grade in Grade::ALL {
            assert_eq!(Grade::try_from(Rating::from(grade)).unwrap(), grade);
        }
    }

    #[test]
    fn test_values() {
        assert_eq!(Rating::Manual.value(), 0);
        assert_eq!(Rating::Easy.value(), 4);
        assert_eq!(f64::from(Grade::Hard), 2.0);
    }
}
