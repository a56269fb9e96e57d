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

use std::ops::Index;

use serde::Deserialize;
use serde::Serialize;

use crate::fsrs::Difficulty;
use crate::fsrs::Stability;
use crate::types::card::Card;
use crate::types::card::State;
use crate::types::rating::Grade;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// One review event. The memory fields describe the card *before* the
/// review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    pub rating: Rating,
    #[serde(default)]
    pub state: Option<State>,
    /// The previous review instant, or the previous due date for a card that
    /// had never been reviewed. Manual logs use it for the target due date.
    #[serde(default)]
    pub due: Option<Timestamp>,
    #[serde(default)]
    pub stability: Option<Stability>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub elapsed_days: i64,
    #[serde(default)]
    pub last_elapsed_days: i64,
    #[serde(default)]
    pub scheduled_days: i64,
    /// When the review happened.
    pub review: Timestamp,
}

impl ReviewLog {
    /// A bare log carrying only a rating and a review instant, as found in an
    /// imported review history.
    pub fn rated(rating: Rating, review: Timestamp) -> Self {
        ReviewLog {
            rating,
            state: None,
            due: None,
            stability: None,
            difficulty: None,
            elapsed_days: 0,
            last_elapsed_days: 0,
            scheduled_days: 0,
            review,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordLogItem {
    pub card: Card,
    pub log: ReviewLog,
}

/// The four possible outcomes of one review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordLog {
    pub again: RecordLogItem,
    pub hard: RecordLogItem,
    pub good: RecordLogItem,
    pub easy: RecordLogItem,
}

impl RecordLog {
    pub fn get(&self, grade: Grade) -> &RecordLogItem {
        match grade {
            Grade::Again => &self.again,
            Grade::Hard => &self.hard,
            Grade::Good => &self.good,
            Grade::Easy => &self.easy,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Grade, &RecordLogItem)> {
        Grade::ALL.into_iter().map(move |g| (g, self.get(g)))
    }

    pub fn into_item(self, grade: Grade) -> RecordLogItem {
        match grade {
            Grade::Again => self.again,
            Grade::Hard => self.hard,
            Grade::Good => self.good,
            Grade::Easy => self.easy,
        }
    }
}

impl Index<Grade> for RecordLog {
    type Output = RecordLogItem;

    fn index(&self, grade: Grade) -> &RecordLogItem {
        self.get(grade)
    }
}
