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

use crate::fsrs::Difficulty;
use crate::fsrs::Stability;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum State {
    /// The card has never been reviewed.
    New,
    Learning,
    Review,
    /// The card lapsed and is being relearned.
    Relearning,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::New => "new",
            State::Learning => "learning",
            State::Review => "review",
            State::Relearning => "relearning",
        }
    }
}

/// The memory record for one learning item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// When the card is next due.
    pub due: Timestamp,
    /// The card's stability (an FSRS parameter).
    pub stability: Stability,
    /// The card's difficulty (an FSRS parameter).
    pub difficulty: Difficulty,
    /// Whole days between the last two reviews.
    pub elapsed_days: i64,
    /// The interval chosen at the last review, in days.
    pub scheduled_days: i64,
    /// The number of times the card has been reviewed.
    pub reps: u32,
    /// The number of times the card was forgotten while in review.
    pub lapses: u32,
    pub state: State,
    pub last_review: Option<Timestamp>,
}

impl Card {
    /// An empty card, due at `now`.
    pub fn new(now: Timestamp) -> Self {
        Card {
            due: now,
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            state: State::New,
            last_review: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.state == State::New
    }
}
