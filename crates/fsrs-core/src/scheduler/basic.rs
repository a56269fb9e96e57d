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

use crate::fsrs::forgetting_curve;
use crate::fsrs::initial_difficulty;
use crate::fsrs::initial_stability;
use crate::fsrs::next_difficulty;
use crate::fsrs::next_interval;
use crate::fsrs::next_lapse_stability;
use crate::fsrs::next_recall_stability;
use crate::fsrs::next_short_term_stability;
use crate::params::Parameters;
use crate::scheduler::Base;
use crate::scheduler::Schedule;
use crate::types::card::Card;
use crate::types::card::State;
use crate::types::rating::Grade;
use crate::types::review_log::RecordLog;
use crate::types::review_log::RecordLogItem;
use crate::types::timestamp::Timestamp;

/// Minutes until a new card is shown again after Again, Hard and Good.
const NEW_STEPS: [i64; 3] = [1, 5, 10];
/// Minutes until a learning card is shown again after Again and Hard.
const LEARNING_STEPS: [i64; 2] = [5, 10];
/// Minutes until a lapsed card is shown again.
const RELEARNING_STEP: i64 = 5;

/// The scheduler with sub-day learning steps.
pub struct BasicScheduler<'a> {
    base: Base<'a>,
}

impl<'a> BasicScheduler<'a> {
    pub fn new(params: &'a Parameters, card: &Card, now: Timestamp) -> Self {
        BasicScheduler {
            base: Base::new(params, card, now),
        }
    }

    fn interval(&self, stability: f64) -> i64 {
        let base = &self.base;
        next_interval(
            base.params,
            stability,
            base.current.elapsed_days,
            &base.seed,
        )
    }

    fn new_state(&mut self, grade: Grade) -> RecordLogItem {
        let p = self.base.params;
        let now = self.base.now;
        let mut next = self.base.current.clone();
        next.difficulty = initial_difficulty(p, grade);
        next.stability = initial_stability(p, grade);
        let step = match grade {
            Grade::Again => Some(NEW_STEPS[0]),
            Grade::Hard => Some(NEW_STEPS[1]),
            Grade::Good => Some(NEW_STEPS[2]),
            Grade::Easy => None,
        };
        match step {
            Some(minutes) => {
                next.scheduled_days = 0;
                next.due = now.add_minutes(minutes);
                next.state = State::Learning;
            }
            None => {
                let ivl = self.interval(next.stability);
                next.scheduled_days = ivl;
                next.due = now.add_days(ivl);
                next.state = State::Review;
            }
        }
        let item = self.base.item(grade, next);
        self.base.remember(grade, &item);
        item
    }

    fn learning_state(&mut self, grade: Grade) -> RecordLogItem {
        let p = self.base.params;
        let now = self.base.now;
        let last = &self.base.last;
        let mut next = self.base.current.clone();
        next.difficulty = next_difficulty(p, last.difficulty, grade);
        next.stability = next_short_term_stability(p, last.stability, grade);
        match grade {
            Grade::Again | Grade::Hard => {
                let minutes = if grade == Grade::Again {
                    LEARNING_STEPS[0]
                } else {
                    LEARNING_STEPS[1]
                };
                next.scheduled_days = 0;
                next.due = now.add_minutes(minutes);
                next.state = last.state;
            }
            Grade::Good => {
                let ivl = self.interval(next.stability);
                next.scheduled_days = ivl;
                next.due = now.add_days(ivl);
                next.state = State::Review;
            }
            Grade::Easy => {
                let good_stability = next_short_term_stability(p, last.stability, Grade::Good);
                let good_ivl = self.interval(good_stability);
                let ivl = i64::max(self.interval(next.stability), good_ivl + 1);
                next.scheduled_days = ivl;
                next.due = now.add_days(ivl);
                next.state = State::Review;
            }
        }
        let item = self.base.item(grade, next);
        self.base.remember(grade, &item);
        item
    }

    fn review_state(&mut self, grade: Grade) -> RecordLogItem {
        let p = self.base.params;
        let now = self.base.now;
        let last = &self.base.last;
        let (d, s) = (last.difficulty, last.stability);
        let r = forgetting_curve(self.base.current.elapsed_days as f64, s);

        let mut again = self.base.current.clone();
        let mut hard = self.base.current.clone();
        let mut good = self.base.current.clone();
        let mut easy = self.base.current.clone();

        again.difficulty = next_difficulty(p, d, Grade::Again);
        again.stability = next_lapse_stability(p, d, s, r);
        hard.difficulty = next_difficulty(p, d, Grade::Hard);
        hard.stability = next_recall_stability(p, d, s, r, Grade::Hard);
        good.difficulty = next_difficulty(p, d, Grade::Good);
        good.stability = next_recall_stability(p, d, s, r, Grade::Good);
        easy.difficulty = next_difficulty(p, d, Grade::Easy);
        easy.stability = next_recall_stability(p, d, s, r, Grade::Easy);

        // Hard <= Good < Easy.
        let mut hard_ivl = self.interval(hard.stability);
        let mut good_ivl = self.interval(good.stability);
        hard_ivl = hard_ivl.min(good_ivl);
        good_ivl = good_ivl.max(hard_ivl + 1);
        let easy_ivl = self.interval(easy.stability).max(good_ivl + 1);

        again.scheduled_days = 0;
        again.due = now.add_minutes(RELEARNING_STEP);
        again.state = State::Relearning;
        again.lapses = again.lapses.saturating_add(1);
        for (card, ivl) in [
            (&mut hard, hard_ivl),
            (&mut good, good_ivl),
            (&mut easy, easy_ivl),
        ] {
            card.scheduled_days = ivl;
            card.due = now.add_days(ivl);
            card.state = State::Review;
        }

        let log = RecordLog {
            again: self.base.item(Grade::Again, again),
            hard: self.base.item(Grade::Hard, hard),
            good: self.base.item(Grade::Good, good),
            easy: self.base.item(Grade::Easy, easy),
        };
        self.base.remember_all(log, grade)
    }
}

impl Schedule for BasicScheduler<'_> {
    fn review_grade(&mut self, grade: Grade) -> RecordLogItem {
        if let Some(item) = self.base.cached(grade) {
            return item;
        }
        match self.base.last.state {
            State::New => self.new_state(grade),
            State::Learning | State::Relearning => self.learning_state(grade),
            State::Review => self.review_state(grade),
        }
    }
}
