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

use crate::fsrs::Difficulty;
use crate::fsrs::Stability;
use crate::fsrs::forgetting_curve;
use crate::fsrs::initial_difficulty;
use crate::fsrs::initial_stability;
use crate::fsrs::next_difficulty;
use crate::fsrs::next_interval;
use crate::fsrs::next_lapse_stability;
use crate::fsrs::next_recall_stability;
use crate::params::Parameters;
use crate::scheduler::Base;
use crate::scheduler::Schedule;
use crate::types::card::Card;
use crate::types::card::State;
use crate::types::rating::Grade;
use crate::types::review_log::RecordLog;
use crate::types::review_log::RecordLogItem;
use crate::types::timestamp::Timestamp;

/// The scheduler without sub-day steps: every outcome is a review in whole
/// days.
pub struct LongTermScheduler<'a> {
    base: Base<'a>,
}

impl<'a> LongTermScheduler<'a> {
    pub fn new(params: &'a Parameters, card: &Card, now: Timestamp) -> Self {
        LongTermScheduler {
            base: Base::new(params, card, now),
        }
    }

    fn new_state(&mut self, grade: Grade) -> RecordLogItem {
        let p = self.base.params;
        self.base.current.scheduled_days = 0;
        self.base.current.elapsed_days = 0;
        let memory = Grade::ALL.map(|g| (initial_difficulty(p, g), initial_stability(p, g)));
        self.schedule(memory, false, grade)
    }

    fn review_state(&mut self, grade: Grade) -> RecordLogItem {
        let p = self.base.params;
        let last = &self.base.last;
        let (d, s) = (last.difficulty, last.stability);
        let r = forgetting_curve(self.base.current.elapsed_days as f64, s);
        let memory = [
            (
                next_difficulty(p, d, Grade::Again),
                next_lapse_stability(p, d, s, r),
            ),
            (
                next_difficulty(p, d, Grade::Hard),
                next_recall_stability(p, d, s, r, Grade::Hard),
            ),
            (
                next_difficulty(p, d, Grade::Good),
                next_recall_stability(p, d, s, r, Grade::Good),
            ),
            (
                next_difficulty(p, d, Grade::Easy),
                next_recall_stability(p, d, s, r, Grade::Easy),
            ),
        ];
        self.schedule(memory, true, grade)
    }

    /// Builds all four outcomes from their memory states, indexed like
    /// [`Grade::ALL`], and caches them.
    fn schedule(
        &mut self,
        memory: [(Difficulty, Stability); 4],
        lapse: bool,
        grade: Grade,
    ) -> RecordLogItem {
        let base = &self.base;
        let elapsed = base.current.elapsed_days;
        let [again, hard, good, easy] =
            memory.map(|(_, s)| next_interval(base.params, s, elapsed, &base.seed));
        // Again < Hard < Good < Easy.
        let again = again.min(hard);
        let hard = hard.max(again + 1);
        let good = good.max(hard + 1);
        let easy = easy.max(good + 1);
        let intervals = [again, hard, good, easy];
        let cards = std::array::from_fn::<Card, 4, _>(|i| {
            let (difficulty, stability) = memory[i];
            let mut card = base.current.clone();
            card.difficulty = difficulty;
            card.stability = stability;
            card.scheduled_days = intervals[i];
            card.due = base.now.add_days(intervals[i]);
            card.state = State::Review;
            card
        });
        let [mut again, hard, good, easy] = cards;
        if lapse {
            again.lapses = again.lapses.saturating_add(1);
        }
        let log = RecordLog {
            again: base.item(Grade::Again, again),
            hard: base.item(Grade::Hard, hard),
            good: base.item(Grade::Good, good),
            easy: base.item(Grade::Easy, easy),
        };
        self.base.remember_all(log, grade)
    }
}

impl Schedule for LongTermScheduler<'_> {
    fn review_grade(&mut self, grade: Grade) -> RecordLogItem {
        if let Some(item) = self.base.cached(grade) {
            return item;
        }
        match self.base.last.state {
            State::New => self.new_state(grade),
            State::Learning | State::Relearning | State::Review => self.review_state(grade),
        }
    }
}
