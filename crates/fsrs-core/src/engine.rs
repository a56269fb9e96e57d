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

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::fsrs::Recall;
use crate::fsrs::forgetting_curve;
use crate::fsrs::round8;
use crate::params::Parameters;
use crate::reschedule::RescheduleOptions;
use crate::reschedule::RescheduleResult;
use crate::reschedule::Rescheduler;
use crate::scheduler::Schedule;
use crate::scheduler::Scheduler;
use crate::types::card::Card;
use crate::types::card::State;
use crate::types::rating::Grade;
use crate::types::rating::Rating;
use crate::types::review_log::RecordLog;
use crate::types::review_log::RecordLogItem;
use crate::types::review_log::ReviewLog;
use crate::types::timestamp::Timestamp;

/// The entry point: a parameter set and the operations on cards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fsrs {
    params: Parameters,
}

impl Fsrs {
    pub fn new(params: Parameters) -> Self {
        Fsrs { params }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn scheduler(&self, card: &Card, now: Timestamp) -> Scheduler<'_> {
        Scheduler::new(&self.params, card, now)
    }

    /// The outcome of every possible rating.
    pub fn preview(&self, card: &Card, now: Timestamp) -> RecordLog {
        self.scheduler(card, now).preview()
    }

    /// Reviews `card` at `now`.
    pub fn next(&self, card: &Card, now: Timestamp, rating: Rating) -> Fallible<RecordLogItem> {
        self.scheduler(card, now).review(rating)
    }

    /// Probability of recalling `card` at `now`. Zero for new cards.
    pub fn retrievability(&self, card: &Card, now: Timestamp) -> Recall {
        if card.is_new() || card.stability <= 0.0 {
            return 0.0;
        }
        let elapsed = card
            .last_review
            .map(|last_review| now.days_since(last_review).max(0))
            .unwrap_or(0);
        forgetting_curve(elapsed as f64, round8(card.stability))
    }

    /// Undoes the review recorded by `log`, returning the card as it was
    /// before.
    pub fn rollback(&self, card: &Card, log: &ReviewLog) -> Fallible<Card> {
        let grade = Grade::try_from(log.rating)?;
        let Some(state) = log.state else {
            return fail(
                ErrorKind::InvalidParameter,
                "cannot roll back a log without a state",
            );
        };
        let (due, last_review, lapses) = match state {
            State::New => {
                let due = log.due.ok_or_else(|| {
                    ErrorReport::new(
                        ErrorKind::InvalidParameter,
                        "cannot roll back a new card without a due date",
                    )
                })?;
                (due, None, 0)
            }
            State::Learning | State::Review | State::Relearning => {
                let lapsed = grade == Grade::Again && state == State::Review;
                let lapses = card.lapses.saturating_sub(u32::from(lapsed));
                (log.review, log.due, lapses)
            }
        };
        Ok(Card {
            due,
            stability: log.stability.unwrap_or(0.0),
            difficulty: log.difficulty.unwrap_or(0.0),
            elapsed_days: log.last_elapsed_days,
            scheduled_days: log.scheduled_days,
            reps: card.reps.saturating_sub(1),
            lapses,
            state,
            last_review,
        })
    }

    /// Resets `card` to new, due `now`. The review counts are kept unless
    /// `reset_count` is set.
    pub fn forget(&self, card: &Card, now: Timestamp, reset_count: bool) -> RecordLogItem {
        let scheduled_days = match card.last_review {
            Some(last_review) if !card.is_new() => now.days_since(last_review),
            _ => 0,
        };
        let log = ReviewLog {
            rating: Rating::Manual,
            state: Some(card.state),
            due: Some(card.due),
            stability: Some(card.stability),
            difficulty: Some(card.difficulty),
            elapsed_days: 0,
            last_elapsed_days: card.elapsed_days,
            scheduled_days,
            review: now,
        };
        let mut forgotten = Card::new(now);
        if !reset_count {
            forgotten.reps = card.reps;
            forgotten.lapses = card.lapses;
        }
        RecordLogItem {
            card: forgotten,
            log,
        }
    }

    /// Replays `logs` and works out how to move `current` onto the replayed
    /// schedule.
    pub fn reschedule(
        &self,
        current: &Card,
        logs: &[ReviewLog],
        options: RescheduleOptions,
    ) -> Fallible<RescheduleResult> {
        let mut logs = logs.to_vec();
        if options.sort_by_review {
            logs.sort_by_key(|log| log.review);
        }
        if options.skip_manual {
            logs.retain(|log| log.rating != Rating::Manual);
        }
        let rescheduler = Rescheduler::new(&self.params);
        let first_card = options
            .first_card
            .unwrap_or_else(|| Card::new(options.now));
        let collections = rescheduler.reschedule(&first_card, &logs)?;
        let reschedule_item = rescheduler.calculate_manual_record(
            current,
            options.now,
            collections.last(),
            options.update_memory_state,
        )?;
        Ok(RescheduleResult {
            collections,
            reschedule_item,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterConfig;
    use crate::scheduler::tests::ts;

    fn good_history() -> Vec<ReviewLog> {
        [
            "2024-09-13T00:00:00Z",
            "2024-09-13T00:00:00Z",
            "2024-09-17T00:00:00Z",
            "2024-09-28T00:00:00Z",
        ]
        .iter()
        .map(|at| ReviewLog::rated(Rating::Good, ts(at)))
        .collect()
    }

    #[test]
    fn test_next_rejects_manual() {
        let f = Fsrs::default();
        let now = ts("2022-12-29T12:30:00Z");
        let err = f.next(&Card::new(now), now, Rating::Manual).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRating);
    }

    #[test]
    fn test_preview_agrees_with_next() -> Fallible<()> {
        let f = Fsrs::default();
        let now = ts("2022-12-29T12:30:00Z");
        let card = f.next(&Card::new(now), now, Rating::Good)?.card;
        let preview = f.preview(&card, card.due);
        for (grade, item) in preview.iter() {
            assert_eq!(*item, f.next(&card, card.due, grade.into())?);
        }
        Ok(())
    }

    #[test]
    fn test_retrievability() -> Fallible<()> {
        let f = Fsrs::default();
        let created = ts("2022-12-29T12:30:00Z");
        let card = Card::new(created);
        assert_eq!(f.retrievability(&card, created), 0.0);
        let reviewed = created.add_minutes(5);
        let expected = [1.0, 1.0, 1.0, 0.89832125];
        for (grade, expected) in Grade::ALL.iter().zip(expected) {
            let item = f.next(&card, reviewed, Rating::from(*grade))?;
            let r = f.retrievability(&item.card, item.card.due);
            assert_eq!(r, expected);
            assert_eq!(f.retrievability(&item.card, reviewed), 1.0);
            // Before the last review, no time has elapsed.
            assert_eq!(f.retrievability(&item.card, created.add_days(-3)), 1.0);
            let later = f.retrievability(&item.card, item.card.due.add_days(100));
            assert!((0.0..=1.0).contains(&later));
            assert!(later < 1.0);
        }
        Ok(())
    }

    #[test]
    fn test_rollback_undoes_first_review() -> Fallible<()> {
        for short_term in [true, false] {
            let f = Fsrs::new(Parameters::from_config(ParameterConfig {
                enable_short_term: Some(short_term),
                ..ParameterConfig::default()
            })?);
            let now = ts("2022-12-29T12:30:00Z");
            let empty = Card::new(now);
            for grade in Grade::ALL {
                let item = f.next(&empty, now, grade.into())?;
                assert_eq!(f.rollback(&item.card, &item.log)?, empty);
            }
        }
        Ok(())
    }

    #[test]
    fn test_rollback_undoes_later_reviews() -> Fallible<()> {
        let f = Fsrs::default();
        let mut now = ts("2022-12-29T12:30:00Z");
        let mut card = Card::new(now);
        for rating in [Rating::Good, Rating::Good, Rating::Again, Rating::Hard] {
            let item = f.next(&card, now, rating)?;
            let previous = f.rollback(&item.card, &item.log)?;
            assert_eq!(previous.due, card.due);
            assert_eq!(previous.stability, card.stability);
            assert_eq!(previous.difficulty, card.difficulty);
            assert_eq!(previous.reps, card.reps);
            assert_eq!(previous.lapses, card.lapses);
            assert_eq!(previous.state, card.state);
            card = item.card;
            now = card.due;
        }
        Ok(())
    }

    #[test]
    fn test_rollback_errors() {
        let f = Fsrs::default();
        let now = ts("2022-12-29T12:30:00Z");
        let card = Card::new(now);
        let mut log = ReviewLog::rated(Rating::Good, now);
        let err = f.rollback(&card, &log).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        log.state = Some(State::New);
        let err = f.rollback(&card, &log).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        log.rating = Rating::Manual;
        let err = f.rollback(&card, &log).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRating);
    }

    #[test]
    fn test_forget() -> Fallible<()> {
        let f = Fsrs::default();
        let mut now = ts("2022-12-29T12:30:00Z");
        let mut card = Card::new(now);
        for rating in [Rating::Good, Rating::Good, Rating::Good, Rating::Again] {
            card = f.next(&card, now, rating)?.card;
            now = card.due;
        }
        let forget_at = now.add_days(3);
        let item = f.forget(&card, forget_at, true);
        assert_eq!(item.card, Card::new(forget_at));
        assert_eq!(item.log.rating, Rating::Manual);
        assert_eq!(item.log.state, Some(card.state));
        assert_eq!(item.log.due, Some(card.due));
        assert_eq!(item.log.stability, Some(card.stability));
        assert_eq!(item.log.elapsed_days, 0);
        assert_eq!(item.log.last_elapsed_days, card.elapsed_days);
        assert_eq!(item.log.scheduled_days, 3);
        let err = f.rollback(&item.card, &item.log).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRating);

        let kept = f.forget(&card, forget_at, false);
        assert_eq!(kept.card.reps, card.reps);
        assert_eq!(kept.card.lapses, card.lapses);
        assert_eq!(kept.card.state, State::New);
        assert_eq!(kept.card.last_review, None);
        Ok(())
    }

    #[test]
    fn test_forget_new_card() {
        let f = Fsrs::default();
        let now = ts("2022-12-29T12:30:00Z");
        let item = f.forget(&Card::new(now), now.add_days(10), true);
        assert_eq!(item.log.scheduled_days, 0);
        assert_eq!(item.card.due, now.add_days(10));
    }

    #[test]
    fn test_reschedule_short_and_long_term() -> Fallible<()> {
        let options = RescheduleOptions {
            skip_manual: false,
            ..RescheduleOptions::new(ts("2024-10-01T00:00:00Z"))
        };
        let current = Card::new(ts("2024-08-11T01:00:00Z"));

        let f = Fsrs::default();
        let result = f.reschedule(&current, &good_history(), options.clone())?;
        assert!(result.reschedule_item.is_some());
        let items = &result.collections;
        let intervals: Vec<i64> = items.iter().map(|i| i.card.scheduled_days).collect();
        let stability: Vec<f64> = items.iter().map(|i| i.card.stability).collect();
        let difficulty: Vec<f64> = items.iter().map(|i| i.card.difficulty).collect();
        assert_eq!(intervals, [0, 4, 14, 38]);
        assert_eq!(stability, [3.173, 4.46685806, 14.21728391, 37.90805078]);
        assert_eq!(difficulty, [5.28243442, 5.27296793, 5.26354498, 5.25416538]);

        let f = Fsrs::new(Parameters::from_config(ParameterConfig {
            enable_short_term: Some(false),
            ..ParameterConfig::default()
        })?);
        let result = f.reschedule(&current, &good_history(), options)?;
        assert!(result.reschedule_item.is_some());
        let items = &result.collections;
        let intervals: Vec<i64> = items.iter().map(|i| i.card.scheduled_days).collect();
        let stability: Vec<f64> = items.iter().map(|i| i.card.stability).collect();
        assert_eq!(intervals, [3, 4, 13, 37]);
        assert_eq!(stability, [3.173, 3.173, 12.96611898, 36.73449305]);
        Ok(())
    }

    #[test]
    fn test_reschedule_current_card_already_matches() -> Fallible<()> {
        let f = Fsrs::default();
        let current = Card {
            due: ts("2024-11-05T00:00:00Z"),
            stability: 37.90805078,
            difficulty: 5.25416538,
            elapsed_days: 11,
            scheduled_days: 9,
            reps: 5,
            lapses: 0,
            state: State::Review,
            last_review: Some(ts("2024-10-27T00:00:00Z")),
        };
        let options = RescheduleOptions {
            skip_manual: false,
            update_memory_state: true,
            first_card: Some(Card::new(ts("2024-08-13T00:00:00Z"))),
            ..RescheduleOptions::new(ts("2024-09-27T00:00:00Z"))
        };
        let result = f.reschedule(&current, &good_history(), options)?;
        assert_eq!(result.reschedule_item, None);
        Ok(())
    }

    #[test]
    fn test_reschedule_after_forget() -> Fallible<()> {
        let f = Fsrs::default();
        let history = good_history();
        let mut card = Card::new(ts("2024-08-11T01:00:00Z"));
        for log in &history {
            card = f.next(&card, log.review, log.rating)?.card;
        }
        let forget_at = ts("2024-10-27T00:00:00Z");
        let forgotten = f.forget(&card, forget_at, false);
        let mut logs = history.clone();
        logs.push(forgotten.log.clone());
        let options = RescheduleOptions {
            update_memory_state: true,
            first_card: Some(Card::new(ts("2024-09-28T00:00:00Z"))),
            ..RescheduleOptions::new(forget_at)
        };
        let result = f.reschedule(&forgotten.card, &logs, options)?;
        assert_eq!(result.collections.len(), 4);
        let item = result
            .reschedule_item
            .ok_or_else(|| ErrorReport::new(ErrorKind::InvalidParameter, "no record"))?;
        assert_eq!(item.card.due, card.due);
        assert_eq!(item.card.stability, card.stability);
        assert_eq!(item.card.difficulty, card.difficulty);
        Ok(())
    }

    #[test]
    fn test_reschedule_sorts_when_asked() -> Fallible<()> {
        let f = Fsrs::default();
        let mut shuffled = good_history();
        shuffled.reverse();
        let now = ts("2024-10-01T00:00:00Z");
        let current = Card::new(now);
        let sorted = f.reschedule(&current, &good_history(), RescheduleOptions::new(now))?;
        let options = RescheduleOptions {
            sort_by_review: true,
            ..RescheduleOptions::new(now)
        };
        let resorted = f.reschedule(&current, &shuffled, options)?;
        assert_eq!(sorted, resorted);
        Ok(())
    }
}
