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

//! Rebuilding a card from its review history.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::fsrs::Difficulty;
use crate::fsrs::Stability;
use crate::params::Parameters;
use crate::scheduler::Schedule;
use crate::scheduler::Scheduler;
use crate::types::card::Card;
use crate::types::card::State;
use crate::types::rating::Rating;
use crate::types::review_log::RecordLogItem;
use crate::types::review_log::ReviewLog;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Debug, PartialEq)]
pub struct RescheduleOptions {
    /// The instant the correction record is made at.
    pub now: Timestamp,
    /// The card the replay starts from. Defaults to an empty card due `now`.
    pub first_card: Option<Card>,
    /// Drop manual entries before replaying.
    pub skip_manual: bool,
    /// Carry the replayed memory state into the correction record.
    pub update_memory_state: bool,
    /// Sort entries by review instant before replaying. The sort is stable.
    pub sort_by_review: bool,
}

impl RescheduleOptions {
    pub fn new(now: Timestamp) -> Self {
        RescheduleOptions {
            now,
            first_card: None,
            skip_manual: true,
            update_memory_state: false,
            sort_by_review: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RescheduleResult {
    /// One item per replayed entry.
    pub collections: Vec<RecordLogItem>,
    /// A manual record moving the current card onto the replayed schedule,
    /// if the two disagree.
    pub reschedule_item: Option<RecordLogItem>,
}

/// A manual edit of a card's schedule.
#[derive(Clone, Debug, PartialEq)]
pub struct ManualEdit {
    pub state: State,
    pub review: Timestamp,
    pub elapsed_days: i64,
    pub stability: Option<Stability>,
    pub difficulty: Option<Difficulty>,
    pub due: Option<Timestamp>,
}

pub struct Rescheduler<'a> {
    params: &'a Parameters,
}

impl<'a> Rescheduler<'a> {
    pub fn new(params: &'a Parameters) -> Self {
        Rescheduler { params }
    }

    /// Reviews `card` at `review`. A history entry dated before the card's
    /// last review cannot be replayed.
    pub fn replay(
        &self,
        card: &Card,
        review: Timestamp,
        rating: Rating,
    ) -> Fallible<RecordLogItem> {
        if let Some(last_review) = card.last_review {
            if review < last_review {
                return fail(
                    ErrorKind::InvalidParameter,
                    format!("review at {review} predates the last review at {last_review}"),
                );
            }
        }
        Scheduler::new(self.params, card, review).review(rating)
    }

    /// Applies a manual edit. Moving a card back to `New` empties it;
    /// any other target state needs a due date.
    pub fn handle_manual_rating(&self, card: &Card, edit: ManualEdit) -> Fallible<RecordLogItem> {
        if edit.state == State::New {
            let log = ReviewLog {
                rating: Rating::Manual,
                state: Some(State::New),
                due: Some(edit.due.unwrap_or(edit.review)),
                stability: Some(card.stability),
                difficulty: Some(card.difficulty),
                elapsed_days: edit.elapsed_days,
                last_elapsed_days: card.elapsed_days,
                scheduled_days: card.scheduled_days,
                review: edit.review,
            };
            return Ok(RecordLogItem {
                card: Card::new(edit.review),
                log,
            });
        }
        let Some(due) = edit.due else {
            return fail(
                ErrorKind::InvalidParameter,
                "a due date is required to manually schedule a card",
            );
        };
        let log = ReviewLog {
            rating: Rating::Manual,
            state: Some(card.state),
            due: Some(card.last_review.unwrap_or(card.due)),
            stability: Some(card.stability),
            difficulty: Some(card.difficulty),
            elapsed_days: edit.elapsed_days,
            last_elapsed_days: card.elapsed_days,
            scheduled_days: card.scheduled_days,
            review: edit.review,
        };
        let next = Card {
            due,
            stability: edit.stability.unwrap_or(card.stability),
            difficulty: edit.difficulty.unwrap_or(card.difficulty),
            elapsed_days: edit.elapsed_days,
            scheduled_days: due.days_since(edit.review),
            reps: card.reps.saturating_add(1),
            lapses: card.lapses,
            state: edit.state,
            last_review: Some(edit.review),
        };
        Ok(RecordLogItem { card: next, log })
    }

    /// Replays `logs` in order, starting from an empty card due when
    /// `first_card` is. A review that cannot be replayed, such as one dated
    /// before the previous entry, is logged and skipped, but a malformed
    /// manual entry fails the whole replay.
    pub fn reschedule(
        &self,
        first_card: &Card,
        logs: &[ReviewLog],
    ) -> Fallible<Vec<RecordLogItem>> {
        let mut collections = Vec::with_capacity(logs.len());
        let mut current = Card::new(first_card.due);
        for entry in logs {
            let item = if entry.rating == Rating::Manual {
                self.replay_manual(&current, entry)?
            } else {
                match self.replay(&current, entry.review, entry.rating) {
                    Ok(item) => item,
                    Err(err) => {
                        log::warn!("Skipping review at {}: {}", entry.review, err.message());
                        continue;
                    }
                }
            };
            current = item.card.clone();
            collections.push(item);
        }
        Ok(collections)
    }

    fn replay_manual(&self, card: &Card, entry: &ReviewLog) -> Fallible<RecordLogItem> {
        let state = entry.state.ok_or_else(|| {
            ErrorReport::new(
                ErrorKind::InvalidParameter,
                format!("manual entry at {} has no state", entry.review),
            )
        })?;
        let elapsed_days = match card.last_review {
            Some(last_review) if !card.is_new() => entry.review.days_since(last_review),
            _ => 0,
        };
        self.handle_manual_rating(
            card,
            ManualEdit {
                state,
                review: entry.review,
                elapsed_days,
                stability: entry.stability,
                difficulty: entry.difficulty,
                due: entry.due,
            },
        )
    }

    /// The manual record that moves `current` onto the schedule of the last
    /// replayed item, or `None` when they already agree.
    pub fn calculate_manual_record(
        &self,
        current: &Card,
        now: Timestamp,
        replayed: Option<&RecordLogItem>,
        update_memory: bool,
    ) -> Fallible<Option<RecordLogItem>> {
        let Some(replayed) = replayed else {
            return Ok(None);
        };
        let target = &replayed.card;
        if current.due == target.due {
            return Ok(None);
        }
        let mut card = current.clone();
        card.scheduled_days = target.due.days_since(current.due);
        let edit = ManualEdit {
            state: target.state,
            review: now,
            elapsed_days: replayed.log.elapsed_days,
            stability: update_memory.then_some(target.stability),
            difficulty: update_memory.then_some(target.difficulty),
            due: Some(target.due),
        };
        self.handle_manual_rating(&card, edit).map(Some)
    }
}
