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

//! Turns a card snapshot and a review instant into the four possible review
//! outcomes.
//!
//! Two variants share one snapshot of the card. [`BasicScheduler`] has sub-day
//! learning steps for new and lapsed cards; [`LongTermScheduler`] schedules
//! every outcome in whole days. [`Scheduler`] picks one from the parameters.

mod basic;
mod long_term;

use std::collections::HashMap;

pub use basic::BasicScheduler;
pub use long_term::LongTermScheduler;

use crate::error::Fallible;
use crate::params::Parameters;
use crate::types::card::Card;
use crate::types::rating::Grade;
use crate::types::rating::Rating;
use crate::types::review_log::RecordLog;
use crate::types::review_log::RecordLogItem;
use crate::types::review_log::ReviewLog;
use crate::types::timestamp::Timestamp;

/// Something that can review a card.
pub trait Schedule {
    /// The outcome of reviewing with `grade`. Outcomes are computed once per
    /// scheduler and cached.
    fn review_grade(&mut self, grade: Grade) -> RecordLogItem;

    /// Like [`Schedule::review_grade`], but rejects `Rating::Manual`.
    fn review(&mut self, rating: Rating) -> Fallible<RecordLogItem> {
        let grade = Grade::try_from(rating)?;
        Ok(self.review_grade(grade))
    }

    /// All four outcomes.
    fn preview(&mut self) -> RecordLog {
        RecordLog {
            again: self.review_grade(Grade::Again),
            hard: self.review_grade(Grade::Hard),
            good: self.review_grade(Grade::Good),
            easy: self.review_grade(Grade::Easy),
        }
    }
}

/// The snapshot shared by both variants.
pub(crate) struct Base<'a> {
    pub(crate) params: &'a Parameters,
    /// The card as it was passed in.
    pub(crate) last: Card,
    /// The card with this review's elapsed days, reps and review instant.
    pub(crate) current: Card,
    pub(crate) now: Timestamp,
    /// Seeds the fuzz generator.
    pub(crate) seed: String,
    cache: HashMap<Grade, RecordLogItem>,
}

impl<'a> Base<'a> {
    pub fn new(params: &'a Parameters, card: &Card, now: Timestamp) -> Self {
        let mut current = card.clone();
        current.elapsed_days = match card.last_review {
            Some(last_review) if !card.is_new() => now.days_since(last_review).max(0),
            _ => 0,
        };
        current.reps = current.reps.saturating_add(1);
        current.last_review = Some(now);
        let seed = format!(
            "{}_{}_{}",
            now.unix_millis(),
            current.reps,
            current.difficulty * current.stability
        );
        log::debug!(
            "Scheduling {} card at {now}: {} days elapsed.",
            card.state.as_str(),
            current.elapsed_days
        );
        Base {
            params,
            last: card.clone(),
            current,
            now,
            seed,
            cache: HashMap::new(),
        }
    }

    pub fn build_log(&self, grade: Grade) -> ReviewLog {
        ReviewLog {
            rating: grade.into(),
            state: Some(self.current.state),
            due: Some(self.last.last_review.unwrap_or(self.last.due)),
            stability: Some(self.current.stability),
            difficulty: Some(self.current.difficulty),
            elapsed_days: self.current.elapsed_days,
            last_elapsed_days: self.last.elapsed_days,
            scheduled_days: self.current.scheduled_days,
            review: self.now,
        }
    }

    pub fn item(&self, grade: Grade, card: Card) -> RecordLogItem {
        RecordLogItem {
            card,
            log: self.build_log(grade),
        }
    }

    pub(crate) fn cached(&self, grade: Grade) -> Option<RecordLogItem> {
        self.cache.get(&grade).cloned()
    }

    pub(crate) fn remember(&mut self, grade: Grade, item: &RecordLogItem) {
        self.cache.insert(grade, item.clone());
    }

    /// Caches every outcome and hands back the requested one.
    pub(crate) fn remember_all(&mut self, log: RecordLog, grade: Grade) -> RecordLogItem {
        for (g, item) in log.iter() {
            self.cache.insert(g, item.clone());
        }
        log.into_item(grade)
    }
}

/// The variant selected by `enable_short_term`.
pub enum Scheduler<'a> {
    Basic(BasicScheduler<'a>),
    LongTerm(LongTermScheduler<'a>),
}

impl<'a> Scheduler<'a> {
    pub fn new(params: &'a Parameters, card: &Card, now: Timestamp) -> Self {
        if params.enable_short_term() {
            Scheduler::Basic(BasicScheduler::new(params, card, now))
        } else {
            Scheduler::LongTerm(LongTermScheduler::new(params, card, now))
        }
    }
}

impl Schedule for Scheduler<'_> {
    fn review_grade(&mut self, grade: Grade) -> RecordLogItem {
        match self {
            Scheduler::Basic(s) => s.review_grade(grade),
            Scheduler::LongTerm(s) => s.review_grade(grade),
        }
    }
}
