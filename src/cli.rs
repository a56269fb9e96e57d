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

use clap::Args;
use clap::Parser;
use fsrs_core::engine::Fsrs;
use fsrs_core::error::Fallible;
use fsrs_core::reschedule::RescheduleOptions;
use fsrs_core::types::card::Card;
use fsrs_core::types::rating::Rating;
use fsrs_core::types::review_log::ReviewLog;
use fsrs_core::types::timestamp::DEFAULT_LABEL_UNITS;
use fsrs_core::types::timestamp::Timestamp;
use serde::Serialize;
use serde_json::json;

use crate::config::load_parameters;
use crate::config::read_json;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Print an empty card.
    New {
        /// When the card is due. By default, the current time is used.
        #[arg(long)]
        now: Option<String>,
    },
    /// Show the outcome of every rating without committing to one.
    Preview {
        /// Path to the card JSON, or `-` for standard input.
        #[arg(long)]
        card: String,
        #[command(flatten)]
        options: Options,
    },
    /// Review a card.
    Review {
        /// Path to the card JSON, or `-` for standard input.
        #[arg(long)]
        card: String,
        /// One of again, hard, good, easy.
        #[arg(long)]
        rating: String,
        #[command(flatten)]
        options: Options,
    },
    /// Undo the review recorded by a log.
    Rollback {
        /// Path to the card JSON, or `-` for standard input.
        #[arg(long)]
        card: String,
        /// Path to the review log JSON.
        #[arg(long)]
        log: String,
    },
    /// Reset a card to new.
    Forget {
        /// Path to the card JSON, or `-` for standard input.
        #[arg(long)]
        card: String,
        /// Also reset the review and lapse counts.
        #[arg(long)]
        reset_count: bool,
        #[command(flatten)]
        options: Options,
    },
    /// Replay a review history and print the corrected schedule.
    Reschedule {
        /// Path to the current card JSON.
        #[arg(long)]
        card: String,
        /// Path to a JSON array of review logs, or `-` for standard input.
        #[arg(long)]
        logs: String,
        /// Path to the card the replay starts from. By default, an empty card is used.
        #[arg(long)]
        first_card: Option<String>,
        /// Carry the replayed stability and difficulty into the correction.
        #[arg(long)]
        update_memory: bool,
        /// Replay manual entries instead of dropping them.
        #[arg(long)]
        keep_manual: bool,
        /// Sort the logs by review time before replaying.
        #[arg(long)]
        sort: bool,
        #[command(flatten)]
        options: Options,
    },
    /// Print the probability of recalling a card.
    Retrievability {
        /// Path to the card JSON, or `-` for standard input.
        #[arg(long)]
        card: String,
        #[command(flatten)]
        options: Options,
    },
}

#[derive(Args)]
struct Options {
    /// The current time, as an RFC 3339 timestamp. By default, the system clock is used.
    #[arg(long)]
    now: Option<String>,
    /// Path to a TOML file with scheduler parameters. By default, the built-in parameters are used.
    #[arg(long)]
    config: Option<String>,
}

impl Options {
    fn now(&self) -> Fallible<Timestamp> {
        parse_now(self.now.clone())
    }

    fn fsrs(&self) -> Fallible<Fsrs> {
        Ok(Fsrs::new(load_parameters(self.config.as_deref())?))
    }
}

#[derive(Serialize)]
struct PreviewEntry<'a> {
    rating: Rating,
    /// Time until the card is due, e.g. `10min`.
    interval: String,
    card: &'a Card,
    log: &'a ReviewLog,
}

fn parse_now(now: Option<String>) -> Fallible<Timestamp> {
    match now {
        Some(now) => Timestamp::try_from(now),
        None => Ok(Timestamp::now()),
    }
}

fn to_json<T: Serialize>(value: &T) -> Fallible<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    let output = execute(cli)?;
    println!("{output}");
    Ok(())
}

fn execute(cli: Command) -> Fallible<String> {
    match cli {
        Command::New { now } => to_json(&Card::new(parse_now(now)?)),
        Command::Preview { card, options } => {
            let card: Card = read_json(&card)?;
            let now = options.now()?;
            let preview = options.fsrs()?.preview(&card, now);
            let entries: Vec<PreviewEntry> = preview
                .iter()
                .map(|(grade, item)| PreviewEntry {
                    rating: grade.into(),
                    interval: item.card.due.interval_label(now, true, &DEFAULT_LABEL_UNITS),
                    card: &item.card,
                    log: &item.log,
                })
                .collect();
            to_json(&entries)
        }
        Command::Review {
            card,
            rating,
            options,
        } => {
            let card: Card = read_json(&card)?;
            let rating = Rating::try_from(rating)?;
            let item = options.fsrs()?.next(&card, options.now()?, rating)?;
            to_json(&item)
        }
        Command::Rollback { card, log } => {
            let card: Card = read_json(&card)?;
            let log: ReviewLog = read_json(&log)?;
            to_json(&Fsrs::default().rollback(&card, &log)?)
        }
        Command::Forget {
            card,
            reset_count,
            options,
        } => {
            let card: Card = read_json(&card)?;
            to_json(&options.fsrs()?.forget(&card, options.now()?, reset_count))
        }
        Command::Reschedule {
            card,
            logs,
            first_card,
            update_memory,
            keep_manual,
            sort,
            options,
        } => {
            let card: Card = read_json(&card)?;
            let logs: Vec<ReviewLog> = read_json(&logs)?;
            let first_card: Option<Card> = match first_card {
                Some(path) => Some(read_json(&path)?),
                None => None,
            };
            let reschedule = RescheduleOptions {
                first_card,
                skip_manual: !keep_manual,
                update_memory_state: update_memory,
                sort_by_review: sort,
                ..RescheduleOptions::new(options.now()?)
            };
            log::info!("Replaying {} review logs.", logs.len());
            to_json(&options.fsrs()?.reschedule(&card, &logs, reschedule)?)
        }
        Command::Retrievability { card, options } => {
            let card: Card = read_json(&card)?;
            let r = options.fsrs()?.retrievability(&card, options.now()?);
            to_json(&json!({ "retrievability": r }))
        }
    }
}
