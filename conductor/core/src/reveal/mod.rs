//! Reveal Scheduler
//!
//! Streams a response into surfaces one sentence card at a time, then commits
//! the finished response as a message.
//!
//! # State Machine
//!
//! ```text
//!            start(text)
//!   Idle ───────────────► Revealing ──(all revealed + settle_delay)──► Settling
//!    ▲                        │                                          │
//!    │        cancel()        │                                          │
//!    ├────────────────────────┘                                          │
//!    └──────────────────────(commit_delay, message committed)────────────┘
//! ```
//!
//! The first sentence appears immediately on start, each following one
//! `tick_interval` later. Once every sentence is out, the scheduler waits
//! `settle_delay` (long enough for the last card's enter animation) before
//! settling, and `commit_delay` more before committing.
//!
//! # Cancellation
//!
//! Starting a new reveal while one is active cancels the old one: its partial
//! sentences are discarded, nothing is committed, every pending continuation
//! is dropped and the epoch moves on. A continuation can only be fired if it
//! carries the current epoch and is the one step the scheduler is waiting for;
//! anything else is reported as [`Dispatch::Stale`] and changes nothing.

pub mod timeline;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::layout::{Layout, LayoutGenerator, ViewportClass};
use crate::messages::MessageId;
use crate::sentence::{self, Sentence};

pub use timeline::{Continuation, Epoch, Timeline};

/// Delay between two sentence cards
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(300);

/// Wait after the last card before settling (exceeds the card enter animation)
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(400);

/// Wait between settling and committing
pub const DEFAULT_COMMIT_DELAY: Duration = Duration::from_millis(50);

/// Reveal cadence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealTiming {
    /// Delay between sentence cards
    pub tick_interval: Duration,
    /// Delay after the last card before settling
    pub settle_delay: Duration,
    /// Delay between settling and committing
    pub commit_delay: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
            commit_delay: DEFAULT_COMMIT_DELAY,
        }
    }
}

impl RevealTiming {
    /// Time from start to commit for `sentence_count` sentences
    #[must_use]
    pub fn total_duration(&self, sentence_count: usize) -> Duration {
        self.tick_interval * sentence_count as u32 + self.settle_delay + self.commit_delay
    }
}

/// Scheduler state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchedulerState {
    /// No active reveal
    #[default]
    Idle,
    /// Sentences are being appended
    Revealing,
    /// Every sentence is out, waiting to commit
    Settling,
}

/// A step of the reveal sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealStep {
    /// Append the next sentence, or start settling when none are left
    Reveal,
    /// Enter the settling state
    Settle,
    /// Commit the message and return to idle
    Commit,
}

/// Live state of the reveal in progress
#[derive(Clone, Debug)]
pub struct RevealState {
    epoch: Epoch,
    source_text: String,
    sentences: Vec<Sentence>,
    revealed: Vec<Sentence>,
    layout: Layout,
    viewport: ViewportClass,
    started_at: Duration,
}

impl RevealState {
    /// Generation of this reveal
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// The full response text
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Sentences revealed so far, in order
    #[must_use]
    pub fn revealed(&self) -> &[Sentence] {
        &self.revealed
    }

    /// Index of the next sentence to reveal
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.revealed.len()
    }

    /// Total sentences in this reveal
    #[must_use]
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// Whether every sentence has been revealed
    #[must_use]
    pub fn is_fully_revealed(&self) -> bool {
        self.revealed.len() == self.sentences.len()
    }

    /// Grid layout, fixed at start
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Viewport class captured at start
    #[must_use]
    pub fn viewport(&self) -> ViewportClass {
        self.viewport
    }

    /// Logical time the reveal started
    #[must_use]
    pub fn started_at(&self) -> Duration {
        self.started_at
    }
}

/// A completed reveal, ready to become an assistant message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishedReveal {
    /// Generation of the reveal
    pub epoch: Epoch,
    /// Full response text
    pub text: String,
    /// Every sentence, in reveal order
    pub sentences: Vec<Sentence>,
    /// Grid layout used during the reveal
    pub layout: Layout,
}

/// Receiver of committed reveals
pub trait CommitSink {
    /// Store the finished reveal as an assistant message
    fn commit(&mut self, reveal: FinishedReveal) -> MessageId;
}

/// What happened during a scheduler call, in timeline order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealEvent {
    /// A reveal began
    Started {
        /// Generation of the reveal
        epoch: Epoch,
        /// Grid the sentences will fill
        layout: Layout,
        /// Number of sentences to reveal
        sentence_count: usize,
        /// Viewport class captured at start
        viewport: ViewportClass,
    },
    /// A sentence was appended
    SentenceRevealed {
        /// Generation of the reveal
        epoch: Epoch,
        /// Position of the sentence
        index: usize,
        /// The sentence
        sentence: Sentence,
    },
    /// Every sentence is out and the settle delay has passed
    Settling {
        /// Generation of the reveal
        epoch: Epoch,
    },
    /// The reveal was committed to the session
    Committed {
        /// Generation of the reveal
        epoch: Epoch,
        /// The new assistant message
        message_id: MessageId,
    },
    /// The reveal was discarded without committing
    Cancelled {
        /// Generation of the discarded reveal
        epoch: Epoch,
        /// How many sentences had been revealed
        revealed: usize,
    },
}

/// Outcome of firing a continuation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The step ran
    Applied(Vec<RevealEvent>),
    /// The continuation belongs to a cancelled or finished step; nothing changed
    Stale,
}

/// Timed, cancellable reveal state machine
#[derive(Debug)]
pub struct RevealScheduler<R: Rng = StdRng> {
    timing: RevealTiming,
    generator: LayoutGenerator<R>,
    timeline: Timeline<RevealStep>,
    epoch: Epoch,
    state: SchedulerState,
    reveal: Option<RevealState>,
    awaiting: Option<Continuation<RevealStep>>,
}

impl<R: Rng> RevealScheduler<R> {
    /// Create an idle scheduler
    pub fn new(timing: RevealTiming, generator: LayoutGenerator<R>) -> Self {
        Self {
            timing,
            generator,
            timeline: Timeline::new(),
            epoch: Epoch::default(),
            state: SchedulerState::Idle,
            reveal: None,
            awaiting: None,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Current epoch
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Current logical time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    /// Reveal cadence
    #[must_use]
    pub fn timing(&self) -> RevealTiming {
        self.timing
    }

    /// Live reveal, if one is active
    #[must_use]
    pub fn reveal(&self) -> Option<&RevealState> {
        self.reveal.as_ref()
    }

    /// The continuation the scheduler is waiting for
    #[must_use]
    pub fn pending(&self) -> Option<&Continuation<RevealStep>> {
        self.awaiting.as_ref()
    }

    /// Begin revealing `text`, cancelling any reveal in progress
    ///
    /// The first sentence (if any) is revealed immediately.
    pub fn start(&mut self, text: &str, viewport: ViewportClass) -> Vec<RevealEvent> {
        let mut events: Vec<RevealEvent> = self.cancel().into_iter().collect();

        self.epoch = self.epoch.next();
        let sentences = sentence::split(text);
        let layout = self.generator.generate(sentences.len(), viewport);

        tracing::debug!(
            epoch = self.epoch.0,
            sentences = sentences.len(),
            rows = layout.rows().len(),
            viewport = viewport.name(),
            "Reveal started"
        );

        events.push(RevealEvent::Started {
            epoch: self.epoch,
            layout: layout.clone(),
            sentence_count: sentences.len(),
            viewport,
        });

        self.reveal = Some(RevealState {
            epoch: self.epoch,
            source_text: text.to_string(),
            revealed: Vec::with_capacity(sentences.len()),
            sentences,
            layout,
            viewport,
            started_at: self.timeline.now(),
        });
        self.state = SchedulerState::Revealing;

        events.extend(self.reveal_next());
        events
    }

    /// Discard the active reveal without committing it
    ///
    /// Returns `None` when nothing was active.
    pub fn cancel(&mut self) -> Option<RevealEvent> {
        let dropped = self.timeline.clear();
        self.awaiting = None;
        let reveal = self.reveal.take()?;

        self.state = SchedulerState::Idle;
        self.epoch = self.epoch.next();

        tracing::debug!(
            epoch = reveal.epoch.0,
            revealed = reveal.revealed.len(),
            dropped_continuations = dropped,
            "Reveal cancelled"
        );

        Some(RevealEvent::Cancelled {
            epoch: reveal.epoch,
            revealed: reveal.revealed.len(),
        })
    }

    /// Run every step due at or before `time`, then move the clock to `time`
    pub fn advance_to(&mut self, time: Duration, sink: &mut impl CommitSink) -> Vec<RevealEvent> {
        let mut events = Vec::new();
        while let Some(continuation) = self.timeline.pop_due(time) {
            if let Dispatch::Applied(applied) = self.fire(continuation, sink) {
                events.extend(applied);
            }
        }
        self.timeline.advance_to(time);
        events
    }

    /// Run a single continuation
    ///
    /// Only the continuation the scheduler is waiting for, from the current
    /// epoch, has any effect.
    pub fn fire(
        &mut self,
        continuation: Continuation<RevealStep>,
        sink: &mut impl CommitSink,
    ) -> Dispatch {
        if continuation.epoch != self.epoch || self.awaiting.as_ref() != Some(&continuation) {
            tracing::trace!(
                epoch = continuation.epoch.0,
                current = self.epoch.0,
                step = ?continuation.step,
                "Ignoring stale continuation"
            );
            return Dispatch::Stale;
        }
        self.awaiting = None;
        self.timeline.advance_to(continuation.due);

        let events = match continuation.step {
            RevealStep::Reveal => self.reveal_next(),
            RevealStep::Settle => self.settle(),
            RevealStep::Commit => self.commit(sink),
        };
        Dispatch::Applied(events)
    }

    fn schedule(&mut self, delay: Duration, step: RevealStep) {
        let continuation = self.timeline.schedule(delay, self.epoch, step);
        self.awaiting = Some(continuation);
    }

    fn reveal_next(&mut self) -> Vec<RevealEvent> {
        let Some(reveal) = self.reveal.as_mut() else {
            return Vec::new();
        };

        if reveal.is_fully_revealed() {
            self.schedule(self.timing.settle_delay, RevealStep::Settle);
            return Vec::new();
        }

        let index = reveal.revealed.len();
        let sentence = reveal.sentences[index].clone();
        reveal.revealed.push(sentence.clone());

        tracing::trace!(epoch = self.epoch.0, index, "Sentence revealed");

        self.schedule(self.timing.tick_interval, RevealStep::Reveal);
        vec![RevealEvent::SentenceRevealed {
            epoch: self.epoch,
            index,
            sentence,
        }]
    }

    fn settle(&mut self) -> Vec<RevealEvent> {
        if self.reveal.is_none() {
            return Vec::new();
        }
        self.state = SchedulerState::Settling;
        self.schedule(self.timing.commit_delay, RevealStep::Commit);

        tracing::debug!(epoch = self.epoch.0, "Reveal settling");
        vec![RevealEvent::Settling { epoch: self.epoch }]
    }

    fn commit(&mut self, sink: &mut impl CommitSink) -> Vec<RevealEvent> {
        let Some(reveal) = self.reveal.take() else {
            return Vec::new();
        };
        self.state = SchedulerState::Idle;

        let finished = FinishedReveal {
            epoch: reveal.epoch,
            text: reveal.source_text,
            sentences: reveal.revealed,
            layout: reveal.layout,
        };
        let message_id = sink.commit(finished);

        tracing::debug!(epoch = self.epoch.0, message_id = %message_id, "Reveal committed");
        vec![RevealEvent::Committed {
            epoch: self.epoch,
            message_id,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collects commits without a session
    #[derive(Default)]
    struct RecordingSink {
        commits: Vec<FinishedReveal>,
    }

    impl CommitSink for RecordingSink {
        fn commit(&mut self, reveal: FinishedReveal) -> MessageId {
            self.commits.push(reveal);
            MessageId::new()
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn scheduler() -> RevealScheduler {
        RevealScheduler::new(RevealTiming::default(), LayoutGenerator::with_seed(11))
    }

    fn revealed_texts(scheduler: &RevealScheduler) -> Vec<String> {
        scheduler
            .reveal()
            .map(|r| r.revealed().iter().map(|s| s.text.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_first_sentence_is_immediate() {
        let mut scheduler = scheduler();
        let events = scheduler.start("One. Two. Three.", ViewportClass::Standard);

        assert!(matches!(events[0], RevealEvent::Started { sentence_count: 3, .. }));
        assert!(matches!(events[1], RevealEvent::SentenceRevealed { index: 0, .. }));
        assert_eq!(scheduler.state(), SchedulerState::Revealing);
        assert_eq!(revealed_texts(&scheduler), vec!["One."]);
    }

    #[test]
    fn test_ticks_follow_interval() {
        let mut scheduler = scheduler();
        let mut sink = RecordingSink::default();
        scheduler.start("One. Two. Three.", ViewportClass::Standard);

        scheduler.advance_to(ms(299), &mut sink);
        assert_eq!(revealed_texts(&scheduler).len(), 1);

        scheduler.advance_to(ms(300), &mut sink);
        assert_eq!(revealed_texts(&scheduler).len(), 2);

        scheduler.advance_to(ms(600), &mut sink);
        assert_eq!(revealed_texts(&scheduler), vec!["One.", "Two.", "Three."]);
        assert_eq!(scheduler.state(), SchedulerState::Revealing);
    }

    #[test]
    fn test_full_cycle_commits_once() {
        let mut scheduler = scheduler();
        let mut sink = RecordingSink::default();
        scheduler.start("One. Two. Three.", ViewportClass::Standard);

        scheduler.advance_to(ms(1299), &mut sink);
        assert_eq!(scheduler.state(), SchedulerState::Settling);
        assert!(sink.commits.is_empty());

        let events = scheduler.advance_to(ms(1350), &mut sink);
        assert!(matches!(events.last(), Some(RevealEvent::Committed { .. })));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.reveal().is_none());
        assert_eq!(sink.commits.len(), 1);
        assert_eq!(sink.commits[0].sentences.len(), 3);
        assert_eq!(sink.commits[0].layout.slot_count(), 3);

        scheduler.advance_to(ms(10_000), &mut sink);
        assert_eq!(sink.commits.len(), 1);
    }

    #[test]
    fn test_settling_starts_after_settle_delay() {
        let mut scheduler = scheduler();
        let mut sink = RecordingSink::default();
        scheduler.start("One. Two.", ViewportClass::Standard);

        // Last card at 300, exhaustion noticed at 600, settle at 1000.
        scheduler.advance_to(ms(999), &mut sink);
        assert_eq!(scheduler.state(), SchedulerState::Revealing);
        let events = scheduler.advance_to(ms(1000), &mut sink);
        assert_eq!(events, vec![RevealEvent::Settling { epoch: scheduler.epoch() }]);
    }

    #[test]
    fn test_empty_text_skips_reveal_ticks() {
        let mut scheduler = scheduler();
        let mut sink = RecordingSink::default();
        let events = scheduler.start("", ViewportClass::Standard);

        assert_eq!(events.len(), 1);
        assert_eq!(
            scheduler.pending().map(|c| c.step),
            Some(RevealStep::Settle)
        );

        let events = scheduler.advance_to(ms(450), &mut sink);
        assert!(events
            .iter()
            .all(|e| !matches!(e, RevealEvent::SentenceRevealed { .. })));
        assert_eq!(sink.commits.len(), 1);
        assert!(sink.commits[0].sentences.is_empty());
        assert!(sink.commits[0].layout.is_empty());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_restart_cancels_previous() {
        let mut scheduler = scheduler();
        let mut sink = RecordingSink::default();
        scheduler.start("A one. A two. A three.", ViewportClass::Standard);
        scheduler.advance_to(ms(300), &mut sink);
        let first_epoch = scheduler.epoch();

        let events = scheduler.start("B one. B two.", ViewportClass::Standard);
        assert_eq!(
            events[0],
            RevealEvent::Cancelled {
                epoch: first_epoch,
                revealed: 2
            }
        );
        assert!(scheduler.epoch() > first_epoch);
        assert_eq!(revealed_texts(&scheduler), vec!["B one."]);
    }

    #[test]
    fn test_stale_continuation_is_noop() {
        let mut scheduler = scheduler();
        let mut sink = RecordingSink::default();
        scheduler.start("A one. A two.", ViewportClass::Standard);
        let stale = scheduler.pending().cloned().expect("pending tick");

        scheduler.start("B one. B two.", ViewportClass::Standard);
        assert_eq!(scheduler.fire(stale, &mut sink), Dispatch::Stale);
        assert_eq!(revealed_texts(&scheduler), vec!["B one."]);
    }

    #[test]
    fn test_duplicate_fire_is_noop() {
        let mut scheduler = scheduler();
        let mut sink = RecordingSink::default();
        scheduler.start("One. Two. Three.", ViewportClass::Standard);
        let tick = scheduler.pending().cloned().expect("pending tick");

        assert!(matches!(
            scheduler.fire(tick.clone(), &mut sink),
            Dispatch::Applied(_)
        ));
        assert_eq!(scheduler.fire(tick, &mut sink), Dispatch::Stale);
        assert_eq!(revealed_texts(&scheduler).len(), 2);
    }

    #[test]
    fn test_cancel_when_idle() {
        let mut scheduler = scheduler();
        assert!(scheduler.cancel().is_none());
        assert_eq!(scheduler.epoch(), Epoch::default());
    }

    #[test]
    fn test_total_duration() {
        let timing = RevealTiming::default();
        assert_eq!(timing.total_duration(3), ms(1350));
        assert_eq!(timing.total_duration(0), ms(450));
    }
}
