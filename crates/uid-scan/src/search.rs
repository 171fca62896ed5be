//! Collision-resolution search for one vendor prefix
//!
//! [`Discovery`] is a sans-IO state machine: it hands out [`Action`]s to put
//! on the bus and consumes the [`Reply`] to every probe. Transports drive it
//! (see [`crate::Scanner`] for the async line link and [`Discovery::run`]
//! for in-process use).
//!
//! # Walk
//!
//! The search is a depth-first walk over suffix continuations. A candidate
//! fragment `s` is probed as `prefix + tail(s)`, where the most recently
//! added symbol sits right after the anchor, so each level pins one more
//! symbol of the UID counting from its end:
//!
//! ```text
//! AB            -> collision
//! AB0           -> silence           (abandon)
//! AB1           -> AB...1 twice      (confirm, mute, probe AB1 again)
//! AB2           -> collision
//!   AB02        -> ...
//! ```
//!
//! - Silence abandons the branch.
//! - A collision (or a rejected tentative UID) pushes every one-symbol
//!   extension onto the frontier, so it is fully resolved before its
//!   siblings.
//! - A confirmed UID is muted and the same probe is revisited once, since
//!   removing it can unmask a device that collided with it.
//! - Nothing extends past the full UID length.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
use uid_protocol::{matches, AlphabetOrder, Command, Reply, Uid, VendorPrefix, PREFIX_LEN, UID_LEN};

use crate::confirm::{Tentative, Verdict};
use crate::error::ScanError;

/// A line the engine wants put on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send a probe and deliver the reply via [`Discovery::observe`]
    Probe(String),
    /// Silence a confirmed device; no reply is expected
    Mute(Uid),
    /// Unmute every device; the last action of a search
    ResetAll,
}

impl Action {
    /// Returns true if the bus may answer this action
    pub fn expects_reply(&self) -> bool {
        matches!(self, Action::Probe(_))
    }

    /// Wire command for this action
    pub fn to_command(&self) -> Command {
        match self {
            Action::Probe(pattern) => Command::Probe(pattern.clone()),
            Action::Mute(uid) => Command::mute(uid),
            Action::ResetAll => Command::ResetAll,
        }
    }
}

/// A suffix continuation under exploration
///
/// The fragment is stored newest-symbol-last and reversed once when the
/// probe is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    reversed: Vec<u8>,
    revisit: bool,
}

impl Candidate {
    fn root() -> Self {
        Self {
            reversed: Vec::new(),
            revisit: false,
        }
    }

    /// Number of suffix symbols pinned by this candidate
    pub fn depth(&self) -> usize {
        self.reversed.len()
    }

    /// Returns true if this is a second look after a mute
    pub fn is_revisit(&self) -> bool {
        self.revisit
    }

    /// Tail as transmitted after the anchor
    pub fn tail(&self) -> String {
        self.reversed.iter().rev().map(|&b| b as char).collect()
    }

    fn child(&self, symbol: u8) -> Self {
        let mut reversed = Vec::with_capacity(self.reversed.len() + 1);
        reversed.extend_from_slice(&self.reversed);
        reversed.push(symbol);
        Self {
            reversed,
            revisit: false,
        }
    }

    fn revisited(self) -> Self {
        Self {
            revisit: true,
            ..self
        }
    }
}

/// Counters collected while searching one prefix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Probes sent, including repeats and revisits
    pub probes: u64,
    /// Probes answered by a collision
    pub collisions: u64,
    /// Probes nobody answered
    pub timeouts: u64,
    /// Tentative UIDs that failed confirmation
    pub rejected: u64,
    /// Branches abandoned at the full UID length while still ambiguous
    pub exhausted: u64,
    /// Mute commands issued
    pub mutes: u64,
    /// Deepest suffix level probed
    pub max_depth: usize,
}

/// Result of searching one vendor prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Prefix that was searched
    pub prefix: VendorPrefix,
    /// UIDs confirmed under this prefix
    pub found: BTreeSet<Uid>,
    /// Search counters
    pub stats: SearchStats,
    /// Wall-clock duration of the search
    pub elapsed_ms: u64,
}

#[derive(Debug)]
enum Phase {
    /// Next action comes from the frontier
    Ready,
    /// First probe of a candidate is outstanding
    Probing { candidate: Candidate, pattern: String },
    /// A tentative UID awaits its next observation
    Confirming {
        candidate: Candidate,
        tentative: Tentative,
    },
    /// Reset was issued, nothing left to do
    Finished,
}

/// Discovery engine for a single vendor prefix
#[derive(Debug)]
pub struct Discovery {
    prefix: VendorPrefix,
    order: AlphabetOrder,
    echo_verify: bool,
    frontier: Vec<Candidate>,
    explored: HashSet<String>,
    found: BTreeSet<Uid>,
    outbox: VecDeque<Action>,
    phase: Phase,
    stats: SearchStats,
    started: Instant,
}

impl Discovery {
    /// Create a search walking the alphabet in ascending order
    pub fn new(prefix: VendorPrefix) -> Self {
        Self::with_options(prefix, AlphabetOrder::Ascending, false)
    }

    /// Create a search with an explicit walk order and confirmation mode
    pub fn with_options(prefix: VendorPrefix, order: AlphabetOrder, echo_verify: bool) -> Self {
        Self {
            prefix,
            order,
            echo_verify,
            frontier: vec![Candidate::root()],
            explored: HashSet::new(),
            found: BTreeSet::new(),
            outbox: VecDeque::new(),
            phase: Phase::Ready,
            stats: SearchStats::default(),
            started: Instant::now(),
        }
    }

    /// Get the prefix under search
    pub fn prefix(&self) -> &VendorPrefix {
        &self.prefix
    }

    /// UIDs confirmed so far
    pub fn found(&self) -> &BTreeSet<Uid> {
        &self.found
    }

    /// Counters so far
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Candidates still waiting to be probed
    pub fn frontier(&self) -> &[Candidate] {
        &self.frontier
    }

    /// The tentative UID currently being confirmed, if any
    pub fn tentative(&self) -> Option<&Tentative> {
        match &self.phase {
            Phase::Confirming { tentative, .. } => Some(tentative),
            _ => None,
        }
    }

    /// Returns true once the closing reset has been handed out
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished) && self.outbox.is_empty()
    }

    fn pattern(&self, candidate: &Candidate) -> String {
        format!("{}{}", self.prefix, candidate.tail())
    }

    /// Next line to put on the bus; `None` once the search is complete
    ///
    /// After an [`Action::Probe`] the reply must be delivered through
    /// [`Discovery::observe`] before asking again.
    pub fn next_action(&mut self) -> Result<Option<Action>, ScanError> {
        if let Some(action) = self.outbox.pop_front() {
            return Ok(Some(action));
        }

        match &self.phase {
            Phase::Ready => {}
            Phase::Probing { pattern, .. } => return Err(ScanError::ReplyPending(pattern.clone())),
            Phase::Confirming { tentative, .. } => {
                return Err(ScanError::ReplyPending(tentative.probe().to_string()))
            }
            Phase::Finished => return Ok(None),
        }

        while let Some(candidate) = self.frontier.pop() {
            let pattern = self.pattern(&candidate);
            if !candidate.revisit && !self.explored.insert(pattern.clone()) {
                trace!("Skipping already explored {}", pattern);
                continue;
            }

            trace!("Probe {} (depth {})", pattern, candidate.depth());
            self.stats.probes += 1;
            self.stats.max_depth = self.stats.max_depth.max(candidate.depth());
            self.phase = Phase::Probing {
                candidate,
                pattern: pattern.clone(),
            };
            return Ok(Some(Action::Probe(pattern)));
        }

        info!(
            "Prefix {} complete: {} UID(s) after {} probes",
            self.prefix,
            self.found.len(),
            self.stats.probes
        );
        self.phase = Phase::Finished;
        Ok(Some(Action::ResetAll))
    }

    /// Deliver the reply to the outstanding probe
    pub fn observe(&mut self, reply: Reply) -> Result<(), ScanError> {
        match std::mem::replace(&mut self.phase, Phase::Ready) {
            Phase::Probing { candidate, pattern } => match reply {
                Reply::Silence => {
                    self.stats.timeouts += 1;
                    trace!("No answer to {}", pattern);
                }
                Reply::Collision => {
                    self.stats.collisions += 1;
                    debug!("Collision at {}", pattern);
                    self.deepen(candidate, &pattern);
                }
                Reply::Uid(uid) if !matches(&pattern, uid.as_str()) => {
                    self.stats.collisions += 1;
                    debug!("Reply {} does not match {}; treating as collision", uid, pattern);
                    self.deepen(candidate, &pattern);
                }
                Reply::Uid(uid) => {
                    debug!("Tentative {} at {}", uid, pattern);
                    let tentative = Tentative::new(uid, pattern, self.echo_verify);
                    self.confirm_next(candidate, tentative);
                }
            },
            Phase::Confirming {
                candidate,
                tentative,
            } => {
                let pattern = self.pattern(&candidate);
                match tentative.observe(&reply) {
                    Verdict::Pending(tentative) => self.confirm_next(candidate, tentative),
                    Verdict::Confirmed(uid) => self.accept(candidate, uid, &pattern),
                    Verdict::Rejected(why) => {
                        self.stats.rejected += 1;
                        debug!("Tentative UID at {} rejected: {:?}", pattern, why);
                        self.deepen(candidate, &pattern);
                    }
                }
            }
            other => {
                self.phase = other;
                return Err(ScanError::UnexpectedReply);
            }
        }
        Ok(())
    }

    /// Queue the probe for the next confirmation observation
    fn confirm_next(&mut self, candidate: Candidate, tentative: Tentative) {
        self.stats.probes += 1;
        self.outbox
            .push_back(Action::Probe(tentative.probe().to_string()));
        self.phase = Phase::Confirming {
            candidate,
            tentative,
        };
    }

    fn accept(&mut self, candidate: Candidate, uid: Uid, pattern: &str) {
        if self.found.contains(&uid) {
            // A muted device should never answer again
            warn!("{} answered {} after being muted; searching deeper", uid, pattern);
            self.deepen(candidate, pattern);
            return;
        }

        info!("FOUND: {}", uid);
        self.found.insert(uid.clone());
        self.stats.mutes += 1;
        self.outbox.push_back(Action::Mute(uid));
        self.frontier.push(candidate.revisited());
    }

    fn deepen(&mut self, candidate: Candidate, pattern: &str) {
        if PREFIX_LEN + candidate.depth() >= UID_LEN {
            self.stats.exhausted += 1;
            warn!("Still ambiguous at full length {}; abandoning branch", pattern);
            return;
        }

        // Stack: push in reverse so the first symbol of the walk order pops first
        for symbol in self.order.reversed().symbols() {
            self.frontier.push(candidate.child(symbol));
        }
    }

    /// Consume the engine into its report
    pub fn finish(self) -> ScanReport {
        ScanReport {
            prefix: self.prefix,
            found: self.found,
            stats: self.stats,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        }
    }

    /// Drive the search to completion through a synchronous exchange
    ///
    /// `exchange` puts a command on the bus and returns the line received
    /// in reply, or `None` when nothing arrived.
    pub fn run<F>(mut self, mut exchange: F) -> Result<ScanReport, ScanError>
    where
        F: FnMut(&Command) -> Option<String>,
    {
        while let Some(action) = self.next_action()? {
            let reply = exchange(&action.to_command());
            if action.expects_reply() {
                self.observe(Reply::classify(reply.as_deref()))?;
            }
        }
        Ok(self.finish())
    }
}
