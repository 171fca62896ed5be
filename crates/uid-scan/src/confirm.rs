//! Two-phase confirmation of single-device replies
//!
//! A full-length reply is only a candidate: two devices answering at once
//! can momentarily look like one. A candidate becomes [`Verdict::Confirmed`]
//! only after the identical probe produces the identical UID again. With
//! echo verification enabled, the UID itself is then sent as a probe; a
//! full-length probe can only ever match the one device carrying it.
//!
//! ```text
//!   reply UID ──> Tentative(Repeat) ──same UID──> Confirmed
//!                        │                 (echo) └──> Tentative(Echo) ──same UID──> Confirmed
//!                        └── silence / other ──> Rejected            └── otherwise ──> Rejected
//! ```

use uid_protocol::{Reply, Uid};

/// Which observation the tentative UID is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for the repeat of the original probe
    Repeat,
    /// Waiting for the device to answer a probe of its own UID
    Echo,
}

/// Why a tentative UID was not confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The repeated probe went unanswered
    Silent,
    /// The repeated probe produced a collision
    Collided,
    /// The repeated probe produced a different UID
    Changed(Uid),
}

/// Result of feeding an observation into a [`Tentative`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Another observation is required
    Pending(Tentative),
    /// The UID belongs to a single real device
    Confirmed(Uid),
    /// The first reply was a collision artifact
    Rejected(Rejection),
}

/// A UID seen once and awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tentative {
    uid: Uid,
    pattern: String,
    stage: Stage,
    echo: bool,
}

impl Tentative {
    /// Start confirming `uid`, first seen in reply to `pattern`
    pub fn new(uid: Uid, pattern: impl Into<String>, echo: bool) -> Self {
        Self {
            uid,
            pattern: pattern.into(),
            stage: Stage::Repeat,
            echo,
        }
    }

    /// The candidate UID
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// The current stage
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The probe to send for the next observation
    pub fn probe(&self) -> &str {
        match self.stage {
            Stage::Repeat => &self.pattern,
            Stage::Echo => self.uid.as_str(),
        }
    }

    /// Feed the reply to [`Tentative::probe`]
    pub fn observe(self, reply: &Reply) -> Verdict {
        match reply {
            Reply::Uid(uid) if *uid == self.uid => match self.stage {
                Stage::Repeat if self.echo => Verdict::Pending(Tentative {
                    stage: Stage::Echo,
                    ..self
                }),
                _ => Verdict::Confirmed(self.uid),
            },
            Reply::Uid(other) => Verdict::Rejected(Rejection::Changed(other.clone())),
            Reply::Collision => Verdict::Rejected(Rejection::Collided),
            Reply::Silence => Verdict::Rejected(Rejection::Silent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> Uid {
        s.parse().unwrap()
    }

    const A: &str = "AB11111111111111111";
    const B: &str = "AB22222222222222222";

    #[test]
    fn test_repeat_match_confirms() {
        let t = Tentative::new(uid(A), "AB1", false);
        assert_eq!(t.stage(), Stage::Repeat);
        assert_eq!(t.probe(), "AB1");
        assert_eq!(t.observe(&Reply::Uid(uid(A))), Verdict::Confirmed(uid(A)));
    }

    #[test]
    fn test_repeat_silence_rejects() {
        let t = Tentative::new(uid(A), "AB1", false);
        assert_eq!(
            t.observe(&Reply::Silence),
            Verdict::Rejected(Rejection::Silent)
        );
    }

    #[test]
    fn test_repeat_mismatch_rejects() {
        let t = Tentative::new(uid(A), "AB", false);
        assert_eq!(
            t.observe(&Reply::Uid(uid(B))),
            Verdict::Rejected(Rejection::Changed(uid(B)))
        );
        let t = Tentative::new(uid(A), "AB", false);
        assert_eq!(
            t.observe(&Reply::Collision),
            Verdict::Rejected(Rejection::Collided)
        );
    }

    #[test]
    fn test_echo_stage() {
        let t = Tentative::new(uid(A), "AB1", true);
        let Verdict::Pending(t) = t.observe(&Reply::Uid(uid(A))) else {
            panic!("expected echo stage");
        };
        assert_eq!(t.stage(), Stage::Echo);
        assert_eq!(t.probe(), A);
        assert_eq!(t.uid(), &uid(A));

        let rejected = t.clone().observe(&Reply::Silence);
        assert_eq!(rejected, Verdict::Rejected(Rejection::Silent));
        assert_eq!(t.observe(&Reply::Uid(uid(A))), Verdict::Confirmed(uid(A)));
    }
}
