//! Property tests for the device simulator
//!
//! - Replies follow the match rule over active devices only
//! - Mute followed by unmute restores the original answers
//! - Reset is idempotent

use proptest::prelude::*;
use uid_protocol::{matches, Command};
use uid_sim::{DeviceSet, DeviceSimulator};

fn population() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("A[BC][0-3]{17}", 1..6).prop_map(|s| s.into_iter().collect())
}

fn probe() -> impl Strategy<Value = String> {
    "A[BC][0-3]{0,4}"
}

fn simulator(uids: &[String]) -> DeviceSimulator {
    DeviceSimulator::new(DeviceSet::new(uids.iter().cloned())).unwrap()
}

fn answers(sim: &mut DeviceSimulator, probes: &[String]) -> Vec<Option<String>> {
    probes
        .iter()
        .map(|p| sim.handle(&Command::Probe(p.clone())))
        .collect()
}

proptest! {
    #[test]
    fn reply_follows_match_count(uids in population(), p in probe()) {
        let mut sim = simulator(&uids);
        let matched: Vec<&String> = uids.iter().filter(|u| matches(&p, u)).collect();
        let reply = sim.handle(&Command::Probe(p.clone()));

        match matched.len() {
            0 => prop_assert_eq!(reply, None),
            1 => prop_assert_eq!(reply, Some(matched[0].clone())),
            _ => prop_assert_eq!(reply, Some(String::new())),
        }
    }

    #[test]
    fn muted_devices_never_answer(uids in population(), p in probe(), pick in any::<prop::sample::Index>()) {
        let mut sim = simulator(&uids);
        let victim = pick.get(&uids).clone();
        sim.handle(&Command::Mute(victim.clone()));

        let others = uids.iter().filter(|u| **u != victim && matches(&p, u)).count();
        let reply = sim.handle(&Command::Probe(p.clone()));
        prop_assert_ne!(reply.as_deref(), Some(victim.as_str()));
        prop_assert_eq!(reply.is_none(), others == 0);
    }

    #[test]
    fn mute_unmute_round_trip(
        uids in population(),
        probes in prop::collection::vec(probe(), 1..12),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut sim = simulator(&uids);
        let before = answers(&mut sim, &probes);

        let victim = pick.get(&uids).clone();
        sim.handle(&Command::Mute(victim.clone()));
        sim.handle(&Command::Unmute(victim));

        prop_assert_eq!(answers(&mut sim, &probes), before);
    }

    #[test]
    fn reset_twice_equals_reset_once(uids in population(), muted in prop::collection::vec(any::<prop::sample::Index>(), 0..4)) {
        let mut sim = simulator(&uids);
        for pick in &muted {
            sim.handle(&Command::Mute(pick.get(&uids).clone()));
        }

        sim.handle(&Command::ResetAll);
        let once = sim.devices().clone();
        sim.handle(&Command::ResetAll);
        prop_assert_eq!(sim.devices(), &once);
        prop_assert_eq!(once.muted_count(), 0);
    }
}
