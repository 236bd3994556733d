// Which intents the presentation may offer for a snapshot
//
// Derived by asking the engine itself, so a button is offered exactly when the
// reducer would accept the intent.

use super::clock::FixedClock;
use super::intent::Intent;
use super::reducer::PipelineEngine;
use super::snapshot::Snapshot;

/// Every catalogued intent the reducer would currently accept, in display order.
///
/// `Reset` is always included.
pub fn available_intents(snapshot: &Snapshot) -> Vec<Intent> {
    let engine = probe();
    Intent::catalog()
        .into_iter()
        .filter(|intent| engine.check(snapshot, intent).is_ok())
        .collect()
}

pub fn is_available(snapshot: &Snapshot, intent: &Intent) -> bool {
    probe().check(snapshot, intent).is_ok()
}

fn probe() -> PipelineEngine<FixedClock> {
    PipelineEngine::with_clock(FixedClock::epoch())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::intent::IntentKind;

    #[test]
    fn test_empty_snapshot_offers_create_and_reset() {
        let kinds: Vec<_> = available_intents(&Snapshot::empty())
            .iter()
            .map(Intent::kind)
            .collect();
        assert_eq!(kinds, vec![IntentKind::CreateLead, IntentKind::Reset]);
    }

    #[test]
    fn test_following_lead_offers_tag_convert_close() {
        let engine = probe();
        let snapshot = [Intent::CreateLead, Intent::AssignLead, Intent::StartFollowing]
            .iter()
            .fold(Snapshot::empty(), |s, i| engine.reduce(&s, i));

        let kinds: Vec<_> = available_intents(&snapshot).iter().map(Intent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                IntentKind::TagLead,
                IntentKind::ConvertLead,
                IntentKind::CloseLead,
                IntentKind::Reset
            ]
        );
        assert!(!is_available(&snapshot, &Intent::tag("")));
    }
}
