// Property-Based Testing for the pipeline engine
// Checks the engine invariants over arbitrary intent sequences

use nexus_flow::pipeline::{
    available_intents, FixedClock, InstallationAction, Intent, IntentKind, PipelineEngine,
    ReconciliationStep, SalesAction, ServiceStep, Snapshot, StatusMachine,
};
use proptest::prelude::*;
use proptest_derive::Arbitrary;

// Test-local mirror of the intent surface so proptest can derive a strategy for it
#[derive(Debug, Clone, Copy, Arbitrary)]
enum Step {
    CreateLead,
    AssignLead,
    StartFollowing,
    TagLead(#[proptest(strategy = "0usize..3")] usize),
    ConvertLead,
    CloseLead,
    PublishQuote,
    RequestMeasurement,
    Measurement(#[proptest(strategy = "0usize..5")] usize),
    NewQuoteVersion,
    ConfirmQuote,
    Sales(#[proptest(strategy = "0usize..3")] usize),
    CreateInstallation,
    Installation(#[proptest(strategy = "0usize..5")] usize),
    CreateReconciliation,
    Reconciliation(#[proptest(strategy = "0usize..4")] usize),
}

impl Step {
    fn intent(self) -> Intent {
        match self {
            Step::CreateLead => Intent::CreateLead,
            Step::AssignLead => Intent::AssignLead,
            Step::StartFollowing => Intent::StartFollowing,
            Step::TagLead(i) => Intent::tag(["quoted", "vip", " "][i]),
            Step::ConvertLead => Intent::ConvertLead,
            Step::CloseLead => Intent::CloseLead,
            Step::PublishQuote => Intent::PublishQuote,
            Step::RequestMeasurement => Intent::RequestMeasurement,
            Step::Measurement(i) => Intent::measurement(ServiceStep::ALL[i]),
            Step::NewQuoteVersion => Intent::NewQuoteVersion,
            Step::ConfirmQuote => Intent::ConfirmQuote,
            Step::Sales(i) => Intent::sales(SalesAction::ALL[i]),
            Step::CreateInstallation => Intent::CreateInstallation,
            Step::Installation(i) => Intent::installation(InstallationAction::ALL[i]),
            Step::CreateReconciliation => Intent::CreateReconciliation,
            Step::Reconciliation(i) => Intent::reconciliation(ReconciliationStep::ALL[i]),
        }
    }
}

fn engine() -> PipelineEngine<FixedClock> {
    PipelineEngine::with_clock(FixedClock::epoch())
}

/// Random walks mostly wander off the happy path; steer half of them through it
fn walk_strategy() -> impl Strategy<Value = Vec<Intent>> {
    let random = prop::collection::vec(any::<Step>(), 0..60)
        .prop_map(|steps| steps.into_iter().map(Step::intent).collect::<Vec<_>>());
    let guided = prop::collection::vec(any::<prop::sample::Index>(), 0..40).prop_map(|picks| {
        let engine = engine();
        let mut snapshot = Snapshot::empty();
        let mut intents = Vec::new();
        for pick in picks {
            let options: Vec<_> = available_intents(&snapshot)
                .into_iter()
                .filter(|intent| intent.kind() != IntentKind::Reset)
                .collect();
            if options.is_empty() {
                break;
            }
            let intent = pick.get(&options).clone();
            snapshot = engine.reduce(&snapshot, &intent);
            intents.push(intent);
        }
        intents
    });
    prop_oneof![random, guided]
}

fn run(intents: &[Intent]) -> Snapshot {
    let engine = engine();
    intents
        .iter()
        .fold(Snapshot::empty(), |snapshot, intent| engine.reduce(&snapshot, intent))
}

/// (entity, status label, is terminal) for every document present
fn statuses(snapshot: &Snapshot) -> Vec<(&'static str, &'static str, bool)> {
    let mut out = Vec::new();
    if let Some(l) = &snapshot.lead {
        out.push(("lead", l.status.label(), l.status.is_terminal()));
    }
    if let Some(q) = &snapshot.quote {
        out.push(("quote", q.current_status.label(), q.current_status.is_terminal()));
    }
    if let Some(m) = &snapshot.measurement {
        out.push(("measurement", m.status.label(), m.status.is_terminal()));
    }
    if let Some(o) = &snapshot.sales_order {
        out.push(("sales_order", o.status.label(), o.status.is_terminal()));
    }
    if let Some(i) = &snapshot.installation {
        out.push(("installation", i.status.label(), i.status.is_terminal()));
    }
    if let Some(r) = &snapshot.reconciliation {
        out.push(("reconciliation", r.status.label(), r.status.is_terminal()));
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Applying a refused intent any number of times equals applying it zero times
    #[test]
    fn refused_intents_are_idempotent(walk in walk_strategy(), step in any::<Step>(), n in 1usize..5) {
        let engine = engine();
        let snapshot = run(&walk);
        let intent = step.intent();

        if engine.check(&snapshot, &intent).is_err() {
            let mut repeated = snapshot.clone();
            for _ in 0..n {
                repeated = engine.reduce(&repeated, &intent);
            }
            prop_assert_eq!(repeated, snapshot);
        }
    }

    /// Log grows by exactly one per accepted intent and never shrinks except on reset
    #[test]
    fn log_is_monotonic(walk in walk_strategy()) {
        let engine = engine();
        let mut snapshot = Snapshot::empty();
        for intent in &walk {
            let before = snapshot.log.len();
            let accepted = engine.check(&snapshot, intent).is_ok();
            snapshot = engine.reduce(&snapshot, intent);
            let expected = if accepted { before + 1 } else { before };
            prop_assert_eq!(snapshot.log.len(), expected);
        }
        let reset = engine.reduce(&snapshot, &Intent::Reset);
        prop_assert_eq!(reset.log.len(), 1);
        prop_assert!(reset.is_blank());
    }

    /// Once a document reaches a terminal status it never leaves it
    #[test]
    fn terminal_statuses_are_final(walk in walk_strategy(), tail in prop::collection::vec(any::<Step>(), 1..20)) {
        let engine = engine();
        let snapshot = run(&walk);
        let terminal: Vec<_> = statuses(&snapshot)
            .into_iter()
            .filter(|(_, _, is_terminal)| *is_terminal)
            .collect();

        let after = tail
            .iter()
            .fold(snapshot, |s, step| engine.reduce(&s, &step.intent()));
        let now = statuses(&after);
        for entry in terminal {
            prop_assert!(now.contains(&entry), "{:?} left its terminal status", entry);
        }
    }

    /// Creating intents never produce a second document and never drop an existing one
    #[test]
    fn documents_are_single_instance(walk in walk_strategy()) {
        let engine = engine();
        let mut snapshot = Snapshot::empty();
        for intent in &walk {
            let next = engine.reduce(&snapshot, intent);
            let before: Vec<_> = statuses(&snapshot).into_iter().map(|(e, _, _)| e).collect();
            let after: Vec<_> = statuses(&next).into_iter().map(|(e, _, _)| e).collect();
            for entity in &before {
                prop_assert!(after.contains(entity), "{} disappeared after {}", entity, intent);
            }
            prop_assert!(after.len() <= before.len() + 1);
            if let (Some(a), Some(b)) = (&snapshot.lead, &next.lead) {
                prop_assert_eq!(&a.id, &b.id);
            }
            snapshot = next;
        }
    }

    /// Every offered intent is accepted and every accepted catalog intent is offered
    #[test]
    fn availability_matches_the_reducer(walk in walk_strategy()) {
        let engine = engine();
        let snapshot = run(&walk);
        let offered = available_intents(&snapshot);

        for intent in Intent::catalog() {
            let accepted = engine.try_reduce(&snapshot, &intent).is_ok();
            prop_assert_eq!(offered.contains(&intent), accepted, "{}", intent);
        }
    }

    /// Later documents only exist once their predecessor reached the spawning status
    #[test]
    fn stage_gating_holds(walk in walk_strategy()) {
        let snapshot = run(&walk);
        if snapshot.quote.is_some() {
            prop_assert_eq!(snapshot.lead.as_ref().map(|l| l.status.label()), Some("converted"));
        }
        if snapshot.measurement.is_some() {
            prop_assert!(snapshot.quote.is_some());
        }
        if snapshot.sales_order.is_some() {
            prop_assert_eq!(snapshot.quote.as_ref().map(|q| q.current_status.label()), Some("confirmed"));
        }
        if snapshot.installation.is_some() {
            prop_assert!(snapshot.sales_order.is_some());
        }
        if snapshot.reconciliation.is_some() {
            let order = snapshot.sales_order.as_ref().map(|o| o.status.label());
            prop_assert!(matches!(order, Some("reconciliation") | Some("completed")));
        }
    }
}
