//! Registry of known payload contracts
//!
//! Adding a contract means adding one entry to `CONTRACTS`. Pairs that are
//! not listed here are accepted as long as the payload is an object.

use super::types::{Contract, FieldCheck, FieldRule};

/// Phases a bead can report, in workflow order
pub const BEAD_PHASES: &[&str] = &[
    "brainstorm",
    "brainstorm-reviewed",
    "strategized",
    "planned",
    "plan-reviewed",
    "executing",
    "shipping",
    "done",
];

const BEAD_PHASE: &[FieldRule] = &[
    FieldRule::new("id", FieldCheck::NonEmptyString),
    FieldRule::new("phase", FieldCheck::OneOf(BEAD_PHASES)),
    FieldRule::new("reason", FieldCheck::OptionalString),
    FieldRule::new("ts", FieldCheck::Number),
];

const DISPATCH: &[FieldRule] = &[
    FieldRule::new("name", FieldCheck::NonEmptyString),
    FieldRule::new("workdir", FieldCheck::NonEmptyString),
    FieldRule::new("activity", FieldCheck::NonEmptyString),
    FieldRule::new("started", FieldCheck::NonNegativeNumber),
    FieldRule::new("turns", FieldCheck::NonNegativeNumber),
    FieldRule::new("commands", FieldCheck::NonNegativeNumber),
    FieldRule::new("messages", FieldCheck::NonNegativeNumber),
];

// `ts` is a string here but numeric in bead_phase; producers already rely on both.
const COORDINATION_SIGNAL: &[FieldRule] = &[
    FieldRule::new("layer", FieldCheck::NonEmptyString),
    FieldRule::new("icon", FieldCheck::NonEmptyString),
    FieldRule::new("text", FieldCheck::NonEmptyString),
    FieldRule::new("ts", FieldCheck::NonEmptyString),
    FieldRule::new("priority", FieldCheck::NonNegativeNumber),
];

pub const CONTRACTS: &[Contract] = &[
    Contract {
        namespace: "interphase",
        kind: "bead_phase",
        rules: BEAD_PHASE,
    },
    Contract {
        namespace: "clavain",
        kind: "dispatch",
        rules: DISPATCH,
    },
    Contract {
        namespace: "interlock",
        kind: "coordination_signal",
        rules: COORDINATION_SIGNAL,
    },
];

/// Contract registered for `(namespace, kind)`, if any
pub fn lookup(namespace: &str, kind: &str) -> Option<&'static Contract> {
    CONTRACTS
        .iter()
        .find(|c| c.namespace == namespace && c.kind == kind)
}
