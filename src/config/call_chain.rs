// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turns a [`Scenario`] into frame definitions.
//!
//! ```text
//! unnamedReturnVals | namedReturnVals     defers: first, <recovery>, last
//!   -> f1
//!     -> f2                               defers: first, <raise again>, last
//!       -> f3
//!         -> panicker                     defers: one; raises the payload
//! ```

use crate::actions::{Announce, Raise, Recover, RecoverAndSetError};
use crate::config::consts::{
    BODY_RESULT_NUMBER, BODY_RESULT_TEXT, RECOVERED_ERROR_MESSAGE, REPLACEMENT_PAYLOAD,
};
use crate::config::scenario::{RecoveryMode, Scenario};
use crate::engine::binding::ReturnValues;
use crate::engine::frame::FrameDef;
use crate::engine::payload::Payload;

/// Builds the scenario's main call chain, rooted at the starting function.
pub fn build_call_chain(scenario: &Scenario) -> FrameDef {
    let start = scenario.start();
    let root = FrameDef::new(start.frame_name())
        .with_binding(start.binding())
        .defer(Announce::new("first deferred func"));

    let root = match scenario.recovery() {
        RecoveryMode::None => root,
        RecoveryMode::Basic => root.defer(Recover::new()),
        RecoveryMode::SetErrorOnRecover => {
            root.defer(RecoverAndSetError::new(RECOVERED_ERROR_MESSAGE))
        }
    };

    root.defer(Announce::new("last deferred func"))
        .call(f1(scenario))
        .returns(ReturnValues::new(BODY_RESULT_NUMBER, BODY_RESULT_TEXT))
}

fn f1(scenario: &Scenario) -> FrameDef {
    FrameDef::new("f1").call(f2(scenario))
}

fn f2(scenario: &Scenario) -> FrameDef {
    let f2 = FrameDef::new("f2").defer(Announce::new("first deferred func"));
    let f2 = if scenario.raises_in_cleanup() {
        f2.defer(Raise::new(Payload::text(REPLACEMENT_PAYLOAD)))
    } else {
        f2
    };
    f2.defer(Announce::new("last deferred func"))
        .call(f3(scenario))
}

fn f3(scenario: &Scenario) -> FrameDef {
    FrameDef::new("f3").call(panicker(scenario))
}

fn panicker(scenario: &Scenario) -> FrameDef {
    let panicker = FrameDef::new("panicker").defer(Announce::new("deferred func"));
    if scenario.raise() {
        panicker.raise(scenario.payload().clone())
    } else {
        panicker
    }
}

/// A background line: registers one deferred action, then waits.
pub fn sleeper_line() -> FrameDef {
    FrameDef::new("sleeper")
        .defer(Announce::new("sleeper: defer func called"))
        .yield_now()
}

pub fn background_line_name(index: usize) -> String {
    format!("sleeper-{}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::frame::Step;

    fn defer_count(def: &FrameDef) -> usize {
        def.steps()
            .iter()
            .filter(|step| matches!(step, Step::Defer(_)))
            .count()
    }

    fn callee(def: &FrameDef) -> &FrameDef {
        def.steps()
            .iter()
            .find_map(|step| match step {
                Step::Call(callee) => Some(callee.as_ref()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_chain_shape() {
        let scenario = Scenario::from_tags("named", "basic", "string").unwrap();
        let root = build_call_chain(&scenario);

        assert_eq!(root.name(), "namedReturnVals");
        assert_eq!(defer_count(&root), 3);

        let f1 = callee(&root);
        let f2 = callee(f1);
        let f3 = callee(f2);
        let panicker = callee(f3);
        assert_eq!(
            [f1.name(), f2.name(), f3.name(), panicker.name()],
            ["f1", "f2", "f3", "panicker"]
        );
        assert_eq!(defer_count(f2), 2);
        assert!(matches!(panicker.steps().last(), Some(Step::Raise(_))));
    }

    #[test]
    fn test_reraise_action_only_when_raising() {
        let reraise = Scenario::from_tags("unnamed", "none", "int")
            .unwrap()
            .with_reraise_in_cleanup(true);
        assert_eq!(defer_count(callee(callee(&build_call_chain(&reraise)))), 3);

        let quiet = reraise.with_raise(false);
        let root = build_call_chain(&quiet);
        let f2 = callee(callee(&root));
        assert_eq!(defer_count(f2), 2);
        assert!(!callee(callee(f2))
            .steps()
            .iter()
            .any(|step| matches!(step, Step::Raise(_))));
    }

    #[test]
    fn test_no_recovery_registers_two_root_defers() {
        let scenario = Scenario::from_tags("unnamed", "none", "nil").unwrap();
        assert_eq!(defer_count(&build_call_chain(&scenario)), 2);
    }
}
