//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary sequences of user
//! intents and gateway outcomes.

use super::transition::*;
use super::*;
use crate::conversation::{Role, Turn};
use crate::gateway::{Answer, DocumentReceipt, GatewayError, VideoReceipt};
use crate::source::{DocumentFile, SourceBinding, PDF_MEDIA_TYPE};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[ \t]{1,3}",
        "[a-zA-Z ?]{1,20}",
    ]
}

fn arb_document() -> impl Strategy<Value = DocumentFile> {
    (
        "[a-z]{1,8}",
        prop_oneof![
            Just(PDF_MEDIA_TYPE.to_string()),
            Just("text/plain".to_string()),
            Just("image/png".to_string()),
        ],
        proptest::collection::vec(any::<u8>(), 0..16),
    )
        .prop_map(|(stem, media_type, bytes)| {
            DocumentFile::new(format!("{stem}.pdf"), media_type, bytes)
        })
}

fn arb_binding() -> impl Strategy<Value = SourceBinding> {
    prop_oneof![
        Just(SourceBinding::Empty),
        ("[a-z]{1,8}", 0u64..10_000).prop_map(|(name, size_bytes)| SourceBinding::Document {
            name: format!("{name}.pdf"),
            size_bytes,
        }),
        "[A-Za-z0-9_-]{11}".prop_map(|video_id| SourceBinding::Video { video_id }),
    ]
}

fn arb_pending() -> impl Strategy<Value = Option<OperationKind>> {
    prop_oneof![
        Just(None),
        Just(Some(OperationKind::AttachDocument)),
        Just(Some(OperationKind::AttachVideo)),
        Just(Some(OperationKind::Ask)),
    ]
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    (
        arb_binding(),
        arb_pending(),
        proptest::collection::vec("[a-z]{1,10}", 0..4),
    )
        .prop_map(|(binding, pending, texts)| {
            let mut state = SessionState {
                binding,
                pending,
                ..SessionState::default()
            };
            for text in texts {
                state.log.append(Turn::assistant(text));
            }
            state
        })
}

fn arb_user_intent() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_document().prop_map(|file| Event::SubmitDocument { file }),
        arb_text().prop_map(|url| Event::SubmitVideo { url }),
        arb_text().prop_map(|text| Event::SendQuestion { text }),
        Just(Event::ClearSource),
    ]
}

fn arb_gateway_error() -> impl Strategy<Value = GatewayError> {
    prop_oneof![
        "[a-zA-Z ]{1,20}".prop_map(GatewayError::rejected),
        "[a-zA-Z ]{1,20}".prop_map(GatewayError::unreachable),
    ]
}

/// A step the simulated user/network takes
#[derive(Debug, Clone)]
enum Step {
    Intent(Event),
    /// Resolve whatever call is outstanding (or deliver a stray outcome)
    Resolve {
        success: bool,
        error: GatewayError,
        payload: String,
    },
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => arb_user_intent().prop_map(Step::Intent),
        2 => (any::<bool>(), arb_gateway_error(), "[a-zA-Z0-9]{1,11}").prop_map(
            |(success, error, payload)| Step::Resolve { success, error, payload }
        ),
    ]
}

/// Build the outcome event for an outstanding operation
fn outcome_for(kind: OperationKind, success: bool, error: GatewayError, payload: String) -> Event {
    match (kind, success) {
        (OperationKind::AttachDocument, true) => Event::DocumentAttached {
            receipt: DocumentReceipt {
                name: format!("{payload}.pdf"),
                size_bytes: payload.len() as u64,
            },
        },
        (OperationKind::AttachDocument, false) => Event::DocumentFailed { error },
        (OperationKind::AttachVideo, true) => Event::VideoAttached {
            receipt: VideoReceipt { video_id: payload },
        },
        (OperationKind::AttachVideo, false) => Event::VideoFailed { error },
        (OperationKind::Ask, true) => Event::AnswerReceived {
            answer: Answer { text: payload },
        },
        (OperationKind::Ask, false) => Event::AskFailed { error },
    }
}

fn network_effects(effects: &[Effect]) -> Vec<OperationKind> {
    effects.iter().filter_map(Effect::operation).collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// The log only grows by appending at most one turn per intent, and
    /// intents are only ever refused for reasons worth telling the user.
    #[test]
    fn prop_log_is_append_only(state in arb_state(), event in arb_user_intent()) {
        match transition(&state, event) {
            Ok(result) => {
                let old = state.log.turns();
                let new = result.new_state.log.turns();
                prop_assert!(new.len() == old.len() || new.len() == old.len() + 1);
                prop_assert_eq!(&new[..old.len()], old);
            }
            Err(e) => prop_assert!(e.is_user_facing()),
        }
    }

    /// A question is accepted iff a source is bound, the trimmed question is
    /// non-empty and nothing is pending.
    #[test]
    fn prop_ask_acceptance(state in arb_state(), text in arb_text()) {
        let accepted = match transition(&state, Event::SendQuestion { text: text.clone() }) {
            Ok(result) => result.effects.iter().any(|e| matches!(e, Effect::Ask { .. })),
            Err(_) => false,
        };
        let expected = !state.binding.is_empty()
            && !text.trim().is_empty()
            && state.pending.is_none();
        prop_assert_eq!(accepted, expected);
    }

    /// While a call is outstanding every non-clear intent leaves state alone.
    #[test]
    fn prop_no_queueing(state in arb_state(), event in arb_user_intent()) {
        prop_assume!(state.pending.is_some());
        prop_assume!(!matches!(event, Event::ClearSource));

        match transition(&state, event) {
            Ok(result) => {
                // Only the "nothing submitted" no-ops are accepted
                prop_assert_eq!(result.new_state, state);
                prop_assert!(result.effects.is_empty());
            }
            Err(e) => {
                let is_busy = matches!(e, TransitionError::Busy { .. });
                prop_assert!(is_busy);
            }
        }
    }

    /// Clearing an empty binding changes nothing.
    #[test]
    fn prop_clear_idempotent(state in arb_state()) {
        let once = transition(&state, Event::ClearSource).unwrap().new_state;
        prop_assert!(once.binding.is_empty());
        prop_assert_eq!(&once.log, &state.log);
        prop_assert_eq!(once.pending, state.pending);

        let twice = transition(&once, Event::ClearSource).unwrap();
        prop_assert_eq!(&twice.new_state, &once);
        prop_assert!(twice.effects.is_empty());
    }

    /// Drive whole sessions: `pending` tracks exactly the outstanding call,
    /// each question precedes its reply, and the binding always reflects the
    /// last successful attach (or a later clear).
    #[test]
    fn prop_session_invariants(steps in proptest::collection::vec(arb_step(), 1..40)) {
        let mut state = SessionState::new();
        let mut outstanding: Option<OperationKind> = None;
        let mut question_index: Option<usize> = None;

        for step in steps {
            match step {
                Step::Intent(event) => {
                    let is_clear = matches!(event, Event::ClearSource);
                    let was_empty = state.binding.is_empty();
                    match transition(&state, event) {
                        Ok(result) => {
                            let started = network_effects(&result.effects);
                            prop_assert!(started.len() <= 1);
                            if let Some(kind) = started.first() {
                                prop_assert!(outstanding.is_none());
                                outstanding = Some(*kind);
                                if *kind == OperationKind::Ask {
                                    question_index = Some(result.new_state.log.len() - 1);
                                    let last = result.new_state.log.last().unwrap();
                                    prop_assert_eq!(last.role, Role::User);
                                }
                            }
                            if is_clear {
                                prop_assert!(result.new_state.binding.is_empty());
                                if was_empty {
                                    prop_assert_eq!(&result.new_state, &state);
                                }
                            }
                            state = result.new_state;
                        }
                        Err(TransitionError::Busy { pending }) => {
                            prop_assert_eq!(Some(pending), outstanding);
                        }
                        Err(TransitionError::InvalidSourceKind { .. } | TransitionError::NoSource) => {
                            prop_assert!(outstanding.is_none());
                        }
                        Err(TransitionError::InvalidTransition(msg)) => {
                            prop_assert!(false, "intent produced invalid transition: {}", msg);
                        }
                    }
                }
                Step::Resolve { success, error, payload } => {
                    let Some(kind) = outstanding.take() else {
                        // Stray outcome with nothing pending is refused
                        let stray = outcome_for(OperationKind::Ask, success, error, payload);
                        let refused = matches!(
                            transition(&state, stray),
                            Err(TransitionError::InvalidTransition(_))
                        );
                        prop_assert!(refused);
                        continue;
                    };
                    let before = state.log.len();
                    let prior_binding = state.binding.clone();
                    let result = transition(&state, outcome_for(kind, success, error, payload.clone()))
                        .unwrap();
                    state = result.new_state;

                    // Exactly one assistant turn per resolution
                    prop_assert_eq!(state.log.len(), before + 1);
                    prop_assert_eq!(state.log.last().unwrap().role, Role::Assistant);

                    match (kind, success) {
                        (OperationKind::AttachDocument, true) => {
                            let is_document = matches!(state.binding, SourceBinding::Document { .. });
                            prop_assert!(is_document);
                        }
                        (OperationKind::AttachVideo, true) => {
                            prop_assert_eq!(
                                &state.binding,
                                &SourceBinding::Video { video_id: payload }
                            );
                        }
                        (OperationKind::Ask, _) => {
                            let q = question_index.take().unwrap();
                            prop_assert!(q < state.log.len() - 1);
                            prop_assert_eq!(state.log.turns()[q].role, Role::User);
                            prop_assert_eq!(&state.binding, &prior_binding);
                        }
                        _ => prop_assert_eq!(&state.binding, &prior_binding),
                    }
                }
            }

            prop_assert_eq!(state.pending, outstanding);
            prop_assert_eq!(state.is_busy(), outstanding.is_some());
        }
    }
}
