//! Delta Accumulator
//!
//! Consumes stream fragments for a single response and decides whether the response is
//! plain assistant text or a function call. Text is surfaced token by token as it arrives;
//! function-call arguments are buffered per function name and only released once the
//! stream has ended, so callers never observe partial argument JSON.

use crate::types::{ChatDelta, ChatResult, FunctionCall, Role};

/// Finish reason signalling a function call.
pub const FUNCTION_CALL_FINISH_REASON: &str = "function_call";

/// Classification of the response being accumulated.
///
/// `PlainText` and `FunctionCall` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Undetermined,
    PlainText,
    FunctionCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorMode {
    /// Function-call deltas are ignored; everything is text.
    PlainTextOnly,
    FunctionAware,
}

/// Something the caller must be told about right away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccumulatorEvent {
    /// The response type was decided. Emitted at most once.
    TypeResolved(Role),
    Token(String),
}

/// Outcome of a finished stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccumulatedResponse {
    /// No role was resolved; nothing is appended.
    Empty,
    Text { role: Role, content: String },
    /// Buffered calls in first-seen order of their names.
    FunctionCalls(Vec<FunctionCall>),
}

/// Per-call accumulation state.
#[derive(Debug)]
pub struct DeltaAccumulator {
    mode: AccumulatorMode,
    kind: ResponseKind,
    role: Option<Role>,
    text: String,
    function_buffers: Vec<FunctionCall>,
    active_function: Option<usize>,
}

impl DeltaAccumulator {
    pub fn new(mode: AccumulatorMode) -> Self {
        Self {
            mode,
            kind: ResponseKind::Undetermined,
            role: None,
            text: String::new(),
            function_buffers: Vec::new(),
            active_function: None,
        }
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Feed one fragment, returning the events to deliver in order.
    pub fn push(&mut self, fragment: &ChatResult) -> Vec<AccumulatorEvent> {
        let Some(choice) = fragment.first_choice() else {
            return Vec::new();
        };
        let delta = choice.delta.as_ref();
        let mut events = Vec::new();

        if self.kind == ResponseKind::Undetermined
            && let Some(role) = self.resolve(delta, choice.finish_reason.as_deref())
        {
            events.push(AccumulatorEvent::TypeResolved(role));
        }

        match self.kind {
            ResponseKind::FunctionCall => self.buffer_function_delta(delta),
            ResponseKind::Undetermined | ResponseKind::PlainText => {
                if let Some(content) = delta
                    .and_then(|d| d.content.as_deref())
                    .filter(|c| !c.is_empty())
                {
                    self.text.push_str(content);
                    events.push(AccumulatorEvent::Token(content.to_string()));
                }
            }
        }

        events
    }

    fn resolve(&mut self, delta: Option<&ChatDelta>, finish_reason: Option<&str>) -> Option<Role> {
        let role = delta.and_then(|d| d.role);

        if self.mode == AccumulatorMode::FunctionAware {
            let has_function_call = delta.is_some_and(|d| d.function_call.is_some());
            if has_function_call
                || finish_reason == Some(FUNCTION_CALL_FINISH_REASON)
                || role == Some(Role::Function)
            {
                tracing::debug!("Response resolved as function call");
                self.kind = ResponseKind::FunctionCall;
                self.role = Some(Role::Function);
                return self.role;
            }
        }

        let role = role?;
        tracing::debug!(%role, "Response resolved as plain text");
        self.kind = ResponseKind::PlainText;
        self.role = Some(role);
        Some(role)
    }

    fn buffer_function_delta(&mut self, delta: Option<&ChatDelta>) {
        let Some(call) = delta.and_then(|d| d.function_call.as_ref()) else {
            return;
        };

        if let Some(name) = call.name.as_deref().filter(|n| !n.is_empty()) {
            let index = match self.function_buffers.iter().position(|f| f.name == name) {
                Some(index) => index,
                None => {
                    tracing::debug!(function = name, "Buffering function call");
                    self.function_buffers.push(FunctionCall::new(name, String::new()));
                    self.function_buffers.len() - 1
                }
            };
            self.active_function = Some(index);
        }

        if let Some(chunk) = call.arguments.as_deref().filter(|a| !a.is_empty()) {
            match self.active_function {
                Some(index) => self.function_buffers[index].arguments.push_str(chunk),
                None => {
                    tracing::warn!("Dropping function arguments received before any function name")
                }
            }
        }
    }

    /// Consume the accumulator at end of stream.
    pub fn finish(self) -> AccumulatedResponse {
        match self.kind {
            ResponseKind::FunctionCall => {
                if self.function_buffers.is_empty() {
                    tracing::warn!("Function call response ended without any function name");
                    AccumulatedResponse::Empty
                } else {
                    AccumulatedResponse::FunctionCalls(self.function_buffers)
                }
            }
            ResponseKind::PlainText | ResponseKind::Undetermined => match self.role {
                Some(role) => AccumulatedResponse::Text {
                    role,
                    content: self.text,
                },
                None => {
                    if !self.text.is_empty() {
                        tracing::debug!("Discarding text from a response that never named a role");
                    }
                    AccumulatedResponse::Empty
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn fragment(choice: serde_json::Value) -> ChatResult {
        serde_json::from_value(json!({ "choices": [choice] })).expect("fragment")
    }

    fn content(text: &str) -> ChatResult {
        fragment(json!({"index": 0, "delta": {"content": text}}))
    }

    fn run(
        mode: AccumulatorMode,
        fragments: &[ChatResult],
    ) -> (Vec<AccumulatorEvent>, AccumulatedResponse) {
        let mut acc = DeltaAccumulator::new(mode);
        let events = fragments.iter().flat_map(|f| acc.push(f)).collect();
        (events, acc.finish())
    }

    #[test]
    fn tokens_are_surfaced_in_order_and_concatenated() {
        let (events, response) = run(
            AccumulatorMode::FunctionAware,
            &[
                fragment(json!({"index": 0, "delta": {"role": "assistant"}})),
                content("He"),
                content("llo"),
                fragment(json!({"index": 0, "delta": {}, "finish_reason": "stop"})),
            ],
        );

        assert_eq!(
            events,
            vec![
                AccumulatorEvent::TypeResolved(Role::Assistant),
                AccumulatorEvent::Token("He".into()),
                AccumulatorEvent::Token("llo".into()),
            ]
        );
        assert_eq!(
            response,
            AccumulatedResponse::Text {
                role: Role::Assistant,
                content: "Hello".into()
            }
        );
    }

    #[test]
    fn function_arguments_are_buffered_until_the_end() {
        let (events, response) = run(
            AccumulatorMode::FunctionAware,
            &[
                fragment(json!({"index": 0, "delta": {"function_call": {"name": "f"}}})),
                fragment(json!({"index": 0, "delta": {"function_call": {"arguments": "{\"x\":"}}})),
                fragment(json!({"index": 0, "delta": {"function_call": {"arguments": "1}"}}})),
                fragment(json!({"index": 0, "delta": {}, "finish_reason": "function_call"})),
            ],
        );

        assert_eq!(events, vec![AccumulatorEvent::TypeResolved(Role::Function)]);
        assert_eq!(
            response,
            AccumulatedResponse::FunctionCalls(vec![FunctionCall::new("f", "{\"x\":1}")])
        );
    }

    #[test]
    fn function_call_wins_over_role_in_the_same_fragment() {
        let mut acc = DeltaAccumulator::new(AccumulatorMode::FunctionAware);
        let events = acc.push(&fragment(json!({
            "index": 0,
            "delta": {"role": "assistant", "content": null,
                      "function_call": {"name": "lookup", "arguments": ""}}
        })));

        assert_eq!(events, vec![AccumulatorEvent::TypeResolved(Role::Function)]);
        assert_eq!(acc.kind(), ResponseKind::FunctionCall);
    }

    #[test]
    fn type_resolution_fires_once() {
        let (events, _) = run(
            AccumulatorMode::FunctionAware,
            &[
                content("pre"),
                fragment(json!({"index": 0, "delta": {"role": "assistant"}})),
                fragment(json!({"index": 0, "delta": {"role": "assistant", "content": "x"}})),
                fragment(json!({"index": 0, "delta": {"function_call": {"name": "late"}}})),
            ],
        );

        let resolved: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, AccumulatorEvent::TypeResolved(_)))
            .collect();
        assert_eq!(resolved, vec![&AccumulatorEvent::TypeResolved(Role::Assistant)]);
    }

    #[test]
    fn multiple_functions_keep_first_seen_order() {
        let (_, response) = run(
            AccumulatorMode::FunctionAware,
            &[
                fragment(json!({"index": 0, "delta": {"function_call": {"name": "b", "arguments": "{"}}})),
                fragment(json!({"index": 0, "delta": {"function_call": {"name": "a", "arguments": "{}"}}})),
                fragment(json!({"index": 0, "delta": {"function_call": {"name": "b", "arguments": "}"}}})),
            ],
        );

        assert_eq!(
            response,
            AccumulatedResponse::FunctionCalls(vec![
                FunctionCall::new("b", "{}"),
                FunctionCall::new("a", "{}"),
            ])
        );
    }

    #[test]
    fn plain_text_mode_ignores_function_deltas() {
        let (events, response) = run(
            AccumulatorMode::PlainTextOnly,
            &[
                fragment(json!({"index": 0, "delta": {"role": "assistant"}})),
                fragment(json!({"index": 0, "delta": {"function_call": {"name": "f"}}})),
                content("ok"),
            ],
        );

        assert_eq!(events.len(), 2);
        assert_eq!(
            response,
            AccumulatedResponse::Text {
                role: Role::Assistant,
                content: "ok".into()
            }
        );
    }

    #[test]
    fn nothing_seen_is_empty() {
        let (events, response) = run(
            AccumulatorMode::FunctionAware,
            &[fragment(json!({"index": 0, "delta": {}})), ChatResult::default()],
        );
        assert!(events.is_empty());
        assert_eq!(response, AccumulatedResponse::Empty);
    }

    #[test]
    #[traced_test]
    fn orphan_arguments_are_dropped() {
        let (_, response) = run(
            AccumulatorMode::FunctionAware,
            &[
                fragment(json!({"index": 0, "delta": {"function_call": {"arguments": "{\"lost\":"}}})),
                fragment(json!({"index": 0, "delta": {"function_call": {"name": "g", "arguments": "{}"}}})),
            ],
        );
        assert_eq!(
            response,
            AccumulatedResponse::FunctionCalls(vec![FunctionCall::new("g", "{}")])
        );
        assert!(logs_contain("Dropping function arguments"));
    }

    #[test]
    fn text_without_a_role_is_not_kept() {
        let (events, response) = run(
            AccumulatorMode::FunctionAware,
            &[content("hi"), content(" there")],
        );

        assert_eq!(
            events,
            vec![
                AccumulatorEvent::Token("hi".into()),
                AccumulatorEvent::Token(" there".into()),
            ]
        );
        assert_eq!(response, AccumulatedResponse::Empty);
    }

    #[test]
    fn finish_reason_alone_resolves_function_call() {
        let mut acc = DeltaAccumulator::new(AccumulatorMode::FunctionAware);
        let events = acc.push(&fragment(
            json!({"index": 0, "delta": {}, "finish_reason": "function_call"}),
        ));

        assert_eq!(events, vec![AccumulatorEvent::TypeResolved(Role::Function)]);
        assert_eq!(acc.kind(), ResponseKind::FunctionCall);
        assert_eq!(acc.finish(), AccumulatedResponse::Empty);
    }

    #[test]
    fn function_role_resolves_function_call() {
        let (events, response) = run(
            AccumulatorMode::FunctionAware,
            &[
                fragment(json!({"index": 0, "delta": {"role": "function"}})),
                fragment(json!({"index": 0, "delta": {"function_call": {"name": "h", "arguments": "[]"}}})),
            ],
        );

        assert_eq!(events, vec![AccumulatorEvent::TypeResolved(Role::Function)]);
        assert_eq!(
            response,
            AccumulatedResponse::FunctionCalls(vec![FunctionCall::new("h", "[]")])
        );
    }

    #[test]
    fn undetermined_tokens_then_function_call_switches_state() {
        let (events, response) = run(
            AccumulatorMode::FunctionAware,
            &[
                content("thinking"),
                fragment(json!({"index": 0, "delta": {"function_call": {"name": "f", "arguments": "{}"}}})),
                content("ignored"),
                fragment(json!({"index": 0, "delta": {"role": "assistant"}})),
            ],
        );

        assert_eq!(
            events,
            vec![
                AccumulatorEvent::Token("thinking".into()),
                AccumulatorEvent::TypeResolved(Role::Function),
            ]
        );
        assert_eq!(
            response,
            AccumulatedResponse::FunctionCalls(vec![FunctionCall::new("f", "{}")])
        );
    }
}
