//! Function-call dispatcher.
//!
//! Consumes a guarded provider stream, accumulating text into a content
//! buffer and tool-call fragments into one call record. Once the call is
//! complete its arguments are parsed and handed to the caller's executor
//! exactly once. The lifecycle is tracked as an explicit [`DispatchState`].

use std::future::Future;

use serde_json::Value;
use tokio::sync::mpsc;
use ym_domain::error::{Error, Result};
use ym_domain::stream::StreamEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// State
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A tool call still being streamed; fields are raw concatenated text.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub index: u32,
    pub id: String,
    pub kind: String,
    pub name: String,
    pub arguments: String,
}

/// A complete call with parsed arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug)]
pub enum DispatchState {
    Streaming,
    CallAccumulating(CallRecord),
    CallComplete(FunctionCall),
    Executed { call: FunctionCall, result: Value },
    ExecutionFailed { call: FunctionCall, error: Error },
    /// Content-only completion, or a call that could not be parsed.
    Done,
}

impl DispatchState {
    pub fn name(&self) -> &'static str {
        match self {
            DispatchState::Streaming => "streaming",
            DispatchState::CallAccumulating(_) => "call_accumulating",
            DispatchState::CallComplete(_) => "call_complete",
            DispatchState::Executed { .. } => "executed",
            DispatchState::ExecutionFailed { .. } => "execution_failed",
            DispatchState::Done => "done",
        }
    }
}

/// Final result of a dispatch.
#[derive(Debug)]
pub enum Outcome {
    /// No usable function call; `content` is the model's text.
    Content { content: String },
    Executed {
        content: String,
        call: FunctionCall,
        result: Value,
    },
    ExecutionFailed {
        content: String,
        call: FunctionCall,
        error: Error,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dispatcher
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct Dispatcher {
    state: DispatchState,
    content: String,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            state: DispatchState::Streaming,
            content: String::new(),
        }
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// True once no more stream input is needed.
    pub fn is_settled(&self) -> bool {
        !matches!(
            self.state,
            DispatchState::Streaming | DispatchState::CallAccumulating(_)
        )
    }

    /// Feed one stream event.
    pub fn observe(&mut self, event: StreamEvent) {
        if self.is_settled() {
            return;
        }
        match event {
            StreamEvent::Token { text } => self.content.push_str(&text),
            StreamEvent::ToolCallDelta {
                index,
                call_id,
                kind,
                name,
                arguments,
            } => self.on_fragment(index, call_id, kind, name, arguments),
            StreamEvent::Done {
                finish_reason: Some(reason),
                ..
            } => {
                if let DispatchState::CallAccumulating(_) = self.state {
                    tracing::debug!(finish_reason = %reason, "tool-call phase finished");
                    self.complete();
                }
            }
            StreamEvent::Done { .. } => {}
        }
    }

    /// The upstream ended. A call still accumulating is completed with
    /// whatever arrived; otherwise this is a plain content completion.
    pub fn end_of_stream(&mut self) {
        match self.state {
            DispatchState::CallAccumulating(_) => self.complete(),
            DispatchState::Streaming => self.state = DispatchState::Done,
            _ => {}
        }
    }

    fn on_fragment(
        &mut self,
        index: u32,
        call_id: Option<String>,
        kind: Option<String>,
        name: Option<String>,
        arguments: Option<String>,
    ) {
        if matches!(self.state, DispatchState::Streaming) {
            tracing::debug!(index, name = name.as_deref().unwrap_or(""), "tool call started");
            self.state = DispatchState::CallAccumulating(CallRecord {
                index,
                id: call_id.unwrap_or_default(),
                kind: kind.unwrap_or_default(),
                name: name.unwrap_or_default(),
                arguments: arguments.unwrap_or_default(),
            });
            return;
        }

        match &mut self.state {
            DispatchState::CallAccumulating(record) if record.index == index => {
                if record.id.is_empty() {
                    record.id = call_id.unwrap_or_default();
                }
                if record.kind.is_empty() {
                    record.kind = kind.unwrap_or_default();
                }
                if let Some(n) = name {
                    record.name.push_str(&n);
                }
                if let Some(a) = arguments {
                    record.arguments.push_str(&a);
                }
            }
            DispatchState::CallAccumulating(record) => {
                tracing::debug!(
                    dispatched = record.index,
                    ignored = index,
                    "ignoring fragment of an additional tool call"
                );
            }
            _ => {}
        }
    }

    /// `CallAccumulating` → `CallComplete`, or `Done` when the record
    /// cannot be dispatched.
    fn complete(&mut self) {
        let DispatchState::CallAccumulating(record) =
            std::mem::replace(&mut self.state, DispatchState::Done)
        else {
            return;
        };

        if record.name.is_empty() {
            tracing::warn!("tool call without a function name; using content");
            return;
        }

        let raw = record.arguments.trim();
        let parsed = if raw.is_empty() {
            Ok(Value::Object(Default::default()))
        } else {
            serde_json::from_str::<Value>(raw)
        };

        match parsed {
            Ok(arguments) => {
                self.state = DispatchState::CallComplete(FunctionCall {
                    id: record.id,
                    name: record.name,
                    arguments,
                });
            }
            Err(e) => {
                tracing::warn!(
                    function = %record.name,
                    arguments = %record.arguments,
                    error = %e,
                    "malformed function-call arguments; using content"
                );
            }
        }
    }

    /// Run the executor for a complete call and produce the outcome.
    pub async fn settle<F, Fut>(mut self, execute: F) -> Outcome
    where
        F: FnOnce(FunctionCall) -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let DispatchState::CallComplete(call) =
            std::mem::replace(&mut self.state, DispatchState::Done)
        {
            self.state = match execute(call.clone()).await {
                Ok(result) => DispatchState::Executed { call, result },
                Err(error) => DispatchState::ExecutionFailed { call, error },
            };
        }
        tracing::debug!(state = self.state.name(), "dispatch settled");

        match self.state {
            DispatchState::Executed { call, result } => Outcome::Executed {
                content: self.content,
                call,
                result,
            },
            DispatchState::ExecutionFailed { call, error } => Outcome::ExecutionFailed {
                content: self.content,
                call,
                error,
            },
            _ => Outcome::Content {
                content: self.content,
            },
        }
    }
}

/// Drive a dispatcher over `rx` until it settles, then execute.
///
/// Stream errors (provider failure, timeout, cancellation) are returned
/// as-is; argument parse failures are not errors.
pub async fn dispatch<F, Fut>(
    mut rx: mpsc::Receiver<Result<StreamEvent>>,
    execute: F,
) -> Result<Outcome>
where
    F: FnOnce(FunctionCall) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let mut dispatcher = Dispatcher::new();
    while !dispatcher.is_settled() {
        match rx.recv().await {
            Some(Ok(event)) => dispatcher.observe(event),
            Some(Err(e)) => return Err(e),
            None => dispatcher.end_of_stream(),
        }
    }
    drop(rx);
    Ok(dispatcher.settle(execute).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(name: Option<&str>, args: Option<&str>) -> StreamEvent {
        StreamEvent::ToolCallDelta {
            index: 0,
            call_id: name.map(|_| "call_1".to_string()),
            kind: name.map(|_| "function".to_string()),
            name: name.map(str::to_string),
            arguments: args.map(str::to_string),
        }
    }

    fn done(reason: &str) -> StreamEvent {
        StreamEvent::Done {
            usage: None,
            finish_reason: Some(reason.into()),
        }
    }

    #[test]
    fn content_only_stream_ends_done() {
        let mut d = Dispatcher::new();
        d.observe(StreamEvent::Token { text: "Hello ".into() });
        d.observe(StreamEvent::Token { text: "world".into() });
        d.observe(done("stop"));
        assert!(matches!(d.state(), DispatchState::Streaming));
        d.end_of_stream();
        assert!(matches!(d.state(), DispatchState::Done));
        assert_eq!(d.content(), "Hello world");
    }

    #[test]
    fn fragments_accumulate_into_one_record() {
        let mut d = Dispatcher::new();
        d.observe(fragment(Some("ge"), Some("{\"a\"")));
        d.observe(fragment(Some("t"), None));
        d.observe(fragment(None, Some(":1}")));
        match d.state() {
            DispatchState::CallAccumulating(r) => {
                assert_eq!(r.name, "get");
                assert_eq!(r.arguments, "{\"a\":1}");
                assert_eq!(r.id, "call_1");
                assert_eq!(r.kind, "function");
            }
            other => panic!("unexpected state {}", other.name()),
        }
        d.observe(done("tool_calls"));
        match d.state() {
            DispatchState::CallComplete(call) => {
                assert_eq!(call.name, "get");
                assert_eq!(call.arguments, json!({"a": 1}));
            }
            other => panic!("unexpected state {}", other.name()),
        }
    }

    #[test]
    fn usage_only_done_does_not_complete_the_call() {
        let mut d = Dispatcher::new();
        d.observe(fragment(Some("get"), Some("{")));
        d.observe(StreamEvent::Done {
            usage: None,
            finish_reason: None,
        });
        assert!(matches!(d.state(), DispatchState::CallAccumulating(_)));
    }

    #[test]
    fn end_of_stream_completes_a_pending_call() {
        let mut d = Dispatcher::new();
        d.observe(fragment(Some("get"), Some("{}")));
        d.end_of_stream();
        assert!(matches!(d.state(), DispatchState::CallComplete(_)));
    }

    #[test]
    fn empty_arguments_parse_as_empty_object() {
        let mut d = Dispatcher::new();
        d.observe(fragment(Some("getCurrentDate"), None));
        d.observe(done("tool_calls"));
        match d.state() {
            DispatchState::CallComplete(call) => assert_eq!(call.arguments, json!({})),
            other => panic!("unexpected state {}", other.name()),
        }
    }

    #[test]
    fn malformed_arguments_degrade_to_done() {
        let mut d = Dispatcher::new();
        d.observe(StreamEvent::Token { text: "partial answer".into() });
        d.observe(fragment(Some("get"), Some("{\"a\": ")));
        d.observe(done("tool_calls"));
        assert!(matches!(d.state(), DispatchState::Done));
        assert_eq!(d.content(), "partial answer");
    }

    #[test]
    fn second_call_fragments_are_ignored() {
        let mut d = Dispatcher::new();
        d.observe(fragment(Some("first"), Some("{}")));
        d.observe(StreamEvent::ToolCallDelta {
            index: 1,
            call_id: Some("call_2".into()),
            kind: None,
            name: Some("second".into()),
            arguments: Some("{\"x\":1}".into()),
        });
        d.observe(done("tool_calls"));
        match d.state() {
            DispatchState::CallComplete(call) => {
                assert_eq!(call.name, "first");
                assert_eq!(call.arguments, json!({}));
            }
            other => panic!("unexpected state {}", other.name()),
        }
    }

    #[tokio::test]
    async fn settle_reports_execution_failure() {
        let mut d = Dispatcher::new();
        d.observe(fragment(Some("get"), Some("{\"a\":1}")));
        d.end_of_stream();
        let outcome = d
            .settle(|_| async { Err(Error::Other("boom".into())) })
            .await;
        match outcome {
            Outcome::ExecutionFailed { call, error, .. } => {
                assert_eq!(call.name, "get");
                assert!(error.to_string().contains("boom"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn dispatch_propagates_stream_errors() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Ok(StreamEvent::Token { text: "a".into() })).await.unwrap();
        tx.send(Err(Error::Timeout("idle".into()))).await.unwrap();
        drop(tx);
        let err = dispatch(rx, |_| async { Ok(Value::Null) }).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }
}
