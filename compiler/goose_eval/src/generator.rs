//! Generators and the iteration engine.
//!
//! Every source a `for` loop consumes runs on a producer thread that hands
//! values over a rendezvous channel (`bounded(0)`), so a value is only
//! produced once the consumer asks for it.
//!
//! Generator functions get a richer two-way protocol. Calling one spawns a
//! worker thread with its own [`Interpreter`] sharing the caller's scopes
//! and modules; the worker parks until the first request, then runs the
//! body up to each `yield`:
//!
//! ```text
//! consumer                      worker
//!    | --- Next --------------->  | runs body
//!    | <-- Yield(v) ------------  | parks in `yield`
//!    | --- Next --------------->  | resumes
//!    | <-- Return(v) -----------  | body finished
//!    | --- Next --------------->  |
//!    | <-- Done ----------------  |
//! ```
//!
//! `Close`, or the consumer dropping its handle, makes the parked `yield`
//! unwind the body with [`ControlFlow::Cancel`]. Handles never join their
//! worker; a disconnected worker exits on its own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::channel::{bounded, Receiver, Sender};
use goose_ir::Span;
use goose_stack::spawn_worker;

use crate::errors::{internal, ControlFlow, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::proto::ProtoBuilder;
use crate::value::{CompositeRef, FuncContext, Value};

pub type GeneratorRef = Arc<GeneratorHandle>;

enum Request {
    Next,
    IsDone,
    Close,
}

enum Reply {
    Yield(Value),
    Return(Value),
    Done,
    Error(EvalError),
    IsDone(bool),
}

/// Consumer side of a running generator.
pub struct GeneratorHandle {
    requests: Sender<Request>,
    replies: Receiver<Reply>,
    finished: AtomicBool,
}

/// What the worker runs once the first `Next` arrives.
pub(crate) struct GeneratorJob {
    pub func: Value,
    pub this: Option<Value>,
    pub args: Vec<Value>,
    pub span: Span,
}

impl GeneratorHandle {
    /// Start a worker for `job`. The body does not run until the first
    /// request.
    pub(crate) fn spawn(interp: &Interpreter, job: GeneratorJob) -> Result<GeneratorRef, EvalError> {
        let (request_tx, request_rx) = bounded(0);
        let (reply_tx, reply_rx) = bounded(0);
        let worker = interp.fork_for_worker();
        spawn_worker("goose-generator", move || run_worker(worker, job, request_rx, reply_tx))
            .map_err(|err| internal(format!("cannot start generator: {err}")))?;
        tracing::trace!("generator spawned");
        Ok(Arc::new(GeneratorHandle {
            requests: request_tx,
            replies: reply_rx,
            finished: AtomicBool::new(false),
        }))
    }

    /// Resume the body; `None` once it has finished.
    pub fn next(&self) -> Result<Option<Value>, EvalError> {
        if self.finished.load(Ordering::Acquire) {
            return Ok(None);
        }
        if self.requests.send(Request::Next).is_err() {
            self.finish();
            return Ok(None);
        }
        match self.replies.recv() {
            Ok(Reply::Yield(value)) => Ok(Some(value)),
            Ok(Reply::Return(_) | Reply::Done) | Err(_) => {
                self.finish();
                Ok(None)
            }
            Ok(Reply::Error(err)) => {
                self.finish();
                Err(err)
            }
            Ok(Reply::IsDone(_)) => Err(internal("generator answered Next with IsDone")),
        }
    }

    pub fn is_done(&self) -> bool {
        if self.finished.load(Ordering::Acquire) {
            return true;
        }
        if self.requests.send(Request::IsDone).is_err() {
            self.finish();
            return true;
        }
        match self.replies.recv() {
            Ok(Reply::IsDone(done)) => done,
            _ => {
                self.finish();
                true
            }
        }
    }

    /// Stop the worker. Later `next` calls yield nothing.
    pub fn close(&self) {
        if !self.finished.swap(true, Ordering::AcqRel) {
            // The worker may already be gone; nothing to stop then.
            let _ = self.requests.send(Request::Close);
            tracing::trace!("generator closed");
        }
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::Release);
    }
}

/// Worker-side channel ends, installed in the worker's interpreter so
/// `yield` can reach the consumer.
pub(crate) struct Yielder {
    requests: Receiver<Request>,
    replies: Sender<Reply>,
}

impl Yielder {
    /// Hand `value` to the consumer and park until it asks for more.
    pub(crate) fn yield_value(&self, value: Value) -> Result<(), EvalError> {
        if self.replies.send(Reply::Yield(value)).is_err() {
            return Err(EvalError::control(ControlFlow::Cancel));
        }
        if wait_for_next(&self.requests, &self.replies) {
            Ok(())
        } else {
            Err(EvalError::control(ControlFlow::Cancel))
        }
    }
}

/// Serve requests until a `Next` arrives. `false` when the consumer closed
/// or went away.
fn wait_for_next(requests: &Receiver<Request>, replies: &Sender<Reply>) -> bool {
    loop {
        match requests.recv() {
            Ok(Request::Next) => return true,
            Ok(Request::IsDone) => {
                if replies.send(Reply::IsDone(false)).is_err() {
                    return false;
                }
            }
            Ok(Request::Close) | Err(_) => return false,
        }
    }
}

fn run_worker(
    mut interp: Interpreter,
    job: GeneratorJob,
    requests: Receiver<Request>,
    replies: Sender<Reply>,
) {
    if !wait_for_next(&requests, &replies) {
        tracing::trace!("generator closed before start");
        return;
    }

    interp.yielder = Some(Yielder {
        requests: requests.clone(),
        replies: replies.clone(),
    });
    let result = interp.run_generator_body(&job);
    interp.yielder = None;

    let reply = match result {
        Ok(value) => Reply::Return(value),
        Err(err) if matches!(err.control_flow, Some(ControlFlow::Cancel)) => {
            tracing::trace!("generator cancelled");
            return;
        }
        Err(err) => Reply::Error(err),
    };
    if let Err(unsent) = replies.send(reply) {
        if let Reply::Error(err) = unsent.into_inner() {
            tracing::warn!(error = %err, "generator failed after its consumer left");
        }
        return;
    }

    while let Ok(request) = requests.recv() {
        let reply = match request {
            Request::Next => Reply::Done,
            Request::IsDone => Reply::IsDone(true),
            Request::Close => break,
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
    tracing::trace!("generator worker exiting");
}

/// Values pulled by a `for` loop.
pub(crate) enum ValueStream {
    Producer(Receiver<Value>),
    Generator(GeneratorRef),
}

impl ValueStream {
    /// Stream for `value`, or `None` if it is not iterable.
    pub(crate) fn open(value: &Value) -> Result<Option<ValueStream>, EvalError> {
        let values: Box<dyn Iterator<Item = Value> + Send> = match value {
            Value::String(s) => Box::new(Chars {
                text: s.clone(),
                pos: 0,
            }),
            Value::Array(a) => Box::new(a.snapshot().into_iter()),
            Value::IntRange(r) => r.values(),
            Value::FloatRange(r) => r.values(),
            Value::Generator(g) => return Ok(Some(ValueStream::Generator(g.clone()))),
            _ => return Ok(None),
        };
        spawn_producer(values).map(|rx| Some(ValueStream::Producer(rx)))
    }

    pub(crate) fn next(&mut self) -> Result<Option<Value>, EvalError> {
        match self {
            ValueStream::Producer(rx) => Ok(rx.recv().ok()),
            ValueStream::Generator(g) => g.next(),
        }
    }

    /// Stop the source early.
    pub(crate) fn close(self) {
        match self {
            // Dropping the receiver makes the producer's next send fail.
            ValueStream::Producer(rx) => drop(rx),
            ValueStream::Generator(g) => g.close(),
        }
    }
}

fn spawn_producer(
    values: Box<dyn Iterator<Item = Value> + Send>,
) -> Result<Receiver<Value>, EvalError> {
    let (tx, rx) = bounded(0);
    spawn_worker("goose-producer", move || {
        for value in values {
            if tx.send(value).is_err() {
                break;
            }
        }
    })
    .map_err(|err| internal(format!("cannot start producer: {err}")))?;
    Ok(rx)
}

/// Codepoints of a shared string as one-char strings.
struct Chars {
    text: Arc<str>,
    pos: usize,
}

impl Iterator for Chars {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let c = self.text[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(Value::string(c.to_string()))
    }
}

// Prototype

pub(crate) fn build_prototype(builder: ProtoBuilder) -> CompositeRef {
    builder
        .method("next", next)
        .method("isDone", is_done)
        .method("close", close)
        .method("toArray", to_array)
        .finish()
}

fn this_generator(ctx: &FuncContext<'_>) -> Result<GeneratorRef, EvalError> {
    match &ctx.this {
        Value::Generator(g) => Ok(g.clone()),
        other => Err(internal(format!(
            "method of Generator called on {}",
            other.type_name()
        ))),
    }
}

fn next(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(this_generator(ctx)?.next()?.unwrap_or(Value::Null))
}

fn is_done(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::Bool(this_generator(ctx)?.is_done()))
}

fn close(ctx: &mut FuncContext<'_>) -> EvalResult {
    this_generator(ctx)?.close();
    Ok(Value::Null)
}

fn to_array(ctx: &mut FuncContext<'_>) -> EvalResult {
    let generator = this_generator(ctx)?;
    let mut items = Vec::new();
    while let Some(value) = generator.next()? {
        items.push(value);
    }
    Ok(Value::array(items))
}
