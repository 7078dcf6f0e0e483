//! Scripted transport and dialer for client tests.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::core::CallContext;
use crate::message::{Exchange, JsonCodec, Message, MessageCodec};
use crate::transport::{DialError, Dialer, Transport, TransportError, TransportResult};

/// Something a fake transport or dialer did, tagged with the connection id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Dial(usize),
    WriteDeadline(usize),
    ReadDeadline(usize),
    Send(usize, Vec<u8>),
    Recv(usize),
    Close(usize),
}

/// Shared, ordered record of events across every fake connection.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub(crate) fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn sent(&self) -> Vec<(usize, Vec<u8>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Send(id, bytes) => Some((id, bytes)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

/// What the next `recv` on a fake transport does.
pub(crate) enum RecvStep {
    /// Answer the last request with its own payload.
    Echo,
    /// Return these bytes.
    Bytes(Vec<u8>),
    /// Fail.
    Fail(TransportError),
    /// Never complete.
    Hang,
}

pub(crate) fn broken_pipe() -> TransportError {
    TransportError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
}

/// Transport whose behavior is scripted step by step.
///
/// Empty scripts mean success: sends succeed and receives echo.
pub(crate) struct FakeTransport {
    id: usize,
    log: EventLog,
    sends: VecDeque<TransportError>,
    recvs: VecDeque<RecvStep>,
    close_error: Option<TransportError>,
    last_request: Option<Vec<u8>>,
    yield_between_ops: bool,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            id: 0,
            log: EventLog::default(),
            sends: VecDeque::new(),
            recvs: VecDeque::new(),
            close_error: None,
            last_request: None,
            yield_between_ops: false,
        }
    }

    pub(crate) fn fail_send(mut self, err: TransportError) -> Self {
        self.sends.push_back(err);
        self
    }

    pub(crate) fn then_recv(mut self, step: RecvStep) -> Self {
        self.recvs.push_back(step);
        self
    }

    pub(crate) fn close_error(mut self, err: TransportError) -> Self {
        self.close_error = Some(err);
        self
    }

    /// Yield to the scheduler inside every send and receive.
    pub(crate) fn yielding(mut self) -> Self {
        self.yield_between_ops = true;
        self
    }

    fn echo(&self) -> TransportResult<Vec<u8>> {
        let Some(request) = &self.last_request else {
            return Err(TransportError::ConnectionClosed);
        };
        let msg: Message = JsonCodec.decode(request).map_err(|_| TransportError::ConnectionClosed)?;
        let Some(Exchange::Request(req)) = msg.exchange else {
            return Err(TransportError::ConnectionClosed);
        };
        let reply = Message::response(req.call_id, Some(req.payload));
        JsonCodec.encode(&reply).map_err(|_| TransportError::ConnectionClosed)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn set_write_deadline(&mut self, _deadline: Instant) -> TransportResult<()> {
        self.log.push(Event::WriteDeadline(self.id));
        Ok(())
    }

    fn set_read_deadline(&mut self, _deadline: Instant) -> TransportResult<()> {
        self.log.push(Event::ReadDeadline(self.id));
        Ok(())
    }

    async fn send(&mut self, payload: &[u8]) -> TransportResult<()> {
        if self.yield_between_ops {
            tokio::task::yield_now().await;
        }
        self.log.push(Event::Send(self.id, payload.to_vec()));
        if let Some(err) = self.sends.pop_front() {
            return Err(err);
        }
        self.last_request = Some(payload.to_vec());
        Ok(())
    }

    async fn recv(&mut self) -> TransportResult<Vec<u8>> {
        if self.yield_between_ops {
            tokio::task::yield_now().await;
        }
        self.log.push(Event::Recv(self.id));
        match self.recvs.pop_front().unwrap_or(RecvStep::Echo) {
            RecvStep::Echo => self.echo(),
            RecvStep::Bytes(bytes) => Ok(bytes),
            RecvStep::Fail(err) => Err(err),
            RecvStep::Hang => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.log.push(Event::Close(self.id));
        match self.close_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// What the next dial does.
pub(crate) enum DialStep {
    Connect(FakeTransport),
    Fail,
}

/// Dialer handing out scripted transports; connections are numbered from 1
/// in dial order. An exhausted script connects an echoing transport.
pub(crate) struct FakeDialer {
    log: EventLog,
    steps: Mutex<VecDeque<DialStep>>,
    attempts: Mutex<Vec<Instant>>,
    always_fail: bool,
}

impl FakeDialer {
    pub(crate) fn new(log: EventLog) -> Self {
        Self {
            log,
            steps: Mutex::new(VecDeque::new()),
            attempts: Mutex::new(Vec::new()),
            always_fail: false,
        }
    }

    pub(crate) fn failing(log: EventLog) -> Self {
        Self {
            always_fail: true,
            ..Self::new(log)
        }
    }

    pub(crate) fn then(self, step: DialStep) -> Self {
        self.steps.lock().unwrap().push_back(step);
        self
    }

    pub(crate) fn then_connect(self, transport: FakeTransport) -> Self {
        self.then(DialStep::Connect(transport))
    }

    pub(crate) fn then_fail(self, times: usize) -> Self {
        (0..times).fold(self, |dialer, _| dialer.then(DialStep::Fail))
    }

    /// When each dial attempt started.
    pub(crate) fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dialer for FakeDialer {
    async fn dial(&self, _ctx: &CallContext) -> Result<Box<dyn Transport>, DialError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(Instant::now());
            attempts.len()
        };

        let step = if self.always_fail {
            DialStep::Fail
        } else {
            self.steps
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| DialStep::Connect(FakeTransport::new()))
        };

        match step {
            DialStep::Connect(mut transport) => {
                let id = self.log.count(|e| matches!(e, Event::Dial(_))) + 1;
                self.log.push(Event::Dial(id));
                transport.id = id;
                transport.log = self.log.clone();
                Ok(Box::new(transport))
            }
            DialStep::Fail => Err(DialError::new(
                format!("fake:{attempt}"),
                TransportError::ConnectionClosed,
            )),
        }
    }
}
