// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity guard: keeps calls alive across connection loss.
//!
//! While online, calls pass straight through to the wrapped transport. The
//! first connection error flips the guard offline; from then on calls wait in
//! a FIFO queue while the guard probes the transport with a capped linear
//! backoff. A successful probe flips it back online and replays the queue in
//! submission order.
//!
//! ```text
//!            connection error / rpc.connectionerror
//!   ┌────────┐ ─────────────────────────────────► ┌─────────┐ ──┐ failed probe
//!   │ Online │                                    │ Offline │   │ (backoff grows)
//!   └────────┘ ◄───────────────────────────────── └─────────┘ ◄─┘
//!               successful probe (replay queue)
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};
use wb_core::{
    BusEvent, ConnectionState, EventPublisher, ReconnectConfig, Request, RpcError, RpcResult,
};

use crate::backoff::Backoff;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::transport::{ready, ResponseFuture, Transport};

/// A call waiting for its outcome, possibly parked in the queue.
struct PendingCall {
    /// Submission order; the queue is kept sorted by it.
    seq: u64,
    request: Request,
    reply: oneshot::Sender<RpcResult<Value>>,
}

struct GuardState {
    connection: ConnectionState,
    backoff: Backoff,
    queue: VecDeque<PendingCall>,
    /// Set while queued calls are being replayed; new calls queue behind them.
    draining: bool,
    next_seq: u64,
    /// Bumped whenever a probe chain starts or ends; stale probes see a
    /// different value and stop.
    probe_epoch: u64,
}

struct Inner<T> {
    transport: T,
    probe_operation: String,
    events: Arc<dyn EventPublisher>,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<GuardState>,
}

/// Wraps a transport with offline queueing and reconnection probing.
///
/// Cheap to clone; clones share state.
pub struct ConnectivityGuard<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for ConnectivityGuard<T> {
    fn clone(&self) -> Self {
        ConnectivityGuard { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Transport + 'static> ConnectivityGuard<T> {
    /// Create a guard that schedules probes on the tokio runtime.
    pub fn new(transport: T, config: &ReconnectConfig, events: Arc<dyn EventPublisher>) -> Self {
        Self::with_scheduler(transport, config, events, Arc::new(TokioScheduler::new()))
    }

    /// Create a guard with a custom scheduler (for testing).
    pub fn with_scheduler(
        transport: T,
        config: &ReconnectConfig,
        events: Arc<dyn EventPublisher>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let state = GuardState {
            connection: ConnectionState::Online,
            backoff: Backoff::from_config(config),
            queue: VecDeque::new(),
            draining: false,
            next_seq: 0,
            probe_epoch: 0,
        };

        ConnectivityGuard {
            inner: Arc::new(Inner {
                transport,
                probe_operation: config.probe_operation.clone(),
                events,
                scheduler,
                state: Mutex::new(state),
            }),
        }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.lock().connection
    }

    pub fn is_online(&self) -> bool {
        self.state() == ConnectionState::Online
    }

    /// Get the number of calls waiting for the connection to return.
    pub fn pending_len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Get the current retry counter.
    pub fn retry_count(&self) -> u32 {
        self.lock().backoff.attempts()
    }

    /// The wrapped transport.
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Submit a call.
    ///
    /// Online calls go to the transport immediately. Offline calls are
    /// queued and the returned future resolves once they have been replayed.
    pub fn submit(&self, request: Request) -> ResponseFuture {
        if let Err(err) = request.validate() {
            return ready(Err(err));
        }

        let (reply, outcome) = oneshot::channel();
        self.dispatch(request, reply);

        Box::pin(async move { outcome.await.unwrap_or(Err(RpcError::Abandoned)) })
    }

    /// Go offline: queue new calls and start probing.
    ///
    /// Does nothing when already offline; the running probe chain continues
    /// and no event is published.
    pub fn transition_offline(&self) {
        let probe = {
            let mut state = self.lock();
            if state.connection == ConnectionState::Offline {
                debug!("already offline");
                return;
            }
            mark_offline(&mut state)
        };
        self.announce_offline(probe);
    }

    /// Go online: reset the backoff and replay queued calls in order.
    ///
    /// Calls submitted during the replay queue up behind the ones already
    /// waiting. Does nothing when already online.
    pub fn transition_online(&self) {
        {
            let mut state = self.lock();
            if state.connection == ConnectionState::Online {
                return;
            }
            state.connection = ConnectionState::Online;
            state.backoff.reset();
            state.probe_epoch = state.probe_epoch.wrapping_add(1);
            state.draining = true;
            info!("connection restored, replaying {} queued calls", state.queue.len());
        }

        self.drain();

        // A replayed call may already have taken the guard offline again;
        // that transition published its own event.
        if self.is_online() {
            self.inner.events.publish(BusEvent::ConnectionState(ConnectionState::Online));
        }
    }

    /// Probe the transport now.
    ///
    /// Success brings the guard online. Failure keeps it offline and
    /// restarts the probe chain with the next backoff delay.
    pub async fn probe_connectivity(&self) {
        let result = self.send_probe().await;
        self.finish_probe(result, None);
    }

    /// Subscribe to `rpc.connectionerror` on the bus.
    ///
    /// The listener holds only a weak reference and stops when the guard is
    /// dropped or the bus closes.
    pub fn listen(&self, mut events: broadcast::Receiver<BusEvent>) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.spawn(Box::pin(async move {
            loop {
                match events.recv().await {
                    Ok(BusEvent::ConnectionError) => match upgrade(&weak) {
                        Some(guard) => guard.transition_offline(),
                        None => break,
                    },
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("connection listener lagged, missed {} events", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue the call when offline or replaying, otherwise send it.
    fn dispatch(&self, request: Request, reply: oneshot::Sender<RpcResult<Value>>) {
        let call = {
            let mut state = self.lock();
            let seq = state.next_seq;
            state.next_seq = state.next_seq.wrapping_add(1);
            let call = PendingCall { seq, request, reply };

            if state.connection == ConnectionState::Offline || state.draining {
                debug!("queueing {}", call.request.operation);
                enqueue(&mut state.queue, call);
                return;
            }
            call
        };
        self.issue(call);
    }

    /// Hand the call to the transport and route its outcome.
    fn issue(&self, call: PendingCall) {
        let PendingCall { seq, request, reply } = call;
        let response = self.inner.transport.call(request.clone());

        let guard = self.clone();
        self.inner.scheduler.spawn(Box::pin(async move {
            let result = response.await;
            guard.complete(PendingCall { seq, request, reply }, result);
        }));
    }

    fn complete(&self, call: PendingCall, result: RpcResult<Value>) {
        let err = match result {
            Err(err) if err.is_connection() => err,
            other => {
                let _ = call.reply.send(other);
                return;
            }
        };

        let probe = {
            let mut state = self.lock();
            if state.connection == ConnectionState::Offline {
                // The guard went offline while this call was in flight; it
                // failed for the same reason, so it waits for replay.
                debug!("requeueing {} after connection error", call.request.operation);
                enqueue(&mut state.queue, call);
                return;
            }
            mark_offline(&mut state)
        };

        warn!("{} failed with connection error: {}", call.request.operation, err);
        self.announce_offline(probe);
        let _ = call.reply.send(Err(err));
    }

    /// Send queued calls one at a time, oldest first. Calls not yet sent
    /// stay in the queue, so a drop back to offline leaves them ahead of
    /// anything newer.
    fn drain(&self) {
        loop {
            let call = {
                let mut state = self.lock();
                if state.connection == ConnectionState::Offline {
                    debug!("connection lost during replay, {} calls stay queued", state.queue.len());
                    state.draining = false;
                    return;
                }
                match state.queue.pop_front() {
                    Some(call) => call,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };
            self.issue(call);
        }
    }

    fn announce_offline(&self, probe: (Duration, u64)) {
        let (delay, epoch) = probe;
        info!("connection lost, next probe in {:?}", delay);
        self.inner.events.publish(BusEvent::ConnectionState(ConnectionState::Offline));
        self.schedule_probe(delay, epoch);
    }

    fn schedule_probe(&self, delay: Duration, epoch: u64) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.schedule(
            delay,
            Box::pin(async move {
                if let Some(guard) = upgrade(&weak) {
                    guard.run_probe(epoch).await;
                }
            }),
        );
    }

    async fn run_probe(&self, epoch: u64) {
        if !self.is_current_probe(epoch) {
            debug!("dropping stale probe");
            return;
        }
        let result = self.send_probe().await;
        self.finish_probe(result, Some(epoch));
    }

    fn send_probe(&self) -> ResponseFuture {
        debug!("probing with {}", self.inner.probe_operation);
        self.inner.transport.call(Request::bare(self.inner.probe_operation.clone()))
    }

    fn is_current_probe(&self, epoch: u64) -> bool {
        let state = self.lock();
        state.connection == ConnectionState::Offline && state.probe_epoch == epoch
    }

    fn finish_probe(&self, result: RpcResult<Value>, epoch: Option<u64>) {
        if let Err(err) = result {
            let next = {
                let mut state = self.lock();
                if state.connection == ConnectionState::Online {
                    return;
                }
                if epoch.is_some_and(|e| e != state.probe_epoch) {
                    return;
                }
                state.probe_epoch = state.probe_epoch.wrapping_add(1);
                (state.backoff.next_delay(), state.probe_epoch)
            };
            debug!("probe failed ({}), next probe in {:?}", err, next.0);
            self.schedule_probe(next.0, next.1);
            return;
        }

        if epoch.is_some_and(|e| !self.is_current_probe(e)) {
            return;
        }
        self.transition_online();
    }
}

/// Inserts `call` in submission order.
fn enqueue(queue: &mut VecDeque<PendingCall>, call: PendingCall) {
    let at = queue.partition_point(|queued| queued.seq < call.seq);
    queue.insert(at, call);
}

/// Flips an online guard offline and starts a new probe chain.
fn mark_offline(state: &mut GuardState) -> (Duration, u64) {
    state.connection = ConnectionState::Offline;
    state.probe_epoch = state.probe_epoch.wrapping_add(1);
    (state.backoff.next_delay(), state.probe_epoch)
}

fn upgrade<T: Transport>(weak: &Weak<Inner<T>>) -> Option<ConnectivityGuard<T>> {
    weak.upgrade().map(|inner| ConnectivityGuard { inner })
}

impl<T: Transport + 'static> Transport for ConnectivityGuard<T> {
    fn call(&self, request: Request) -> ResponseFuture {
        self.submit(request)
    }
}
