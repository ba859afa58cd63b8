// SPDX-License-Identifier: GPL-3.0-or-later
// src/net/mock.rs
//
// In-memory transport for tests: canned replies, request log and an
// in-flight high-water mark.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{Body, ProgressSink, Reply, Request, Transport, TransportError};

type Responder = Box<dyn Fn(&Request) -> Result<Reply, TransportError> + Send + Sync>;

pub struct MockTransport {
    responder: Responder,
    delay: Duration,
    pub log: Mutex<Vec<Request>>,
    pub completed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new(
        responder: impl Fn(&Request) -> Result<Reply, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            delay: Duration::from_millis(5),
            log: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        request: Request,
        progress: Option<ProgressSink>,
    ) -> impl Future<Output = Result<Reply, TransportError>> + Send {
        async move {
            self.log.lock().unwrap().push(request.clone());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let (Some(report), Body::Multipart { file, .. }) = (&progress, &request.body) {
                report(file.size / 2, file.size);
                report(file.size, file.size);
            }
            tokio::time::sleep(self.delay).await;
            let reply = (self.responder)(&request);

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            let label = match &request.body {
                Body::Multipart { file, .. } => file.name.clone(),
                _ => request.url.clone(),
            };
            self.completed.lock().unwrap().push(label);
            reply
        }
    }
}
