use crate::session::{AssistRequest, AssistResponse};
use assistant::AnnotationAssistant;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Runs assistant requests off the UI thread and hands the responses back
/// through a channel polled once per frame.
pub struct AssistDispatcher {
    runtime: Runtime,
    assistant: Arc<dyn AnnotationAssistant>,
    tx: Sender<AssistResponse>,
    rx: Receiver<AssistResponse>,
}

impl AssistDispatcher {
    pub fn new(assistant: Arc<dyn AnnotationAssistant>) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("assistant")
            .enable_all()
            .build()?;
        let (tx, rx) = unbounded();
        Ok(Self {
            runtime,
            assistant,
            tx,
            rx,
        })
    }

    /// `notify` runs after the response is queued, typically to wake the UI.
    pub fn dispatch(&self, request: AssistRequest, notify: impl FnOnce() + Send + 'static) {
        let assistant = Arc::clone(&self.assistant);
        let tx = self.tx.clone();
        debug!(
            "dispatching {:?} to {} (epoch {})",
            request.kind(),
            assistant.name(),
            request.epoch
        );
        self.runtime.spawn(async move {
            let response = request.run(assistant.as_ref()).await;
            if tx.send(response).is_ok() {
                notify();
            }
        });
    }

    pub fn try_recv(&self) -> Option<AssistResponse> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<AssistResponse> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AssistKind, AssistPayload};
    use assistant::ScriptedAssistant;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn responses_come_back_with_request_epoch() {
        let assistant = Arc::new(ScriptedAssistant::new().with_refinement("Clean."));
        let dispatcher = AssistDispatcher::new(assistant.clone()).unwrap();
        let woke = Arc::new(AtomicBool::new(false));
        let flag = woke.clone();

        assert!(dispatcher.try_recv().is_none());
        dispatcher.dispatch(
            AssistRequest {
                epoch: 7,
                payload: AssistPayload::Refine("dirty".into()),
            },
            move || flag.store(true, Ordering::SeqCst),
        );

        let response = dispatcher.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(response.epoch, 7);
        assert_eq!(response.kind, AssistKind::Refine);
        assert_eq!(response.result.unwrap(), "Clean.");
        assert_eq!(assistant.refine_calls(), 1);

        // notify runs right after the send; give the worker a moment.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !woke.load(Ordering::SeqCst) && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(woke.load(Ordering::SeqCst));
    }
}
