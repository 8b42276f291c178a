use crossbeam_channel::{unbounded, Receiver, Sender};
use media_io::{best_decoder, RgbaFrame};
use std::path::PathBuf;
use std::thread;
use tracing::{debug, warn};

pub(crate) enum PreviewCmd {
    Show(f64),
    Stop,
}

pub struct PreviewFrame {
    pub time: f64,
    pub frame: RgbaFrame,
}

/// Background decoder for the frame under the playhead. Only the most
/// recent request is decoded; older ones are dropped.
pub struct PreviewWorker {
    cmd_tx: Sender<PreviewCmd>,
    frame_rx: Receiver<PreviewFrame>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PreviewWorker {
    pub fn spawn(path: PathBuf, repaint: impl Fn() + Send + 'static) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = unbounded::<PreviewCmd>();
        let (frame_tx, frame_rx) = unbounded::<PreviewFrame>();
        let handle = thread::Builder::new()
            .name("preview-decode".into())
            .spawn(move || run(path, cmd_rx, frame_tx, repaint))?;
        Ok(Self {
            cmd_tx,
            frame_rx,
            handle: Some(handle),
        })
    }

    pub fn show(&self, time: f64) {
        let _ = self.cmd_tx.send(PreviewCmd::Show(time));
    }

    /// Newest decoded frame since the last call
    pub fn latest(&self) -> Option<PreviewFrame> {
        self.frame_rx.try_iter().last()
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(PreviewCmd::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(
    path: PathBuf,
    cmd_rx: Receiver<PreviewCmd>,
    frame_tx: Sender<PreviewFrame>,
    repaint: impl Fn(),
) {
    let mut decoder = best_decoder();
    let mut last_shown: Option<f64> = None;
    let mut warned = false;

    while let Ok(cmd) = cmd_rx.recv() {
        let latest = cmd_rx.try_iter().fold(cmd, |_, newer| newer);
        let time = match latest {
            PreviewCmd::Stop => break,
            PreviewCmd::Show(time) => time,
        };
        if last_shown.is_some_and(|t| (t - time).abs() < 1e-3) {
            continue;
        }
        match decoder.decode_rgba_at(&path, time) {
            Ok(frame) => {
                last_shown = Some(time);
                if frame_tx.send(PreviewFrame { time, frame }).is_err() {
                    break;
                }
                repaint();
            }
            Err(err) if !warned => {
                warn!("preview decode failed for {}: {err}", path.display());
                warned = true;
            }
            Err(err) => debug!("preview decode failed at {time:.3}s: {err}"),
        }
    }
    debug!("preview worker for {} stopped", path.display());
}
