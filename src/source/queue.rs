use super::FrameSource;
use crate::error::Result;
use crate::models::Candidate;
use crossbeam_channel::{Receiver, bounded};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Reading end of a producer thread.
///
/// Frames arrive tagged with strictly increasing indices starting at the
/// `start_frame` given to [`spawn_source`]. Only one reader may consume it.
pub struct FrameQueue {
    rx: Receiver<Result<(u64, Vec<Candidate>)>>,
    handle: Option<JoinHandle<()>>,
}

/// Run `source` on its own thread, feeding a bounded queue of `capacity` frames
pub fn spawn_source<S>(mut source: S, start_frame: u64, capacity: usize) -> FrameQueue
where
    S: FrameSource + Send + 'static,
{
    let (tx, rx) = bounded(capacity.max(1));
    let handle = thread::spawn(move || {
        let mut frame_index = start_frame;
        loop {
            let item = match source.next_frame() {
                Ok(Some(candidates)) => Ok((frame_index, candidates)),
                Ok(None) => {
                    debug!(frames = frame_index - start_frame, "source finished");
                    break;
                }
                Err(err) => {
                    warn!(frame = frame_index, error = %err, "source failed");
                    let _ = tx.send(Err(err));
                    break;
                }
            };
            if tx.send(item).is_err() {
                debug!(frame = frame_index, "queue reader gone");
                break;
            }
            frame_index += 1;
        }
    });
    FrameQueue {
        rx,
        handle: Some(handle),
    }
}

impl FrameQueue {
    /// Block for the next frame with its index; `None` once the producer is done
    pub fn recv_indexed(&mut self) -> Result<Option<(u64, Vec<Candidate>)>> {
        match self.rx.recv() {
            Ok(item) => item.map(Some),
            Err(_) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
                Ok(None)
            }
        }
    }
}

impl FrameSource for FrameQueue {
    fn next_frame(&mut self) -> Result<Option<Vec<Candidate>>> {
        Ok(self.recv_indexed()?.map(|(_, candidates)| candidates))
    }

    fn next_indexed(&mut self, _expected: u64) -> Result<Option<(u64, Vec<Candidate>)>> {
        self.recv_indexed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Symbology;
    use crate::source::FrameList;

    #[test]
    fn test_queue_preserves_order_and_indices() {
        let c = Candidate::new("x", Symbology::QrCode);
        let list = FrameList::from(vec![vec![c.clone()], vec![], vec![c.clone(), c.clone()]]);
        let mut queue = spawn_source(list, 7, 1);
        assert_eq!(queue.recv_indexed().unwrap(), Some((7, vec![c.clone()])));
        assert_eq!(queue.recv_indexed().unwrap(), Some((8, vec![])));
        assert_eq!(queue.recv_indexed().unwrap().map(|(i, f)| (i, f.len())), Some((9, 2)));
        assert_eq!(queue.recv_indexed().unwrap(), None);
        assert_eq!(queue.next_frame().unwrap(), None);
    }

    #[test]
    fn test_queue_keeps_producer_index_over_expected() {
        let c = Candidate::new("x", Symbology::QrCode);
        let mut queue = spawn_source(FrameList::from(vec![vec![c.clone()]]), 3, 4);
        assert_eq!(queue.next_indexed(0).unwrap(), Some((3, vec![c])));
        assert_eq!(queue.next_indexed(4).unwrap(), None);
    }
}
