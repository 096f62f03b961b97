//! Single-consumer hand-off for filling a document from other threads.
//!
//! A [`Document`] is not safe for concurrent mutation. Producers therefore
//! never touch it: they compute their data independently and send boxed
//! operations through a bounded channel to one consumer thread, which owns the
//! document, applies the operations in order and finally hands the document
//! to a finisher (typically `save` or `close`). A full queue blocks the
//! producer, so backpressure from the output reaches the producers.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::document::Document;
use crate::error::{Result, RustyodsError};

/// Work applied to the document on the consumer thread.
pub type Operation = Box<dyn FnOnce(&mut Document) -> Result<()> + Send>;

/// Message carried by the bus.
pub enum Instruction {
    Apply(Operation),
    /// End of stream. Everything queued after it is discarded.
    Stop,
}

/// Producer handle. Clone it once per producer thread.
#[derive(Clone)]
pub struct BusSender {
    sender: SyncSender<Instruction>,
}

impl BusSender {
    /// Queue `operation`, blocking while the queue is full.
    ///
    /// Fails with [`RustyodsError::Closed`] once the consumer has stopped.
    pub fn send<F>(&self, operation: F) -> Result<()>
    where
        F: FnOnce(&mut Document) -> Result<()> + Send + 'static,
    {
        self.sender
            .send(Instruction::Apply(Box::new(operation)))
            .map_err(|_| RustyodsError::Closed)
    }

    /// Ask the consumer to stop after the operations already queued.
    pub fn stop(&self) -> Result<()> {
        self.sender
            .send(Instruction::Stop)
            .map_err(|_| RustyodsError::Closed)
    }
}

/// The consumer thread and the handle used to feed it.
pub struct DocumentBus<T> {
    sender: Option<BusSender>,
    handle: Option<JoinHandle<Result<T>>>,
}

impl<T: Send + 'static> DocumentBus<T> {
    /// Move `document` to a new consumer thread with a queue of `capacity`
    /// operations. `finisher` runs once the stream ends.
    pub fn spawn<F>(document: Document, capacity: usize, finisher: F) -> Result<Self>
    where
        F: FnOnce(Document) -> Result<T> + Send + 'static,
    {
        let (sender, receiver) = sync_channel(capacity.max(1));
        let handle = thread::Builder::new()
            .name("rustyods-consumer".to_string())
            .spawn(move || consume(document, receiver, finisher))?;
        Ok(DocumentBus {
            sender: Some(BusSender { sender }),
            handle: Some(handle),
        })
    }

    /// A new producer handle.
    pub fn sender(&self) -> Result<BusSender> {
        self.sender.clone().ok_or(RustyodsError::Closed)
    }

    /// Stop the consumer, wait for it and return the finisher's result, or
    /// the first error an operation returned.
    pub fn join(mut self) -> Result<T> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<T> {
        if let Some(sender) = self.sender.take() {
            // The consumer may already be gone; its result below says why.
            let _ = sender.stop();
        }
        let handle = self.handle.take().ok_or(RustyodsError::Closed)?;
        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(RustyodsError::custom("document consumer thread panicked")),
        }
    }
}

impl<T> Drop for DocumentBus<T> {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.stop();
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("document consumer thread panicked");
            }
        }
    }
}

fn consume<T, F>(mut document: Document, receiver: Receiver<Instruction>, finisher: F) -> Result<T>
where
    F: FnOnce(Document) -> Result<T>,
{
    let mut applied = 0usize;
    let mut first_error = None;
    // Ends on Stop or once every sender is dropped.
    for instruction in receiver.iter() {
        match instruction {
            Instruction::Apply(operation) => {
                if first_error.is_some() {
                    continue;
                }
                match operation(&mut document) {
                    Ok(()) => applied += 1,
                    Err(e) => {
                        warn!("operation {} failed, discarding the rest: {}", applied, e);
                        first_error = Some(e);
                    }
                }
            }
            Instruction::Stop => break,
        }
    }
    drop(receiver);
    debug!("document consumer applied {} operations", applied);
    match first_error {
        Some(e) => Err(e),
        None => finisher(document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;

    #[test]
    fn test_operations_apply_in_order() {
        let mut doc = Document::new();
        doc.add_table("Data").unwrap();
        let bus = DocumentBus::spawn(doc, 4, |doc| {
            Ok(doc.table("Data").unwrap().value(2, 0).clone())
        })
        .unwrap();
        let sender = bus.sender().unwrap();
        let producer = thread::spawn(move || {
            for i in 0..3u32 {
                sender
                    .send(move |doc| {
                        doc.cursor("Data")?.to_cell(i, 0)?.set_value(i * 10)?;
                        Ok(())
                    })
                    .unwrap();
            }
        });
        producer.join().unwrap();
        assert_eq!(bus.join().unwrap(), CellValue::Float(20.0));
    }

    #[test]
    fn test_first_error_wins() {
        let bus = DocumentBus::spawn(Document::new(), 2, |_| Ok(())).unwrap();
        let sender = bus.sender().unwrap();
        sender
            .send(|doc| doc.cursor("missing").map(|_| ()))
            .unwrap();
        sender.send(|doc| doc.add_table("x:y").map(|_| ())).unwrap();
        assert!(matches!(bus.join(), Err(RustyodsError::TableNotFound(_))));
    }

    #[test]
    fn test_send_after_stop_fails() {
        let bus = DocumentBus::spawn(Document::new(), 1, |doc| Ok(doc.tables().len())).unwrap();
        let sender = bus.sender().unwrap();
        sender.send(|doc| doc.add_table("A").map(|_| ())).unwrap();
        assert_eq!(bus.join().unwrap(), 1);
        assert!(matches!(sender.send(|_| Ok(())), Err(RustyodsError::Closed)));
    }

    #[test]
    fn test_panicking_operation_is_reported() {
        let bus = DocumentBus::spawn(Document::new(), 1, |_| Ok(())).unwrap();
        bus.sender().unwrap().send(|_| panic!("boom")).unwrap();
        assert!(matches!(bus.join(), Err(RustyodsError::Custom(_))));
    }
}
