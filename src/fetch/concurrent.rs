use std::{
    mem::swap,
    panic::resume_unwind,
    sync::mpsc::{Receiver, SyncSender, sync_channel},
    thread::{self, JoinHandle, panicking},
};

use log::debug;

use crate::{
    buffers::ColumnarBuffer,
    driver::{Record, Statement},
};

use super::fetch_batch;

/// Fetches batches on a dedicated system thread, one batch ahead of the application. Works with a
/// double buffer strategy: One buffer is consumed by the application, while the other one is filled
/// by the fetch thread. The two buffers flip their roles between batches.
pub struct ConcurrentFetch<S> {
    /// `None` once the fetch thread has been drained.
    channels: Option<Channels>,
    /// We join with the fetch thread if we stop receiving batches (i.e. receive_batch.recv()
    /// returns an error) or we drain. `None` if the thread has already been joined.
    fetch_thread: Option<JoinHandle<S>>,
    /// Only `Some`, if `fetch_thread` has been joined.
    statement: Option<S>,
}

struct Channels {
    /// In order to avoid reallocating buffers over and over again, we use this channel to send the
    /// buffers back to the fetch thread after the application consumed them.
    send_buffer: SyncSender<ColumnarBuffer>,
    /// Receives filled batches from the fetch thread. Once the source is empty or if an error
    /// occurs its associated sender is dropped, and receiving batches will return an error (which
    /// we expect during normal operation and cleanup, and is not forwarded to the user). Errors
    /// reported by the driver are send as a message on their own, right before that.
    receive_batch: Receiver<Result<ColumnarBuffer, Record>>,
}

impl<S> ConcurrentFetch<S>
where
    S: Statement + 'static,
{
    /// Starts fetching batches from `statement` into `buffer` on a new system thread.
    pub fn start(statement: S, buffer: ColumnarBuffer) -> Self {
        let (send_buffer, receive_buffer) = sync_channel(1);
        let (send_batch, receive_batch) = sync_channel(1);

        let fetch_thread = thread::spawn(move || {
            let mut statement = statement;
            let mut buffer = buffer;
            loop {
                match fetch_batch(&mut statement, &mut buffer) {
                    Ok(true) => (),
                    // Result set is consumed. Dropping `send_batch` signals the end to the
                    // application thread.
                    Ok(false) => break statement,
                    Err(record) => {
                        let _ = send_batch.send(Err(record));
                        break statement;
                    }
                }
                if send_batch.send(Ok(buffer)).is_err() {
                    // Should the main thread stop receiving buffers, this thread should
                    // also stop fetching batches.
                    break statement;
                }
                // Wait for the application thread to give us a buffer to fill.
                match receive_buffer.recv() {
                    // Application thread dropped sender and does not want more buffers to be
                    // filled. Let's stop this thread and return the statement.
                    Err(_) => break statement,
                    Ok(next_buffer) => buffer = next_buffer,
                }
            }
        });

        Self {
            channels: Some(Channels {
                send_buffer,
                receive_batch,
            }),
            fetch_thread: Some(fetch_thread),
            statement: None,
        }
    }
}

impl<S> ConcurrentFetch<S> {
    /// Swaps `buffer` with the next batch fetched by the fetch thread, blocking until it is
    /// available. The buffer passed in, is send to the fetch thread to be filled with the batch
    /// after.
    ///
    /// # Return
    ///
    /// * `true`: The contents of the next batch are now in `buffer`.
    /// * `false`: The result set is consumed completely. `buffer` is left untouched.
    pub fn fetch_into(&mut self, buffer: &mut ColumnarBuffer) -> Result<bool, Record> {
        let Some(channels) = &self.channels else {
            // Already drained. Treat this like a result set which is consumed completely.
            return Ok(false);
        };
        match channels.receive_batch.recv() {
            // We successfully fetched a batch from the driver.
            Ok(Ok(mut batch)) => {
                swap(buffer, &mut batch);
                let _ = channels.send_buffer.send(batch);
                Ok(true)
            }
            Ok(Err(record)) => {
                self.drain();
                Err(record)
            }
            // Fetch thread stopped sending batches, because we consumed the result set
            // completely.
            Err(_receive_error) => {
                self.drain();
                Ok(false)
            }
        }
    }

    /// Waits for any fetch in flight to complete, discards its batch and joins the fetch thread.
    /// There is no way to cancel a fetch, which has already been issued to the driver.
    pub fn drain(&mut self) {
        // Dropping both channels is necessary to avoid deadlocks. The fetch thread may either wait
        // to send a batch, or wait to receive a buffer to fill.
        if self.channels.take().is_some() {
            debug!("Draining concurrent fetch.");
        }
        if let Some(join_handle) = self.fetch_thread.take() {
            match join_handle.join() {
                Ok(statement) => self.statement = Some(statement),
                // Avoid panicking, if we already have a panic. We don't want to mask the original
                // error.
                Err(payload) => {
                    if !panicking() {
                        resume_unwind(payload)
                    }
                }
            }
        }
    }

    /// Drains the fetch thread and yields the statement back.
    pub fn into_statement(mut self) -> Option<S> {
        self.drain();
        self.statement.take()
    }
}

impl<S> Drop for ConcurrentFetch<S> {
    fn drop(&mut self) {
        self.drain()
    }
}
