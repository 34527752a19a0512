//! Capture Module
//!
//! Turns a pcap or pcapng byte stream into `Segment`s for the engine.
//!
//! ## Pipeline
//! ```text
//!  file / stdin ──► PcapSource ──► CaptureFilter ──► channel ──► Engine
//!                  (pcap-parser,                    (bounded,
//!                    etherparse)                     optional)
//! ```
//!
//! Live interfaces are read by piping a capture tool into stdin, e.g.
//! `tcpdump -i eth0 -s 65535 -U -w - tcp port 6379 | resp-sniffer`.

mod decode;
mod filter;
mod pcap;

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver};

use crate::error::Result;
use crate::flow::Segment;

pub use decode::decode_packet;
pub use filter::CaptureFilter;
pub use pcap::PcapSource;

/// Run a segment source on its own thread
///
/// The source is built on the capture thread by `open`, so it does not need
/// to be `Send`. Segments arrive on the returned receiver in capture order.
/// The thread stops after forwarding the source's first error, at the end
/// of the source, or once the receiver is dropped.
pub fn spawn_reader<F, S>(open: F, capacity: usize) -> Result<(Receiver<Result<Segment>>, JoinHandle<()>)>
where
    F: FnOnce() -> Result<S> + Send + 'static,
    S: Iterator<Item = Result<Segment>>,
{
    let (tx, rx) = channel::bounded(capacity.max(1));

    let handle = thread::Builder::new()
        .name("capture".to_string())
        .spawn(move || {
            let source = match open() {
                Ok(source) => source,
                Err(e) => {
                    if let Err(unsent) = tx.send(Err(e)) {
                        if let Err(e) = unsent.into_inner() {
                            tracing::debug!("Segment receiver dropped before open error: {}", e);
                        }
                    }
                    return;
                }
            };

            for item in source {
                let failed = item.is_err();
                if tx.send(item).is_err() {
                    tracing::debug!("Segment receiver dropped, stopping capture");
                    return;
                }
                if failed {
                    return;
                }
            }
            tracing::debug!("Capture source exhausted");
        })?;

    Ok((rx, handle))
}
