//! pcap / pcapng reader
//!
//! Streams packets out of a legacy pcap or a pcapng container, in file
//! order, and yields the TCP segments that pass the capture filter.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use pcap_parser::data::get_packetdata;
use pcap_parser::pcapng::Block;
use pcap_parser::traits::{PcapNGPacketBlock, PcapReaderIterator};
use pcap_parser::{create_reader, Linktype, PcapBlockOwned, PcapError};

use crate::error::{Result, SnifferError};
use crate::flow::Segment;

use super::{decode_packet, CaptureFilter};

/// Reader buffer size; must hold the largest block in the capture
/// (262144 byte snaplen plus block framing)
const READER_CAPACITY: usize = 512 * 1024;

/// pcapng default timestamp resolution (microseconds)
const DEFAULT_TSRESOL: u8 = 6;

/// Link layer of a legacy pcap stream
#[derive(Debug, Clone, Copy)]
struct LegacyLink {
    linktype: Linktype,
    units_per_sec: f64,
}

/// One pcapng interface description
#[derive(Debug, Clone, Copy)]
struct Interface {
    linktype: Linktype,
    units_per_sec: f64,
    offset_secs: f64,
}

/// Link state collected from header blocks
#[derive(Debug, Default)]
struct LinkState {
    legacy: Option<LegacyLink>,
    interfaces: Vec<Interface>,
    last_timestamp: f64,
}

impl LinkState {
    /// Turn one block into a segment, updating link state on header blocks
    fn segment(&mut self, block: PcapBlockOwned<'_>) -> Result<Option<Segment>> {
        match block {
            PcapBlockOwned::LegacyHeader(header) => {
                let units_per_sec = if header.is_nanosecond_precision() { 1e9 } else { 1e6 };
                tracing::debug!(linktype = ?header.network, "pcap header");
                self.legacy = Some(LegacyLink {
                    linktype: header.network,
                    units_per_sec,
                });
                Ok(None)
            }
            PcapBlockOwned::Legacy(packet) => {
                let link = self.legacy.unwrap_or(LegacyLink {
                    linktype: Linktype::ETHERNET,
                    units_per_sec: 1e6,
                });
                let timestamp = packet.ts_sec as f64 + packet.ts_usec as f64 / link.units_per_sec;
                self.last_timestamp = timestamp;
                to_segment(
                    packet.data,
                    link.linktype,
                    packet.caplen as usize,
                    timestamp,
                    packet.origlen as usize,
                )
            }
            PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                self.interfaces.clear();
                Ok(None)
            }
            PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                let tsresol = if idb.if_tsresol == 0 { DEFAULT_TSRESOL } else { idb.if_tsresol };
                tracing::debug!(linktype = ?idb.linktype, tsresol, "pcapng interface");
                self.interfaces.push(Interface {
                    linktype: idb.linktype,
                    units_per_sec: units_per_sec(tsresol),
                    offset_secs: idb.if_tsoffset as f64,
                });
                Ok(None)
            }
            PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => {
                let Some(iface) = self.interfaces.get(epb.if_id as usize).copied() else {
                    return Err(SnifferError::Capture(format!(
                        "packet references unknown interface {}",
                        epb.if_id
                    )));
                };
                let ticks = ((epb.ts_high as u64) << 32) | epb.ts_low as u64;
                let timestamp = iface.offset_secs + ticks as f64 / iface.units_per_sec;
                self.last_timestamp = timestamp;
                to_segment(
                    epb.packet_data(),
                    iface.linktype,
                    epb.caplen as usize,
                    timestamp,
                    epb.origlen as usize,
                )
            }
            PcapBlockOwned::NG(Block::SimplePacket(spb)) => {
                // Simple packets carry no timestamp
                let Some(iface) = self.interfaces.first().copied() else {
                    return Ok(None);
                };
                let data = spb.packet_data();
                to_segment(
                    data,
                    iface.linktype,
                    data.len(),
                    self.last_timestamp,
                    spb.origlen as usize,
                )
            }
            _ => Ok(None),
        }
    }
}

/// Ticks per second for a pcapng `if_tsresol` value
fn units_per_sec(tsresol: u8) -> f64 {
    let exponent = (tsresol & 0x7f) as i32;
    if tsresol & 0x80 != 0 {
        2f64.powi(exponent)
    } else {
        10f64.powi(exponent)
    }
}

fn to_segment(
    data: &[u8],
    linktype: Linktype,
    caplen: usize,
    timestamp: f64,
    wire_len: usize,
) -> Result<Option<Segment>> {
    match get_packetdata(data, linktype, caplen) {
        Some(packet) => decode_packet(packet, timestamp, wire_len),
        None => Ok(None),
    }
}

/// Segment source over a pcap or pcapng stream
pub struct PcapSource {
    reader: Box<dyn PcapReaderIterator>,
    filter: CaptureFilter,
    link: LinkState,
    finished: bool,

    /// Packets that failed header decoding
    undecodable: u64,
}

impl PcapSource {
    /// Read a capture from any byte stream
    pub fn new<R: Read + 'static>(input: R, filter: CaptureFilter) -> Result<Self> {
        let reader = create_reader(READER_CAPACITY, input)
            .map_err(|e| SnifferError::Capture(format!("failed to create reader: {e}")))?;

        Ok(Self {
            reader,
            filter,
            link: LinkState::default(),
            finished: false,
            undecodable: 0,
        })
    }

    /// Read a capture file
    pub fn open(path: &Path, filter: CaptureFilter) -> Result<Self> {
        let file = File::open(path)?;
        tracing::debug!("Reading capture from {}", path.display());
        Self::new(file, filter)
    }

    /// Read a capture from standard input
    pub fn stdin(filter: CaptureFilter) -> Result<Self> {
        tracing::debug!("Reading capture from stdin");
        Self::new(io::stdin(), filter)
    }

    /// Open `path`, or standard input when it is `-`
    pub fn from_arg(path: &str, filter: CaptureFilter) -> Result<Self> {
        if path == "-" {
            Self::stdin(filter)
        } else {
            Self::open(Path::new(path), filter)
        }
    }

    /// Packets skipped because their headers could not be decoded
    pub fn undecodable(&self) -> u64 {
        self.undecodable
    }

    fn finish(&mut self) {
        self.finished = true;
        if self.undecodable > 0 {
            tracing::info!("Capture ended, {} undecodable packets skipped", self.undecodable);
        } else {
            tracing::debug!("Capture ended");
        }
    }
}

impl Iterator for PcapSource {
    type Item = Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.reader.next() {
                Ok((offset, block)) => {
                    let decoded = self.link.segment(block);
                    self.reader.consume(offset);

                    match decoded {
                        Ok(Some(segment)) if self.filter.matches(&segment) => {
                            return Some(Ok(segment));
                        }
                        Ok(_) => {}
                        Err(SnifferError::Decode(reason)) => {
                            self.undecodable += 1;
                            tracing::debug!("Skipping undecodable packet: {}", reason);
                        }
                        Err(e) => {
                            self.finished = true;
                            return Some(Err(e));
                        }
                    }
                }
                Err(PcapError::Eof) => self.finish(),
                Err(PcapError::Incomplete(_)) => {
                    if self.reader.reader_exhausted() {
                        tracing::warn!("Capture ends with a truncated block");
                        self.finish();
                    } else if let Err(e) = self.reader.refill() {
                        self.finished = true;
                        return Some(Err(SnifferError::Capture(format!(
                            "failed to refill reader: {e}"
                        ))));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(SnifferError::Capture(format!("pcap parse error: {e}"))));
                }
            }
        }
        None
    }
}
