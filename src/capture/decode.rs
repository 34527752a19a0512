//! Link/network/transport header decoding

use std::net::{IpAddr, SocketAddr};

use bytes::Bytes;
use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::data::{PacketData, ETHERTYPE_IPV4, ETHERTYPE_IPV6};

use crate::error::{Result, SnifferError};
use crate::flow::Segment;

/// Decode one captured packet into a TCP segment
///
/// Returns `Ok(None)` for anything that is not TCP over IPv4/IPv6. Empty
/// payloads are returned as empty segments; the engine skips them.
pub fn decode_packet(packet: PacketData<'_>, timestamp: f64, wire_len: usize) -> Result<Option<Segment>> {
    let sliced = match packet {
        PacketData::L2(frame) => SlicedPacket::from_ethernet(frame)
            .map_err(|e| SnifferError::Decode(format!("ethernet: {e:?}")))?,
        PacketData::L3(ethertype, data) if ethertype == ETHERTYPE_IPV4 || ethertype == ETHERTYPE_IPV6 => {
            SlicedPacket::from_ip(data).map_err(|e| SnifferError::Decode(format!("ip: {e:?}")))?
        }
        _ => return Ok(None),
    };

    let (src_ip, dst_ip) = match &sliced.net {
        Some(NetSlice::Ipv4(ip)) => {
            let header = ip.header();
            (IpAddr::V4(header.source_addr()), IpAddr::V4(header.destination_addr()))
        }
        Some(NetSlice::Ipv6(ip)) => {
            let header = ip.header();
            (IpAddr::V6(header.source_addr()), IpAddr::V6(header.destination_addr()))
        }
        _ => return Ok(None),
    };

    let Some(TransportSlice::Tcp(tcp)) = &sliced.transport else {
        return Ok(None);
    };

    let segment = Segment::new(
        timestamp,
        SocketAddr::new(src_ip, tcp.source_port()),
        SocketAddr::new(dst_ip, tcp.destination_port()),
        Bytes::copy_from_slice(tcp.payload()),
    )
    .with_wire_len(wire_len);

    Ok(Some(segment))
}
