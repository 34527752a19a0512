//! Userspace equivalent of `tcp port P [and src X] [and dst Y]`

use std::net::IpAddr;

use crate::config::Config;
use crate::flow::Segment;

/// Which segments the capture layer forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFilter {
    /// Either endpoint must use this port
    pub port: u16,

    /// Required sender address
    pub src: Option<IpAddr>,

    /// Required receiver address
    pub dst: Option<IpAddr>,
}

impl CaptureFilter {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            src: None,
            dst: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            port: config.server_port,
            src: config.src_filter,
            dst: config.dst_filter,
        }
    }

    pub fn matches(&self, segment: &Segment) -> bool {
        if segment.src.port() != self.port && segment.dst.port() != self.port {
            return false;
        }
        if self.src.is_some_and(|ip| segment.src.ip() != ip) {
            return false;
        }
        if self.dst.is_some_and(|ip| segment.dst.ip() != ip) {
            return false;
        }
        true
    }
}
