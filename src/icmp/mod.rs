use std::convert::TryInto;
use std::net::IpAddr;
use anyhow::{anyhow, Result};

pub use echo::Echo;

mod echo;

pub const HEADER_SIZE: usize = 8;

pub const V4_ECHO_REPLY:   u8 = 0;
pub const V4_ECHO_REQUEST: u8 = 8;
pub const V6_ECHO_REQUEST: u8 = 128;
pub const V6_ECHO_REPLY:   u8 = 129;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Family {
    V4,
    V6,
}

#[derive(Debug)]
pub enum Message<'a> {
    EchoRequest(Echo<'a>),
    EchoReply(Echo<'a>),
    Other(u8, u8),
}

impl Family {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    pub fn echo_request(self) -> u8 {
        match self {
            Family::V4 => V4_ECHO_REQUEST,
            Family::V6 => V6_ECHO_REQUEST,
        }
    }

    pub fn echo_reply(self) -> u8 {
        match self {
            Family::V4 => V4_ECHO_REPLY,
            Family::V6 => V6_ECHO_REPLY,
        }
    }
}

impl<'a> Message<'a> {
    /// Decodes an ICMP message with any IP header already stripped.
    pub fn decode(family: Family, slice: &'a [u8]) -> Result<Self> {
        if slice.len() < HEADER_SIZE {
            return Err(anyhow!("short packet: {} bytes", slice.len()));
        }

        let kind = slice[0];
        let code = slice[1];
        let rest = &slice[4..];

        Ok(match (kind, code) {
            (k, 0) if k == family.echo_reply()   => Message::EchoReply(rest.try_into()?),
            (k, 0) if k == family.echo_request() => Message::EchoRequest(rest.try_into()?),
            _                                    => Message::Other(kind, code),
        })
    }
}

pub fn checksum(pkt: &[u8]) -> u16 {
    let mut sum = 0u32;

    for chunk in pkt.chunks(2) {
        let word = match chunk {
            [x, y] => u16::from_be_bytes([*x, *y]),
            [x]    => u16::from_be_bytes([*x, 0]),
            _      => unreachable!(),
        } as u32;
        sum = sum.wrapping_add(word);
    }

    while (sum >> 16) > 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }

    !sum as u16
}
