use std::convert::{TryFrom, TryInto};
use anyhow::{anyhow, Error};
use super::{checksum, Family, HEADER_SIZE};

#[derive(Debug)]
pub struct Echo<'a> {
    pub id:   u16,
    pub seq:  u16,
    pub data: &'a [u8]
}

impl Echo<'_> {
    /// Encodes an echo request. The IPv4 checksum is filled in here,
    /// ICMPv6 checksums are computed by the kernel.
    pub fn request(&self, family: Family) -> Vec<u8> {
        let mut pkt = Vec::with_capacity(HEADER_SIZE + self.data.len());

        pkt.extend_from_slice(&[family.echo_request(), 0, 0, 0]);
        pkt.extend_from_slice(&self.id.to_be_bytes());
        pkt.extend_from_slice(&self.seq.to_be_bytes());
        pkt.extend_from_slice(self.data);

        if family == Family::V4 {
            let cksum = checksum(&pkt).to_be_bytes();
            pkt[2..4].copy_from_slice(&cksum);
        }

        pkt
    }
}

impl<'a> TryFrom<&'a [u8]> for Echo<'a> {
    type Error = Error;

    fn try_from(slice: &'a [u8]) -> Result<Self, Self::Error> {
        if slice.len() < 4 {
            return Err(anyhow!("truncated echo"));
        }

        Ok(Self {
            id:   u16::from_be_bytes(slice[0..2].try_into()?),
            seq:  u16::from_be_bytes(slice[2..4].try_into()?),
            data: &slice[4..]
        })
    }
}
