use std::array::TryFromSliceError;
use std::convert::{TryFrom, TryInto};
use std::net::IpAddr;
use rand::random;
use crate::icmp::{Echo, Family};

pub(crate) const TOKEN_SIZE: usize = 16;

#[derive(Debug)]
pub struct Probe {
    pub addr:  IpAddr,
    pub id:    u16,
    pub seq:   u16,
    pub size:  usize,
    pub token: Token,
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct Token([u8; TOKEN_SIZE]);

impl Probe {
    pub fn new(addr: IpAddr, id: u16, seq: u16, size: usize) -> Self {
        let token = Token(random());
        Self { addr, id, seq, size, token }
    }

    /// Encodes the echo request. The payload is `size` bytes led by the
    /// token, and never shorter than the token itself.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = vec![0u8; self.size.max(TOKEN_SIZE)];
        data[..TOKEN_SIZE].copy_from_slice(&self.token.0);

        let echo = Echo { id: self.id, seq: self.seq, data: &data };
        echo.request(Family::of(&self.addr))
    }
}

impl Token {
    /// Extracts the token leading an echo reply payload.
    pub fn from_payload(data: &[u8]) -> Option<Self> {
        data.get(..TOKEN_SIZE)?.try_into().ok()
    }
}

impl TryFrom<&[u8]> for Token {
    type Error = TryFromSliceError;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(buf.try_into()?))
    }
}
