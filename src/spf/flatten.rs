//-
// Copyright (c) 2026, the spf-breakdown authors
//
// This file is part of spf-breakdown.
//
// spf-breakdown is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// spf-breakdown is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with spf-breakdown. If not, see <http://www.gnu.org/licenses/>.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use super::tree::{ContainmentMatch, PolicyNode};
use crate::support::error::Error;

/// A parsed `address/length` range.
///
/// Host bits in `addr` are permitted and ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cidr {
    addr: IpAddr,
    len: u8,
}

impl FromStr for Cidr {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        let (addr, len) = s.split_once('/').ok_or(())?;
        if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }

        let addr = addr.parse::<IpAddr>().map_err(|_| ())?;
        let len = len.parse::<u8>().map_err(|_| ())?;
        Self::new(addr, len).ok_or(())
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

impl Cidr {
    /// Returns `None` if `len` is too long for the family of `addr`.
    pub fn new(addr: IpAddr, len: u8) -> Option<Self> {
        let max = if addr.is_ipv4() { 32 } else { 128 };
        (len <= max).then_some(Self { addr, len })
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    /// Whether `ip` lies within this range.
    ///
    /// Addresses of the other family are never contained.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.addr, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = u32::MAX.checked_shl(32 - u32::from(self.len));
                let mask = mask.unwrap_or(0);
                u32::from(net) & mask == u32::from(ip) & mask
            },
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = u128::MAX.checked_shl(128 - u32::from(self.len));
                let mask = mask.unwrap_or(0);
                u128::from(net) & mask == u128::from(ip) & mask
            },
            _ => false,
        }
    }
}

/// Tests `address` against every range in the tree rooted at `node`.
///
/// The result lists each node's own ranges in rule order, followed by those
/// of its includes in source order. A range which does not parse fails the
/// whole call.
pub fn flatten(
    node: &PolicyNode,
    address: IpAddr,
) -> Result<Vec<ContainmentMatch>, Error> {
    let address = canonical(address);
    let mut matches = Vec::new();
    for node in node.walk() {
        for rule in &node.rules {
            for range in rule.ranges() {
                let cidr = range.parse::<Cidr>().map_err(|()| Error::Parse {
                    range: range.to_owned(),
                })?;
                matches.push(ContainmentMatch {
                    range: range.to_owned(),
                    within: cidr.contains(address),
                });
            }
        }
    }

    Ok(matches)
}

/// Maps IPv4-mapped IPv6 addresses to plain IPv4.
fn canonical(address: IpAddr) -> IpAddr {
    match address {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => address,
        },
        v4 => v4,
    }
}
