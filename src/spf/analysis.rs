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

use std::net::IpAddr;

use log::warn;
use serde::Serialize;

use super::flatten::flatten;
use super::resolve::PolicyResolver;
use super::tree::{ContainmentMatch, PolicyNode};
use crate::support::error::Error;

/// Everything known about whether `ip` may send mail for `domain`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub domain: String,
    pub ip: IpAddr,
    /// PTR names of `ip`. Empty if the reverse lookup failed.
    pub reverse: Vec<String>,
    /// The top-level SPF record, empty if `domain` has none.
    pub spf_record: String,
    /// Every range in the tree, in pre-order, tested against `ip`.
    pub ranges: Vec<ContainmentMatch>,
    pub breakdown: PolicyNode,
}

impl Analysis {
    /// Whether any range anywhere in the tree contains `ip`.
    ///
    /// Qualifiers are not considered, so a range listed under `-ip4:` still
    /// counts.
    pub fn authorised(&self) -> bool {
        self.ranges.iter().any(|m| m.within)
    }
}

pub fn analyse(
    resolver: &PolicyResolver<'_>,
    domain: &str,
    ip: IpAddr,
) -> Result<Analysis, Error> {
    let reverse = match resolver.lookup().reverse(ip) {
        Ok(names) => names,
        Err(e) => {
            warn!("{e}");
            Vec::new()
        },
    };

    let breakdown = resolver.resolve(domain)?;
    let ranges = flatten(&breakdown, ip)?;

    Ok(Analysis {
        domain: domain.to_owned(),
        ip,
        reverse,
        spf_record: breakdown.record.clone(),
        ranges,
        breakdown,
    })
}
