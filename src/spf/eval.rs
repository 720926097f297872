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

use log::{debug, warn};

use super::syntax::Mechanism;
use super::tree::Rule;
use crate::support::dns::{self, Lookup};
use crate::support::error::Error;

/// What a single record token contributes to its node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// An address-producing mechanism.
    Rule(Rule),
    /// An `include:` of the given domain, which the caller must resolve.
    Include(&'a str),
    /// Recognised or ignored, but contributes nothing.
    Nothing,
}

/// Gives `address` an explicit prefix length if it lacks one.
///
/// Anything with fewer than two colons is taken to be IPv4 and gets `/32`;
/// everything else gets `/128`. Text already containing a `/` is returned
/// unchanged.
pub fn to_cidr(address: &str) -> String {
    if address.contains('/') {
        address.to_owned()
    } else if address.matches(':').count() < 2 {
        format!("{address}/32")
    } else {
        format!("{address}/128")
    }
}

/// Evaluates one token of the SPF record of `domain`.
pub fn evaluate<'a>(
    lookup: &dyn Lookup,
    domain: &str,
    token: &'a str,
) -> Result<Outcome<'a>, Error> {
    let mechanism =
        Mechanism::parse(token).map_err(|source| Error::MalformedMechanism {
            token: token.to_owned(),
            source,
        })?;

    let ranges = match mechanism {
        Mechanism::Version(_) | Mechanism::All => return Ok(Outcome::Nothing),

        Mechanism::Unknown => {
            warn!("{domain}: ignoring unsupported term {token:?}");
            return Ok(Outcome::Nothing);
        },

        Mechanism::Include(target) => return Ok(Outcome::Include(target)),

        Mechanism::Mx(target) => {
            dns::resolve_mail_exchangers(lookup, target.unwrap_or(domain))?
                .iter()
                .map(|a| to_cidr(a))
                .collect::<Vec<_>>()
        },

        Mechanism::A(target) => {
            dns::resolve_addresses(lookup, target.unwrap_or(domain))?
                .iter()
                .map(|a| to_cidr(a))
                .collect()
        },

        Mechanism::ACidr(len) => dns::resolve_addresses(lookup, domain)?
            .into_iter()
            .map(|a| {
                if a.contains('/') {
                    a
                } else {
                    format!("{a}/{len}")
                }
            })
            .collect(),

        Mechanism::Ip4(literal) | Mechanism::Ip6(literal)
            if literal.contains('/') =>
        {
            vec![literal.to_owned()]
        },
        Mechanism::Ip4(literal) => vec![format!("{literal}/32")],
        Mechanism::Ip6(literal) => vec![format!("{literal}/128")],
    };

    debug!("{domain}: {token} => {ranges:?}");
    Ok(Outcome::Rule(Rule::new(token, &ranges)))
}
