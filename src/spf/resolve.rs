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

//! Expansion of a domain's SPF record into a `PolicyNode` tree.
//!
//! Resolution is strictly depth-first and stops at the first error anywhere
//! in the tree; no partial tree is ever returned. Nothing is memoised, so a
//! domain included from two places is looked up twice.
//!
//! `include:` chains are bounded. The resolver tracks the domains on the
//! current inclusion path and refuses both an include of a domain already on
//! that path and an include nested deeper than `max_include_depth`.

use log::{debug, info};

use super::eval::{self, Outcome};
use super::syntax::find_spf_record;
use super::tree::PolicyNode;
use crate::support::dns::Lookup;
use crate::support::error::{Error, RecursionKind};

/// The default bound on nested `include:` mechanisms.
///
/// RFC 7208 limits a whole evaluation to 10 DNS-querying terms; this bounds
/// only the nesting.
pub const DEFAULT_MAX_INCLUDE_DEPTH: u32 = 10;

pub struct PolicyResolver<'l> {
    lookup: &'l dyn Lookup,
    max_include_depth: u32,
}

impl<'l> PolicyResolver<'l> {
    pub fn new(lookup: &'l dyn Lookup) -> Self {
        Self {
            lookup,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    pub fn with_max_include_depth(mut self, max_include_depth: u32) -> Self {
        self.max_include_depth = max_include_depth;
        self
    }

    pub fn lookup(&self) -> &'l dyn Lookup {
        self.lookup
    }

    /// Resolves the full policy tree of `domain`.
    ///
    /// A domain without an SPF record yields an empty node, not an error.
    pub fn resolve(&self, domain: &str) -> Result<PolicyNode, Error> {
        let mut chain = Vec::new();
        self.resolve_in_chain(domain, &mut chain)
    }

    fn resolve_in_chain(
        &self,
        domain: &str,
        chain: &mut Vec<String>,
    ) -> Result<PolicyNode, Error> {
        chain.push(normalise(domain));
        let result = self.resolve_node(domain, chain);
        chain.pop();
        result
    }

    fn resolve_node(
        &self,
        domain: &str,
        chain: &mut Vec<String>,
    ) -> Result<PolicyNode, Error> {
        debug!("resolving SPF policy of {domain} (depth {})", chain.len());

        let txt = self.lookup.txt(domain)?;
        let record = match find_spf_record(&txt) {
            Some(record) => record,
            None => {
                info!("{domain} has no SPF record");
                return Ok(PolicyNode::empty(domain));
            },
        };
        debug!("{domain}: {record:?}");

        let mut node = PolicyNode {
            domain: domain.to_owned(),
            record: record.to_owned(),
            ..PolicyNode::default()
        };

        for token in record.split(' ').filter(|t| !t.is_empty()) {
            match eval::evaluate(self.lookup, domain, token)? {
                Outcome::Rule(rule) => node.rules.push(rule),
                Outcome::Include(target) => {
                    self.check_include(target, chain)?;
                    let child = self.resolve_in_chain(target, chain)?;
                    node.includes.push(child);
                },
                Outcome::Nothing => (),
            }
        }

        Ok(node)
    }

    fn check_include(
        &self,
        target: &str,
        chain: &[String],
    ) -> Result<(), Error> {
        let kind = if chain.contains(&normalise(target)) {
            RecursionKind::Loop
        } else if chain.len() as u32 > self.max_include_depth {
            RecursionKind::Depth(self.max_include_depth)
        } else {
            return Ok(());
        };

        Err(Error::RecursionLimit {
            domain: target.to_owned(),
            kind,
        })
    }
}

/// Resolves `domain` with the default limits.
pub fn resolve(
    lookup: &dyn Lookup,
    domain: &str,
) -> Result<PolicyNode, Error> {
    PolicyResolver::new(lookup).resolve(domain)
}

fn normalise(domain: &str) -> String {
    domain.trim_end_matches('.').to_ascii_lowercase()
}
