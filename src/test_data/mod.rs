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

//! An in-memory DNS for tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;

use crate::support::dns::Lookup;
use crate::support::error::{LookupError, RecordKind};

/// A programmable `Lookup`.
///
/// Names with no programmed answer resolve successfully to nothing. Names
/// marked with `failing` return a `LookupError` for that record kind. Every
/// query is recorded so tests can check what was asked.
#[derive(Default)]
pub struct FakeDns {
    txt: HashMap<String, Vec<String>>,
    addresses: HashMap<String, Vec<IpAddr>>,
    mx: HashMap<String, Vec<String>>,
    ptr: HashMap<IpAddr, Vec<String>>,
    failing: HashSet<(RecordKind, String)>,
    queries: RefCell<Vec<(RecordKind, String)>>,
}

fn key(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

impl FakeDns {
    pub fn with_txt(mut self, domain: &str, records: &[&str]) -> Self {
        self.txt.insert(
            key(domain),
            records.iter().map(|&s| s.to_owned()).collect(),
        );
        self
    }

    /// Shorthand for a domain whose only TXT record is `record`.
    pub fn with_spf(self, domain: &str, record: &str) -> Self {
        self.with_txt(domain, &[record])
    }

    pub fn with_addresses(mut self, host: &str, addresses: &[&str]) -> Self {
        self.addresses.insert(
            key(host),
            addresses.iter().map(|a| a.parse().unwrap()).collect(),
        );
        self
    }

    pub fn with_mx(mut self, domain: &str, exchangers: &[&str]) -> Self {
        self.mx.insert(
            key(domain),
            exchangers.iter().map(|&s| s.to_owned()).collect(),
        );
        self
    }

    pub fn with_ptr(mut self, ip: &str, names: &[&str]) -> Self {
        self.ptr.insert(
            ip.parse().unwrap(),
            names.iter().map(|&s| s.to_owned()).collect(),
        );
        self
    }

    pub fn failing(mut self, kind: RecordKind, name: &str) -> Self {
        self.failing.insert((kind, key(name)));
        self
    }

    /// How many times `name` was queried for `kind`.
    pub fn query_count(&self, kind: RecordKind, name: &str) -> usize {
        let name = key(name);
        self.queries
            .borrow()
            .iter()
            .filter(|(k, n)| *k == kind && *n == name)
            .count()
    }

    fn answer<T: Clone>(
        &self,
        kind: RecordKind,
        name: String,
        table: &HashMap<String, Vec<T>>,
    ) -> Result<Vec<T>, LookupError> {
        self.queries.borrow_mut().push((kind, name.clone()));
        if self.failing.contains(&(kind, name.clone())) {
            return Err(LookupError::new(kind, name, "SERVFAIL"));
        }

        Ok(table.get(&name).cloned().unwrap_or_default())
    }
}

impl Lookup for FakeDns {
    fn txt(&self, domain: &str) -> Result<Vec<String>, LookupError> {
        self.answer(RecordKind::Txt, key(domain), &self.txt)
    }

    fn addresses(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
        self.answer(RecordKind::Address, key(host), &self.addresses)
    }

    fn mail_exchangers(
        &self,
        domain: &str,
    ) -> Result<Vec<String>, LookupError> {
        self.answer(RecordKind::Mx, key(domain), &self.mx)
    }

    fn reverse(&self, ip: IpAddr) -> Result<Vec<String>, LookupError> {
        let name = ip.to_string();
        self.queries.borrow_mut().push((RecordKind::Ptr, name.clone()));
        if self.failing.contains(&(RecordKind::Ptr, name.clone())) {
            return Err(LookupError::new(RecordKind::Ptr, name, "SERVFAIL"));
        }

        Ok(self.ptr.get(&ip).cloned().unwrap_or_default())
    }
}
