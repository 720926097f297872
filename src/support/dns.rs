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

use std::borrow::Cow;
use std::io;
use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use log::debug;

use super::error::{LookupError, RecordKind};
use super::system_config::ResolverSettings;

/// The DNS operations the SPF breakdown needs.
///
/// Every call is a fresh query; implementations must not answer from a cache
/// that outlives the call.
///
/// A query which succeeds with no records returns an empty list. Only actual
/// failures (including non-existent names) are errors.
pub trait Lookup {
    /// All TXT records of `domain`, each with its strings concatenated.
    fn txt(&self, domain: &str) -> Result<Vec<String>, LookupError>;
    /// The A and AAAA records of `host`.
    fn addresses(&self, host: &str) -> Result<Vec<IpAddr>, LookupError>;
    /// The exchange host names of `domain`, most preferred first.
    fn mail_exchangers(&self, domain: &str)
        -> Result<Vec<String>, LookupError>;
    /// The PTR names of `ip`.
    fn reverse(&self, ip: IpAddr) -> Result<Vec<String>, LookupError>;
}

/// Looks up the addresses of `host`, rendered as strings, in answer order.
pub fn resolve_addresses(
    lookup: &dyn Lookup,
    host: &str,
) -> Result<Vec<String>, LookupError> {
    let addresses = lookup
        .addresses(host)?
        .into_iter()
        .map(|ip| ip.to_string())
        .collect::<Vec<_>>();
    debug!("{host} has addresses {addresses:?}");
    Ok(addresses)
}

/// Looks up the addresses of every mail exchanger of `domain`.
///
/// Exchangers are visited in preference order and their addresses appended
/// in turn. Any failure fails the whole call.
pub fn resolve_mail_exchangers(
    lookup: &dyn Lookup,
    domain: &str,
) -> Result<Vec<String>, LookupError> {
    let mut addresses = Vec::new();
    for exchanger in lookup.mail_exchangers(domain)? {
        debug!("{domain} has mail exchanger {exchanger}");
        addresses.extend(resolve_addresses(lookup, &exchanger)?);
    }

    Ok(addresses)
}

/// A `Lookup` over the blocking hickory resolver.
pub struct HickoryLookup {
    resolver: hickory_resolver::Resolver,
}

impl HickoryLookup {
    pub fn new(settings: &ResolverSettings) -> io::Result<Self> {
        let (config, mut opts) = if settings.name_servers.is_empty() {
            hickory_resolver::system_conf::read_system_conf()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
        } else {
            (
                ResolverConfig::from_parts(
                    None,
                    vec![],
                    NameServerConfigGroup::from_ips_clear(
                        &settings.name_servers,
                        settings.port,
                        true,
                    ),
                ),
                Default::default(),
            )
        };

        opts.timeout = Duration::from_secs(settings.timeout_secs);
        opts.attempts = settings.attempts;
        opts.cache_size = 0;

        Ok(Self {
            resolver: hickory_resolver::Resolver::new(config, opts)?,
        })
    }
}

impl Lookup for HickoryLookup {
    fn txt(&self, domain: &str) -> Result<Vec<String>, LookupError> {
        debug!("TXT lookup for {domain}");
        let lookup = classify(
            RecordKind::Txt,
            domain,
            self.resolver.txt_lookup(&*fqdn(domain)),
        )?;

        Ok(lookup
            .map(|r| r.iter().map(|txt| join_txt(txt.txt_data())).collect())
            .unwrap_or_default())
    }

    fn addresses(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
        debug!("address lookup for {host}");
        let lookup = classify(
            RecordKind::Address,
            host,
            self.resolver.lookup_ip(&*fqdn(host)),
        )?;
        Ok(lookup.map(|r| r.iter().collect()).unwrap_or_default())
    }

    fn mail_exchangers(
        &self,
        domain: &str,
    ) -> Result<Vec<String>, LookupError> {
        debug!("MX lookup for {domain}");
        let lookup = classify(
            RecordKind::Mx,
            domain,
            self.resolver.mx_lookup(&*fqdn(domain)),
        )?;

        let mut exchangers = lookup
            .map(|r| {
                r.iter()
                    .map(|mx| (mx.preference(), mx.exchange().to_utf8()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        // Stable, so equal preferences keep answer order.
        exchangers.sort_by_key(|&(preference, _)| preference);
        Ok(exchangers.into_iter().map(|(_, name)| name).collect())
    }

    fn reverse(&self, ip: IpAddr) -> Result<Vec<String>, LookupError> {
        debug!("PTR lookup for {ip}");
        let lookup = classify(
            RecordKind::Ptr,
            &ip.to_string(),
            self.resolver.reverse_lookup(ip),
        )?;
        Ok(lookup
            .map(|r| r.iter().map(|name| name.0.to_utf8()).collect())
            .unwrap_or_default())
    }
}

/// Concatenates the character strings of one TXT record.
///
/// Invalid UTF-8 is replaced rather than rejected.
fn join_txt(parts: &[Box<[u8]>]) -> String {
    let len = parts.iter().map(|p| p.len()).sum();
    let mut combined = Vec::with_capacity(len);
    for part in parts {
        combined.extend_from_slice(part);
    }

    match String::from_utf8(combined) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Makes `name` absolute so that search domains are never appended.
fn fqdn(name: &str) -> Cow<'_, str> {
    if name.ends_with('.') {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}."))
    }
}

/// Separates empty answers from failures.
///
/// A negative answer to a name that exists (NODATA) is `Ok(None)`. A name
/// that does not exist, or any other error, is a `LookupError`.
fn classify<T>(
    kind: RecordKind,
    name: &str,
    r: Result<T, ResolveError>,
) -> Result<Option<T>, LookupError> {
    match r {
        Ok(v) => Ok(Some(v)),
        Err(e) => match *e.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. }
                if response_code != ResponseCode::NXDomain =>
            {
                Ok(None)
            },
            _ => Err(LookupError::new(kind, name, e)),
        },
    }
}
