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

use thiserror::Error;

use crate::spf::syntax;

/// The kind of DNS query which failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Txt,
    Address,
    Mx,
    Ptr,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::Txt => "TXT",
            Self::Address => "A/AAAA",
            Self::Mx => "MX",
            Self::Ptr => "PTR",
        })
    }
}

/// A failure of the DNS substrate.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("unable to look up {kind} record for {name}: {message}")]
pub struct LookupError {
    pub kind: RecordKind,
    pub name: String,
    pub message: String,
}

impl LookupError {
    pub fn new(
        kind: RecordKind,
        name: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            message: message.to_string(),
        }
    }
}

/// Why an inclusion chain was cut off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecursionKind {
    /// The domain is already being resolved further up the same chain.
    Loop,
    /// The chain is deeper than the configured maximum.
    Depth(u32),
}

impl fmt::Display for RecursionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Loop => f.write_str("inclusion loop"),
            Self::Depth(limit) => {
                write!(f, "more than {limit} levels of inclusion")
            },
        }
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("malformed mechanism {token:?}: {source}")]
    MalformedMechanism {
        token: String,
        source: syntax::Error,
    },
    #[error("not a valid CIDR range: {range:?}")]
    Parse { range: String },
    #[error("refusing to include {domain}: {kind}")]
    RecursionLimit { domain: String, kind: RecursionKind },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            "unable to look up MX record for example.com: SERVFAIL",
            Error::from(LookupError::new(
                RecordKind::Mx,
                "example.com",
                "SERVFAIL",
            ))
            .to_string(),
        );
        assert_eq!(
            "malformed mechanism \"ip4:\": missing argument for ip4",
            Error::MalformedMechanism {
                token: "ip4:".to_owned(),
                source: syntax::Error::MissingArgument("ip4"),
            }
            .to_string(),
        );
        assert_eq!(
            "refusing to include a.example: more than 3 levels of inclusion",
            Error::RecursionLimit {
                domain: "a.example".to_owned(),
                kind: RecursionKind::Depth(3),
            }
            .to_string(),
        );
    }
}
