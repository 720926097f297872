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

//! The subset of the SPF record grammar which the breakdown understands.
//!
//! A record is split on single spaces and each word is classified by a fixed
//! table of matchers. Words the table does not know are `Unknown` rather than
//! an error, so that records using newer or unsupported terms still resolve.

use thiserror::Error;

/// The prefix a TXT record must carry to be considered an SPF record.
///
/// This is matched exactly, including case and the trailing space.
pub const SPF_PREFIX: &str = "v=spf1 ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mechanism<'a> {
    /// `v=<version>`
    Version(&'a str),
    /// `mx` (`None`, the owning domain) or `mx:<domain>`.
    Mx(Option<&'a str>),
    /// `a/<length>` against the owning domain. Holds the text after the
    /// slash.
    ACidr(&'a str),
    /// `a` (`None`, the owning domain) or `a:<domain>`.
    A(Option<&'a str>),
    /// `ip4:<address>[/<length>]`, verbatim.
    Ip4(&'a str),
    /// `ip6:<address>[/<length>]`, verbatim.
    Ip6(&'a str),
    Include(&'a str),
    All,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("SPF version is missing")]
    MissingVersion,
    #[error("missing argument for {0}")]
    MissingArgument(&'static str),
    #[error("CIDR length is missing")]
    MissingCidrLength,
}

#[derive(Clone, Copy, Debug)]
enum Matcher {
    Exact(&'static str),
    Prefix(&'static str),
}

impl Matcher {
    /// If `word` matches, returns the part of `word` following the matched
    /// text.
    fn strip(self, word: &str) -> Option<&str> {
        match self {
            Self::Exact(s) => (word == s).then_some(""),
            Self::Prefix(p) => word.strip_prefix(p),
        }
    }
}

type Parser = for<'a> fn(&'a str) -> Result<Mechanism<'a>, Error>;

// The prefixes are mutually exclusive, so the order here is only for
// legibility.
static MECHANISMS: &[(Matcher, Parser)] = &[
    (Matcher::Prefix("v="), parse_version),
    (Matcher::Exact("mx"), parse_mx),
    (Matcher::Prefix("mx:"), parse_mx_domain),
    (Matcher::Prefix("a/"), parse_a_cidr),
    (Matcher::Prefix("a:"), parse_a_domain),
    (Matcher::Exact("a"), parse_a),
    (Matcher::Prefix("ip4:"), parse_ip4),
    (Matcher::Prefix("ip6:"), parse_ip6),
    (Matcher::Prefix("include:"), parse_include),
    (Matcher::Exact("all"), parse_all),
];

fn parse_version(arg: &str) -> Result<Mechanism<'_>, Error> {
    if arg.is_empty() {
        return Err(Error::MissingVersion);
    }

    Ok(Mechanism::Version(arg))
}

fn parse_mx(_: &str) -> Result<Mechanism<'_>, Error> {
    Ok(Mechanism::Mx(None))
}

fn parse_mx_domain(arg: &str) -> Result<Mechanism<'_>, Error> {
    non_empty(arg, "mx").map(|d| Mechanism::Mx(Some(d)))
}

fn parse_a_cidr(arg: &str) -> Result<Mechanism<'_>, Error> {
    if arg.is_empty() {
        return Err(Error::MissingCidrLength);
    }

    Ok(Mechanism::ACidr(arg))
}

fn parse_a_domain(arg: &str) -> Result<Mechanism<'_>, Error> {
    non_empty(arg, "a").map(|d| Mechanism::A(Some(d)))
}

fn parse_a(_: &str) -> Result<Mechanism<'_>, Error> {
    Ok(Mechanism::A(None))
}

fn parse_ip4(arg: &str) -> Result<Mechanism<'_>, Error> {
    non_empty(arg, "ip4").map(Mechanism::Ip4)
}

fn parse_ip6(arg: &str) -> Result<Mechanism<'_>, Error> {
    non_empty(arg, "ip6").map(Mechanism::Ip6)
}

fn parse_include(arg: &str) -> Result<Mechanism<'_>, Error> {
    non_empty(arg, "include").map(Mechanism::Include)
}

fn parse_all(_: &str) -> Result<Mechanism<'_>, Error> {
    Ok(Mechanism::All)
}

fn non_empty<'a>(arg: &'a str, name: &'static str) -> Result<&'a str, Error> {
    if arg.is_empty() {
        Err(Error::MissingArgument(name))
    } else {
        Ok(arg)
    }
}

impl<'a> Mechanism<'a> {
    /// Parses a single word of an SPF record.
    ///
    /// A leading qualifier (`+`, `-`, `~` or `?`) is stripped and otherwise
    /// ignored. An empty word parses as `Unknown`.
    pub fn parse(word: &'a str) -> Result<Self, Error> {
        let rest = word
            .strip_prefix(|c: char| matches!(c, '+' | '-' | '~' | '?'))
            .unwrap_or(word);

        MECHANISMS
            .iter()
            .find_map(|&(matcher, parse)| matcher.strip(rest).map(parse))
            .unwrap_or(Ok(Mechanism::Unknown))
    }
}

/// Returns the SPF record among `txt_records`, if any.
///
/// The first record carrying `SPF_PREFIX` wins; any others are ignored.
pub fn find_spf_record<S: AsRef<str>>(txt_records: &[S]) -> Option<&str> {
    txt_records
        .iter()
        .map(AsRef::as_ref)
        .find(|r| r.starts_with(SPF_PREFIX))
}
