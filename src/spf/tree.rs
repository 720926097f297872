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

use serde::Serialize;

/// The ranges one mechanism of a record expanded to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// The mechanism exactly as it appeared in the record.
    pub key: String,
    /// The CIDR ranges the mechanism stands for, joined with `,`.
    ///
    /// Empty if the mechanism resolved to no addresses.
    pub value: String,
}

impl Rule {
    pub fn new(key: impl Into<String>, ranges: &[String]) -> Self {
        Self {
            key: key.into(),
            value: ranges.join(","),
        }
    }

    /// The individual ranges in `value`.
    pub fn ranges(&self) -> impl Iterator<Item = &str> + '_ {
        self.value.split(',').filter(|s| !s.is_empty())
    }
}

/// The resolved SPF policy of one domain.
///
/// A domain without an SPF record is represented by a node whose `record`,
/// `rules` and `includes` are all empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PolicyNode {
    pub domain: String,
    /// The SPF TXT record, verbatim.
    pub record: String,
    /// One entry per address-producing mechanism, in record order.
    pub rules: Vec<Rule>,
    /// One entry per `include:` mechanism, in record order.
    pub includes: Vec<PolicyNode>,
}

impl PolicyNode {
    /// A node for a domain which publishes no SPF record.
    pub fn empty(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    pub fn has_record(&self) -> bool {
        !self.record.is_empty()
    }

    /// Visits this node and all its descendants in pre-order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a PolicyNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a PolicyNode;

    fn next(&mut self) -> Option<&'a PolicyNode> {
        let node = self.stack.pop()?;
        self.stack.extend(node.includes.iter().rev());
        Some(node)
    }
}

/// Whether one range of a policy tree contains the queried address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContainmentMatch {
    /// The range exactly as it appears in its rule.
    pub range: String,
    pub within: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rule_ranges() {
        let rule = Rule::new(
            "mx",
            &["192.0.2.1/32".to_owned(), "2001:db8::1/128".to_owned()],
        );
        assert_eq!("192.0.2.1/32,2001:db8::1/128", rule.value);
        assert_eq!(
            vec!["192.0.2.1/32", "2001:db8::1/128"],
            rule.ranges().collect::<Vec<_>>(),
        );

        let rule = Rule::new("a:nothing.example", &[]);
        assert_eq!("", rule.value);
        assert_eq!(0, rule.ranges().count());
    }

    #[test]
    fn walk_is_pre_order() {
        let tree = PolicyNode {
            domain: "root".to_owned(),
            includes: vec![
                PolicyNode {
                    domain: "a".to_owned(),
                    includes: vec![PolicyNode::empty("a1")],
                    ..PolicyNode::default()
                },
                PolicyNode::empty("b"),
            ],
            ..PolicyNode::default()
        };

        assert_eq!(
            vec!["root", "a", "a1", "b"],
            tree.walk().map(|n| &*n.domain).collect::<Vec<_>>(),
        );
        assert!(!tree.has_record());
    }
}
