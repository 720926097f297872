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

use std::io::{self, Write};

use serde::Serialize;

use crate::spf::{Analysis, PolicyNode};

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn json(out: &mut impl Write, value: &impl Serialize) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// Writes `node` and its includes as an indented outline.
pub fn tree(out: &mut impl Write, node: &PolicyNode) -> io::Result<()> {
    write_node(out, node, 0)
}

fn write_node(
    out: &mut impl Write,
    node: &PolicyNode,
    depth: usize,
) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    if !node.has_record() {
        return writeln!(out, "{indent}{} (no SPF record)", node.domain);
    }

    writeln!(out, "{indent}{} \"{}\"", node.domain, node.record)?;
    for rule in &node.rules {
        writeln!(out, "{indent}  {}", rule.key)?;
        if rule.value.is_empty() {
            writeln!(out, "{indent}    (no addresses)")?;
        }
        for range in rule.ranges() {
            writeln!(out, "{indent}    {range}")?;
        }
    }

    for include in &node.includes {
        write_node(out, include, depth + 1)?;
    }

    Ok(())
}

/// Writes a human-readable report of `analysis`.
pub fn analysis(out: &mut impl Write, analysis: &Analysis) -> io::Result<()> {
    writeln!(out, "Domain:     {}", analysis.domain)?;
    if analysis.reverse.is_empty() {
        writeln!(out, "Address:    {}", analysis.ip)?;
    } else {
        writeln!(
            out,
            "Address:    {} ({})",
            analysis.ip,
            analysis.reverse.join(", "),
        )?;
    }

    if analysis.spf_record.is_empty() {
        writeln!(out, "SPF record: (none)")?;
    } else {
        writeln!(out, "SPF record: {}", analysis.spf_record)?;
    }

    writeln!(out)?;
    for m in &analysis.ranges {
        let mark = if m.within { 'x' } else { ' ' };
        writeln!(out, "  [{mark}] {}", m.range)?;
    }

    writeln!(out)?;
    if analysis.authorised() {
        writeln!(
            out,
            "{} is within the SPF policy of {}",
            analysis.ip, analysis.domain,
        )?;
    } else {
        writeln!(
            out,
            "{} is not within the SPF policy of {}",
            analysis.ip, analysis.domain,
        )?;
    }

    writeln!(out)?;
    tree(out, &analysis.breakdown)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::spf::{ContainmentMatch, Rule};

    fn sample() -> PolicyNode {
        PolicyNode {
            domain: "example.com".to_owned(),
            record: "v=spf1 a:none.example mx include:_spf.example.net -all"
                .to_owned(),
            rules: vec![
                Rule::new("a:none.example", &[]),
                Rule::new(
                    "mx",
                    &[
                        "192.0.2.25/32".to_owned(),
                        "2001:db8::25/128".to_owned(),
                    ],
                ),
            ],
            includes: vec![PolicyNode::empty("_spf.example.net")],
        }
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn tree_outline() {
        let expected = [
            "example.com \"v=spf1 a:none.example mx \
             include:_spf.example.net -all\"",
            "  a:none.example",
            "    (no addresses)",
            "  mx",
            "    192.0.2.25/32",
            "    2001:db8::25/128",
            "  _spf.example.net (no SPF record)",
            "",
        ];
        assert_eq!(
            expected.join("\n"),
            render(|out| tree(out, &sample())),
        );
    }

    #[test]
    fn analysis_report() {
        let analysis = Analysis {
            domain: "example.com".to_owned(),
            ip: "192.0.2.25".parse().unwrap(),
            reverse: vec!["mx.example.com.".to_owned()],
            spf_record: sample().record,
            ranges: vec![
                ContainmentMatch {
                    range: "192.0.2.25/32".to_owned(),
                    within: true,
                },
                ContainmentMatch {
                    range: "2001:db8::25/128".to_owned(),
                    within: false,
                },
            ],
            breakdown: sample(),
        };

        let text = render(|out| super::analysis(out, &analysis));
        assert!(text.starts_with(
            "Domain:     example.com\n\
             Address:    192.0.2.25 (mx.example.com.)\n"
        ));
        assert!(text.contains("  [x] 192.0.2.25/32\n"));
        assert!(text.contains("  [ ] 2001:db8::25/128\n"));
        assert!(text.contains(
            "192.0.2.25 is within the SPF policy of example.com\n"
        ));
        assert!(text.ends_with("_spf.example.net (no SPF record)\n"));
    }

    #[test]
    fn json_output() {
        let text = render(|out| json(out, &sample()));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!("mx", value["rules"][1]["key"]);
        assert_eq!("", value["includes"][0]["record"]);
        assert!(text.ends_with("}\n"));
    }
}
