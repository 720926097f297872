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
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use regex::Regex;
use structopt::StructOpt;

use super::render;
use crate::spf::{analyse, PolicyResolver};
use crate::support::dns::HickoryLookup;
use crate::support::error::Error;
use crate::support::sysexits::*;
use crate::support::system_config::{LogConfig, SystemConfig};

const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "/etc/spf-breakdown/spf-breakdown.toml",
    "/usr/local/etc/spf-breakdown/spf-breakdown.toml",
];

lazy_static! {
    static ref RX_DOMAIN: Regex = Regex::new(
        "^([A-Za-z0-9_]([A-Za-z0-9_-]{0,61}[A-Za-z0-9])?\\.)+\
         [A-Za-z]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\\.?$"
    )
    .unwrap();
}

/// Break an SPF policy down into the address ranges it authorises.
#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
struct Options {
    /// The configuration file to use
    /// [default: /etc/spf-breakdown/spf-breakdown.toml or
    /// /usr/local/etc/spf-breakdown/spf-breakdown.toml]
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Log in more detail to standard error. Can be passed multiple times.
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Resolve the SPF policy of a domain and print every range it expands
    /// to, following `include:` mechanisms.
    Resolve {
        /// The domain whose policy to resolve.
        #[structopt(parse(try_from_str = parse_domain))]
        domain: String,

        /// Print the tree as JSON.
        #[structopt(long)]
        json: bool,
    },
    /// Check an address against every range of a domain's SPF policy.
    ///
    /// Qualifiers are ignored: a range counts as containing the address even
    /// if its mechanism is `-ip4:` or similar. This is not an SPF verdict.
    Analyse {
        /// The domain whose policy to check against.
        #[structopt(parse(try_from_str = parse_domain))]
        domain: String,

        /// The IPv4 or IPv6 address to check.
        ip: IpAddr,

        /// Print the analysis as JSON.
        #[structopt(long)]
        json: bool,
    },
}

fn parse_domain(s: &str) -> Result<String, String> {
    if s.len() <= 253 && RX_DOMAIN.is_match(s) {
        Ok(s.to_owned())
    } else {
        Err(format!("not a valid domain name: {s:?}"))
    }
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let options = Options::from_clap(&match Options::clap().get_matches_safe()
    {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        },
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        },
    });

    let (system_config, config_dir) = load_config(options.config.as_deref());
    init_log(&system_config.log, config_dir.as_deref(), options.verbose);

    let lookup = match HickoryLookup::new(&system_config.resolver) {
        Ok(lookup) => lookup,
        Err(e) => {
            eprintln!("Unable to set up DNS resolver: {e}");
            EX_OSERR.exit()
        },
    };
    let resolver = PolicyResolver::new(&lookup)
        .with_max_include_depth(system_config.limits.max_include_depth);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = match options.command {
        Command::Resolve { domain, json } => {
            let node = resolver.resolve(&domain).unwrap_or_else(|e| fail(&e));
            if json {
                render::json(&mut out, &node)
            } else {
                render::tree(&mut out, &node)
            }
        },
        Command::Analyse { domain, ip, json } => {
            let analysis =
                analyse(&resolver, &domain, ip).unwrap_or_else(|e| fail(&e));
            if json {
                render::json(&mut out, &analysis)
            } else {
                render::analysis(&mut out, &analysis)
            }
        },
    };

    if let Err(e) = written.and_then(|()| out.flush()) {
        eprintln!("Error writing output: {e}");
        EX_IOERR.exit();
    }
}

fn fail(e: &Error) -> ! {
    eprintln!("{e}");
    Sysexit::from(e).exit()
}

/// Loads the configuration, returning it along with the directory it was
/// found in.
///
/// Without an explicit path and with no file at any of the default
/// locations, the built-in defaults are used.
fn load_config(explicit: Option<&Path>) -> (SystemConfig, Option<PathBuf>) {
    let path = match explicit {
        Some(path) => path.to_owned(),
        None => match DEFAULT_CONFIG_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.is_file())
        {
            Some(path) => path.to_owned(),
            None => return (SystemConfig::default(), None),
        },
    };

    match SystemConfig::load(&path) {
        Ok(config) => (config, path.parent().map(Path::to_owned)),
        Err(e) => {
            eprintln!("Error in config file at '{}': {}", path.display(), e);
            EX_CONFIG.exit()
        },
    }
}

/// The `log4rs` configuration file named by `config`, if any.
///
/// A relative path is taken relative to `config_dir`.
fn log_config_file(
    config: &LogConfig,
    config_dir: Option<&Path>,
) -> Option<PathBuf> {
    let file = config.config_file.as_ref()?;
    Some(match config_dir {
        Some(dir) => dir.join(file),
        None => file.clone(),
    })
}

fn init_log(config: &LogConfig, config_dir: Option<&Path>, verbose: u8) {
    if let Some(path) = log_config_file(config, config_dir) {
        if let Err(e) =
            log4rs::init_file(&path, log4rs::file::Deserializers::new())
        {
            eprintln!(
                "Error initialising logging from '{}': {}",
                path.display(),
                e
            );
            EX_CONFIG.exit();
        }
        return;
    }

    // Already validated when the configuration was loaded
    let level =
        raise(config.level_filter().unwrap_or(LevelFilter::Warn), verbose);
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} [{l}][{t}] {m}{n}",
        )))
        .build();
    let result = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| e.to_string())
        .and_then(|c| log4rs::init_config(c).map_err(|e| e.to_string()));
    if let Err(e) = result {
        eprintln!("Error initialising logging: {e}");
        EX_SOFTWARE.exit();
    }
}

/// Makes `level` more verbose by `steps` levels, saturating at `Trace`.
fn raise(level: LevelFilter, steps: u8) -> LevelFilter {
    const LEVELS: [LevelFilter; 6] = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];

    let base = LEVELS.iter().position(|&l| l == level).unwrap_or(0);
    LEVELS[(base + usize::from(steps)).min(LEVELS.len() - 1)]
}
