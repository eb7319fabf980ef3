//! connfilter: CLI tool for validating and querying connection filter configs.

use clap::{Parser, Subcommand};
use connfilter::{parse_connection_filters, FilterConfig, FilterTableBuilder, Protocol};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "connfilter")]
#[command(version = "0.1.0")]
#[command(about = "Validate and query connection filter configs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report which filter lines are accepted and which are dropped
    Check {
        /// Filter config file (YAML, or JSON with a .json extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Exit with an error if any line is dropped
        #[arg(long)]
        strict: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check whether an endpoint is blacklisted
    Query {
        /// Filter config file (YAML, or JSON with a .json extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Filter set to query: source (src) or dest (destination, dst)
        #[arg(short, long, default_value = "dest")]
        table: String,

        /// Endpoint address
        #[arg(short, long)]
        addr: String,

        /// Endpoint port
        #[arg(short, long)]
        port: u16,

        /// Transport protocol: tcp or udp
        #[arg(long, default_value = "tcp")]
        protocol: Protocol,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            config,
            strict,
            verbose,
        } => check(&config, strict, verbose),
        Commands::Query {
            config,
            table,
            addr,
            port,
            protocol,
        } => query(&config, &table, &addr, port, protocol),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn check(path: &Path, strict: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = FilterConfig::load(path)?;

    let mut dropped = 0;
    for (name, raw) in [
        ("source", &config.source_excludes),
        ("dest", &config.dest_excludes),
    ] {
        let mut builder = FilterTableBuilder::new();
        for (pattern, ports) in raw {
            match builder.add_entry(pattern, ports) {
                Ok(()) => {
                    if verbose {
                        println!("[{}] ok      {:?}", name, pattern);
                    }
                }
                Err(e) => {
                    println!("[{}] dropped {:?}: {}", name, pattern, e);
                    dropped += 1;
                }
            }
        }

        let table = builder.build();
        println!(
            "[{}] {} exact, {} CIDR, wildcard: {}",
            name,
            table.exact_count(),
            table.cidr_count(),
            if table.has_wildcard() { "yes" } else { "no" }
        );
    }

    if strict && dropped > 0 {
        return Err(format!("{} filter line(s) dropped", dropped).into());
    }
    Ok(())
}

fn query(
    path: &Path,
    table: &str,
    addr: &str,
    port: u16,
    protocol: Protocol,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = FilterConfig::load(path)?;
    let table = parse_connection_filters(config.filters(table)?);

    if table.is_blacklisted_host(addr, port, protocol) {
        println!("blacklisted");
    } else {
        println!("allowed");
    }
    Ok(())
}
