//! Command line interface for the `labwire` binary.
//!
//! `listen` runs the responder server; `send` transmits a text file as one
//! transfer cycle. The definitions are shared with `build.rs` for man page
//! generation, so this module depends on `clap` alone.

use std::{net::SocketAddr, num::NonZeroUsize, path::PathBuf};

use clap::{Args, Parser, Subcommand};

/// Command line arguments for the `labwire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "labwire",
    version,
    about = "Laboratory instrument link: framed ENQ/ACK transfers over TCP"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Accept connections and answer queries from an order catalog.
    Listen(ListenArgs),
    /// Transmit a text file to a listening peer.
    Send(SendArgs),
}

/// Settings shared by both roles.
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Largest payload carried by one frame, in characters.
    #[arg(long, default_value = "50")]
    pub max_chunk_size: NonZeroUsize,
    /// Seconds to wait for each acknowledgement.
    #[arg(long, default_value_t = 15)]
    pub ack_timeout_secs: u64,
}

#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: std::net::IpAddr,
    /// Port to listen on.
    #[arg(long, env = "TCP_PORT", default_value_t = 5000)]
    pub port: u16,
    /// JSON schema document describing every record type.
    #[arg(long)]
    pub schema: PathBuf,
    /// JSON order catalog keyed by specimen identifier.
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// Number of accept loops.
    #[arg(long)]
    pub workers: Option<usize>,
    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Host of the listening peer.
    #[arg(long, env = "TCP_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Port of the listening peer.
    #[arg(long, env = "TCP_PORT", default_value_t = 5000)]
    pub port: u16,
    /// File to transmit; standard input when absent.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Corrupt frames at random to exercise the peer's rejection path.
    #[arg(long, env = "SIMULATION_MODE")]
    pub simulate: bool,
    /// Wait for the peer's reply cycle and print it.
    #[arg(long)]
    pub await_reply: bool,
    /// Seconds to wait for the reply cycle.
    #[arg(long, default_value_t = 30)]
    pub reply_timeout_secs: u64,
    #[command(flatten)]
    pub link: LinkArgs,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;
    use serial_test::serial;

    use super::{Cli, Command};

    #[test]
    #[serial]
    fn listen_defaults() {
        let cli = Cli::parse_from(["labwire", "listen", "--schema", "schema.json"]);
        let Command::Listen(args) = cli.command else {
            panic!("expected listen");
        };
        assert_eq!(args.port, 5000);
        assert_eq!(args.link.max_chunk_size.get(), 50);
        assert_eq!(args.link.ack_timeout_secs, 15);
        assert!(args.catalog.is_none());
    }

    #[test]
    #[serial]
    fn send_reads_port_from_environment() {
        // SAFETY: `#[serial]` keeps other tests from touching the environment
        // concurrently.
        unsafe { std::env::set_var("TCP_PORT", "6001") };
        let cli = Cli::try_parse_from(["labwire", "send", "--file", "query.txt"]);
        unsafe { std::env::remove_var("TCP_PORT") };

        let Command::Send(args) = cli.expect("valid arguments").command else {
            panic!("expected send");
        };
        assert_eq!(args.port, 6001);
        assert_eq!(args.host, "127.0.0.1");
        assert!(!args.simulate);
    }

    #[rstest]
    #[case::zero_chunk(&["labwire", "send", "--max-chunk-size", "0"])]
    #[case::missing_schema(&["labwire", "listen"])]
    #[case::no_command(&["labwire"])]
    #[serial]
    fn rejects_invalid_arguments(#[case] argv: &[&str]) {
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    #[serial]
    fn send_flags() {
        let cli = Cli::parse_from([
            "labwire",
            "send",
            "--host",
            "10.0.0.2",
            "--simulate",
            "--await-reply",
            "--reply-timeout-secs",
            "5",
        ]);
        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.host, "10.0.0.2");
        assert!(args.simulate);
        assert!(args.await_reply);
        assert_eq!(args.reply_timeout_secs, 5);
    }
}
