// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use noderoll::config::Overrides;
use noderoll::output::OutputMode;

#[derive(Parser)]
#[command(name = "noderoll")]
#[command(about = "Drain and renew the container-instance nodes of a cluster")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (default: noderoll.yml in the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Named aws profile
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Region override
    #[arg(long, global = true)]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }

    /// Command-line values that override the configuration file.
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            aws_profile: self.profile.clone(),
            aws_region: self.region.clone(),
            ..Overrides::default()
        };
        if let Commands::Node(NodeCommand::Drain { timing, .. }) = &self.command {
            overrides.poll_interval = timing.poll_interval;
            overrides.drain_timeout = timing.timeout;
        }
        if let Commands::Node(NodeCommand::Renew {
            timing,
            registration_timeout,
            no_wait_registration,
            ..
        }) = &self.command
        {
            overrides.poll_interval = timing.poll_interval;
            overrides.drain_timeout = timing.timeout;
            overrides.registration_timeout = *registration_timeout;
            overrides.no_wait_registration = *no_wait_registration;
        }
        overrides
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and manage container-instance nodes
    #[command(subcommand)]
    Node(NodeCommand),

    /// Inspect the services of a cluster
    #[command(subcommand)]
    Service(ServiceCommand),
}

#[derive(Subcommand)]
pub enum NodeCommand {
    /// List nodes in a cluster
    Ls {
        /// Cluster name
        cluster: String,
    },

    /// Set node status to ACTIVE or DRAINING
    Update {
        /// Cluster name
        cluster: String,

        /// Node ids (space- or comma-separated)
        #[arg(
            short = 'i',
            long = "ids",
            alias = "container-instances",
            required = true,
            num_args = 1..,
            value_delimiter = ','
        )]
        ids: Vec<String>,

        /// New status: ACTIVE or DRAINING
        #[arg(short, long)]
        status: String,
    },

    /// Drain nodes, optionally waiting until their tasks have moved
    Drain {
        /// Cluster name
        cluster: String,

        /// Node ids (space- or comma-separated)
        #[arg(
            short = 'i',
            long = "ids",
            alias = "container-instances",
            required = true,
            num_args = 1..,
            value_delimiter = ','
        )]
        ids: Vec<String>,

        /// Wait until every node has drained
        #[arg(short, long)]
        wait: bool,

        #[command(flatten)]
        timing: Timing,
    },

    /// Replace every node using fresh capacity from an autoscaling group
    Renew {
        /// Cluster name
        cluster: String,

        /// Autoscaling group backing the cluster
        #[arg(short = 'a', long = "asg-name")]
        group: String,

        #[command(flatten)]
        timing: Timing,

        /// Maximum time to wait for replacement nodes to join (e.g. 10m)
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
        registration_timeout: Option<Duration>,

        /// Drain old nodes without waiting for replacements to join
        #[arg(long)]
        no_wait_registration: bool,
    },
}

#[derive(Subcommand)]
pub enum ServiceCommand {
    /// List services in a cluster
    Ls {
        /// Cluster name
        cluster: String,
    },
}

/// Poll timing flags shared by the waiting commands.
#[derive(Args)]
pub struct Timing {
    /// Interval between status polls (e.g. 5s)
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub poll_interval: Option<Duration>,

    /// Maximum time to wait for nodes to drain (e.g. 10m)
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ids_accept_spaces_and_commas() {
        let cli = Cli::try_parse_from([
            "noderoll", "node", "drain", "demo", "-i", "a", "b,c", "--wait",
        ])
        .unwrap();
        match cli.command {
            Commands::Node(NodeCommand::Drain { ids, wait, .. }) => {
                assert_eq!(ids, ["a", "b", "c"]);
                assert!(wait);
            }
            _ => panic!("expected node drain"),
        }
    }

    #[test]
    fn container_instances_is_accepted_for_ids() {
        let cli = Cli::try_parse_from([
            "noderoll",
            "node",
            "update",
            "demo",
            "--container-instances",
            "a,b",
            "-s",
            "ACTIVE",
        ])
        .unwrap();
        match cli.command {
            Commands::Node(NodeCommand::Update { ids, .. }) => assert_eq!(ids, ["a", "b"]),
            _ => panic!("expected node update"),
        }
    }

    #[test]
    fn renew_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "noderoll",
            "node",
            "renew",
            "demo",
            "-a",
            "asg-demo",
            "--poll-interval",
            "2s",
            "--no-wait-registration",
            "--profile",
            "prod",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.poll_interval, Some(Duration::from_secs(2)));
        assert!(overrides.no_wait_registration);
        assert_eq!(overrides.aws_profile.as_deref(), Some("prod"));
    }
}
