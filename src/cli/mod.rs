pub mod config;
pub mod describe;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agent-vision")]
#[command(author, version, about = "Describe images through a remote vision-language model")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "AGENT_VISION_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Describe an image file or inline data URL
    Describe(describe::DescribeArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}
