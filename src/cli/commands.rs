use clap::{Parser, Subcommand};

/// `ScribeTwin` - blog posts written in a target author's style.
#[derive(Parser, Debug)]
#[command(name = "scribetwin")]
#[command(version)]
#[command(about = "Generate blog posts refined towards an author's writing style.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.scribetwin/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the WebSocket gateway
    Serve {
        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, 0 for a random free port (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one generation locally and print events as JSON lines
    Generate {
        /// Blog topic
        #[arg(short, long)]
        topic: String,

        /// rss2json feed URL of the target author (default from config)
        #[arg(long)]
        style_source: Option<String>,
    },
}
