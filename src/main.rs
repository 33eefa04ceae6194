use broadside::server::{Server, DEFAULT_ADDR};
use clap::Parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Listen for players and run one read loop per connection.
    Serve {
        #[arg(long, default_value = DEFAULT_ADDR)]
        bind: String,
    },
    /// Connect to a server and chat from the terminal.
    Connect {
        #[arg(long, default_value = "127.0.0.1:8888")]
        addr: String,
        #[arg(long, default_value = "anonymous")]
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    broadside::init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { bind } => {
            let server = Server::bind(&bind).await?;
            server.run().await
        }
        Commands::Connect { addr, username } => broadside::client::run(&addr, &username).await,
    }
}
