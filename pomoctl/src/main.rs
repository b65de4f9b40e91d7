use anyhow::Result;
use clap::{Parser, Subcommand};
use pomo_ipc::{Command, Response, SessionSnapshot, SOCKET_PATH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

#[derive(Parser)]
#[command(name = "pomoctl")]
#[command(about = "Control the pomo session timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the session, optionally naming the activity first
    Start {
        #[arg(short, long)]
        activity: Option<String>,
    },
    /// Pause the session
    Pause,
    /// Reset the countdown, activity and cycle counter
    Reset,
    /// Name the activity for the next session
    SetActivity { name: String },
    /// Show the session state
    Status,
    /// List completed activities
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Start { activity } => {
            // Setting the activity is its own command; the session only
            // starts once one is named.
            if let Some(name) = activity {
                match send_command(Command::SetActivity { name }).await? {
                    Response::Ok => {}
                    Response::Error(e) => {
                        eprintln!("Error: {}", e);
                        return Ok(());
                    }
                    other => {
                        eprintln!("Unexpected response: {:?}", other);
                        return Ok(());
                    }
                }
            }
            Command::Start
        }
        Commands::Pause => Command::Pause,
        Commands::Reset => Command::Reset,
        Commands::SetActivity { name } => Command::SetActivity { name },
        Commands::Status => Command::Status,
        Commands::History => Command::History,
    };

    let response = send_command(command).await?;

    match response {
        Response::Ok => println!("OK"),
        Response::Status(snapshot) => print_status(&snapshot),
        Response::History(activities) => {
            if activities.is_empty() {
                println!("No completed activities");
            }
            for activity in activities {
                println!(
                    "✓ {}  ({})",
                    activity.name,
                    activity.completed_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Response::Error(e) => eprintln!("Error: {}", e),
    }

    Ok(())
}

fn print_status(snapshot: &SessionSnapshot) {
    let state = if snapshot.is_running {
        "running"
    } else {
        "paused"
    };
    println!(
        "{}  {:02}:{:02}  [{}]",
        snapshot.kind,
        snapshot.remaining_seconds / 60,
        snapshot.remaining_seconds % 60,
        state
    );
    if !snapshot.current_activity.is_empty() {
        println!("Focus: {}", snapshot.current_activity);
    }
    println!(
        "Sessions this cycle: {}/4",
        snapshot.completed_work_sessions
    );
}

async fn send_command(cmd: Command) -> Result<Response> {
    let mut stream = UnixStream::connect(SOCKET_PATH).await?;

    let msg = serde_json::to_vec(&cmd)?;
    stream.write_all(&msg).await?;
    stream.write_all(b"\n").await?;

    let mut buf = vec![0; 64 * 1024];
    let n = stream.read(&mut buf).await?;
    let response: Response = serde_json::from_slice(&buf[..n])?;

    Ok(response)
}
