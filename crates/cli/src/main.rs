use anyhow::Context;
use clap::{Parser, Subcommand};
use kitab_app::modules::admin::{models::SendPinPayload, SendPinHandler};
use kitab_app::modules::books::{models::AddBookPayload, AddBookHandler};
use kitab_app::AppServices;
use kitab_kernel::{settings::Settings, Callable};

#[derive(Parser, Debug)]
#[command(name = "kitab", version, about = "KitabCorner backend tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Add a book through the addBook handler
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        year: i64,
    },
    /// Email a security PIN through the sendSecurityPin handler
    SendPin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        pin: String,
    },
    /// Print the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load KitabCorner settings")?;
    kitab_telemetry::init_stderr(&settings.telemetry)?;

    let outcome = run(cli.command, settings).await;
    if let Err(e) = &outcome {
        tracing::error!(error = %format!("{e:#}"), "kitab command failed");
    }
    outcome
}

async fn run(command: Command, settings: Settings) -> anyhow::Result<()> {
    match command {
        Command::Serve => kitab_app::serve(settings).await,
        Command::AddBook {
            title,
            author,
            year,
        } => {
            let services = AppServices::from_settings(&settings).await?;
            let handler = AddBookHandler::new(services.store);
            let payload = AddBookPayload {
                title: Some(title.into()),
                author: Some(author.into()),
                year: Some(year.into()),
            };
            tracing::debug!(?payload, "invoking addBook");
            print_result(handler.call(payload).await?)
        }
        Command::SendPin { email, pin } => {
            let services = AppServices::from_settings(&settings).await?;
            let handler = SendPinHandler::new(services.mail, services.from_address);
            let payload = SendPinPayload {
                email: Some(email.into()),
                pin: Some(pin.into()),
            };
            print_result(handler.call(payload).await?)
        }
        Command::Config => {
            println!("{:#?}", settings);
            Ok(())
        }
    }
}

fn print_result<T: serde::Serialize>(result: T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(&serde_json::json!({ "result": result }))?;
    println!("{}", rendered);
    Ok(())
}
