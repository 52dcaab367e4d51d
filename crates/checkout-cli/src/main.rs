use anyhow::{bail, Result};
use checkout_core::{validate::validate_chain, Block, CheckoutRecord};
use clap::{Parser, Subcommand};
use reqwest::Response;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "checkout-cli")]
#[command(about = "CLI client for the book checkout ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:3000)
    #[arg(long, global = true, default_value = "http://127.0.0.1:3000")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every block in the chain
    Chain,
    /// Print height and hash of the tail block
    Head,
    /// Record a book checkout
    Checkout {
        #[arg(long)]
        book_id: String,
        #[arg(long)]
        user: String,
        /// ISO date, e.g. 2024-01-01
        #[arg(long)]
        checkout_date: String,
    },
    /// Register a book and print its catalog id
    NewBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        publish_date: String,
        #[arg(long)]
        isbn: String,
    },
    /// Download the chain and check every link locally
    Verify,
}

#[derive(Serialize)]
struct BookOut {
    title: String,
    author: String,
    publish_date: String,
    isbn: String,
}

async fn print_response(res: Response) -> Result<()> {
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    println!("{body}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();
    match cli.cmd {
        Command::Chain => {
            let res = client.get(format!("{node}/")).send().await?;
            print_response(res).await?;
        }
        Command::Head => {
            let res = client.get(format!("{node}/chain/head")).send().await?;
            print_response(res).await?;
        }
        Command::Checkout {
            book_id,
            user,
            checkout_date,
        } => {
            let record = CheckoutRecord::new(book_id, user, checkout_date);
            let res = client.post(format!("{node}/")).json(&record).send().await?;
            print_response(res).await?;
        }
        Command::NewBook {
            title,
            author,
            publish_date,
            isbn,
        } => {
            let book = BookOut {
                title,
                author,
                publish_date,
                isbn,
            };
            let res = client.post(format!("{node}/new")).json(&book).send().await?;
            print_response(res).await?;
        }
        Command::Verify => {
            let blocks: Vec<Block> = client
                .get(format!("{node}/"))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            debug!(blocks = blocks.len(), "chain downloaded");
            match validate_chain(&blocks) {
                Ok(()) => println!("chain valid: {} block(s)", blocks.len()),
                Err(err) => bail!("chain invalid: {err}"),
            }
        }
    }
    Ok(())
}
