//! Trolley command line client
//!
//! Loads a cart from a YAML fixture, applies one operation against the storefront and
//! prints the reconciled cart.

use std::{
    io::{self, Write},
    path::Path,
    process::ExitCode,
    sync::Arc,
};

use thiserror::Error;
use tracing::{debug, error};

use trolley::{
    alerts::Alert,
    display,
    engine::CartEngine,
    error::CartError,
    fixtures::{CartFixture, FixtureError},
    gateway::{CartGateway, GatewayError, HttpCartGateway},
    lines::LineId,
    products::ProductId,
    search,
    session::{CartSession, Presenter},
};

use crate::{
    config::{CliConfig, Command, StorefrontConfig},
    terminal::{TerminalConfirm, TerminalPresenter},
};

mod config;
mod observability;
mod terminal;

type Session = CartSession<TerminalPresenter, TerminalConfirm>;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("--storefront-url (or STOREFRONT_URL) is required for this command")]
    MissingStorefront,
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(error) => {
            _ = error.print();

            return ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(2));
        }
    };

    if let Err(source) = observability::init(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("Logging error: {source}");
        }

        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(source) => {
            error!("{source}");

            #[expect(clippy::print_stderr, reason = "errors must reach the user without RUST_LOG")]
            {
                eprintln!("Error: {source}");
            }

            ExitCode::FAILURE
        }
    }
}

/// Runs one command. Returns `false` when the operation was rejected locally or by the
/// storefront.
async fn run(config: CliConfig) -> Result<bool, AppError> {
    let CliConfig {
        storefront,
        command,
        ..
    } = config;

    match command {
        Command::Show { cart } => {
            let snapshot = CartFixture::load(cart)?.into_snapshot()?;

            display::write_cart_table(&mut io::stdout().lock(), &snapshot)?;

            Ok(true)
        }
        Command::Update {
            cart,
            line,
            quantity,
        } => {
            let mut session = open(&cart, &storefront, TerminalConfirm::AssumeYes)?;

            let sent = session.commit(&LineId::from(line), &quantity)?;

            if !sent {
                debug!("quantity clamped, nothing sent");
            }

            Ok(finish(session).await? && sent)
        }
        Command::Remove { cart, line, yes } => {
            let confirm = if yes {
                TerminalConfirm::AssumeYes
            } else {
                TerminalConfirm::Prompt
            };

            let mut session = open(&cart, &storefront, confirm)?;

            if !session.remove(&LineId::from(line))? {
                debug!("removal not confirmed");
            }

            finish(session).await
        }
        Command::Add {
            cart,
            product,
            quantity,
        } => {
            let mut session = open(&cart, &storefront, TerminalConfirm::AssumeYes)?;

            if let Err(source) = session.add_to_cart(ProductId::from(product), &quantity) {
                debug!(%source, "add to cart rejected");

                return Ok(false);
            }

            finish(session).await
        }
        Command::Search { query } => match search::validate_query(&query) {
            Ok(query) => {
                writeln!(io::stdout().lock(), "Searching for \"{query}\"")?;

                Ok(true)
            }
            Err(source) => {
                TerminalPresenter.alert(&Alert::for_error(&source.into(), ""));

                Ok(false)
            }
        },
    }
}

fn open(
    cart: &Path,
    storefront: &StorefrontConfig,
    confirm: TerminalConfirm,
) -> Result<Session, AppError> {
    let config = storefront
        .gateway_config()
        .ok_or(AppError::MissingStorefront)?;

    let snapshot = CartFixture::load(cart)?.into_snapshot()?;
    let gateway: Arc<dyn CartGateway> = Arc::new(HttpCartGateway::new(config)?);

    Ok(CartSession::new(
        CartEngine::new(snapshot),
        gateway,
        TerminalPresenter,
        confirm,
    ))
}

async fn finish(mut session: Session) -> Result<bool, AppError> {
    let resolutions = session.settle().await;

    let accepted = resolutions
        .iter()
        .filter_map(|resolution| resolution.alert())
        .all(|alert| alert.kind().is_none());

    display::write_cart_table(&mut io::stdout().lock(), session.snapshot())?;

    Ok(accepted)
}
