//! Generates a v1 token catalog with random tokens, for load testing.

use anyhow::{Context, Result};
use clap::Parser;
use ingress_authz::api::v1;
use rand::RngCore;
use std::io::Write as _;

/// Token catalog generator
#[derive(Parser)]
#[command(name = "ingress-authz-config-gen")]
#[command(about = "Print a v1 token catalog with random tokens")]
struct Cli {
    /// Number of tokens to generate
    #[arg(short, long, default_value_t = 1_000_000)]
    count: usize,
}

fn gen_token(rng: &mut impl RngCore) -> String {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);

    hex::encode(bytes)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = rand::thread_rng();

    let config = v1::Config {
        version: v1::VERSION.to_string(),
        tokens: (0..cli.count).map(|_| v1::Token::new(gen_token(&mut rng))).collect(),
    };

    let data = serde_json::to_string_pretty(&config).context("could not encode token catalog")?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(data.as_bytes()).context("could not write token catalog")?;

    Ok(())
}
