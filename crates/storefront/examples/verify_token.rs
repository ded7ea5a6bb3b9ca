//! Example: Verify a signed storefront token
//!
//! Usage:
//!   cargo run --example verify_token -- <root.cer> <bundle-id> <environment> <kind> <token-file> [app-apple-id]
//!
//! `kind` is one of transaction, renewal, notification, app-transaction or
//! realtime. Online (OCSP) checks are enabled when STOREFRONT_ONLINE=1.

use std::env;
use std::fs;
use std::process;
use storefront::{Environment, PayloadKind, SignedDataVerifier, VerifierConfig};

fn parse_environment(value: &str) -> Option<Environment> {
    match value {
        "Sandbox" => Some(Environment::Sandbox),
        "Production" => Some(Environment::Production),
        "Xcode" => Some(Environment::Xcode),
        "LocalTesting" => Some(Environment::LocalTesting),
        _ => None,
    }
}

fn parse_kind(value: &str) -> Option<PayloadKind> {
    match value {
        "transaction" => Some(PayloadKind::Transaction),
        "renewal" => Some(PayloadKind::RenewalInfo),
        "notification" => Some(PayloadKind::Notification),
        "app-transaction" => Some(PayloadKind::AppTransaction),
        "realtime" => Some(PayloadKind::RealtimeRequest),
        _ => None,
    }
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 6 {
        eprintln!(
            "Usage: {} <root.cer> <bundle-id> <environment> <kind> <token-file> [app-apple-id]",
            args[0]
        );
        process::exit(1);
    }

    let root = match fs::read(&args[1]) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error reading root certificate {}: {}", args[1], e);
            process::exit(1);
        }
    };

    let Some(environment) = parse_environment(&args[3]) else {
        eprintln!("Unknown environment: {}", args[3]);
        process::exit(1);
    };

    let Some(kind) = parse_kind(&args[4]) else {
        eprintln!("Unknown payload kind: {}", args[4]);
        process::exit(1);
    };

    let token = match fs::read_to_string(&args[5]) {
        Ok(data) => data.trim().to_string(),
        Err(e) => {
            eprintln!("Error reading token {}: {}", args[5], e);
            process::exit(1);
        }
    };

    let mut config = VerifierConfig::new(vec![root], args[2].as_str(), environment)
        .with_online_checks(env::var("STOREFRONT_ONLINE").as_deref() == Ok("1"));
    if let Some(app_apple_id) = args.get(6) {
        match app_apple_id.parse() {
            Ok(id) => config = config.with_app_apple_id(id),
            Err(e) => {
                eprintln!("Invalid app apple id {}: {}", app_apple_id, e);
                process::exit(1);
            }
        }
    }

    let verifier = match SignedDataVerifier::new(config) {
        Ok(verifier) => verifier,
        Err(e) => {
            eprintln!("Error creating verifier: {}", e);
            process::exit(1);
        }
    };

    match verifier.verify_and_decode_any(kind, &token).await {
        Ok(payload) => {
            println!("✓ Verified {}", payload.kind());
            println!("{:#?}", payload);
        }
        Err(e) => {
            println!("✗ Verification failed (status {}): {}", e.status().code(), e);
            process::exit(1);
        }
    }
}
