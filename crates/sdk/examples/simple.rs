//! Simple SDK Example
//!
//! Demonstrates basic usage of the brandscout SDK.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package brandscout-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple
//!    ```

use brandscout_sdk::{BrandscoutClient, QuizResponses, RegistrySearchRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Brandscout SDK - Simple Example");
    println!("================================\n");

    println!("1. Connecting to daemon...");
    let client = BrandscoutClient::connect("http://127.0.0.1:8177").await?;
    println!("   connected\n");

    println!("2. Starting a search...");
    let handle = client
        .registry_search(RegistrySearchRequest {
            client_id: "example".to_string(),
            quiz_responses: QuizResponses {
                business_name: "Acme Robotics".to_string(),
                tld_preferences: vec!["com".to_string(), "io".to_string()],
                vibe: "playful".to_string(),
                domain_idea: None,
                keywords: None,
                client_email: None,
            },
            driver_provider: None,
            swarm_provider: None,
        })
        .await?;

    println!("   job started:");
    println!("     - ID: {}", handle.job_id);
    println!("     - Status: {}\n", handle.status);

    println!("3. Waiting 2 seconds...");
    tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;
    println!("   done\n");

    println!("4. Fetching status...");
    let status = client.status(&handle.job_id).await?;
    println!("   status: {}", status.status);
    println!("   batch: {}", status.batch_num);
    println!("   domains checked: {}", status.domains_checked);
    println!("   good results: {}\n", status.good_results);

    println!("5. Cancelling job...");
    let cancelled = client.cancel(&handle.job_id).await?;
    println!("   job is now: {}", cancelled.status);

    println!("\nexample completed successfully");

    Ok(())
}
