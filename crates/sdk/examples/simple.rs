//! Simple example of using the Waitroom SDK
//!
//! Run with: cargo run --example simple
//!
//! Requires a running daemon: `waitroom`

use waitroom_sdk::{EntryStatus, WaitroomClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = WaitroomClient::connect("http://127.0.0.1:9010").await?;
    println!("Connected to Waitroom daemon");

    let queue = "default";
    let user_id = "42";

    let rank = match client.register(queue, user_id).await {
        Ok(response) => response.rank,
        Err(e) if e.is_already_registered() => {
            println!("User {} already waiting", user_id);
            client.rank(queue, user_id).await?.rank
        }
        Err(e) => return Err(e.into()),
    };
    println!("Rank: {}", rank);

    let allowed = client.allow(queue, 1).await?;
    println!(
        "Requested {}, admitted {}",
        allowed.requested_count, allowed.allowed_count
    );

    if client.is_admitted(queue, user_id).await? {
        let binding = client.touch(queue, user_id).await?;
        println!(
            "Set-Cookie: {}={}; Max-Age={}; Path={}",
            binding.cookie_name, binding.token, binding.max_age_secs, binding.path
        );

        let visit = client.enter(queue, user_id, Some(&binding.token)).await?;
        assert_eq!(visit.status, EntryStatus::Admitted);
        println!("User {} may proceed", visit.user_id);
    }

    let stats = client.stats(queue).await?;
    println!("Waiting: {}, admitted: {}", stats.waiting, stats.admitted);

    Ok(())
}
