//! Minimal example: two users create identities, one uploads a file and
//! downloads it again, then shares another file with the second user.
//!
//! Run with: `RUST_LOG=sharevault=debug cargo run --example secure_share_demo`
//!
//! The activity log is persisted to a JSON-lines file in the temp directory.

use sharevault::audit::FileActivitySink;
use sharevault::store::InMemoryKeyStore;
use sharevault::{Config, SecureShare};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. Setup
    let mut share = SecureShare::new(InMemoryKeyStore::new(), Config::default())?;
    let activity_path = std::env::temp_dir().join("sharevault_activity.jsonl");
    share.add_activity_sink(Box::new(FileActivitySink::new(&activity_path)?));

    // 2. Identity: key pair generated, private key wrapped under the password
    let owner = "alice@example.com";
    let key_id = share.create_identity(owner, "Str0ngPass!", "Str0ngPass!")?;
    println!("Created key pair {key_id}");

    // 3. Upload: the envelope is what a storage layer would persist
    let sealed = share.upload(owner, "plan.txt", "text/plain", b"ship it on friday")?;
    println!(
        "Stored envelope:\n{}",
        serde_json::to_string_pretty(&sealed.to_encoded())?
    );

    // 4. Download, two-phase: the password arrives after the user is prompted
    let pending = share.begin_download(owner, &sealed)?;
    if let Err(e) = share.finish_download(&pending, "not my password") {
        println!("First attempt: {e}");
    }
    let file = share.finish_download(&pending, "Str0ngPass!")?;
    println!("Recovered {}: {}", file.name, String::from_utf8_lossy(&file.bytes));

    // 5. Share: sealed for bob's stored public key, alice cannot reopen it
    let bob = "bob@example.com";
    share.create_identity(bob, "B0bsPassword", "B0bsPassword")?;
    let shared = share.share(owner, bob, "budget.csv", "text/csv", b"q1,q2\n10,20\n")?;
    if let Err(e) = share.download(owner, &shared, "Str0ngPass!") {
        println!("Sender download: {e}");
    }
    let file = share.download(bob, &shared, "B0bsPassword")?;
    println!("Bob recovered {} ({} bytes)", file.name, file.bytes.len());

    // 6. Activity
    for record in share.activity_log().recent(10) {
        println!("{:?} {} {:?}", record.kind, record.subject, record.status);
    }
    println!("Activity log written to {}", activity_path.display());

    Ok(())
}
