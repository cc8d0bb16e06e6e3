use coauthor_sdk::MergeStrategy;
use stress_test::{scripted_session, stress_test_concurrent_writers, stress_test_replay};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;


fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "coauthor=info,warn".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> std::io::Result<()> {
    init_tracing();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async_main());
    Ok(())
}

async fn async_main() {
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            SCRIPTED SESSIONS                               ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    for strategy in [
        MergeStrategy::UserPriority,
        MergeStrategy::AgentPriority,
        MergeStrategy::Merge,
    ] {
        if let Err(err) = scripted_session(strategy).await {
            eprintln!("scripted session ({}) failed: {}", strategy, err);
        }
    }

    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            REPLAY STRESS TESTS                             ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Small histories, many sections
    let small = stress_test_replay(32, 50, 7).await;
    small.print();

    // Long histories
    let large = stress_test_replay(8, 1000, 42).await;
    large.print();

    if let Err(err) = stress_test_concurrent_writers(8, 200).await {
        eprintln!("concurrent writers failed: {}", err);
    }

    if small.violations + large.violations == 0 {
        println!("\n✓ All stress tests completed successfully!");
    } else {
        println!("\n✗ Invariant violations: {}", small.violations + large.violations);
    }
}
