use stress_test::{stress_test_scaling, stress_test_store, StressConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;
use weave_store::StoreError;


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = rt.block_on(async_main()) {
        error!(error = %err, "stress tests aborted");
        std::process::exit(1);
    }
}

async fn async_main() -> Result<(), StoreError> {
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            ASYNC STRESS TESTS                               ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Test 1: Small scale, few keys so merges conflict often
    let stats = stress_test_store(StressConfig {
        keys: 2,
        ..StressConfig::default()
    })
    .await?;
    stats.print();

    // Test 2: Medium scale
    let stats = stress_test_store(StressConfig {
        universes: 10,
        writers: 8,
        ops_per_writer: 500,
        merges: 1000,
        keys: 32,
    })
    .await?;
    stats.print();

    // Test 3: Scaling analysis
    stress_test_scaling(20, 5).await?;

    println!("\n✓ All stress tests completed successfully!");
    Ok(())
}
