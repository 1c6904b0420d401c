#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = knova::run().await {
        eprintln!("knova fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
