#[tokio::main]
async fn main() -> anyhow::Result<()> {
    remold::cli::run().await
}
