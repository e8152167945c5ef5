#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hackathon_server::run().await
}
