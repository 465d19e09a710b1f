#[tokio::main]
async fn main() -> anyhow::Result<()> {
    familycare_server::start().await
}
