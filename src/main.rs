#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stackview_lib::run().await
}
