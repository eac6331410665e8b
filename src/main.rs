#[tokio::main]
async fn main() -> anyhow::Result<()> {
    video_recorder_lib::run().await
}
