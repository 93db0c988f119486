#[tokio::main]
async fn main() {
    if let Err(e) = lib_proximity_sim::init().await {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
