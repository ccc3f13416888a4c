#[tokio::main]
async fn main() {
  if let Err(e) = workout_log_lib::run().await {
    eprintln!("workout-log failed: {}", e);
    std::process::exit(1);
  }
}
