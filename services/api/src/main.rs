use firesafe_review_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("firesafe-review: {err}");
        std::process::exit(1);
    }
}
