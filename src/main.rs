use treepush::ui::output;

#[tokio::main]
async fn main() {
    if let Err(err) = treepush::cli::run().await {
        output::error(format!("{:#}", err));
        std::process::exit(1);
    }
}
