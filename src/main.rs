use gitstat::presentation::cli::CliApp;

#[tokio::main]
async fn main() {
    let app = CliApp::new();
    app.init_tracing();

    // Run the CLI application
    let code = app.run().await;
    std::process::exit(code);
}
