fn main() {
    if let Err(error) = xqkit_cli::run() {
        tracing::error!(%error, "xqkit failed");
        std::process::exit(1);
    }
}
