fn main() {
    sentree::cli::run();
}
