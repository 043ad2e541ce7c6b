fn main() {
    if let Err(err) = timeline_label_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
