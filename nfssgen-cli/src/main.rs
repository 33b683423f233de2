//! Binary entrypoint for nfssgen-cli (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = nfssgen_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
