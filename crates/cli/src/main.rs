fn main() {
    oapi_split_cli::logging::init_tracing();
    std::process::exit(oapi_split_cli::run_from(std::env::args_os()));
}
