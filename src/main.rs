use std::io;
use std::{env, process};
use log::error;
use pinging::{driver, NetEngine};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = env::args().collect::<Vec<_>>();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let code = match driver::execute(&args, &mut out, NetEngine::new) {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    };

    process::exit(code);
}
