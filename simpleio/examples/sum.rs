//! Print the sum of the given numbers.
//!
//! ```text
//! $ cargo run --example sum -- 1 2 3
//! 6
//! $ printf '1 2\n3 "4"\n' | cargo run --example sum
//! 3
//! 7
//! ```
//!
//! Set `SIMPLEIO_LOG` to `debug` or `trace` to see what happens under the hood.

use std::process::ExitCode;

use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use simpleio::{Config, Fields};

#[derive(Debug, Fields)]
struct Numbers {
    #[field(name = "number")]
    values: Vec<i64>,
}

fn init_logger() {
    let level = match std::env::var("SIMPLEIO_LOG").as_deref() {
        Ok("trace") => LevelFilter::Trace,
        Ok("debug") => LevelFilter::Debug,
        Ok(_) => LevelFilter::Info,
        Err(_) => return,
    };

    let config = simplelog::Config::default();

    if let Err(err) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("cannot initialize logger: {err}");
    }
}

fn main() -> ExitCode {
    init_logger();

    simpleio::run(Config::from_env(), |args: Numbers| {
        let sum = args
            .values
            .iter()
            .try_fold(0i64, |acc, x| acc.checked_add(*x))
            .ok_or("overflow")?;

        println!("{sum}");
        Ok::<_, &str>(())
    })
}
