use std::{io, process::ExitCode};

use cda_probe::{Agent, Probe, ProbeError, ProbeErrorKind, ProbeOptions};
use tokio::runtime::Builder;

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let options = match ProbeOptions::from_args(std::env::args_os()) {
		Ok(options) => options,
		Err(err) => err.exit(),
	};

	match run(&options) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			log::error!("probe against {} aborted: {err}", options.host);
			ExitCode::FAILURE
		}
	}
}

fn run(options: &ProbeOptions) -> Result<(), ProbeError> {
	if options.insecure {
		log::info!("certificate validation is disabled");
	}

	let rt = Builder::new_current_thread()
		.enable_all()
		.build()
		.map_err(|err| ProbeError::new(ProbeErrorKind::RuntimeThread, Some(err.to_string())))?;

	rt.block_on(async {
		let agent = Agent::with_options(options.agent_options())?;
		let stdout = io::stdout();
		let mut out = stdout.lock();
		Probe::new(&agent, options).run(&mut out).await?;
		Ok::<(), ProbeError>(())
	})
}
