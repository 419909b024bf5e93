use std::{ffi::OsString, time::Duration};

use clap::{Parser, ValueEnum};

use crate::{
	agent::{AgentOptions, VERSION},
	request::TimeWindow,
};

pub const DEFAULT_HOST: &str = "localhost:8443";
pub const DEFAULT_API_PATH: &str = "cwms-data";
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
	/// Twelve timeseries requests
	Timeseries,
	/// Ten office-listing requests
	Offices,
	/// Both, timeseries first
	All,
}

impl Variant {
	pub fn runs_timeseries(self) -> bool {
		matches!(self, Self::Timeseries | Self::All)
	}

	pub fn runs_offices(self) -> bool {
		matches!(self, Self::Offices | Self::All)
	}
}

/// Time a fixed sequence of requests against a CWMS Data API host.
#[derive(Debug, Clone, Parser)]
#[command(name = "cda-probe", version = VERSION, about)]
pub struct Cli {
	/// Legacy host override. Its presence makes the probe use argument zero
	/// (the program name) as the host; use --host instead.
	#[arg(value_name = "HOST")]
	pub legacy_host: Option<String>,

	/// Host and port to probe
	#[arg(long, env = "CDA_PROBE_HOST")]
	pub host: Option<String>,

	/// API path prefix, repeat to probe several deployments in turn
	#[arg(long = "api-path", value_name = "PATH", default_value = DEFAULT_API_PATH)]
	pub api_paths: Vec<String>,

	#[arg(long, value_enum, default_value_t = Variant::Timeseries)]
	pub variant: Variant,

	/// Seconds to sleep after each batch
	#[arg(long, value_name = "SECS", default_value_t = 1.0)]
	pub pause: f64,

	/// Per-request timeout in seconds, none by default
	#[arg(long, value_name = "SECS", value_parser = positive_secs)]
	pub timeout: Option<Duration>,

	/// Validate server certificates instead of accepting any
	#[arg(long)]
	pub verify_tls: bool,

	#[arg(long)]
	pub begin: Option<String>,

	#[arg(long)]
	pub end: Option<String>,

	#[arg(long)]
	pub unit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProbeOptions {
	pub host: String,
	pub api_paths: Vec<String>,
	pub variant: Variant,
	pub pause: Duration,
	pub timeout: Option<Duration>,
	/// Accept any certificate the server presents.
	pub insecure: bool,
	pub window: TimeWindow,
}

impl Default for ProbeOptions {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_owned(),
			api_paths: vec![DEFAULT_API_PATH.to_owned()],
			variant: Variant::Timeseries,
			pause: DEFAULT_PAUSE,
			timeout: None,
			insecure: true,
			window: TimeWindow::default(),
		}
	}
}

impl ProbeOptions {
	/// Parse the process arguments. `args` includes the program name.
	pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
	where
		I: IntoIterator<Item = T>,
		T: Into<OsString> + Clone,
	{
		let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
		let cli = Cli::try_parse_from(&args)?;
		let argv: Vec<String> = args
			.iter()
			.map(|arg| arg.to_string_lossy().into_owned())
			.collect();
		Ok(Self::from_cli(cli, &argv))
	}

	pub fn from_cli(cli: Cli, argv: &[String]) -> Self {
		let host = match cli.host {
			Some(host) => host,
			None if cli.legacy_host.is_some() => legacy_host(argv, DEFAULT_HOST),
			None => DEFAULT_HOST.to_owned(),
		};

		Self {
			host,
			api_paths: cli.api_paths,
			variant: cli.variant,
			pause: secs(cli.pause).unwrap_or(DEFAULT_PAUSE),
			timeout: cli.timeout,
			insecure: !cli.verify_tls,
			window: TimeWindow {
				begin: cli.begin,
				end: cli.end,
				unit: cli.unit,
			},
		}
	}

	pub fn agent_options(&self) -> AgentOptions {
		AgentOptions {
			skip_certificate_validation: self.insecure,
			timeout: self.timeout,
			user_agent: None,
		}
	}
}

/// Host selection as the probe has always done it: once any user argument is
/// given, the override is read from argument zero, which is the invocation
/// name rather than the argument.
pub fn legacy_host(argv: &[String], default: &str) -> String {
	if argv.len() > 1 {
		let host = argv[0].clone();
		log::warn!("host override taken from argument zero: {host:?}");
		host
	} else {
		default.to_owned()
	}
}

fn secs(value: f64) -> Option<Duration> {
	Duration::try_from_secs_f64(value).ok()
}

fn positive_secs(value: &str) -> Result<Duration, String> {
	let parsed: f64 = value
		.parse()
		.map_err(|_| format!("{value:?} is not a number of seconds"))?;
	match secs(parsed) {
		Some(duration) if !duration.is_zero() => Ok(duration),
		_ => Err(format!("{value:?} must be a positive number of seconds")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_the_fixed_run() {
		let opts = ProbeOptions::from_args(["cda-probe"]).unwrap();
		assert_eq!(opts.host, "localhost:8443");
		assert_eq!(opts.api_paths, ["cwms-data"]);
		assert_eq!(opts.variant, Variant::Timeseries);
		assert_eq!(opts.pause, Duration::from_secs(1));
		assert_eq!(opts.timeout, None);
		assert!(opts.insecure);
		assert_eq!(opts.window, TimeWindow::default());
	}

	// The positional argument never reaches the host: argument zero does.
	#[test]
	fn positional_host_uses_argument_zero() {
		let opts = ProbeOptions::from_args(["cda-probe", "cwms.example:443"]).unwrap();
		assert_eq!(opts.host, "cda-probe");
		assert_ne!(opts.host, "cwms.example:443");
	}

	#[test]
	fn legacy_host_without_arguments_keeps_default() {
		let argv = vec!["/usr/bin/cda-probe".to_string()];
		assert_eq!(legacy_host(&argv, DEFAULT_HOST), DEFAULT_HOST);
	}

	#[test]
	fn host_flag_wins_over_positional() {
		let opts = ProbeOptions::from_args([
			"cda-probe",
			"ignored:1",
			"--host",
			"cwms.example:443",
		])
		.unwrap();
		assert_eq!(opts.host, "cwms.example:443");
	}

	#[test]
	fn flags_are_carried_through() {
		let opts = ProbeOptions::from_args([
			"cda-probe",
			"--host=h:1",
			"--api-path",
			"cwms-data",
			"--api-path",
			"spk-data",
			"--variant",
			"all",
			"--pause",
			"0.25",
			"--timeout",
			"30",
			"--verify-tls",
			"--unit",
			"SI",
		])
		.unwrap();
		assert_eq!(opts.api_paths, ["cwms-data", "spk-data"]);
		assert!(opts.variant.runs_timeseries() && opts.variant.runs_offices());
		assert_eq!(opts.pause, Duration::from_millis(250));
		assert_eq!(opts.timeout, Some(Duration::from_secs(30)));
		assert!(!opts.insecure);
		assert!(!opts.agent_options().skip_certificate_validation);
		assert_eq!(opts.window.unit.as_deref(), Some("SI"));
	}

	#[test]
	fn timeout_must_be_positive() {
		for bad in ["--timeout=0", "--timeout=-1", "--timeout=soon", "--timeout=NaN"] {
			let err = ProbeOptions::from_args(["cda-probe", bad]).unwrap_err();
			assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{bad}");
		}

		let opts = ProbeOptions::from_args(["cda-probe", "--timeout", "2.5"]).unwrap();
		assert_eq!(opts.timeout, Some(Duration::from_millis(2500)));
	}

	#[test]
	fn version_names_the_http_stack() {
		let err = ProbeOptions::from_args(["cda-probe", "--version"]).unwrap_err();
		assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
		assert!(err.to_string().contains("(reqwest "));
	}

	#[test]
	fn negative_pause_falls_back_to_default() {
		let opts = ProbeOptions::from_args(["cda-probe", "--pause=-3"]).unwrap();
		assert_eq!(opts.pause, DEFAULT_PAUSE);
	}
}
