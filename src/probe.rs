//! Fetch routines and the timed batches built on them.
//!
//! Every batch makes one untimed warm-up request so that whatever connection
//! reuse the client manages is in place before the clock starts. Only the
//! requests after it count towards the reported total.

use std::{
	io::Write,
	time::{Duration, Instant},
};

use hdrhistogram::Histogram;

use crate::{
	agent::Transport,
	error::ProbeError,
	fetch::fetch,
	options::ProbeOptions,
	request::{RequestDescriptor, TIMESERIES_NAMES},
	response::Outcome,
};

/// Requests in the timed part of the office-listing batch.
pub const OFFICE_REPEATS: usize = 10;

/// Initial upper bound of the latency histogram, in microseconds. It grows past this.
const HIST_HIGH: u64 = 60 * 1000 * 1000;
const HIST_SIGFIG: u8 = 3;

pub struct Probe<'a, T: Transport + ?Sized> {
	transport: &'a T,
	options: &'a ProbeOptions,
}

/// One timed request of a batch.
#[derive(Debug, Clone)]
pub struct Sample {
	pub label: String,
	pub outcome: Outcome,
	pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
	pub api_path: String,
	pub samples: Vec<Sample>,
	/// Wall clock for the timed requests, warm-up excluded.
	pub elapsed: Duration,
}

impl BatchReport {
	pub fn summary(&self) -> Option<LatencySummary> {
		LatencySummary::from_samples(&self.samples)
	}
}

/// Per-request latency distribution of a batch, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
	pub count: u64,
	pub min: u64,
	pub p50: u64,
	pub p90: u64,
	pub max: u64,
	pub mean: f64,
}

impl LatencySummary {
	pub fn from_samples(samples: &[Sample]) -> Option<Self> {
		if samples.is_empty() {
			return None;
		}

		let mut hist = Histogram::<u64>::new_with_bounds(1, HIST_HIGH, HIST_SIGFIG).ok()?;
		hist.auto(true);
		for sample in samples {
			let micros = u64::try_from(sample.elapsed.as_micros()).unwrap_or(u64::MAX);
			if let Err(err) = hist.record(micros.max(1)) {
				log::warn!("latency of {} not recorded: {err}", sample.label);
			}
		}

		Some(Self {
			count: hist.len(),
			min: hist.min(),
			p50: hist.value_at_quantile(0.5),
			p90: hist.value_at_quantile(0.9),
			max: hist.max(),
			mean: hist.mean(),
		})
	}
}

impl<'a, T: Transport + ?Sized> Probe<'a, T> {
	pub fn new(transport: &'a T, options: &'a ProbeOptions) -> Self {
		Self { transport, options }
	}

	/// Data for a single timeseries. The decoded payload is not printed.
	pub async fn fetch_timeseries<W: Write + ?Sized>(
		&self,
		api_path: &str,
		name: &str,
		out: &mut W,
	) -> Result<Sample, ProbeError> {
		let request = RequestDescriptor::timeseries(api_path, name, &self.options.window);
		let sample = self.sample(name, &request, out).await?;
		if !sample.outcome.is_json() {
			writeln!(out, "{}", sample.outcome)?;
		}
		Ok(sample)
	}

	/// The office listing. Unlike timeseries data, a decoded payload is printed.
	pub async fn fetch_offices<W: Write + ?Sized>(
		&self,
		api_path: &str,
		out: &mut W,
	) -> Result<Sample, ProbeError> {
		let request = RequestDescriptor::offices(api_path);
		let sample = self.sample("offices", &request, out).await?;
		writeln!(out, "{}", sample.outcome)?;
		Ok(sample)
	}

	async fn sample<W: Write + ?Sized>(
		&self,
		label: &str,
		request: &RequestDescriptor,
		out: &mut W,
	) -> Result<Sample, ProbeError> {
		let response = fetch(self.transport, &self.options.host, request, out).await?;
		let elapsed = response.elapsed;
		Ok(Sample {
			label: label.to_owned(),
			outcome: response.into_outcome(),
			elapsed,
		})
	}

	pub async fn run_timeseries_batch<W: Write + ?Sized>(
		&self,
		api_path: &str,
		out: &mut W,
	) -> Result<BatchReport, ProbeError> {
		writeln!(out, "== {api_path}: {} timeseries", TIMESERIES_NAMES.len())?;
		self.fetch_timeseries(api_path, TIMESERIES_NAMES[0], out).await?;

		let started = Instant::now();
		let mut samples = Vec::with_capacity(TIMESERIES_NAMES.len());
		for name in TIMESERIES_NAMES {
			let sample = self.fetch_timeseries(api_path, name, out).await?;
			print_sample(out, samples.len() + 1, &sample)?;
			samples.push(sample);
		}
		let elapsed = started.elapsed();

		self.finish(api_path, samples, elapsed, out)
	}

	pub async fn run_offices_batch<W: Write + ?Sized>(
		&self,
		api_path: &str,
		out: &mut W,
	) -> Result<BatchReport, ProbeError> {
		writeln!(out, "== {api_path}: offices x{OFFICE_REPEATS}")?;
		self.fetch_offices(api_path, out).await?;

		let started = Instant::now();
		let mut samples = Vec::with_capacity(OFFICE_REPEATS);
		for n in 1..=OFFICE_REPEATS {
			let sample = self.fetch_offices(api_path, out).await?;
			print_sample(out, n, &sample)?;
			samples.push(sample);
		}
		let elapsed = started.elapsed();

		self.finish(api_path, samples, elapsed, out)
	}

	fn finish<W: Write + ?Sized>(
		&self,
		api_path: &str,
		samples: Vec<Sample>,
		elapsed: Duration,
		out: &mut W,
	) -> Result<BatchReport, ProbeError> {
		let report = BatchReport {
			api_path: api_path.to_owned(),
			samples,
			elapsed,
		};

		if let Some(s) = report.summary() {
			writeln!(
				out,
				"latency over {} requests: min {:.1}ms p50 {:.1}ms p90 {:.1}ms max {:.1}ms mean {:.1}ms",
				s.count,
				ms(s.min),
				ms(s.p50),
				ms(s.p90),
				ms(s.max),
				s.mean / 1000.0,
			)?;
		}
		writeln!(out, "Total time: {:.3}s", report.elapsed.as_secs_f64())?;
		log::info!(
			"{api_path}: {} requests in {:.3}s",
			report.samples.len(),
			report.elapsed.as_secs_f64()
		);

		Ok(report)
	}

	/// Every selected batch for every API path, pausing after each batch.
	pub async fn run<W: Write + ?Sized>(&self, out: &mut W) -> Result<Vec<BatchReport>, ProbeError> {
		let mut reports = Vec::new();
		for api_path in &self.options.api_paths {
			if self.options.variant.runs_timeseries() {
				reports.push(self.run_timeseries_batch(api_path, out).await?);
				tokio::time::sleep(self.options.pause).await;
			}

			if self.options.variant.runs_offices() {
				reports.push(self.run_offices_batch(api_path, out).await?);
				tokio::time::sleep(self.options.pause).await;
			}
		}
		Ok(reports)
	}
}

fn print_sample<W: Write + ?Sized>(out: &mut W, n: usize, sample: &Sample) -> std::io::Result<()> {
	let status = match &sample.outcome {
		Outcome::Json(_) => "ok".to_owned(),
		Outcome::BadStatus { status, .. } => status.as_u16().to_string(),
		Outcome::BadJson { .. } => "bad json".to_owned(),
	};
	writeln!(
		out,
		"{n:>3} {:>8.1}ms  {status:<8} {}",
		sample.elapsed.as_secs_f64() * 1000.0,
		sample.label
	)
}

fn ms(micros: u64) -> f64 {
	micros as f64 / 1000.0
}
