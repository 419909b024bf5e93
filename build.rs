use std::fs;

fn main() {
	// The user agent names the reqwest actually resolved, not the requirement
	let reqwest_version = extract_locked_version("reqwest").unwrap_or_else(|| "unknown".into());
	println!("cargo:rustc-env=REQWEST_VERSION={}", reqwest_version);
	println!("cargo:rerun-if-changed=Cargo.lock");
}

fn extract_locked_version(package: &str) -> Option<String> {
	let cargo_lock = fs::read_to_string("Cargo.lock").ok()?;
	let name_line = format!("name = \"{package}\"");

	let mut lines = cargo_lock.lines().map(str::trim);
	while let Some(line) = lines.next() {
		if line != name_line {
			continue;
		}

		// version follows the name within the same [[package]] entry
		for next_line in lines.by_ref().take(5) {
			if let Some(version) = next_line
				.strip_prefix("version = \"")
				.and_then(|v| v.strip_suffix('"'))
			{
				return Some(version.to_string());
			}
		}
	}

	None
}
