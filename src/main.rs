mod analysis;
mod report;
mod samples;

use std::error::Error;

use analysis::run_analysis;
use report::render_summary;
use samples::Sample;
use tracing_subscriber::EnvFilter;
use trussform::OptimizerConfig;

/// Command-line options: `[SAMPLE] [CONFIG.json] [--json]`.
#[derive(Debug, Default)]
struct Options {
    sample: Option<String>,
    config: Option<String>,
    json: bool,
}

fn parse_options(args: impl Iterator<Item = String>) -> Options {
    let mut options = Options::default();
    for arg in args {
        if arg == "--json" {
            options.json = true;
        } else if options.sample.is_none() {
            options.sample = Some(arg);
        } else {
            options.config = Some(arg);
        }
    }
    options
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let options = parse_options(std::env::args().skip(1));

    // Pick the sample topology and the optimizer settings.
    let sample: Sample = options.sample.as_deref().unwrap_or("introduction").parse()?;
    let config = match &options.config {
        Some(path) => OptimizerConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => OptimizerConfig::default(),
    };

    let mut graph = sample.build()?;
    let summary = run_analysis(sample, &mut graph, &config)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", render_summary(&summary));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_accept_sample_config_and_flag_in_any_order() {
        let args = ["--json", "crane", "settings.json"].map(String::from);
        let options = parse_options(args.into_iter());
        assert!(options.json);
        assert_eq!(options.sample.as_deref(), Some("crane"));
        assert_eq!(options.config.as_deref(), Some("settings.json"));

        let options = parse_options(std::iter::empty());
        assert!(!options.json);
        assert!(options.sample.is_none());
    }
}
