use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{ArgGroup, Parser};
use skybrief::{
    AirportDirectory, BriefingRequest, FlightPlan, RouteBriefingService, SkyBriefConfig, telemetry,
};

/// Aviation weather briefing for a route
#[derive(Debug, Parser)]
#[command(name = "skybrief", version, about = "Aviation weather route briefing")]
#[command(group(ArgGroup::new("input").required(true).args(["request", "plan"])))]
struct Cli {
    /// JSON briefing request file
    request: Option<PathBuf>,

    /// Free-text flight plan, e.g. "KJFK KORD KLAX FL350"
    #[arg(long, value_name = "TEXT")]
    plan: Option<String>,
}

impl Cli {
    fn into_request(self) -> Result<BriefingRequest> {
        if let Some(plan) = self.plan {
            let plan = FlightPlan::parse(&plan).map_err(|err| anyhow!(err.user_message()))?;
            return Ok(plan.into_request(Vec::new()));
        }
        let path = self
            .request
            .ok_or_else(|| anyhow!("a request file or --plan is required"))?;
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read briefing request {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid briefing request in {}", path.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SkyBriefConfig::load()?;
    telemetry::init_tracing(&config.logging)?;

    let request = cli.into_request()?;
    let service = RouteBriefingService::new(&config, AirportDirectory::builtin());
    let response = service
        .generate(&request)
        .map_err(|err| anyhow!(err.user_message()))?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_accepts_one_input() {
        let plan = Cli::try_parse_from(["skybrief", "--plan", "KJFK KBOS"]).unwrap();
        assert_eq!(plan.plan.as_deref(), Some("KJFK KBOS"));
        assert!(plan.request.is_none());

        let file = Cli::try_parse_from(["skybrief", "request.json"]).unwrap();
        assert_eq!(file.request, Some(PathBuf::from("request.json")));
    }

    #[test]
    fn test_cli_rejects_missing_or_both_inputs() {
        assert!(Cli::try_parse_from(["skybrief"]).is_err());
        assert!(Cli::try_parse_from(["skybrief", "request.json", "--plan", "KJFK KBOS"]).is_err());
    }
}
