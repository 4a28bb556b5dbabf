// ABOUTME: Shared helper for building the cluster backend from settings.
// ABOUTME: Keeps profile, region and timeout plumbing out of the individual commands.

use noderoll::backend::AwsCliBackend;
use noderoll::config::Settings;
use noderoll::output::Output;

/// Build the aws-client backend described by `settings`.
pub fn connect_to_backend(settings: &Settings, output: &Output) -> AwsCliBackend {
    let config = settings.aws_cli_config();
    match (&config.profile, &config.region) {
        (Some(profile), Some(region)) => {
            output.progress(&format!("  → Using profile {profile} in {region}"))
        }
        (Some(profile), None) => output.progress(&format!("  → Using profile {profile}")),
        (None, Some(region)) => output.progress(&format!("  → Using region {region}")),
        (None, None) => {}
    }
    tracing::debug!(
        "aws client: {} (timeout {}s)",
        config.program,
        config.timeout.as_secs()
    );
    AwsCliBackend::new(config)
}
