use tokio_util::sync::CancellationToken;

use crate::agent::{Agent, AgentError};
use crate::config::Config;
use crate::scheduler::{ClockStats, TickClock};

/// Build the agent from `config` and tick until cancelled by a signal or,
/// with `count`, until that many ticks have run.
pub async fn run(config: Config, count: Option<u64>) -> Result<ClockStats, AgentError> {
    let mut agent = Agent::from_config(&config).await?;

    let cancel = CancellationToken::new();
    let signals = crate::shutdown::cancel_on_shutdown(cancel.clone());

    let mut clock = TickClock::new(agent.settings().base_interval);
    if let Some(n) = count {
        clock = clock.with_count(n);
    }

    tracing::info!(
        agent = %agent.name(),
        base_interval_s = agent.settings().base_interval.as_secs_f64(),
        count = ?count,
        "agent running"
    );
    let stats = clock.run(&mut agent, &cancel).await;
    signals.abort();
    Ok(stats)
}
