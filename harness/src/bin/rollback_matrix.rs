use serde::Serialize;

use rollback_harness::{
    config::Config,
    logging,
    scenario::{run_scenario, Connections, Outcome, Scenario},
    transaction::Flavor,
};

#[derive(Debug, Serialize)]
struct MatrixLine {
    scenario: String,
    flavor: Flavor,
    commit: bool,
    observed: Outcome,
    expected: Outcome,
    matches: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::load()?;
    let mut conns = Connections::open(&config.database_url, config.pool).await?;

    let mut mismatches = 0;
    for scenario in Scenario::all() {
        let observed = match run_scenario(&mut conns, scenario).await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Failed(e.to_string()),
        };
        let expected = scenario.expected();
        let matches = observed == expected;
        if !matches {
            mismatches += 1;
            tracing::warn!(
                scenario = %scenario.name(),
                observed = %observed,
                expected = %expected,
                "unexpected rollback outcome"
            );
        }

        let line = MatrixLine {
            scenario: scenario.name(),
            flavor: scenario.flavor,
            commit: scenario.commit,
            observed,
            expected,
            matches,
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    conns.pool.close().await;

    if mismatches > 0 {
        anyhow::bail!("{} scenario(s) did not match the expected outcome", mismatches);
    }
    Ok(())
}
