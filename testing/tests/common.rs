#[macro_export]
macro_rules! scenario_test {
    ($name:ident, $scenario:ty, $scenario_instance:expr) => {
        #[test]
        #[ignore = "needs a docker daemon and the nwaku image"]
        fn $name() {
            use nwaku_testing::{
                cluster::ClusterConfig,
                logging::{self, Level, DEFAULT_LOG_FILE},
                run_scenario,
                scenarios::{ScenarioTimeouts, Scenarios},
            };
            use std::io::Write;

            let _ = logging::initialize(Level::INFO, Some(std::path::Path::new(DEFAULT_LOG_FILE)));

            let summary = std::env::var_os("GITHUB_STEP_SUMMARY");
            if let Some(summary) = &summary {
                let _ = std::fs::File::options()
                    .append(true)
                    .open(summary)
                    .and_then(|mut f| {
                        writeln!(
                            f,
                            "### `{}`\n\n{}\n",
                            stringify!($name),
                            <$scenario as documented::Documented>::DOCS
                        )
                    });
            }

            let scenario: Scenarios = $scenario_instance.into();
            let res = run_scenario(scenario, ClusterConfig::default(), ScenarioTimeouts::default());

            if let Some(summary) = &summary {
                let verdict = match &res {
                    Ok(()) => "**PASSED** :white_check_mark:",
                    Err(_) => "**FAILED** :red_circle:",
                };
                let _ = std::fs::File::options()
                    .append(true)
                    .open(summary)
                    .and_then(|mut f| writeln!(f, "{verdict}"));
            }

            if let Err(err) = res {
                panic!("{} failed: {err:#}", stringify!($name));
            }
        }
    };
}
