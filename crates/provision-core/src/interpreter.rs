use crate::runner::{probe, CommandRunner};
use crate::version::InterpreterVersion;
use serde::Serialize;

/// A runnable Python interpreter and the version it reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpreter {
    pub program: String,
    pub version: InterpreterVersion,
}

/// Every candidate that runs and reports a parseable version, in order.
pub fn discover(runner: &dyn CommandRunner, candidates: &[String]) -> Vec<Interpreter> {
    candidates
        .iter()
        .filter_map(|program| {
            let banner = probe(runner, program, "--version")?;
            match InterpreterVersion::parse(&banner) {
                Ok(version) => Some(Interpreter {
                    program: program.clone(),
                    version,
                }),
                Err(_) => {
                    tracing::debug!(program = %program, banner = %banner, "unparseable version banner");
                    None
                }
            }
        })
        .collect()
}

/// First candidate meeting `minimum`.
pub fn find_suitable(
    runner: &dyn CommandRunner,
    candidates: &[String],
    minimum: &InterpreterVersion,
) -> Option<Interpreter> {
    discover(runner, candidates)
        .into_iter()
        .find(|i| i.version.satisfies(minimum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CommandOutput;
    use crate::test_support::FakeRunner;

    fn candidates() -> Vec<String> {
        vec!["python3".to_string(), "python".to_string()]
    }

    #[test]
    fn skips_old_candidates_for_newer_ones() {
        let runner = FakeRunner::new();
        runner.respond("python3 --version", CommandOutput::ok("Python 3.7.17"));
        runner.respond("python --version", CommandOutput::ok("Python 3.10.12"));
        let found = find_suitable(&runner, &candidates(), &InterpreterVersion::new(3, 8, 0)).unwrap();
        assert_eq!(found.program, "python");
        assert_eq!(found.version, InterpreterVersion::new(3, 10, 12));
    }

    #[test]
    fn reads_banner_from_stderr() {
        let runner = FakeRunner::new();
        runner.respond(
            "python --version",
            CommandOutput {
                stderr: "Python 2.7.18\n".to_string(),
                ..CommandOutput::ok("")
            },
        );
        let found = discover(&runner, &candidates());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].version, InterpreterVersion::new(2, 7, 18));
    }

    #[test]
    fn none_when_nothing_meets_minimum() {
        let runner = FakeRunner::new();
        runner.respond("python3 --version", CommandOutput::ok("Python 3.6.15"));
        assert!(find_suitable(&runner, &candidates(), &InterpreterVersion::new(3, 8, 0)).is_none());
        assert_eq!(discover(&runner, &candidates()).len(), 1);
    }
}
