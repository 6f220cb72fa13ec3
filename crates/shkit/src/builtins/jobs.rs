//! jobs builtin - format the executor's job table

use async_trait::async_trait;

use super::{parser_args, Builtin, Context, ExecResult, Job};
use crate::error::Result;
use crate::opts::{Opt, OptParser, OptSpec};

/// The jobs builtin. `-l` adds the process id to each line, `-p` prints
/// only process ids. Operands are `%n` job specs selecting single jobs.
pub struct Jobs;

#[async_trait]
impl Builtin for Jobs {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let mut parser = OptParser::new(OptSpec::shorts("lp"), parser_args("jobs", ctx.args));
        let mut long = false;
        let mut pids_only = false;
        loop {
            match parser.next() {
                Ok(Some(Opt::Short('l'))) => long = true,
                Ok(Some(Opt::Short('p'))) => pids_only = true,
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => return Ok(ExecResult::err(format!("jobs: {e}\n"), 2)),
            }
        }

        let mut jobs: Vec<Job> = ctx.jobs.map(|store| store.jobs()).unwrap_or_default();

        let specs = parser.operands().to_vec();
        if !specs.is_empty() {
            let mut selected = Vec::new();
            for spec in &specs {
                let id = spec.strip_prefix('%').and_then(|n| n.parse::<usize>().ok());
                match id.and_then(|id| jobs.iter().find(|j| j.id == id)) {
                    Some(job) => selected.push(job.clone()),
                    None => {
                        return Ok(ExecResult::err(format!("jobs: {spec}: no such job\n"), 1));
                    }
                }
            }
            jobs = selected;
        }

        let mut out = String::new();
        for job in &jobs {
            if pids_only {
                out.push_str(&format!("{}\n", job.pid));
            } else if long {
                out.push_str(&format!(
                    "[{}] {} {:<24}{}\n",
                    job.id,
                    job.pid,
                    job.state.label(),
                    job.command
                ));
            } else {
                out.push_str(&format!(
                    "[{}]  {:<24}{}\n",
                    job.id,
                    job.state.label(),
                    job.command
                ));
            }
        }
        Ok(ExecResult::ok(out))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Shell;
    use super::super::{JobState, JobStore};
    use super::*;
    use pretty_assertions::assert_eq;

    struct Table(Vec<Job>);

    impl JobStore for Table {
        fn jobs(&self) -> Vec<Job> {
            self.0.clone()
        }
    }

    fn sample() -> Table {
        Table(vec![
            Job {
                id: 1,
                pid: 101,
                state: JobState::Running,
                command: "sleep 10 &".into(),
            },
            Job {
                id: 2,
                pid: 102,
                state: JobState::Done,
                command: "true &".into(),
            },
        ])
    }

    async fn run(args: &[&str], table: &Table) -> ExecResult {
        let mut sh = Shell::new();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let ctx = Context {
            args: &args,
            host: &sh.host,
            vars: &mut sh.vars,
            opts: &mut sh.opts,
            frame: &mut sh.frame,
            functions: None,
            jobs: Some(table),
            runner: None,
        };
        Jobs.execute(ctx).await.unwrap()
    }

    #[tokio::test]
    async fn lists_all_jobs() {
        let table = sample();
        let res = run(&[], &table).await;
        assert!(res.is_success());
        assert!(res.stdout.contains("[1]"));
        assert!(res.stdout.contains("Running"));
        assert!(res.stdout.contains("sleep 10 &"));
        assert!(res.stdout.contains("[2]"));
    }

    #[tokio::test]
    async fn pids_only() {
        let table = sample();
        let res = run(&["-p"], &table).await;
        assert_eq!(res.stdout, "101\n102\n");
    }

    #[tokio::test]
    async fn long_format_includes_pid() {
        let table = sample();
        let res = run(&["-l", "%1"], &table).await;
        assert!(res.stdout.starts_with("[1] 101 "));
        assert_eq!(res.stdout.lines().count(), 1);
    }

    #[tokio::test]
    async fn unknown_job_spec() {
        let table = sample();
        let res = run(&["%9"], &table).await;
        assert_eq!(res.exit_code, 1);
        assert!(res.stderr.contains("%9"));
    }

    #[tokio::test]
    async fn empty_without_job_store() {
        let mut sh = Shell::new();
        let res = sh.run(&Jobs, &[]).await;
        assert!(res.is_success());
        assert!(res.stdout.is_empty());
    }
}
