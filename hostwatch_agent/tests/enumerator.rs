//! Enumerator behaviour against real child processes (`sh -c` stand-ins).
#![cfg(unix)]

use std::time::{Duration, Instant};

use hostwatch_agent::error::EnumerateError;
use hostwatch_agent::processes::{parse_ps_output, ProcessEnumerator, ProcessSource};
use hostwatch_core::ProcessRecord;

struct ScriptSource {
    program: &'static str,
    args: [&'static str; 2],
}

impl ScriptSource {
    fn sh(script: &'static str) -> Self {
        Self {
            program: "sh",
            args: ["-c", script],
        }
    }
}

impl ProcessSource for ScriptSource {
    fn name(&self) -> &'static str {
        "script"
    }

    fn program(&self) -> &'static str {
        self.program
    }

    fn args(&self) -> &[&'static str] {
        &self.args
    }

    fn parse(&self, stdout: &str, _total_memory: u64) -> Vec<ProcessRecord> {
        parse_ps_output(stdout)
    }
}

fn enumerator(src: ScriptSource, timeout: Duration) -> ProcessEnumerator {
    ProcessEnumerator::new(Box::new(src), 0, timeout, 2)
}

const SIXTY_ROWS: &str = r#"echo "PID %CPU %MEM S TIME COMMAND"
i=1
while [ $i -le 60 ]; do
  echo "$i $i.0 0.1 S 00:00:01 proc$i"
  i=$((i+1))
done"#;

#[tokio::test]
async fn caps_at_fifty_sorted_by_cpu() {
    let e = enumerator(ScriptSource::sh(SIXTY_ROWS), Duration::from_secs(5));
    let list = e.list_processes().await.unwrap();
    assert_eq!(list.len(), 50);
    assert_eq!(list[0].pid, 60);
    assert_eq!(list[0].name, "proc60");
    assert_eq!(list[49].pid, 11);
    assert!(list.windows(2).all(|w| w[0].cpu >= w[1].cpu));
}

#[tokio::test]
async fn nonzero_exit_is_reported_and_degrades_to_empty() {
    let e = enumerator(ScriptSource::sh("echo boom >&2; exit 3"), Duration::from_secs(5));
    match e.list_processes().await {
        Err(EnumerateError::NonZeroExit { stderr, .. }) => assert_eq!(stderr, "boom"),
        other => panic!("unexpected: {other:?}"),
    }
    assert!(e.list_or_empty().await.is_empty());
}

#[tokio::test]
async fn slow_listing_times_out() {
    let e = enumerator(ScriptSource::sh("sleep 5"), Duration::from_millis(100));
    let started = Instant::now();
    let res = e.list_processes().await;
    assert!(matches!(res, Err(EnumerateError::Timeout { .. })), "{res:?}");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn missing_binary_is_a_spawn_error() {
    let e = enumerator(
        ScriptSource {
            program: "hostwatch-definitely-not-installed",
            args: ["-c", "true"],
        },
        Duration::from_secs(1),
    );
    assert!(matches!(
        e.list_processes().await,
        Err(EnumerateError::Spawn { .. })
    ));
}
