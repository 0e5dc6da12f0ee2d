//! Integration Tests

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use assert_cli::Assert;
use lazy_static::lazy_static;
use tempdir::TempDir;

const YOSH: &str = env!("CARGO_BIN_EXE_yosh");

trait AssertExt {
    fn exit_status_is(self, exit_status: i32) -> Self;
}

impl AssertExt for Assert {
    fn exit_status_is(self, exit_status: i32) -> Self {
        if exit_status == 0 {
            self.succeeds()
        } else {
            self.fails_with(exit_status)
        }
    }
}

struct ScriptData<'a> {
    pub script: &'a str,
    pub stdout: &'a str,
    pub exit_status: i32,
}

lazy_static! {
    static ref SIMPLE_SCRIPTS: HashMap<&'static str, ScriptData<'static>> = {
        let mut map = HashMap::new();
        map.insert("simple_echo.yosh", ScriptData {
            script: "echo test\n",
            stdout: "test\n",
            exit_status: 0,
        });
        map.insert("simple_pipeline.yosh", ScriptData {
            script: "echo hello | tr a-z A-Z\n",
            stdout: "HELLO\n",
            exit_status: 0,
        });
        map.insert("simple_long_pipeline.yosh", ScriptData {
            script: "printf 'b\\na\\nb\\n' | sort | uniq | wc -l\n",
            stdout: "2",
            exit_status: 0,
        });
        map.insert("simple_quotes.yosh", ScriptData {
            script: "echo 'a | b' \"c > d\"\n",
            stdout: "a | b c > d\n",
            exit_status: 0,
        });
        map.insert("simple_builtin_pipe.yosh", ScriptData {
            script: "help | wc -l\n",
            stdout: "6",
            exit_status: 0,
        });
        map.insert("simple_last_status.yosh", ScriptData {
            script: "echo before\nfalse\n",
            stdout: "before\n",
            exit_status: 1,
        });
        map
    };
}

/// Scratch directory the shell runs in.
struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    fn new() -> WorkDir {
        WorkDir {
            dir: TempDir::new("yosh").expect("unable to generate temp dir"),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn create(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).expect("unable to write test file");
        path
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).expect("unable to read test file")
    }

    fn log_flag(&self) -> String {
        format!("--log={}", self.path().join("yosh.log").display())
    }

    fn assert_command(&self, command: &str) -> Assert {
        Assert::command(&[YOSH])
            .current_dir(self.path())
            .with_args(&[self.log_flag().as_str(), "-c", command])
    }

    /// Runs `script` as a script file and collects its output.
    fn run_script(&self, script: &str) -> Output {
        let path = self.create("script.yosh", script);
        Command::new(YOSH)
            .current_dir(self.path())
            .arg(self.log_flag())
            .arg(&path)
            .output()
            .expect("failed to run yosh")
    }
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_all_simple_yosh_scripts() {
    for (name, expected) in SIMPLE_SCRIPTS.iter() {
        let work_dir = WorkDir::new();
        let path = work_dir.create(name, expected.script);

        Assert::command(&[YOSH])
            .current_dir(work_dir.path())
            .with_args(&[work_dir.log_flag().as_str(), path.to_str().unwrap()])
            .stdout()
            .contains(expected.stdout)
            .exit_status_is(expected.exit_status)
            .unwrap();
    }
}

#[test]
fn test_output_redirect_creates_file() {
    let work_dir = WorkDir::new();
    work_dir
        .assert_command("echo hello | tr a-z A-Z > out.txt")
        .succeeds()
        .unwrap();
    assert_eq!(work_dir.read("out.txt"), "HELLO\n");
}

#[test]
fn test_output_redirect_refuses_existing_file() {
    let work_dir = WorkDir::new();
    work_dir.create("out.txt", "keep me");

    work_dir
        .assert_command("echo replaced > out.txt")
        .fails_with(1)
        .stderr()
        .contains("out.txt: File exists.")
        .unwrap();
    assert_eq!(work_dir.read("out.txt"), "keep me");
}

#[test]
fn test_input_redirect() {
    let work_dir = WorkDir::new();
    work_dir.create("in.txt", "b\na\n");

    work_dir
        .assert_command("sort < in.txt")
        .stdout()
        .is("a\nb")
        .unwrap();
}

#[test]
fn test_missing_input_file_runs_nothing() {
    let work_dir = WorkDir::new();
    work_dir
        .assert_command("cat < missing.txt > out.txt")
        .fails_with(1)
        .stderr()
        .contains("missing.txt: No such file or directory.")
        .unwrap();
    assert!(!work_dir.path().join("out.txt").exists());
}

#[test]
fn test_redirect_errors() {
    let work_dir = WorkDir::new();
    work_dir
        .assert_command("cat < a < b")
        .stderr()
        .contains("Ambiguous input redirect.")
        .unwrap();
    work_dir
        .assert_command("echo hi > a > b")
        .stderr()
        .contains("Ambiguous output redirect.")
        .unwrap();
    work_dir
        .assert_command("cat >")
        .stderr()
        .contains("Missing name for redirect.")
        .unwrap();
}

#[test]
fn test_builtin_with_redirect_writes_to_file() {
    let work_dir = WorkDir::new();
    work_dir.assert_command("help > help.txt").succeeds().unwrap();
    assert_eq!(work_dir.read("help.txt").lines().count(), 6);
}

#[test]
fn test_command_not_found() {
    let work_dir = WorkDir::new();
    work_dir
        .assert_command("yosh-no-such-command --flag")
        .fails_with(127)
        .stderr()
        .contains("yosh: yosh-no-such-command: command not found")
        .unwrap();
}

#[test]
fn test_syntax_error() {
    let work_dir = WorkDir::new();
    work_dir
        .assert_command("echo hi | | cat")
        .fails_with(2)
        .stderr()
        .contains("syntax error")
        .unwrap();
}

#[test]
fn test_foreground_child_killed_by_signal() {
    let work_dir = WorkDir::new();
    work_dir
        .assert_command("sh -c 'kill -9 $$'")
        .fails_with(137)
        .stderr()
        .contains("terminated by SIGKILL")
        .unwrap();
}

#[test]
fn test_cd_changes_directory_for_later_commands() {
    let work_dir = WorkDir::new();
    fs::create_dir(work_dir.path().join("sub")).unwrap();

    let output = work_dir.run_script("cd sub\npwd\ncd a b\n");
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("/sub"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: CD destination"));
}

#[test]
fn test_jobs_kill_and_terminated_listing() {
    let work_dir = WorkDir::new();
    let output = work_dir.run_script(
        "sleep 30 &\n\
         sleep 31 &\n\
         jobs\n\
         kill %1\n\
         jobs\n\
         jobs\n\
         kill %1\n",
    );
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 7, "unexpected output: {:?}", lines);

    let fields: Vec<Vec<&str>> = lines.iter().map(|l| l.split('\t').collect()).collect();

    // first listing: both running, dense ids
    assert_eq!(fields[0][0], "[1]");
    assert_eq!(&fields[0][2..], &["Running", "sleep 30"]);
    assert_eq!(fields[1][0], "[2]");
    assert_eq!(&fields[1][2..], &["Running", "sleep 31"]);
    let first_pid = fields[0][1];
    let second_pid = fields[1][1];

    assert_eq!(lines[2], format!("Process killed: {}", first_pid));

    // the killed job is reported once, then dropped
    assert_eq!(&fields[3][..], &["[1]", first_pid, "Terminated", "sleep 30"]);
    assert_eq!(&fields[4][..], &["[2]", second_pid, "Running", "sleep 31"]);
    assert_eq!(&fields[5][..], &["[1]", second_pid, "Running", "sleep 31"]);

    // ids are recomputed: %1 is now the second job
    assert_eq!(lines[6], format!("Process killed: {}", second_pid));
}

#[test]
fn test_kill_errors() {
    let work_dir = WorkDir::new();
    let output = work_dir.run_script("kill\nkill %4\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: Kill %number"));
    assert!(stderr.contains("yosh: kill: (%4) - No such process"));
}

#[test]
fn test_exit_refuses_while_jobs_run() {
    let work_dir = WorkDir::new();
    let output = work_dir.run_script(
        "sleep 30 &\n\
         exit\n\
         echo still here\n\
         kill %1\n\
         exit\n\
         echo unreachable\n",
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("There are still jobs running!\nstill here\n"));
    assert!(!stdout.contains("unreachable"));
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_history_from_stdin() {
    let work_dir = WorkDir::new();
    Assert::command(&[YOSH])
        .current_dir(work_dir.path())
        .with_args(&[work_dir.log_flag().as_str()])
        .stdin(
            "history -s 3\n\
             echo a\n\
             echo b\n\
             !!\n\
             echo c\n\
             history\n",
        )
        .stdout()
        .contains("b\nb\nc\n0004: ")
        .stdout()
        .doesnt_contain("0003: ")
        .unwrap();
}

#[test]
fn test_history_expansion_errors() {
    let work_dir = WorkDir::new();
    Assert::command(&[YOSH])
        .current_dir(work_dir.path())
        .with_args(&[work_dir.log_flag().as_str()])
        .stdin("!missing\n")
        .stderr()
        .contains("yosh: !missing: event not found")
        .unwrap();
}

#[test]
#[cfg(target_os = "linux")]
fn test_pipeline_leaves_no_zombies() {
    let work_dir = WorkDir::new();
    let output = work_dir.run_script(
        "echo a | cat | cat\n\
         sleep 0.5\n\
         sh -c 'ps -o stat= --ppid $PPID'\n",
    );
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], "a");
    // the only child left is the `sh` running ps
    let states: Vec<&str> = lines[1..].iter().map(|l| l.trim()).collect();
    assert_eq!(states.len(), 1, "unexpected children: {:?}", states);
    assert!(!states[0].starts_with('Z'), "zombie left behind: {:?}", states);
}

#[test]
#[cfg(target_os = "linux")]
fn test_stages_run_with_default_sigpipe() {
    // bit for signal 13 in /proc/<pid>/status masks
    const SIGPIPE_MASK: u64 = 1 << (13 - 1);

    let work_dir = WorkDir::new();
    let output = work_dir.run_script(
        "yes | head -n 1\n\
         grep SigIgn /proc/self/status\n",
    );
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], "y");

    let ignored = lines[1].trim_start_matches("SigIgn:").trim();
    let ignored = u64::from_str_radix(ignored, 16).expect("SigIgn is a hex mask");
    assert_eq!(ignored & SIGPIPE_MASK, 0);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Broken pipe"), "stderr: {}", stderr);
}
