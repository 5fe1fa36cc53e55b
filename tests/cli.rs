use std::fs;
use std::io::Write;
use std::path::PathBuf;

use assert_cmd::Command;

struct ScriptFile {
    path: PathBuf,
}

impl ScriptFile {
    fn new(name: &str, source: &str) -> Self {
        let path = std::env::temp_dir().join(format!("rlox-cli-test-{name}-{}.lox", std::process::id()));
        let mut file = fs::File::create(&path).expect("temp script file should be creatable");
        file.write_all(source.as_bytes()).expect("temp script file should be writable");
        ScriptFile { path }
    }
}

impl Drop for ScriptFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[test]
fn running_a_script_that_succeeds_exits_zero() {
    let file = ScriptFile::new("success", "print 1 + 2;");

    Command::cargo_bin("rlox").unwrap().arg(&file.path).assert().success().stdout("3\n");
}

#[test]
fn running_more_than_one_argument_exits_with_usage_error() {
    let output = Command::cargo_bin("rlox").unwrap().arg("a").arg("b").output().unwrap();

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: lox [script]"));
}

#[test]
fn a_compile_error_exits_65() {
    let file = ScriptFile::new("compile-error", "1 +;");

    Command::cargo_bin("rlox").unwrap().arg(&file.path).assert().code(65);
}

#[test]
fn a_runtime_error_exits_70() {
    let file = ScriptFile::new("runtime-error", "1 / 0;");

    Command::cargo_bin("rlox").unwrap().arg(&file.path).assert().code(70);
}
