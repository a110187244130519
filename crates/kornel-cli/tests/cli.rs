use std::io::Write;
use std::process::{Command, Output, Stdio};

fn kornel(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_kornel"))
        .args(args)
        .env("LC_ALL", "C.UTF-8")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn kornel");
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn one_shot_cut_reads_stdin() {
    let output = kornel(&["cut", "-d:", "-f2-3"], b"a:b:c:d\n");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"b:c\n");
}

#[test]
fn one_shot_cut_keeps_split_bytes() {
    let output = kornel(&["cut", "-b5"], "abcαβγ\n".as_bytes());
    assert_eq!(output.stdout, [0xb1, b'\n']);
}

#[test]
fn usage_error_exit_code() {
    let output = kornel(&["cut", "-b1", "-f1"], b"");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("only one type of list"));
}

#[test]
fn command_string() {
    let output = kornel(
        &["-c", "enum -i M=(On Off); M m=off; echo $m"],
        b"",
    );
    assert!(output.status.success());
    assert_eq!(output.stdout, b"Off\n");
}

#[test]
fn script_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.txt");
    std::fs::write(&data, "x,1\ny,2\n").unwrap();
    let script = dir.path().join("run.kn");
    std::fs::write(
        &script,
        format!("#!/usr/bin/env kornel\nenum Color=(red green blue)\nColor c=blue\necho $((c))\ncut -d, -f2 {}\n", data.display()),
    )
    .unwrap();

    let output = kornel(&[script.to_str().unwrap()], b"");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(output.stdout, b"2\n1\n2\n");
}

#[test]
fn missing_file_fails_but_continues() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.txt");
    std::fs::write(&good, "a:b\n").unwrap();
    let missing = dir.path().join("missing.txt");

    let output = kornel(
        &["cut", "-d:", "-f2", missing.to_str().unwrap(), good.to_str().unwrap()],
        b"",
    );
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(output.stdout, b"b\n");
}
