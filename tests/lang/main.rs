//! Runs every `.lox` program under `tests/lang` and checks it against the
//! annotations it carries:
//!
//! * `// expect: text` is one line of expected `print` output.
//! * `// Error at 'x': msg` is a static error on the same line.
//! * `// [line N] Error...` is a static error reported on line N.
//! * `// expect runtime error: msg` is the error that halts the program.

#[path = "../common/mod.rs"]
mod common;

use std::path::Path;

use common::OutputCapture;
use regex::Regex;
use rox::Lox;

struct Expectations {
    output: Vec<String>,
    static_errors: Vec<String>,
    runtime_error: Option<String>,
}

fn expectations(content: &str) -> Expectations {
    let expect_re = Regex::new(r"//\s*expect: (.*)").expect("regex should compile correctly");
    let error_re = Regex::new(r"//\s*(Error.*)").expect("regex should compile correctly");
    let line_error_re =
        Regex::new(r"//\s*(\[line \d+\] Error.*)").expect("regex should compile correctly");
    let runtime_re =
        Regex::new(r"//\s*expect runtime error: (.*)").expect("regex should compile correctly");

    let mut found = Expectations {
        output: Vec::new(),
        static_errors: Vec::new(),
        runtime_error: None,
    };

    for (index, line) in content.lines().enumerate() {
        if let Some(m) = expect_re.captures(line) {
            found.output.push(m[1].to_string());
        } else if let Some(m) = runtime_re.captures(line) {
            found.runtime_error = Some(m[1].to_string());
        } else if let Some(m) = line_error_re.captures(line) {
            found.static_errors.push(m[1].to_string());
        } else if let Some(m) = error_re.captures(line) {
            found.static_errors.push(format!("[line {}] {}", index + 1, &m[1]));
        }
    }

    found
}

fn run_file(path: &Path) {
    let content = std::fs::read_to_string(path).expect("test file should be valid UTF-8");
    let expected = expectations(&content);

    let output = OutputCapture::new();
    let mut lox = Lox::with_output(Box::new(output.clone()));
    let report = lox.run(&content);

    let static_errors: Vec<String> = report.static_errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        expected.static_errors, static_errors,
        "{}: static errors differ",
        path.display()
    );

    let runtime_error: Option<String> = report
        .runtime_error
        .as_ref()
        .and_then(|e| e.to_string().lines().next().map(str::to_owned));
    assert_eq!(
        expected.runtime_error, runtime_error,
        "{}: runtime error differs",
        path.display()
    );

    let actual: Vec<String> = output.contents().lines().map(str::to_owned).collect();
    assert_eq!(expected.output, actual, "{}: output differs", path.display());
}

#[test]
fn run_suite() {
    let mut count = 0;

    for entry in walkdir::WalkDir::new("tests/lang").sort_by_file_name() {
        let entry = entry.expect("No issues opening the test file");
        let path = entry.path();

        if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "lox") {
            println!("Running test: {}", path.display());
            run_file(path);
            count += 1;
        }
    }

    assert!(count > 0, "no .lox files found under tests/lang");
}
