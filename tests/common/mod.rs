#![allow(dead_code)]

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use rox::{Lox, Report};

/// `Write` sink that keeps everything printed by a session.
#[derive(Debug, Clone, Default)]
pub struct OutputCapture {
    into: Rc<RefCell<Vec<u8>>>,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.into.borrow()).into_owned()
    }
}

impl io::Write for OutputCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.into.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `source` in a fresh session, returning printed output and the report.
pub fn run(source: &str) -> (String, Report) {
    let output = OutputCapture::new();
    let mut lox = Lox::with_output(Box::new(output.clone()));
    let report = lox.run(source);

    (output.contents(), report)
}

/// Run `source` and expect it to finish cleanly; returns printed lines.
pub fn run_ok(source: &str) -> Vec<String> {
    let (output, report) = run(source);

    let errors: Vec<String> = report.errors().map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);

    output.lines().map(str::to_owned).collect()
}
