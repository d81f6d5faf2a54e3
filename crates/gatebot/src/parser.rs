// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-text tokenizer: splits `<start><name><sep><arg><sep><arg>…` runs
//! out of free text, plus priority-prefix detection.

use anyhow::{bail, Result};

const FORBIDDEN: &[char] = &['"', '\'', ',', '[', ']', '(', ')', '{', '}', '\\'];

fn contains_forbidden(s: &str) -> bool {
    s.chars().any(|c| FORBIDDEN.contains(&c) || c.is_ascii_digit() || c.is_ascii_alphabetic() || c.is_whitespace() || c.is_control())
}

/// An invocation is a non-empty `[name, arg, arg, ...]` sequence.
pub type Invocation = Vec<String>;

#[derive(Debug)]
pub struct Parser {
    starts: Vec<String>,
    priority_starts: Vec<String>,
    seps: Vec<String>,
}

impl Parser {
    pub fn new(starts: Vec<String>, priority_starts: Vec<String>, seps: Vec<String>) -> Result<Self> {
        if starts.is_empty() {
            bail!("command_start must be non-empty");
        }
        if seps.is_empty() {
            bail!("command_sep must be non-empty");
        }
        for s in starts.iter().chain(seps.iter()).chain(priority_starts.iter()) {
            if s.is_empty() {
                bail!("command_start/command_sep entries must be non-empty");
            }
            if contains_forbidden(s) {
                bail!("command_start/command_sep entry {s:?} contains a forbidden character");
            }
        }
        for start in &starts {
            for sep in &seps {
                if sep.starts_with(start.as_str()) {
                    bail!("command_start {start:?} is a prefix of command_sep {sep:?}");
                }
            }
        }
        Ok(Parser { starts, priority_starts, seps })
    }

    /// True iff `text` begins with one of the priority start prefixes.
    pub fn is_priority(&self, text: &str) -> bool {
        self.priority_starts.iter().any(|p| text.starts_with(p.as_str()))
    }

    /// Extract all invocations from `text`. Returns `[[]]`-equivalent (an
    /// empty vec) when no commands are found.
    pub fn parse(&self, text: &str) -> Vec<Invocation> {
        let mut invocations = Vec::new();
        let mut rest = text;
        while let Some((start_idx, start_len)) = self.find_start(rest) {
            let after_start = &rest[start_idx + start_len..];
            let (token, token_len) = self.next_token(after_start);
            let mut invocation = Vec::new();
            if !token.is_empty() {
                invocation.push(token.to_owned());
            }
            let mut cursor = &after_start[token_len..];
            while let Some(sep_len) = self.find_sep_at_start(cursor) {
                let after_sep = &cursor[sep_len..];
                let (arg, arg_len) = self.next_token(after_sep);
                invocation.push(arg.to_owned());
                cursor = &after_sep[arg_len..];
            }
            if !invocation.is_empty() && !invocation[0].is_empty() {
                invocations.push(invocation);
            }
            rest = cursor;
        }
        invocations
    }

    fn find_start<'a>(&self, text: &'a str) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for start in &self.starts {
            if let Some(idx) = text.find(start.as_str()) {
                if best.map(|(b, _)| idx < b).unwrap_or(true) {
                    best = Some((idx, start.len()));
                }
            }
        }
        best
    }

    fn find_sep_at_start(&self, text: &str) -> Option<usize> {
        self.seps.iter().find(|sep| text.starts_with(sep.as_str())).map(|sep| sep.len())
    }

    /// Read the maximal run of non-start, non-sep characters at the front of `text`.
    fn next_token<'a>(&self, text: &'a str) -> (&'a str, usize) {
        let mut end = text.len();
        for (idx, _) in text.char_indices() {
            let tail = &text[idx..];
            if self.starts.iter().any(|s| tail.starts_with(s.as_str()))
                || self.seps.iter().any(|s| tail.starts_with(s.as_str()))
            {
                end = idx;
                break;
            }
        }
        (&text[..end], end)
    }
}
