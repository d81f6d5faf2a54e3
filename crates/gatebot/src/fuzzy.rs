// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyword → answer fuzzy matching, used when exact parsing finds nothing.

use rand::Rng;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct FuzzyAnswer {
    pub text: String,
    pub probability: f64,
    /// Optional repetition decay: once this answer has fired `threshold`
    /// times in the current burst, its effective probability is scaled by
    /// `decay`. Not wired to any built-in command by default.
    repeat_decay: Option<(u32, f64)>,
}

impl FuzzyAnswer {
    pub fn new(text: impl Into<String>, probability: f64) -> Self {
        FuzzyAnswer { text: text.into(), probability, repeat_decay: None }
    }

    pub fn with_repeat_decay(mut self, threshold: u32, decay: f64) -> Self {
        self.repeat_decay = Some((threshold, decay));
        self
    }

    fn effective_probability(&self, fire_count: u32) -> f64 {
        match self.repeat_decay {
            Some((threshold, decay)) if fire_count >= threshold => self.probability * decay,
            _ => self.probability,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FuzzyTable {
    answers: HashMap<String, Vec<FuzzyAnswer>>,
}

impl FuzzyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, keyword: impl Into<String>, answer: FuzzyAnswer) {
        self.answers.entry(keyword.into()).or_default().push(answer);
    }

    /// For every keyword contained in `text`, roll each of its answers
    /// against its effective probability and collect the winners.
    pub fn matches(&self, text: &str, fire_counts: &HashMap<String, u32>) -> Vec<String> {
        let mut rng = rand::rng();
        let mut hits = Vec::new();
        for (keyword, answers) in &self.answers {
            if !text.contains(keyword.as_str()) {
                continue;
            }
            let fire_count = fire_counts.get(keyword).copied().unwrap_or(0);
            for answer in answers {
                if rng.random::<f64>() < answer.effective_probability(fire_count) {
                    hits.push(answer.text.clone());
                }
            }
        }
        hits
    }
}
