//! Fact storage listener.
//!
//! Remembers free-form "subject is fact" statements addressed to the bot
//! and recalls a random one on request. Facts live in a JSON file mapping
//! each subject to the list of facts recorded for it.
//!
//! Triggers, checked in order:
//! - `<nick>: forget that <subject> is <fact>`
//! - `<nick>: <subject> is <fact>`
//! - `<nick>: define <subject>`

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use regex::Regex;
use tokio::sync::Mutex;

use super::Listener;

type Database = BTreeMap<String, Vec<String>>;

/// Listener backed by a JSON fact database on disk.
pub struct FactListener {
    path: PathBuf,
    /// Serializes read-modify-write cycles across concurrent dispatches.
    lock: Mutex<()>,
}

impl FactListener {
    /// Create the listener storing facts at the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    async fn read_database(&self) -> Database {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Database::default(),
        }
    }

    async fn write_database(&self, db: &Database) -> anyhow::Result<()> {
        let contents = serde_json::to_string_pretty(db)?;
        tokio::fs::write(&self.path, contents)
            .await
            .with_context(|| format!("failed to write fact database {}", self.path.display()))
    }

    async fn set_fact(&self, subject: &str, fact: &str) -> anyhow::Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        let mut db = self.read_database().await;

        let facts = db.entry(subject.to_owned()).or_default();
        if facts.iter().any(|f| f == fact) {
            return Ok(vec!["This has already been noted.".into()]);
        }
        facts.push(fact.to_owned());

        self.write_database(&db).await?;
        Ok(vec!["Thanks, I have made a note of this.".into()])
    }

    async fn get_fact(&self, subject: &str) -> Vec<String> {
        let _guard = self.lock.lock().await;
        let db = self.read_database().await;

        match db.get(subject).and_then(|facts| {
            facts.choose(&mut rand::thread_rng())
        }) {
            Some(fact) => vec![format!("{} is {}", subject, fact)],
            None => vec![format!("{} is not something I know about.", subject)],
        }
    }

    async fn forget_fact(&self, subject: &str, fact: &str) -> anyhow::Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        let mut db = self.read_database().await;

        let known = db
            .get_mut(subject)
            .filter(|facts| facts.iter().any(|f| f == fact));
        let Some(facts) = known else {
            return Ok(vec!["I don't know anything about that.".into()]);
        };

        facts.retain(|f| f != fact);
        if facts.is_empty() {
            db.remove(subject);
        }

        self.write_database(&db).await?;
        Ok(vec![format!("I have forgotten that {} is {}", subject, fact)])
    }
}

#[async_trait]
impl Listener for FactListener {
    fn name(&self) -> &'static str {
        "fact"
    }

    async fn invoke(&self, text: &str, bot_nick: &str) -> anyhow::Result<Vec<String>> {
        let nick = regex::escape(bot_nick);

        let forget = Regex::new(&format!("^{nick}: forget that (.*?) is (.*)"))?;
        if let Some(captures) = forget.captures(text) {
            return self.forget_fact(&captures[1], &captures[2]).await;
        }

        let set = Regex::new(&format!("{nick}: (.*?) is (.*)"))?;
        if let Some(captures) = set.captures(text) {
            return self.set_fact(&captures[1], &captures[2]).await;
        }

        let get = Regex::new(&format!("{nick}: define (.*)"))?;
        if let Some(captures) = get.captures(text) {
            return Ok(self.get_fact(&captures[1]).await);
        }

        Ok(vec![])
    }
}
