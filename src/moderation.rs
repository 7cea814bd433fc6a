//! Content moderation.
//!
//! Every record passes three checks before it is published, stopping at the
//! first stage that reports a problem:
//!
//! 1. **Metadata**: banned keywords in title, description or tags, and
//!    missing attribution (source or license).
//! 2. **Analysis**: an [`Analyzer`], the seam where an image classifier
//!    plugs in. Two implementations ship: [`RuleAnalyzer`] (deterministic)
//!    and [`SimulatedAnalyzer`] (adds latency and seeded random flags to
//!    stand in for a remote service during demos).
//! 3. **License**: the license must be in the accepted set, and
//!    non-commercial licenses cannot be used commercially.
//!
//! Moderation never fails: an analyzer error becomes a flagged verdict with
//! a generic issue, and the cause is logged.

use crate::config::{AnalyzerKind, ModerationConfig};
use crate::types::{ImageRecord, UsageClass};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Issue reported when the analysis stage itself fails.
pub const SERVICE_UNAVAILABLE: &str = "Moderation service unavailable";

const MISSING_ATTRIBUTION: &str = "Missing source or license information";
const TRADEMARK_ISSUE: &str = "Potential trademark issue detected";
const NON_COMMERCIAL_MISUSE: &str = "Non-commercial license used for commercial purposes";
const REDACTED: &str = "[REDACTED]";

#[derive(Error, Debug)]
pub enum ModerationError {
    #[error("analysis service failed: {0}")]
    Service(String),
}

/// Which stage decided the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationReason {
    Metadata,
    AiAnalysis,
    License,
    Approved,
    Error,
}

/// Verdict for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub safe: bool,
    pub issues: Vec<String>,
    pub reason: ModerationReason,
}

impl ModerationResult {
    fn approved() -> Self {
        Self {
            safe: true,
            issues: Vec::new(),
            reason: ModerationReason::Approved,
        }
    }

    fn flagged(reason: ModerationReason, issues: Vec<String>) -> Self {
        Self {
            safe: false,
            issues,
            reason,
        }
    }
}

/// Output of the analysis stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub safe: bool,
    pub issues: Vec<String>,
}

impl AnalysisResult {
    pub fn safe() -> Self {
        Self {
            safe: true,
            issues: Vec::new(),
        }
    }

    pub fn unsafe_with(issue: &str) -> Self {
        Self {
            safe: false,
            issues: vec![issue.to_string()],
        }
    }
}

/// The analysis stage of moderation.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, record: &ImageRecord) -> Result<AnalysisResult, ModerationError>;
}

/// Deterministic analysis: flags titles mentioning "test".
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleAnalyzer;

impl RuleAnalyzer {
    fn check(record: &ImageRecord) -> AnalysisResult {
        if record.title.to_lowercase().contains("test") {
            AnalysisResult::unsafe_with(TRADEMARK_ISSUE)
        } else {
            AnalysisResult::safe()
        }
    }
}

#[async_trait]
impl Analyzer for RuleAnalyzer {
    async fn analyze(&self, record: &ImageRecord) -> Result<AnalysisResult, ModerationError> {
        Ok(Self::check(record))
    }
}

/// Stand-in for a remote classifier: the rule checks, a fixed delay, and
/// a small probability of flagging anything.
#[derive(Debug)]
pub struct SimulatedAnalyzer {
    latency: Duration,
    flag_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedAnalyzer {
    /// `flag_rate` must be within `0.0..=1.0` (checked by config validation).
    pub fn new(latency: Duration, flag_rate: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            latency,
            flag_rate,
            rng: Mutex::new(rng),
        }
    }

    fn roll(&self) -> Result<bool, ModerationError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ModerationError::Service("random source poisoned".into()))?;
        Ok(rng.random_bool(self.flag_rate))
    }
}

#[async_trait]
impl Analyzer for SimulatedAnalyzer {
    async fn analyze(&self, record: &ImageRecord) -> Result<AnalysisResult, ModerationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let ruled = RuleAnalyzer::check(record);
        if !ruled.safe {
            return Ok(ruled);
        }
        if self.roll()? {
            return Ok(AnalysisResult::unsafe_with(TRADEMARK_ISSUE));
        }
        Ok(ruled)
    }
}

/// Build the analyzer selected by config.
pub fn analyzer_from_config(config: &ModerationConfig) -> Box<dyn Analyzer> {
    match config.analyzer {
        AnalyzerKind::Rules => Box::new(RuleAnalyzer),
        AnalyzerKind::Simulated => Box::new(SimulatedAnalyzer::new(
            Duration::from_millis(config.latency_ms),
            config.random_flag_rate,
            config.seed,
        )),
    }
}

/// Runs the three moderation stages against records.
pub struct ContentModerator {
    banned_keywords: Vec<String>,
    licenses: Vec<String>,
    analyzer: Box<dyn Analyzer>,
}

impl ContentModerator {
    pub fn new(config: &ModerationConfig, analyzer: Box<dyn Analyzer>) -> Self {
        Self {
            banned_keywords: config
                .banned_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            licenses: config.licenses.clone(),
            analyzer,
        }
    }

    pub fn from_config(config: &ModerationConfig) -> Self {
        Self::new(config, analyzer_from_config(config))
    }

    /// Moderate one record. Never fails; see the module docs.
    pub async fn moderate(&self, record: &ImageRecord) -> ModerationResult {
        let metadata_issues = self.check_metadata(record);
        if !metadata_issues.is_empty() {
            return ModerationResult::flagged(ModerationReason::Metadata, metadata_issues);
        }

        match self.analyzer.analyze(record).await {
            Ok(analysis) if !analysis.safe => {
                return ModerationResult::flagged(ModerationReason::AiAnalysis, analysis.issues);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(id = %record.id, error = %e, "moderation analysis failed");
                return ModerationResult::flagged(
                    ModerationReason::Error,
                    vec![SERVICE_UNAVAILABLE.to_string()],
                );
            }
        }

        let license_issues = self.check_license(record);
        if !license_issues.is_empty() {
            return ModerationResult::flagged(ModerationReason::License, license_issues);
        }

        ModerationResult::approved()
    }

    /// Banned keywords in the record text, plus missing attribution.
    pub fn check_metadata(&self, record: &ImageRecord) -> Vec<String> {
        let text = format!(
            "{} {} {}",
            record.title,
            record.description,
            record.tags.join(" ")
        )
        .to_lowercase();

        let mut issues: Vec<String> = self
            .banned_keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .map(|k| format!("Contains banned keyword: {k}"))
            .collect();

        if record.source.trim().is_empty() || record.license.trim().is_empty() {
            issues.push(MISSING_ATTRIBUTION.to_string());
        }
        issues
    }

    /// Unknown licenses, and non-commercial licenses used commercially.
    pub fn check_license(&self, record: &ImageRecord) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.licenses.iter().any(|l| *l == record.license) {
            issues.push(format!("Invalid license type: {}", record.license));
        }
        if record.license.contains("NC") && record.usage == UsageClass::Commercial {
            issues.push(NON_COMMERCIAL_MISUSE.to_string());
        }
        issues
    }

    /// Description with banned words replaced by `[REDACTED]` and the
    /// source and license appended.
    pub fn generate_safe_description(&self, record: &ImageRecord) -> String {
        let mut description = record.description.clone();
        for keyword in &self.banned_keywords {
            description = redact(&description, keyword);
        }
        if !record.source.is_empty() {
            description.push_str(&format!(" \n\nSource: {}", record.source));
        }
        if !record.license.is_empty() {
            description.push_str(&format!(" \nLicense: {}", record.license));
        }
        description.trim().to_string()
    }
}

/// Case-insensitive replacement of every occurrence of `keyword`.
///
/// `keyword` must already be lowercase. Matching walks the original text
/// one character at a time, so characters whose lowercase form has a
/// different length do not shift the match positions.
fn redact(text: &str, keyword: &str) -> String {
    if keyword.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        match lowercase_match_len(rest, keyword) {
            Some(len) => {
                out.push_str(REDACTED);
                rest = &rest[len..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

/// Byte length of the prefix of `text` that lowercases to exactly
/// `keyword`, if there is one.
fn lowercase_match_len(text: &str, keyword: &str) -> Option<usize> {
    let mut wanted = keyword.chars();
    for (start, c) in text.char_indices() {
        for lower in c.to_lowercase() {
            if wanted.next() != Some(lower) {
                return None;
            }
        }
        if wanted.as_str().is_empty() {
            return Some(start + c.len_utf8());
        }
    }
    None
}
