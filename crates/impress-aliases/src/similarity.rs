//! Pairwise identity distance between two normalized records
//!
//! Every signal is a distance in [0, 1] where 1 means "no evidence". Name
//! signals and handle (email/login) signals are combined with MIN, so any
//! single strong witness is enough for a match.

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::config::{clamp_weight, SignalWeights};
use crate::record::NormalizedRecord;

/// Handles shorter than this are not compared.
const MIN_HANDLE_CHARS: usize = 3;

/// Name parts shorter than this are not looked up inside handles.
const MIN_NAME_PART_CHARS: usize = 2;

/// Levenshtein distance divided by the longer string's length in chars.
///
/// Two empty strings are at distance 0. Computed as a single division so
/// that exact ratios such as 3/10 compare equal to the literal threshold.
pub fn normalized_distance(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    levenshtein(a, b) as f64 / longest as f64
}

/// Scale a raw distance towards 1 by a weight in [0, 1].
///
/// `adjust_score(raw, 0) == 1` and `adjust_score(raw, 1) == raw`, exactly.
pub fn adjust_score(raw: f64, weight: f64) -> f64 {
    let weight = clamp_weight(weight);
    if weight == 0.0 {
        1.0
    } else if weight == 1.0 {
        raw
    } else {
        raw + (1.0 - raw) * (1.0 - weight)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Edit distance on handles, forced to 1 unless both are long enough.
fn gated_distance(a: &str, b: &str) -> f64 {
    if char_len(a) >= MIN_HANDLE_CHARS && char_len(b) >= MIN_HANDLE_CHARS {
        normalized_distance(a, b)
    } else {
        1.0
    }
}

/// Edit distance that treats an absent side as no evidence.
fn present_distance(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        1.0
    } else {
        normalized_distance(a, b)
    }
}

/// Edit distance between full normalized names.
pub fn full_name_distance(a: &NormalizedRecord, b: &NormalizedRecord) -> f64 {
    present_distance(&a.normalized_name, &b.normalized_name)
}

/// Mean of the first-name and last-name edit distances.
pub fn part_name_distance(a: &NormalizedRecord, b: &NormalizedRecord) -> f64 {
    let first = present_distance(&a.first_name, &b.first_name);
    let last = present_distance(&a.last_name, &b.last_name);
    (first + last) / 2.0
}

/// 0 if both first and last name (each longer than one character) occur in
/// the handle, otherwise 1.
pub fn name_in_handle_distance(first_name: &str, last_name: &str, handle: &str) -> f64 {
    if char_len(first_name) < MIN_NAME_PART_CHARS || char_len(last_name) < MIN_NAME_PART_CHARS {
        return 1.0;
    }
    let handle = handle.to_lowercase();
    if handle.contains(first_name) && handle.contains(last_name) {
        0.0
    } else {
        1.0
    }
}

/// Smaller of the full-name and name-part distances.
pub fn name_distance(a: &NormalizedRecord, b: &NormalizedRecord) -> f64 {
    full_name_distance(a, b).min(part_name_distance(a, b))
}

/// Name-in-email check run both ways; either direction failing gives 1.
pub fn name_email_distance(a: &NormalizedRecord, b: &NormalizedRecord) -> f64 {
    name_in_handle_distance(&a.first_name, &a.last_name, &b.email)
        .max(name_in_handle_distance(&b.first_name, &b.last_name, &a.email))
}

/// Name-in-login check run both ways; either direction failing gives 1.
pub fn login_name_distance(a: &NormalizedRecord, b: &NormalizedRecord) -> f64 {
    name_in_handle_distance(&a.first_name, &a.last_name, &b.login)
        .max(name_in_handle_distance(&b.first_name, &b.last_name, &a.login))
}

/// Edit distance between email local parts.
pub fn email_distance(a: &NormalizedRecord, b: &NormalizedRecord) -> f64 {
    gated_distance(&a.email_local_part, &b.email_local_part)
}

/// Edit distance between logins.
pub fn login_distance(a: &NormalizedRecord, b: &NormalizedRecord) -> f64 {
    gated_distance(&a.login, &b.login)
}

/// Best of login(a) vs email(b) and email(a) vs login(b).
pub fn login_email_distance(a: &NormalizedRecord, b: &NormalizedRecord) -> f64 {
    gated_distance(&a.login, &b.email_local_part)
        .min(gated_distance(&a.email_local_part, &b.login))
}

/// Per-signal distances for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalBreakdown {
    pub full_name: f64,
    pub part_name: f64,
    pub email_name: f64,
    pub email: f64,
    pub login: f64,
    pub login_email: f64,
    pub login_name: f64,
}

impl SignalBreakdown {
    fn labelled(&self) -> [(&'static str, f64); 7] {
        [
            ("Full name", self.full_name),
            ("Name parts", self.part_name),
            ("Name in email", self.email_name),
            ("Email", self.email),
            ("Login", self.login),
            ("Login/email", self.login_email),
            ("Name in login", self.login_name),
        ]
    }
}

/// Result of scoring one pair of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairScore {
    /// Final distance (0.0 = same identity, 1.0 = no evidence)
    pub distance: f64,
    /// Best adjusted name signal (1.0 when either name is missing)
    pub name_score: f64,
    /// Best adjusted email/login signal
    pub handle_score: f64,
    /// Signals before weighting
    pub raw: SignalBreakdown,
    /// Signals after weighting
    pub adjusted: SignalBreakdown,
    /// Human-readable explanation of the strongest signals
    pub reason: String,
}

/// Weighted combination of all signals into one distance.
#[derive(Debug, Clone, Default)]
pub struct PairwiseScorer {
    weights: SignalWeights,
}

impl PairwiseScorer {
    /// Create a scorer; weights are clamped to [0, 1] here.
    pub fn new(weights: SignalWeights) -> Self {
        Self {
            weights: weights.clamped(),
        }
    }

    pub fn weights(&self) -> &SignalWeights {
        &self.weights
    }

    /// Raw (unweighted) signals for a pair.
    pub fn signals(&self, a: &NormalizedRecord, b: &NormalizedRecord) -> SignalBreakdown {
        SignalBreakdown {
            full_name: full_name_distance(a, b),
            part_name: part_name_distance(a, b),
            email_name: name_email_distance(a, b),
            email: email_distance(a, b),
            login: login_distance(a, b),
            login_email: login_email_distance(a, b),
            login_name: login_name_distance(a, b),
        }
    }

    fn adjust(&self, raw: &SignalBreakdown) -> SignalBreakdown {
        let w = &self.weights;
        SignalBreakdown {
            full_name: adjust_score(raw.full_name, w.full_name_coef),
            part_name: adjust_score(raw.part_name, w.part_name_coef),
            email_name: adjust_score(raw.email_name, w.email_name_coef),
            email: adjust_score(raw.email, w.email_coef),
            login: adjust_score(raw.login, w.login_coef),
            login_email: adjust_score(raw.login_email, w.login_email_coef),
            login_name: adjust_score(raw.login_name, w.login_name_coef),
        }
    }

    fn combine(
        a: &NormalizedRecord,
        b: &NormalizedRecord,
        adjusted: &SignalBreakdown,
    ) -> (f64, f64) {
        let name_score = if a.has_name() && b.has_name() {
            adjusted
                .full_name
                .min(adjusted.part_name)
                .min(adjusted.email_name)
                .min(adjusted.login_name)
        } else {
            1.0
        };
        let handle_score = adjusted
            .email
            .min(adjusted.login)
            .min(adjusted.login_email)
            .min(adjusted.login_name);
        (name_score, handle_score)
    }

    /// Distance between two records in [0, 1].
    ///
    /// Identical records are always at distance 0, even when no field is
    /// usable for comparison.
    pub fn distance(&self, a: &NormalizedRecord, b: &NormalizedRecord) -> f64 {
        if a == b {
            return 0.0;
        }
        let adjusted = self.adjust(&self.signals(a, b));
        let (name_score, handle_score) = Self::combine(a, b, &adjusted);
        name_score.min(handle_score)
    }

    /// Distance plus the per-signal breakdown behind it.
    pub fn explain(&self, a: &NormalizedRecord, b: &NormalizedRecord) -> PairScore {
        let raw = self.signals(a, b);
        let adjusted = self.adjust(&raw);
        let (name_score, handle_score) = Self::combine(a, b, &adjusted);

        if a == b {
            return PairScore {
                distance: 0.0,
                name_score,
                handle_score,
                raw,
                adjusted,
                reason: "Identical record".to_string(),
            };
        }
        let distance = name_score.min(handle_score);

        let mut reasons: Vec<String> = adjusted
            .labelled()
            .iter()
            .filter(|(_, value)| *value < 1.0)
            .filter(|(label, _)| {
                // Name signals do not count when a name is missing
                name_score < 1.0 || !matches!(*label, "Full name" | "Name parts" | "Name in email")
            })
            .map(|(label, value)| format!("{} ({:.0}%)", label, (1.0 - value) * 100.0))
            .collect();
        if reasons.is_empty() {
            reasons.push("No significant similarity".to_string());
        }

        PairScore {
            distance,
            name_score,
            handle_score,
            raw,
            adjusted,
            reason: reasons.join("; "),
        }
    }
}
