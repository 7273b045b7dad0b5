// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Assign each task exactly one business-impact category from a static weighted keyword table
// role: engine/classification
// inputs: Task summary, description, priority
// outputs: Category (Feature Expansion when nothing matches)
// invariants:
// - pure and deterministic; identical text and priority always give the same category
// - keywords match whole words or whole phrases, case-insensitively; each keyword counts once
// - ties: High/Critical prefer Security & Compliance then Platform Stability, then Category::ALL order
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::model::{Category, Priority, Task};

/// Category keywords with weights; 3 = unambiguous, 2 = strong hint, 1 = weak hint.
pub static CATEGORY_KEYWORDS: &[(Category, &[(&str, u32)])] = &[
  (
    Category::RevenueSales,
    &[
      ("revenue", 3),
      ("billing", 3),
      ("invoice", 3),
      ("invoicing", 3),
      ("pricing", 3),
      ("checkout", 3),
      ("payment", 3),
      ("payments", 3),
      ("subscription", 3),
      ("upsell", 3),
      ("free trial", 3),
      ("sales", 2),
      ("conversion", 2),
      ("cart", 2),
      ("purchase", 2),
      ("discount", 2),
      ("coupon", 2),
    ],
  ),
  (
    Category::UserExperience,
    &[
      ("user experience", 3),
      ("ux", 3),
      ("usability", 3),
      ("onboarding", 3),
      ("accessibility", 3),
      ("a11y", 3),
      ("ui", 2),
      ("layout", 2),
      ("responsive", 2),
      ("navigation", 2),
      ("frontend", 2),
      ("login flow", 2),
      ("mobile", 1),
      ("design", 1),
      ("page", 1),
    ],
  ),
  (
    Category::SecurityCompliance,
    &[
      ("security", 3),
      ("vulnerability", 3),
      ("cve", 3),
      ("gdpr", 3),
      ("hipaa", 3),
      ("soc2", 3),
      ("compliance", 3),
      ("encryption", 3),
      ("xss", 3),
      ("csrf", 3),
      ("audit", 2),
      ("authentication", 2),
      ("authorization", 2),
      ("permission", 2),
      ("permissions", 2),
      ("sso", 2),
      ("password", 2),
      ("secret", 2),
      ("secrets", 2),
    ],
  ),
  (
    Category::OperationalEfficiency,
    &[
      ("automation", 3),
      ("automate", 3),
      ("efficiency", 3),
      ("internal tool", 3),
      ("tooling", 2),
      ("workflow", 2),
      ("pipeline", 2),
      ("ci", 2),
      ("deploy", 2),
      ("deployment", 2),
      ("cost", 2),
      ("script", 1),
      ("reporting", 1),
      ("cleanup", 1),
    ],
  ),
  (
    Category::PlatformStability,
    &[
      ("outage", 3),
      ("incident", 3),
      ("stability", 3),
      ("reliability", 3),
      ("uptime", 3),
      ("memory leak", 3),
      ("hotfix", 3),
      ("crash", 3),
      ("bug", 2),
      ("monitoring", 2),
      ("alert", 2),
      ("alerting", 2),
      ("timeout", 2),
      ("performance", 2),
      ("latency", 2),
      ("regression", 2),
      ("fix", 1),
      ("error", 1),
    ],
  ),
  (
    Category::FeatureExpansion,
    &[
      ("new feature", 3),
      ("launch", 2),
      ("feature", 2),
      ("integration", 2),
      ("introduce", 2),
      ("support for", 2),
      ("implement", 1),
      ("api", 1),
    ],
  ),
];

/// Lower-cased alphanumeric words of `text`.
pub fn words(text: &str) -> Vec<String> {
  text
    .split(|c: char| !c.is_alphanumeric())
    .filter(|w| !w.is_empty())
    .map(|w| w.to_lowercase())
    .collect()
}

/// Score of every category for `text`, in Category::ALL order.
pub fn score_categories(text: &str) -> Vec<(Category, u32)> {
  // " w1 w2 ... " so phrases match only on word boundaries
  let padded = format!(" {} ", words(text).join(" "));
  CATEGORY_KEYWORDS
    .iter()
    .map(|(cat, keywords)| {
      let score = keywords
        .iter()
        .filter(|(kw, _)| padded.contains(&format!(" {} ", kw)))
        .map(|(_, w)| *w)
        .sum();
      (*cat, score)
    })
    .collect()
}

fn affinity_rank(cat: Category, priority: Priority) -> usize {
  let urgent = priority >= Priority::High;
  let order = Category::ALL.iter().position(|c| *c == cat).unwrap_or(Category::ALL.len());
  match cat {
    Category::SecurityCompliance if urgent => 0,
    Category::PlatformStability if urgent => 1,
    _ => 2 + order,
  }
}

pub fn classify_text(summary: &str, description: &str, priority: Priority) -> Category {
  let text = format!("{}\n{}", summary, description);
  let scores = score_categories(&text);
  let best = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
  if best == 0 {
    return Category::FeatureExpansion;
  }
  scores
    .into_iter()
    .filter(|(_, s)| *s == best)
    .map(|(c, _)| c)
    .min_by_key(|c| affinity_rank(*c, priority))
    .unwrap_or(Category::FeatureExpansion)
}

pub fn classify(task: &Task) -> Category {
  classify_text(&task.summary, &task.description, task.priority)
}
