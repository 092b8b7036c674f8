//! Discovery output model and the refresh machinery.

use std::collections::BTreeMap;

use serde::Serialize;

pub mod labels;
pub mod poller;
pub mod refresh;

/// A set of scrape targets sharing a common origin. Each target is a label
/// set uniquely identified by its `__address__` label; `source` names the
/// server the group was discovered from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetGroup {
    pub targets: Vec<BTreeMap<String, String>>,
    pub labels: BTreeMap<String, String>,
    pub source: String,
}
