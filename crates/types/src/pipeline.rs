//! Pipeline stage ordering and promotion rules.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::PipelineCoupling;

/// Stages an app can be coupled to, in promotion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    Review,
    Development,
    Staging,
    Production,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 4] = [Self::Review, Self::Development, Self::Staging, Self::Production];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// The stage this one promotes into.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Review => Some(Self::Development),
            Self::Development => Some(Self::Staging),
            Self::Staging => Some(Self::Production),
            Self::Production => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown pipeline stage '{s}'"))
    }
}

/// Stage pairs `(from, to)` a pipeline can promote between.
///
/// A pair is promotable when `to` directly follows `from` and both stages
/// have at least one coupled app. Couplings with unknown stage names are
/// ignored.
pub fn promotable_pairs(couplings: &[PipelineCoupling]) -> Vec<(PipelineStage, PipelineStage)> {
    let populated: BTreeSet<PipelineStage> = couplings
        .iter()
        .filter_map(|coupling| coupling.stage.parse::<PipelineStage>().ok())
        .collect();

    populated
        .iter()
        .filter_map(|stage| {
            let next = stage.next()?;
            populated.contains(&next).then_some((*stage, next))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::App;

    fn coupling(app: &str, stage: &str) -> PipelineCoupling {
        PipelineCoupling {
            app: App {
                id: String::new(),
                name: app.to_string(),
            },
            stage: stage.to_string(),
        }
    }

    #[test]
    fn pairs_require_both_stages_populated() {
        let couplings = vec![
            coupling("portal-dev", "development"),
            coupling("portal-stg", "staging"),
            coupling("portal-prd", "production"),
        ];
        assert_eq!(
            promotable_pairs(&couplings),
            vec![
                (PipelineStage::Development, PipelineStage::Staging),
                (PipelineStage::Staging, PipelineStage::Production),
            ]
        );
    }

    #[test]
    fn gaps_break_promotion() {
        let couplings = vec![coupling("portal-dev", "development"), coupling("portal-prd", "production")];
        assert!(promotable_pairs(&couplings).is_empty());
        assert!(promotable_pairs(&[coupling("x", "qa")]).is_empty());
    }
}
