use serde::{Deserialize, Serialize};

use crate::budget::{Budget, BudgetReport};

/// Loader configuration options.
///
/// Example: load a scene while rejecting properties the classes do not declare.
///
/// ```rust
/// use saphyr_unity::{from_str_with_options, Catalogue};
///
/// let yaml = "%TAG !u! tag:unity3d.com,2011:\n--- !u!81 &3\nAudioListener:\n  m_Enabled: 1\n";
///
/// let options = saphyr_unity::options! {
///     budget: Some(saphyr_unity::Budget {
///         max_documents: 100,
///         ..saphyr_unity::Budget::default()
///     }),
///     ignore_unmatched: false,
/// };
///
/// let scene = from_str_with_options(yaml, &Catalogue::unity(), options).unwrap();
/// assert_eq!(scene.objects.len(), 1);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Optional budget enforced on every event pulled from the YAML parser.
    pub budget: Option<Budget>,
    /// Optional callback invoked with the budget counters once the load ends.
    /// It is invoked both when loading succeeds and when it fails.
    #[serde(skip)]
    pub budget_report: Option<fn(&BudgetReport)>,
    /// Skip property keys the class does not declare. When false, such a key
    /// is a fatal [`crate::Error::UnknownProperty`]. Default: true.
    pub ignore_unmatched: bool,
    /// After exact name and alias matching failed, also try ASCII
    /// case-insensitive matching on names, then aliases. Default: false.
    pub case_insensitive_properties: bool,
    /// Resolve `{fileID: N}` references against the anchors of the decoded
    /// documents once the stream is drained. Default: true.
    pub resolve_references: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            budget: Some(Budget::default()),
            budget_report: None,
            ignore_unmatched: true,
            case_insensitive_properties: false,
            resolve_references: true,
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("budget", &self.budget)
            .field("budget_report", &self.budget_report.is_some())
            .field("ignore_unmatched", &self.ignore_unmatched)
            .field("case_insensitive_properties", &self.case_insensitive_properties)
            .field("resolve_references", &self.resolve_references)
            .finish()
    }
}

/// Small by-copy view of the options the decoder consults for every property.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cfg {
    pub(crate) ignore_unmatched: bool,
    pub(crate) case_insensitive_properties: bool,
}

impl Cfg {
    pub(crate) fn from_options(options: &Options) -> Self {
        Self {
            ignore_unmatched: options.ignore_unmatched,
            case_insensitive_properties: options.case_insensitive_properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let opts = Options::default();
        assert!(opts.budget.is_some());
        assert!(opts.budget_report.is_none());
        assert!(opts.ignore_unmatched);
        assert!(!opts.case_insensitive_properties);
        assert!(opts.resolve_references);
    }

    #[test]
    fn test_options_debug_format() {
        let opts = Options::default();
        let debug_str = format!("{:?}", opts);
        assert!(debug_str.contains("Options"));
        assert!(debug_str.contains("budget_report: false"));
    }

    #[test]
    fn cfg_copies_decoder_flags() {
        let opts = Options {
            ignore_unmatched: false,
            case_insensitive_properties: true,
            ..Options::default()
        };
        let cfg = Cfg::from_options(&opts);
        assert!(!cfg.ignore_unmatched);
        assert!(cfg.case_insensitive_properties);
    }
}
