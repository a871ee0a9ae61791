//! Per-collection settings for installed mods.

use crate::data::OptionGroup;
use serde::{Deserialize, Serialize};

/// The settings record one collection keeps for one installed mod.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ModSettings {
    pub enabled: bool,

    /// Contest priority against every other active mod
    #[serde(default)]
    pub priority: i32,

    /// One selection per option group: an option index for single-select
    /// groups, a membership bitmask for multi-select groups. Missing
    /// entries read as zero.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub settings: Vec<u64>,
}

impl Default for ModSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            priority: 0,
            settings: Vec::new(),
        }
    }
}

impl ModSettings {
    pub fn group_setting(&self, group_index: usize) -> u64 {
        self.settings.get(group_index).copied().unwrap_or(0)
    }

    /// Fit the selections to a mod's group layout: pad or drop entries to
    /// match the group count and clamp each to its group's valid range.
    /// Out-of-range selections come from definition changes after the
    /// settings were written.
    pub fn sanitize(&mut self, groups: &[OptionGroup]) {
        self.settings.resize(groups.len(), 0);
        for (setting, group) in self.settings.iter_mut().zip(groups) {
            *setting = group.clamp_setting(*setting);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GroupKind, GroupOption};

    fn group(kind: GroupKind, option_count: usize) -> OptionGroup {
        OptionGroup {
            name: "group".to_string(),
            kind,
            priority: 0,
            options: (0..option_count)
                .map(|idx| GroupOption {
                    name: format!("option {idx}"),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_sanitize_fits_and_clamps() {
        let groups = [group(GroupKind::Single, 3), group(GroupKind::Multi, 2)];
        let mut settings = ModSettings {
            enabled: true,
            priority: 0,
            settings: vec![9, 0b111, 4],
        };
        settings.sanitize(&groups);
        assert_eq!(settings.settings, vec![2, 0b11]);

        let mut short = ModSettings::default();
        short.sanitize(&groups);
        assert_eq!(short.settings, vec![0, 0]);
    }
}
