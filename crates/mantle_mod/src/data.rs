//! Mod definitions: option groups, options, and the assets they claim.

use crate::path::{GamePath, SourcePath};
use crate::settings::ModSettings;
use mantle_meta::MetaManipulation;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

/// The assets one option contributes: direct file replacements, pure
/// redirects to other virtual paths, and metadata patches.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OptionData {
    /// Virtual path to replacement source file
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub files: HashMap<GamePath, SourcePath>,

    /// Virtual path to redirect target; the source is usually another
    /// virtual path rather than an on-disk file
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub file_swaps: HashMap<GamePath, SourcePath>,

    /// Metadata patches contributed by this option
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manipulations: Vec<MetaManipulation>,
}

impl OptionData {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.file_swaps.is_empty() && self.manipulations.is_empty()
    }

    /// All path claims, replacements before redirects.
    pub fn paths(&self) -> impl Iterator<Item = (&GamePath, &SourcePath)> {
        self.files.iter().chain(self.file_swaps.iter())
    }
}

/// How a group's options combine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKind {
    /// Exactly one option is active, chosen by index.
    Single,
    /// Any subset of options is active, chosen by bitmask.
    Multi,
}

/// One selectable option inside a group.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GroupOption {
    /// The display name of the option
    pub name: String,

    /// Ordering weight among the active options of a multi-select group;
    /// ignored for single-select groups
    #[serde(default)]
    pub priority: i32,

    #[serde(flatten)]
    pub data: OptionData,
}

/// An ordered group of options within a mod.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OptionGroup {
    /// The display name of the group
    pub name: String,

    pub kind: GroupKind,

    /// Groups of higher priority contribute before groups of lower priority
    #[serde(default)]
    pub priority: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<GroupOption>,
}

impl OptionGroup {
    /// Clamp a raw selection to this group's layout: an in-range option
    /// index for single-select, a mask of existing options for multi-select.
    pub fn clamp_setting(&self, setting: u64) -> u64 {
        match self.kind {
            GroupKind::Single => setting.min(self.options.len().saturating_sub(1) as u64),
            GroupKind::Multi => {
                let bits = self.options.len().min(64) as u32;
                if bits == 64 {
                    setting
                } else {
                    setting & ((1u64 << bits) - 1)
                }
            }
        }
    }
}

/// A complete mod definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModData {
    /// The display name of the mod
    pub name: String,

    /// An optional free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Intrinsic priority, consulted only when the mod takes part in a
    /// collection without a settings record (temporary use)
    #[serde(default)]
    pub priority: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<OptionGroup>,

    /// Group-less data that contributes whenever the mod is enabled
    #[serde(default, skip_serializing_if = "OptionData::is_empty")]
    pub default_option: OptionData,
}

impl ModData {
    /// Contributing options under `settings`, most authoritative first.
    ///
    /// Groups are walked in descending priority. A single-select group
    /// contributes its selected option; a multi-select group contributes
    /// every option whose membership bit is set, in descending option
    /// priority. Stable sorting keeps declaration order among equals. The
    /// group-less default data always contributes last.
    pub fn emitted_options<'a>(&'a self, settings: &ModSettings) -> Vec<&'a OptionData> {
        let mut order: Vec<usize> = (0..self.groups.len()).collect();
        order.sort_by_key(|&idx| Reverse(self.groups[idx].priority));

        let mut emitted = Vec::new();
        for idx in order {
            let group = &self.groups[idx];
            let setting = group.clamp_setting(settings.group_setting(idx));
            match group.kind {
                GroupKind::Single => {
                    if let Some(option) = group.options.get(setting as usize) {
                        emitted.push(&option.data);
                    }
                }
                GroupKind::Multi => {
                    let mut selected: Vec<usize> = (0..group.options.len().min(64))
                        .filter(|&bit| setting & (1 << bit) != 0)
                        .collect();
                    selected.sort_by_key(|&bit| Reverse(group.options[bit].priority));
                    emitted.extend(selected.into_iter().map(|bit| &group.options[bit].data));
                }
            }
        }
        emitted.push(&self.default_option);
        emitted
    }
}

/// An always-active mod injected outside the normal settings flow. Carries
/// no groups; its single data block contributes unconditionally.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TempMod {
    pub name: String,

    /// Contest priority against every other active mod
    #[serde(default)]
    pub priority: i32,

    #[serde(flatten)]
    pub data: OptionData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantle_meta::{RspAttribute, RspIdentifier, RspManipulation, SubRace};

    fn file_option(name: &str, priority: i32, path: &str, source: &str) -> GroupOption {
        let mut data = OptionData::default();
        data.files
            .insert(GamePath::new(path).unwrap(), SourcePath::from(source));
        GroupOption {
            name: name.to_string(),
            priority,
            data,
        }
    }

    fn create_example_mod() -> ModData {
        ModData {
            name: "Aurum Regalia".to_string(),
            description: Some("Replacement gear set with optional dye channels".to_string()),
            priority: 0,
            groups: vec![
                OptionGroup {
                    name: "Base".to_string(),
                    kind: GroupKind::Single,
                    priority: 5,
                    options: vec![
                        file_option("Gold", 0, "chara/equipment/e0001/base.tex", "gold/base.tex"),
                        file_option("Silver", 0, "chara/equipment/e0001/base.tex", "silver/base.tex"),
                    ],
                },
                OptionGroup {
                    name: "Extras".to_string(),
                    kind: GroupKind::Multi,
                    priority: 2,
                    options: vec![
                        file_option("Trim", 3, "chara/equipment/e0001/trim.tex", "extras/trim.tex"),
                        file_option("Glow", 1, "chara/equipment/e0001/glow.tex", "extras/glow.tex"),
                        file_option("Dye", 2, "chara/equipment/e0001/dye.tex", "extras/dye.tex"),
                    ],
                },
            ],
            default_option: {
                let mut data = OptionData::default();
                data.manipulations.push(
                    RspManipulation::new(
                        RspIdentifier {
                            sub_race: SubRace::Midlander,
                            attribute: RspAttribute::Height,
                        },
                        1.05,
                    )
                    .into(),
                );
                data
            },
        }
    }

    fn settings(selections: &[u64]) -> ModSettings {
        ModSettings {
            enabled: true,
            priority: 0,
            settings: selections.to_vec(),
        }
    }

    #[test]
    fn test_single_select_emits_selected_option() {
        let mod_data = create_example_mod();
        let emitted = mod_data.emitted_options(&settings(&[1, 0]));
        // Silver base, no extras, then the default data.
        assert_eq!(emitted.len(), 2);
        assert!(emitted[0]
            .files
            .values()
            .any(|source| source.as_str() == "silver/base.tex"));
        assert_eq!(emitted[1], &mod_data.default_option);
    }

    #[test]
    fn test_multi_select_emits_set_bits_by_descending_priority() {
        let mod_data = create_example_mod();
        // Bits {0, 2} of the extras group; option priorities are [3, 1, 2],
        // so Trim (bit 0) contributes before Dye (bit 2) and Glow stays out.
        let emitted = mod_data.emitted_options(&settings(&[0, 0b101]));
        let sources: Vec<&str> = emitted
            .iter()
            .flat_map(|data| data.files.values().map(SourcePath::as_str))
            .collect();
        assert_eq!(
            sources,
            ["gold/base.tex", "extras/trim.tex", "extras/dye.tex"]
        );
    }

    #[test]
    fn test_group_priority_orders_emission() {
        let mut mod_data = create_example_mod();
        mod_data.groups[1].priority = 9;
        let emitted = mod_data.emitted_options(&settings(&[0, 0b010]));
        let sources: Vec<&str> = emitted
            .iter()
            .flat_map(|data| data.files.values().map(SourcePath::as_str))
            .collect();
        // Extras now outrank the base group.
        assert_eq!(sources, ["extras/glow.tex", "gold/base.tex"]);
    }

    #[test]
    fn test_missing_settings_default_to_zero() {
        let mod_data = create_example_mod();
        let emitted = mod_data.emitted_options(&settings(&[]));
        assert_eq!(emitted.len(), 2);
        assert!(emitted[0]
            .files
            .values()
            .any(|source| source.as_str() == "gold/base.tex"));
    }

    #[test]
    fn test_clamp_setting() {
        let mod_data = create_example_mod();
        assert_eq!(mod_data.groups[0].clamp_setting(7), 1);
        assert_eq!(mod_data.groups[1].clamp_setting(0b1111_1010), 0b010);
    }

    #[test]
    fn test_json_parsing() {
        let mod_data: ModData =
            serde_json::from_str(include_str!("../test-data/mod.mantle.json")).unwrap();

        assert_eq!(mod_data, create_example_mod());
    }

    #[test]
    fn test_toml_parsing() {
        let mod_data: ModData =
            toml::from_str(include_str!("../test-data/mod.mantle.toml")).unwrap();

        assert_eq!(mod_data, create_example_mod());
    }
}
