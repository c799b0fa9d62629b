//! Mix package planning
//!
//! A mix package is a batch of standard mixes rendered in one backend
//! request. The selectable mixes form a two-level tree: each standard mix
//! type is a parent whose children are that type applied to every part
//! (e.g. "Bass Dominant", "Lead Dominant"). `Full Mix` has no per-part
//! variants and is a leaf of its own.

use crate::api::CreateMixPackageRequest;
use crate::playback::PlaybackParams;
use std::collections::BTreeSet;

/// Name of the mix with every part at equal level
pub const FULL_MIX: &str = "Full Mix";

/// Standard mix types, in display order
pub const STANDARD_MIX_TYPES: [&str; 4] = [FULL_MIX, "Dominant", "Missing", "Solo"];

/// Name of a per-part standard mix
pub fn part_mix_name(part: &str, mix_type: &str) -> String {
    format!("{} {}", part, mix_type)
}

/// One node of the selection tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixNode {
    pub id: String,
    pub children: Vec<String>,
}

impl MixNode {
    pub fn is_parent(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Build the selection tree for a song's parts
pub fn mix_tree(parts: &[String]) -> Vec<MixNode> {
    STANDARD_MIX_TYPES
        .iter()
        .map(|&mix_type| MixNode {
            id: mix_type.to_string(),
            children: if mix_type == FULL_MIX {
                Vec::new()
            } else {
                parts.iter().map(|p| part_mix_name(p, mix_type)).collect()
            },
        })
        .collect()
}

/// Selection state for creating a mix package
#[derive(Debug, Clone)]
pub struct PackagePlanner {
    parts: Vec<String>,
    tree: Vec<MixNode>,
    existing: BTreeSet<String>,
    selected: BTreeSet<String>,
}

impl PackagePlanner {
    /// Start a plan; mixes the song already has begin selected
    pub fn new(parts: Vec<String>, existing: impl IntoIterator<Item = String>) -> Self {
        let tree = mix_tree(&parts);
        let existing: BTreeSet<String> = existing.into_iter().collect();
        Self {
            parts,
            tree,
            selected: existing.clone(),
            existing,
        }
    }

    pub fn tree(&self) -> &[MixNode] {
        &self.tree
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Replace the selection.
    ///
    /// Existing mixes always stay selected, and selecting a parent selects
    /// all of its children.
    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next = self.existing.clone();
        for id in ids {
            let id = id.as_ref();
            next.insert(id.to_string());
            if let Some(node) = self.tree.iter().find(|n| n.id == id) {
                next.extend(node.children.iter().cloned());
            }
        }
        self.selected = next;
    }

    /// Selected mixes that still need rendering, in tree order
    pub fn mixes_to_create(&self) -> Vec<String> {
        let mut result = Vec::new();
        for node in &self.tree {
            if node.is_parent() {
                result.extend(
                    node.children
                        .iter()
                        .filter(|c| self.selected.contains(*c) && !self.existing.contains(*c))
                        .cloned(),
                );
            } else if self.selected.contains(&node.id) && !self.existing.contains(&node.id) {
                result.push(node.id.clone());
            }
        }
        result
    }

    /// Build the backend request for the planned package
    pub fn to_request(&self, description: impl Into<String>, playback: PlaybackParams) -> CreateMixPackageRequest {
        CreateMixPackageRequest {
            description: description.into(),
            parts: self.parts.clone(),
            mixes: self.mixes_to_create(),
            speed_factor: playback.speed_factor,
            pitch_shift: playback.pitch_shift,
        }
    }
}
